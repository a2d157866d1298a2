//! Command line argument parsing for the taxon CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// taxon - a TF-IDF topic classifier
#[derive(Parser, Debug, Clone)]
#[command(name = "taxon")]
#[command(about = "Train and run a TF-IDF topic classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TaxonArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TaxonArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a model from a labeled corpus
    Train(TrainArgs),

    /// Classify text, stdin, or a fetched URL against a trained model
    Classify(ClassifyArgs),

    /// Show metadata for a trained model bundle
    Inspect(InspectArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Path to the training corpus (JSONL, one document per line)
    #[arg(value_name = "CORPUS_FILE")]
    pub corpus_file: PathBuf,

    /// Where to write the trained model bundle
    #[arg(short, long, value_name = "MODEL_PATH", default_value = "model.bin")]
    pub model: PathBuf,

    /// Fraction of each label held out for evaluation
    #[arg(long, default_value = "0.2")]
    pub test_ratio: f64,

    /// Maximum vocabulary size
    #[arg(long, default_value = "20000")]
    pub max_features: usize,

    /// Maximum optimizer iterations
    #[arg(long, default_value = "200")]
    pub max_iterations: usize,
}

/// Arguments for classification
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Path to the trained model bundle
    #[arg(value_name = "MODEL_PATH")]
    pub model: PathBuf,

    /// Text to classify
    #[arg(short, long, conflicts_with = "url")]
    pub text: Option<String>,

    /// URL to fetch and classify
    #[arg(short, long, conflicts_with = "text")]
    pub url: Option<String>,
}

/// Arguments for bundle inspection
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Path to the trained model bundle
    #[arg(value_name = "MODEL_PATH")]
    pub model: PathBuf,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
