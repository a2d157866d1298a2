//! Command implementations for the taxon CLI.

use std::io::Read;

use crate::classifier::LogisticRegressionConfig;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{Result, TaxonError};
use crate::fetch::{PageFetcher, looks_like_url};
use crate::inference::ClassifierHandle;
use crate::model::ModelBundle;
use crate::train::{Trainer, TrainerConfig};

/// Execute a CLI command.
pub fn execute_command(args: TaxonArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::Classify(classify_args) => classify(classify_args.clone(), &args),
        Command::Inspect(inspect_args) => inspect(inspect_args.clone(), &args),
    }
}

/// Train a model from a corpus and publish the bundle.
fn train(args: TrainArgs, cli_args: &TaxonArgs) -> Result<()> {
    if cli_args.verbosity() > 0 {
        println!("Training from: {}", args.corpus_file.display());
    }

    let config = TrainerConfig {
        test_ratio: args.test_ratio,
        max_features: args.max_features,
        classifier: LogisticRegressionConfig {
            max_iterations: args.max_iterations,
            ..Default::default()
        },
    };

    let report = Trainer::with_config(config).train(&args.corpus_file, &args.model)?;

    print_eval_report(&report, cli_args)?;
    if cli_args.verbosity() > 0 {
        println!("Model written to: {}", args.model.display());
    }

    Ok(())
}

/// Classify text from a flag, a fetched URL, or stdin.
fn classify(args: ClassifyArgs, cli_args: &TaxonArgs) -> Result<()> {
    let handle = ClassifierHandle::load(&args.model)?;

    let text = resolve_input(&args, cli_args)?;
    let result = handle.classify(&text)?;

    print_classification(&result, cli_args)
}

/// Resolve the classification input from the CLI surface.
///
/// `--text` that looks like a URL is still treated as raw text; fetching only
/// happens through `--url`, keeping the two entry points distinct.
fn resolve_input(args: &ClassifyArgs, cli_args: &TaxonArgs) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }

    if let Some(url) = &args.url {
        if !looks_like_url(url) {
            return Err(TaxonError::invalid_argument(format!(
                "{url:?} is not an http(s) URL"
            )));
        }
        if cli_args.verbosity() > 1 {
            println!("Fetching: {url}");
        }
        let fetcher = PageFetcher::new()?;
        return Ok(fetcher.fetch_text(url));
    }

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

/// Show bundle metadata.
fn inspect(args: InspectArgs, cli_args: &TaxonArgs) -> Result<()> {
    let bundle = ModelBundle::load(&args.model)?;

    let info = InspectionResult {
        format_version: bundle.format_version(),
        trained_at: bundle.metadata.trained_at.to_rfc3339(),
        training_documents: bundle.metadata.training_documents,
        vocabulary_size: bundle.vectorizer.vocabulary_size(),
        classes: bundle.classifier.classes().to_vec(),
    };

    print_inspection(&info, cli_args)
}
