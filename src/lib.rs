//! # taxon
//!
//! A TF-IDF topic classification library and CLI for Rust.
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Pluggable text analysis pipeline (tokenizers, filters, analyzers)
//! - TF-IDF feature extraction over unigrams and bigrams
//! - Multinomial logistic regression with calibrated softmax output
//! - Version-tagged, atomically published model bundles
//! - Lock-free concurrent inference over an immutable loaded model
//!
//! ## Quick start
//!
//! ```no_run
//! use taxon::inference::ClassifierHandle;
//! use taxon::train::Trainer;
//!
//! # fn main() -> taxon::error::Result<()> {
//! let report = Trainer::new().train("corpus.jsonl", "model.bin")?;
//! println!("held-out accuracy: {:.3}", report.accuracy);
//!
//! let handle = ClassifierHandle::load("model.bin")?;
//! let result = handle.classify("a long enough paragraph of text ...")?;
//! println!("{}", result.predicted_label);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod classifier;
pub mod cli;
pub mod corpus;
pub mod error;
pub mod features;
pub mod fetch;
pub mod inference;
pub mod metrics;
pub mod model;
pub mod train;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
