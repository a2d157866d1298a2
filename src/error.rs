//! Error types for the taxon library.
//!
//! All fallible operations in taxon return [`Result`], whose error type is the
//! [`TaxonError`] enum. The variants mirror the failure taxonomy of the
//! pipeline: bad inputs, use-before-fit, corrupt or incompatible persisted
//! models, corpora that cannot be stratified, and inference input below the
//! minimum signal threshold.
//!
//! # Examples
//!
//! ```
//! use taxon::error::{TaxonError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(TaxonError::invalid_argument("features and labels differ in length"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for taxon operations.
///
/// Uses the `thiserror` crate for automatic `Error` trait implementation and
/// provides convenient constructor methods for the common variants.
#[derive(Error, Debug)]
pub enum TaxonError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed or mismatched inputs to fit/predict.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A component was used before it was fitted.
    #[error("Not fitted: {0}")]
    NotFitted(String),

    /// A persisted model bundle is missing, corrupt, or incompatible.
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// The training corpus is empty or cannot be stratified.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Inference input is below the minimum signal threshold.
    #[error("Input too short: need at least {required} characters, got {actual}")]
    InputTooShort { required: usize, actual: usize },

    /// A component was configured or re-used in an unsupported way.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Text analysis (tokenization, filtering) errors.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Serialization errors outside of JSON (bundle encoding/decoding).
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`TaxonError`].
pub type Result<T> = std::result::Result<T, TaxonError>;

impl TaxonError {
    /// Create a new invalid-argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        TaxonError::InvalidArgument(msg.into())
    }

    /// Create a new not-fitted error.
    pub fn not_fitted<S: Into<String>>(msg: S) -> Self {
        TaxonError::NotFitted(msg.into())
    }

    /// Create a new model-load error.
    pub fn model_load<S: Into<String>>(msg: S) -> Self {
        TaxonError::ModelLoad(msg.into())
    }

    /// Create a new insufficient-data error.
    pub fn insufficient_data<S: Into<String>>(msg: S) -> Self {
        TaxonError::InsufficientData(msg.into())
    }

    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        TaxonError::Configuration(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        TaxonError::Analysis(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        TaxonError::Serialization(msg.into())
    }
}
