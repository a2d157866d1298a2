//! Text analysis module for taxon.
//!
//! This module provides the tokenization pipeline that feeds the feature
//! extractor: tokenizers split raw text into tokens, filters transform the
//! token stream (lowercasing, stop-word removal), and analyzers tie the two
//! together into a single reusable pipeline.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

// Re-export commonly used types
pub use analyzer::*;
pub use token::*;
pub use token_filter::*;
pub use tokenizer::*;
