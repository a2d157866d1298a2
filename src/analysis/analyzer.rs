//! Analyzer implementations combining tokenizers and filters.
//!
//! Analyzers are the complete text processing pipeline:
//!
//! ```text
//! Raw Text → Tokenizer → Filter 1 → … → Filter N → Token Stream
//! ```
//!
//! The feature extractor holds one analyzer and uses it identically at fit
//! time and at transform time, which is what keeps training and inference
//! tokenization in lockstep.
//!
//! # Examples
//!
//! ```
//! use taxon::analysis::analyzer::{Analyzer, StandardAnalyzer};
//!
//! let analyzer = StandardAnalyzer::new();
//! let tokens: Vec<_> = analyzer.analyze("The Quantum World").unwrap().collect();
//!
//! // "The" is a stop word; the rest is lowercased
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[0].text, "quantum");
//! assert_eq!(tokens[1].text, "world");
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{Filter, LowercaseFilter, StopFilter};
use crate::analysis::tokenizer::{Tokenizer, UnicodeWordTokenizer};
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// Requires `Send + Sync` so analyzers can be shared across threads during
/// parallel training and concurrent inference.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of processed tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// Identifies one of the built-in analyzer pipelines.
///
/// Components that persist their tokenization behavior (the vectorizer does)
/// store an `AnalyzerKind` rather than the analyzer itself, and rebuild the
/// matching pipeline after deserialization. This is what keeps a reloaded
/// model tokenizing exactly like the one that was saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalyzerKind {
    /// Unicode word tokenization, lowercasing, English stop word removal.
    Standard,
    /// Unicode word tokenization and lowercasing, stop words kept.
    StandardNoStop,
}

impl AnalyzerKind {
    /// Build the analyzer pipeline this kind identifies.
    pub fn build(&self) -> Arc<dyn Analyzer> {
        match self {
            AnalyzerKind::Standard => Arc::new(StandardAnalyzer::new()),
            AnalyzerKind::StandardNoStop => Arc::new(StandardAnalyzer::without_stop_words()),
        }
    }
}

/// An analyzer built from a tokenizer and an ordered chain of filters.
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer and no filters.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            tokenizer,
            filters: Vec::new(),
            name: "pipeline".to_string(),
        }
    }

    /// Append a filter to the end of the chain.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the analyzer name.
    pub fn with_name(mut self, name: String) -> Self {
        self.name = name;
        self
    }
}

impl std::fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut stream = self.tokenizer.tokenize(text)?;
        for filter in &self.filters {
            stream = filter.filter(stream)?;
        }
        Ok(stream)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

/// The default analyzer: Unicode word tokenization, lowercasing, and English
/// stop word removal.
pub struct StandardAnalyzer {
    inner: PipelineAnalyzer,
}

impl StandardAnalyzer {
    /// Create a new standard analyzer with default settings.
    pub fn new() -> Self {
        let tokenizer = Arc::new(UnicodeWordTokenizer::new());
        let inner = PipelineAnalyzer::new(tokenizer)
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StopFilter::new()))
            .with_name("standard".to_string());

        StandardAnalyzer { inner }
    }

    /// Create a standard analyzer without stop word filtering.
    pub fn without_stop_words() -> Self {
        let tokenizer = Arc::new(UnicodeWordTokenizer::new());
        let inner = PipelineAnalyzer::new(tokenizer)
            .add_filter(Arc::new(LowercaseFilter::new()))
            .with_name("standard_no_stop".to_string());

        StandardAnalyzer { inner }
    }
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

impl std::fmt::Debug for StandardAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardAnalyzer")
            .field("inner", &self.inner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_standard_analyzer() {
        let analyzer = StandardAnalyzer::new();

        let tokens: Vec<Token> = analyzer
            .analyze("The History of the Roman Empire")
            .unwrap()
            .collect();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["history", "roman", "empire"]);
    }

    #[test]
    fn test_standard_analyzer_without_stop_words() {
        let analyzer = StandardAnalyzer::without_stop_words();

        let tokens: Vec<Token> = analyzer.analyze("The Roman Empire").unwrap().collect();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["the", "roman", "empire"]);
    }

    #[test]
    fn test_empty_text_yields_empty_stream() {
        let analyzer = StandardAnalyzer::new();
        let tokens: Vec<Token> = analyzer.analyze("  \n ").unwrap().collect();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_analyzer_kind_builds_matching_pipeline() {
        let standard = AnalyzerKind::Standard.build();
        let tokens: Vec<Token> = standard.analyze("the quantum world").unwrap().collect();
        assert_eq!(tokens.len(), 2);

        let no_stop = AnalyzerKind::StandardNoStop.build();
        let tokens: Vec<Token> = no_stop.analyze("the quantum world").unwrap().collect();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "the");
    }

    #[test]
    fn test_pipeline_analyzer_custom_chain() {
        let analyzer = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()));

        let tokens: Vec<Token> = analyzer.analyze("Hello WORLD").unwrap().collect();
        assert_eq!(tokens[0].text, "hello");
        assert_eq!(tokens[1].text, "world");
    }
}
