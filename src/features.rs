//! TF-IDF feature extraction.
//!
//! The [`TfIdfVectorizer`] is fitted once over a training corpus, building a
//! vocabulary of unigrams and bigrams with their document frequencies, and
//! from then on transforms any text into an L2-normalized sparse TF-IDF
//! vector of fixed dimension.
//!
//! # Fitting semantics
//!
//! A vectorizer can be fitted exactly once; a second `fit` call fails with a
//! configuration error. Re-fitting means constructing a fresh instance, which
//! keeps a fitted vocabulary immutable for the lifetime of the value.
//!
//! # Examples
//!
//! ```
//! use taxon::features::TfIdfVectorizer;
//!
//! let docs = vec![
//!     "quantum mechanics describes energy levels".to_string(),
//!     "supply and demand set market prices".to_string(),
//! ];
//!
//! let mut vectorizer = TfIdfVectorizer::new();
//! vectorizer.fit(&docs).unwrap();
//!
//! let vector = vectorizer.transform("energy prices").unwrap();
//! assert_eq!(vector.dim, vectorizer.vocabulary_size());
//! ```

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, AnalyzerKind};
use crate::error::{Result, TaxonError};

/// Default cap on vocabulary size, keeping memory bounded on large corpora.
pub const DEFAULT_MAX_FEATURES: usize = 20_000;

/// A sparse, non-negative feature vector.
///
/// Indices are strictly increasing and every index is below `dim`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    /// Total dimensionality (the vocabulary size).
    pub dim: usize,
    /// Indices of non-zero entries, strictly increasing.
    pub indices: Vec<u32>,
    /// Values aligned with `indices`.
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create an all-zero vector of the given dimension.
    pub fn zeros(dim: usize) -> Self {
        SparseVector {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Whether the vector has no non-zero entries.
    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Dot product against a dense vector of length `dim`.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.indices
            .iter()
            .zip(self.values.iter())
            .map(|(&i, &v)| v * dense[i as usize])
            .sum()
    }

    /// Euclidean norm of the vector.
    pub fn l2_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}

/// TF-IDF vectorizer over unigrams and bigrams.
#[derive(Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    /// Term -> feature index. Built once during fitting, immutable afterward.
    vocabulary: HashMap<String, u32>,
    /// Number of training documents containing each term, by feature index.
    document_frequency: Vec<u32>,
    /// Smoothed inverse document frequency, by feature index.
    idf: Vec<f64>,
    /// Total number of documents seen during fitting.
    n_documents: usize,
    /// Maximum vocabulary size.
    max_features: usize,
    /// Whether `fit` has completed.
    fitted: bool,
    /// Which analyzer pipeline tokenizes this vectorizer's text. Persisted,
    /// so a reloaded vectorizer tokenizes exactly like the saved one.
    analyzer_kind: AnalyzerKind,
    /// The built pipeline, constructed on first use from `analyzer_kind`.
    #[serde(skip)]
    analyzer: OnceLock<Arc<dyn Analyzer>>,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("max_features", &self.max_features)
            .field("fitted", &self.fitted)
            .field("analyzer_kind", &self.analyzer_kind)
            .finish()
    }
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TfIdfVectorizer {
    /// Create a new unfitted vectorizer with the standard analyzer and the
    /// default vocabulary cap.
    pub fn new() -> Self {
        Self::with_analyzer(AnalyzerKind::Standard)
    }

    /// Create a new unfitted vectorizer with the given analyzer pipeline.
    pub fn with_analyzer(analyzer_kind: AnalyzerKind) -> Self {
        TfIdfVectorizer {
            vocabulary: HashMap::new(),
            document_frequency: Vec::new(),
            idf: Vec::new(),
            n_documents: 0,
            max_features: DEFAULT_MAX_FEATURES,
            fitted: false,
            analyzer_kind,
            analyzer: OnceLock::new(),
        }
    }

    /// Set the maximum vocabulary size. Only meaningful before fitting.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Which analyzer pipeline this vectorizer tokenizes with.
    pub fn analyzer_kind(&self) -> AnalyzerKind {
        self.analyzer_kind
    }

    fn analyzer(&self) -> &Arc<dyn Analyzer> {
        self.analyzer.get_or_init(|| self.analyzer_kind.build())
    }

    /// Extract unigram and bigram terms from text.
    fn extract_terms(&self, text: &str) -> Result<Vec<String>> {
        let tokens: Vec<String> = self
            .analyzer()
            .analyze(text)?
            .map(|token| token.text)
            .collect();

        let mut terms = Vec::with_capacity(tokens.len().saturating_mul(2));
        terms.extend(tokens.iter().cloned());
        for pair in tokens.windows(2) {
            terms.push(format!("{} {}", pair[0], pair[1]));
        }

        Ok(terms)
    }

    /// Fit the vectorizer on training documents.
    ///
    /// Builds the vocabulary (capped at `max_features` terms by document
    /// frequency) and the smoothed IDF weights. Deterministic: term selection
    /// breaks frequency ties lexicographically and feature indices follow
    /// lexicographic term order.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if self.fitted {
            return Err(TaxonError::configuration(
                "vectorizer is already fitted; construct a new instance to re-fit",
            ));
        }
        if documents.is_empty() {
            return Err(TaxonError::invalid_argument(
                "cannot fit vectorizer on an empty document set",
            ));
        }

        let mut document_frequency: AHashMap<String, u32> = AHashMap::new();
        for doc in documents {
            let terms = self.extract_terms(doc)?;
            let unique: AHashSet<String> = terms.into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        // Keep the most frequent terms, ties broken by term so the selection
        // never depends on hash iteration order.
        let mut ranked: Vec<(String, u32)> = document_frequency.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        // Feature indices follow lexicographic term order.
        ranked.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let n = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(ranked.len());
        let mut df = Vec::with_capacity(ranked.len());
        let mut idf = Vec::with_capacity(ranked.len());
        for (index, (term, count)) in ranked.into_iter().enumerate() {
            vocabulary.insert(term, index as u32);
            df.push(count);
            idf.push(((n + 1.0) / (count as f64 + 1.0)).ln() + 1.0);
        }

        self.vocabulary = vocabulary;
        self.document_frequency = df;
        self.idf = idf;
        self.n_documents = documents.len();
        self.fitted = true;

        Ok(())
    }

    /// Transform text into an L2-normalized TF-IDF vector.
    ///
    /// Terms outside the fitted vocabulary are dropped; text with no known
    /// terms yields an all-zero vector of full dimension.
    pub fn transform(&self, text: &str) -> Result<SparseVector> {
        if !self.fitted {
            return Err(TaxonError::not_fitted(
                "vectorizer must be fitted before transform",
            ));
        }

        let mut counts: AHashMap<u32, f64> = AHashMap::new();
        for term in self.extract_terms(text)? {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        if counts.is_empty() {
            return Ok(SparseVector::zeros(self.vocabulary.len()));
        }

        let mut entries: Vec<(u32, f64)> = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index as usize]))
            .collect();
        entries.sort_unstable_by_key(|&(index, _)| index);

        let norm = entries
            .iter()
            .map(|&(_, v)| v * v)
            .sum::<f64>()
            .sqrt();

        let (indices, values): (Vec<u32>, Vec<f64>) =
            entries.into_iter().map(|(i, v)| (i, v / norm)).unzip();

        Ok(SparseVector {
            dim: self.vocabulary.len(),
            indices,
            values,
        })
    }

    /// Size of the fitted vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of documents seen during fitting.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Whether `fit` has completed.
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Document frequency for a term, if it is in the vocabulary.
    pub fn document_frequency(&self, term: &str) -> Option<u32> {
        self.vocabulary
            .get(term)
            .map(|&index| self.document_frequency[index as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted(docs: &[&str]) -> TfIdfVectorizer {
        let docs: Vec<String> = docs.iter().map(|s| s.to_string()).collect();
        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&docs).unwrap();
        vectorizer
    }

    #[test]
    fn test_fit_builds_vocabulary() {
        let vectorizer = fitted(&[
            "quantum mechanics energy",
            "market prices inflation",
            "quantum field theory",
        ]);

        assert!(vectorizer.is_fitted());
        assert!(vectorizer.vocabulary_size() > 0);
        assert_eq!(vectorizer.n_documents(), 3);
        // "quantum" appears in two of three documents.
        assert_eq!(vectorizer.document_frequency("quantum"), Some(2));
    }

    #[test]
    fn test_fit_twice_fails() {
        let mut vectorizer = fitted(&["one document here"]);
        let result = vectorizer.fit(&["another".to_string()]);
        assert!(matches!(result, Err(TaxonError::Configuration(_))));
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let vectorizer = TfIdfVectorizer::new();
        let result = vectorizer.transform("text");
        assert!(matches!(result, Err(TaxonError::NotFitted(_))));
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let vectorizer = fitted(&[
            "energy levels atoms physics",
            "markets trade goods economics",
        ]);

        let vector = vectorizer.transform("energy physics atoms").unwrap();
        assert!(!vector.is_zero());
        assert!((vector.l2_norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let vectorizer = fitted(&["alpha beta gamma", "beta gamma delta"]);
        let a = vectorizer.transform("alpha beta gamma delta").unwrap();
        let b = vectorizer.transform("alpha beta gamma delta").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_terms_dropped() {
        let vectorizer = fitted(&["alpha beta", "beta gamma"]);
        let vector = vectorizer.transform("completely unrelated words").unwrap();
        assert!(vector.is_zero());
        assert_eq!(vector.dim, vectorizer.vocabulary_size());
    }

    #[test]
    fn test_whitespace_only_text_is_zero_vector() {
        let vectorizer = fitted(&["alpha beta", "beta gamma"]);
        let vector = vectorizer.transform("  \n\t ").unwrap();
        assert!(vector.is_zero());
    }

    #[test]
    fn test_bigrams_in_vocabulary() {
        let vectorizer = fitted(&["machine learning models", "machine learning theory"]);
        assert_eq!(vectorizer.document_frequency("machine learning"), Some(2));
    }

    #[test]
    fn test_no_stop_analyzer_keeps_stop_words() {
        let docs = vec![
            "the quantum world".to_string(),
            "the market economy".to_string(),
        ];
        let mut vectorizer = TfIdfVectorizer::with_analyzer(AnalyzerKind::StandardNoStop);
        vectorizer.fit(&docs).unwrap();

        assert_eq!(vectorizer.analyzer_kind(), AnalyzerKind::StandardNoStop);
        assert_eq!(vectorizer.document_frequency("the"), Some(2));
    }

    #[test]
    fn test_max_features_caps_vocabulary() {
        let docs: Vec<String> = vec![
            "alpha beta gamma delta".to_string(),
            "epsilon zeta eta theta".to_string(),
        ];
        let mut vectorizer = TfIdfVectorizer::new().with_max_features(3);
        vectorizer.fit(&docs).unwrap();
        assert_eq!(vectorizer.vocabulary_size(), 3);
    }

    #[test]
    fn test_sparse_indices_strictly_increasing() {
        let vectorizer = fitted(&["one two three four five", "three four five six"]);
        let vector = vectorizer.transform("five four three two one").unwrap();
        for pair in vector.indices.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_sparse_vector_dot() {
        let vector = SparseVector {
            dim: 4,
            indices: vec![0, 2],
            values: vec![0.5, 2.0],
        };
        let dense = vec![1.0, 10.0, 3.0, 10.0];
        assert!((vector.dot(&dense) - 6.5).abs() < 1e-12);
    }
}
