//! Inference over a loaded model bundle.
//!
//! A [`ClassifierHandle`] wraps a [`ModelBundle`] loaded once from disk. The
//! handle is immutable after loading, so `classify` is a pure function of its
//! input and safe to call concurrently from multiple threads without locking.
//!
//! Input below [`MIN_INPUT_CHARS`] characters (after whitespace
//! normalization) is rejected with `InputTooShort` instead of producing a
//! low-confidence guess; the bag-of-words model is unreliable below that
//! density of signal. This is also how upstream fetch failures surface: the
//! fetch adapter degrades them to empty text, which fails this check.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::argmax;
use crate::error::{Result, TaxonError};
use crate::model::ModelBundle;

/// Minimum input length, in characters after whitespace normalization.
pub const MIN_INPUT_CHARS: usize = 200;

/// The outcome of classifying one piece of text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The label with the highest probability.
    pub predicted_label: String,
    /// Probability for every label the model knows, keyed in sorted order.
    pub distribution: BTreeMap<String, f64>,
}

/// An immutable handle over a loaded model bundle.
#[derive(Debug)]
pub struct ClassifierHandle {
    bundle: ModelBundle,
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl ClassifierHandle {
    /// Load a persisted model bundle into memory.
    pub fn load<P: AsRef<Path>>(bundle_path: P) -> Result<Self> {
        let bundle = ModelBundle::load(bundle_path)?;
        Ok(ClassifierHandle { bundle })
    }

    /// Wrap an in-memory bundle, for callers that just trained one.
    pub fn from_bundle(bundle: ModelBundle) -> Self {
        ClassifierHandle { bundle }
    }

    /// The labels this model can predict, in sorted order.
    pub fn classes(&self) -> &[String] {
        self.bundle.classifier.classes()
    }

    /// Access the underlying bundle.
    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Classify a piece of text into a label and a full distribution.
    ///
    /// Deterministic for a given loaded bundle: the same text always yields
    /// the same result. Argmax ties resolve to the lexicographically lowest
    /// label.
    pub fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let normalized = normalize_whitespace(text);
        let length = normalized.chars().count();
        if length < MIN_INPUT_CHARS {
            return Err(TaxonError::InputTooShort {
                required: MIN_INPUT_CHARS,
                actual: length,
            });
        }

        let features = self.bundle.vectorizer.transform(&normalized)?;
        let probs = self.bundle.classifier.predict_proba(&[features])?;
        let row = &probs[0];

        let classes = self.bundle.classifier.classes();
        let predicted_label = classes[argmax(row)].clone();
        let distribution: BTreeMap<String, f64> = classes
            .iter()
            .cloned()
            .zip(row.iter().copied())
            .collect();

        Ok(ClassificationResult {
            predicted_label,
            distribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LogisticRegression;
    use crate::features::TfIdfVectorizer;

    fn physics_text(i: usize) -> String {
        format!(
            "quantum mechanics describes the energy levels of atoms and the behavior \
             of photons electrons and other particles experiment {i} relativity and \
             thermodynamics complete the classical picture of modern physics"
        )
    }

    fn economics_text(i: usize) -> String {
        format!(
            "markets coordinate supply and demand through prices while inflation \
             interest rates and monetary policy shape the economy experiment {i} \
             trade growth fiscal policy and unemployment are the macroeconomic aggregates"
        )
    }

    fn handle() -> ClassifierHandle {
        let mut docs = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            docs.push(physics_text(i));
            labels.push("Physics".to_string());
            docs.push(economics_text(i));
            labels.push("Economics".to_string());
        }

        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&docs).unwrap();
        let features: Vec<_> = docs
            .iter()
            .map(|d| vectorizer.transform(d).unwrap())
            .collect();
        let mut classifier = LogisticRegression::new();
        classifier.fit(&features, &labels).unwrap();

        let bundle = ModelBundle::new(vectorizer, classifier, docs.len()).unwrap();
        ClassifierHandle::from_bundle(bundle)
    }

    #[test]
    fn test_classify_returns_argmax_and_distribution() {
        let handle = handle();
        let result = handle.classify(&physics_text(99)).unwrap();

        assert_eq!(result.predicted_label, "Physics");
        assert_eq!(result.distribution.len(), 2);

        let sum: f64 = result.distribution.values().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(result.distribution.values().all(|&p| (0.0..=1.0).contains(&p)));

        let (best_label, _) = result
            .distribution
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        assert_eq!(best_label, &result.predicted_label);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let handle = handle();
        let text = economics_text(7);
        let first = handle.classify(&text).unwrap();
        let second = handle.classify(&text).unwrap();
        assert_eq!(first.predicted_label, second.predicted_label);
        assert_eq!(first.distribution, second.distribution);
    }

    #[test]
    fn test_threshold_boundary() {
        let handle = handle();

        let exactly = "x".repeat(MIN_INPUT_CHARS);
        assert!(handle.classify(&exactly).is_ok());

        let short = "x".repeat(MIN_INPUT_CHARS - 1);
        let err = handle.classify(&short).unwrap_err();
        assert!(matches!(
            err,
            TaxonError::InputTooShort {
                required: MIN_INPUT_CHARS,
                actual,
            } if actual == MIN_INPUT_CHARS - 1
        ));
    }

    #[test]
    fn test_whitespace_does_not_pad_length() {
        let handle = handle();
        // 100 characters of signal padded with whitespace stays too short.
        let padded = format!("{}{}", "y ".repeat(100), " ".repeat(500));
        let err = handle.classify(&padded).unwrap_err();
        assert!(matches!(err, TaxonError::InputTooShort { .. }));
    }

    #[test]
    fn test_empty_text_is_input_too_short() {
        let handle = handle();
        let err = handle.classify("").unwrap_err();
        assert!(matches!(
            err,
            TaxonError::InputTooShort { actual: 0, .. }
        ));
    }

    #[test]
    fn test_out_of_vocabulary_text_is_not_an_error() {
        let handle = handle();
        // Long enough, but shares no vocabulary with the corpus: the model
        // falls back to its prior rather than failing.
        let text = "zzz ".repeat(60);
        let result = handle.classify(&text).unwrap();
        let sum: f64 = result.distribution.values().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_concurrent_classification() {
        let handle = std::sync::Arc::new(handle());
        let mut threads = Vec::new();
        for i in 0..4 {
            let handle = std::sync::Arc::clone(&handle);
            threads.push(std::thread::spawn(move || {
                handle.classify(&physics_text(i)).unwrap().predicted_label
            }));
        }
        for thread in threads {
            assert_eq!(thread.join().unwrap(), "Physics");
        }
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(normalize_whitespace(""), "");
    }
}
