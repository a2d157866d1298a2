//! Model bundle persistence.
//!
//! A [`ModelBundle`] pairs a fitted [`TfIdfVectorizer`] with a fitted
//! [`LogisticRegression`]; the classifier's weight columns are indexed
//! against the vectorizer's vocabulary, so the two are only ever saved and
//! loaded together. The on-disk format is bincode with a leading format
//! version tag that is checked on load.
//!
//! # Atomic publish
//!
//! [`ModelBundle::save`] writes to a sibling temporary file and renames it
//! into place, so a reader either sees the previous complete bundle or the
//! new complete bundle, never a partial write.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::LogisticRegression;
use crate::error::{Result, TaxonError};
use crate::features::TfIdfVectorizer;

/// Current on-disk bundle format version.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Metadata recorded when a bundle is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleMetadata {
    /// When training finished.
    pub trained_at: DateTime<Utc>,
    /// Number of documents in the training partition.
    pub training_documents: usize,
}

/// A fitted vectorizer and classifier persisted as one unit.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelBundle {
    /// On-disk format version. Must be the first field so it can be decoded
    /// from the file prefix regardless of what follows.
    format_version: u32,
    /// Training provenance.
    pub metadata: BundleMetadata,
    /// Fitted feature extractor.
    pub vectorizer: TfIdfVectorizer,
    /// Fitted classifier, weight columns indexed against the vocabulary.
    pub classifier: LogisticRegression,
}

impl ModelBundle {
    /// Pair a fitted vectorizer and classifier into a bundle.
    ///
    /// Fails with `InvalidArgument` if either component is unfitted or if the
    /// classifier's feature dimension does not match the vocabulary size.
    pub fn new(
        vectorizer: TfIdfVectorizer,
        classifier: LogisticRegression,
        training_documents: usize,
    ) -> Result<Self> {
        if !vectorizer.is_fitted() {
            return Err(TaxonError::invalid_argument(
                "cannot bundle an unfitted vectorizer",
            ));
        }
        if !classifier.is_fitted() {
            return Err(TaxonError::invalid_argument(
                "cannot bundle an unfitted classifier",
            ));
        }
        if classifier.n_features() != vectorizer.vocabulary_size() {
            return Err(TaxonError::invalid_argument(format!(
                "classifier dimension {} does not match vocabulary size {}",
                classifier.n_features(),
                vectorizer.vocabulary_size()
            )));
        }

        Ok(ModelBundle {
            format_version: BUNDLE_FORMAT_VERSION,
            metadata: BundleMetadata {
                trained_at: Utc::now(),
                training_documents,
            },
            vectorizer,
            classifier,
        })
    }

    /// On-disk format version of this bundle.
    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    /// Serialize the bundle and atomically publish it at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = bincode::serialize(self)
            .map_err(|e| TaxonError::serialization(format!("failed to encode bundle: {e}")))?;

        let mut tmp_name = path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = std::path::PathBuf::from(tmp_name);

        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    /// Load a bundle from `path`, verifying the format version and the
    /// vectorizer/classifier pairing.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            TaxonError::model_load(format!("cannot read bundle at {}: {e}", path.display()))
        })?;

        if bytes.len() < 4 {
            return Err(TaxonError::model_load(format!(
                "bundle at {} is truncated ({} bytes)",
                path.display(),
                bytes.len()
            )));
        }

        // The version tag is the first field, so it decodes from the prefix
        // even when the rest of the layout has changed.
        let found_version: u32 = bincode::deserialize(&bytes[..4]).map_err(|e| {
            TaxonError::model_load(format!("cannot decode bundle version tag: {e}"))
        })?;
        if found_version != BUNDLE_FORMAT_VERSION {
            return Err(TaxonError::model_load(format!(
                "bundle format version mismatch: expected {BUNDLE_FORMAT_VERSION}, found {found_version}"
            )));
        }

        let bundle: ModelBundle = bincode::deserialize(&bytes).map_err(|e| {
            TaxonError::model_load(format!(
                "cannot decode bundle at {}: {e}",
                path.display()
            ))
        })?;

        if bundle.classifier.n_features() != bundle.vectorizer.vocabulary_size() {
            return Err(TaxonError::model_load(format!(
                "bundle is inconsistent: classifier dimension {} vs vocabulary size {}",
                bundle.classifier.n_features(),
                bundle.vectorizer.vocabulary_size()
            )));
        }

        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted_bundle() -> ModelBundle {
        let docs = vec![
            "quantum mechanics and particle physics energy".to_string(),
            "market prices inflation and monetary policy".to_string(),
            "quantum field theory describes particles".to_string(),
            "supply demand and market equilibrium prices".to_string(),
        ];
        let labels = vec![
            "Physics".to_string(),
            "Economics".to_string(),
            "Physics".to_string(),
            "Economics".to_string(),
        ];

        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&docs).unwrap();
        let features: Vec<_> = docs
            .iter()
            .map(|d| vectorizer.transform(d).unwrap())
            .collect();

        let mut classifier = LogisticRegression::new();
        classifier.fit(&features, &labels).unwrap();

        ModelBundle::new(vectorizer, classifier, docs.len()).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_behavior() {
        let bundle = fitted_bundle();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");

        let probe = "quantum particles carry discrete energy";
        let before = bundle.vectorizer.transform(probe).unwrap();
        let before_probs = bundle.classifier.predict_proba(&[before.clone()]).unwrap();

        bundle.save(&path).unwrap();
        let loaded = ModelBundle::load(&path).unwrap();

        let after = loaded.vectorizer.transform(probe).unwrap();
        let after_probs = loaded.classifier.predict_proba(&[after.clone()]).unwrap();

        assert_eq!(before, after);
        assert_eq!(before_probs, after_probs);
        assert_eq!(loaded.format_version(), BUNDLE_FORMAT_VERSION);
    }

    #[test]
    fn test_round_trip_preserves_non_default_analyzer() {
        use crate::analysis::analyzer::AnalyzerKind;

        // Stop words carry signal for this vectorizer, so a reload that fell
        // back to the stop-filtering pipeline would tokenize differently.
        let docs = vec![
            "the the the quantum energy levels".to_string(),
            "of of market prices and trade".to_string(),
        ];
        let labels = vec!["Physics".to_string(), "Economics".to_string()];

        let mut vectorizer = TfIdfVectorizer::with_analyzer(AnalyzerKind::StandardNoStop);
        vectorizer.fit(&docs).unwrap();
        let features: Vec<_> = docs
            .iter()
            .map(|d| vectorizer.transform(d).unwrap())
            .collect();
        let mut classifier = LogisticRegression::new();
        classifier.fit(&features, &labels).unwrap();
        let bundle = ModelBundle::new(vectorizer, classifier, docs.len()).unwrap();

        let probe = "the the the quantum energy";
        let before = bundle.vectorizer.transform(probe).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        bundle.save(&path).unwrap();
        let loaded = ModelBundle::load(&path).unwrap();

        assert_eq!(
            loaded.vectorizer.analyzer_kind(),
            AnalyzerKind::StandardNoStop
        );
        let after = loaded.vectorizer.transform(probe).unwrap();
        assert_eq!(before, after);
        assert!(!after.is_zero());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ModelBundle::load(dir.path().join("nope.bin"));
        assert!(matches!(result, Err(TaxonError::ModelLoad(_))));
    }

    #[test]
    fn test_load_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        std::fs::write(&path, [0u8, 1]).unwrap();

        let result = ModelBundle::load(&path);
        assert!(matches!(result, Err(TaxonError::ModelLoad(_))));
    }

    #[test]
    fn test_load_version_mismatch() {
        let bundle = fitted_bundle();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        bundle.save(&path).unwrap();

        // Stamp a bogus version into the file prefix.
        let mut bytes = std::fs::read(&path).unwrap();
        let bogus = bincode::serialize(&99u32).unwrap();
        bytes[..4].copy_from_slice(&bogus);
        std::fs::write(&path, &bytes).unwrap();

        let err = ModelBundle::load(&path).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("expected 1"), "unexpected message: {msg}");
        assert!(msg.contains("found 99"), "unexpected message: {msg}");
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let bundle = fitted_bundle();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        bundle.save(&path).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("model.bin.tmp").exists());
    }

    #[test]
    fn test_bundle_rejects_unfitted_components() {
        let vectorizer = TfIdfVectorizer::new();
        let classifier = LogisticRegression::new();
        let result = ModelBundle::new(vectorizer, classifier, 0);
        assert!(matches!(result, Err(TaxonError::InvalidArgument(_))));
    }
}
