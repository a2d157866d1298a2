//! Training orchestration.
//!
//! The [`Trainer`] drives the full pipeline: load the corpus, stratify it
//! into train and held-out partitions, fit the vectorizer and classifier on
//! the training partition only, evaluate on the held-out partition, and
//! atomically publish the resulting [`ModelBundle`]. Interrupting a training
//! run never leaves a partial bundle on disk.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::{LogisticRegression, LogisticRegressionConfig};
use crate::corpus::{load_corpus, stratified_split};
use crate::error::Result;
use crate::features::{DEFAULT_MAX_FEATURES, TfIdfVectorizer};
use crate::metrics::EvalReport;
use crate::model::ModelBundle;

/// Configuration for a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Fraction of each label held out for evaluation.
    pub test_ratio: f64,
    /// Vocabulary size cap for the vectorizer.
    pub max_features: usize,
    /// Classifier hyperparameters.
    pub classifier: LogisticRegressionConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            max_features: DEFAULT_MAX_FEATURES,
            classifier: LogisticRegressionConfig::default(),
        }
    }
}

/// Orchestrates split, fit, evaluation, and bundle publication.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Create a trainer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trainer with the given configuration.
    pub fn with_config(config: TrainerConfig) -> Self {
        Trainer { config }
    }

    /// Train a model from the corpus at `corpus_path` and publish the bundle
    /// at `bundle_path`, returning the held-out evaluation report.
    pub fn train<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        corpus_path: P,
        bundle_path: Q,
    ) -> Result<EvalReport> {
        let documents = load_corpus(corpus_path.as_ref())?;
        tracing::info!(
            documents = documents.len(),
            corpus = %corpus_path.as_ref().display(),
            "loaded training corpus"
        );

        let split = stratified_split(&documents, self.config.test_ratio)?;
        tracing::info!(
            train = split.train_texts.len(),
            held_out = split.test_texts.len(),
            "stratified corpus split"
        );

        let mut vectorizer =
            TfIdfVectorizer::new().with_max_features(self.config.max_features);
        vectorizer.fit(&split.train_texts)?;
        tracing::info!(
            vocabulary = vectorizer.vocabulary_size(),
            "fitted TF-IDF vectorizer"
        );

        let train_features = split
            .train_texts
            .iter()
            .map(|text| vectorizer.transform(text))
            .collect::<Result<Vec<_>>>()?;

        let mut classifier = LogisticRegression::with_config(self.config.classifier.clone());
        classifier.fit(&train_features, &split.train_labels)?;
        if let Some(summary) = classifier.training_summary() {
            tracing::info!(
                iterations = summary.iterations,
                converged = summary.converged,
                loss = summary.final_loss,
                "fitted classifier"
            );
        }

        let test_features = split
            .test_texts
            .iter()
            .map(|text| vectorizer.transform(text))
            .collect::<Result<Vec<_>>>()?;
        let predictions = classifier.predict(&test_features)?;
        let report = EvalReport::compute(&split.test_labels, &predictions)?;

        for (label, metrics) in &report.per_label {
            tracing::info!(
                label = %label,
                precision = metrics.precision,
                recall = metrics.recall,
                f1 = metrics.f1,
                support = metrics.support,
                "held-out metrics"
            );
        }
        tracing::info!(accuracy = report.accuracy, "held-out accuracy");

        let n_train = split.train_texts.len();
        let bundle = ModelBundle::new(vectorizer, classifier, n_train)?;
        bundle.save(bundle_path.as_ref())?;
        tracing::info!(bundle = %bundle_path.as_ref().display(), "published model bundle");

        Ok(report)
    }
}
