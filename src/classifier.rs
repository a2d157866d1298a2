//! Multinomial logistic regression over sparse TF-IDF features.
//!
//! The classifier learns one linear decision function per label and produces
//! probability distributions through a numerically-stable softmax. Training
//! is full-batch gradient descent with L2 regularization, run to a gradient
//! tolerance or a maximum iteration cap. Hitting the cap keeps the last
//! iterate and emits a warning rather than failing; the caller can inspect
//! [`LogisticRegression::training_summary`] for the outcome.
//!
//! # Determinism
//!
//! Class order is the lexicographic sort of the labels seen during fitting,
//! and argmax ties are broken toward the lowest lexicographic label, so the
//! same fitted model always produces the same prediction for the same input.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaxonError};
use crate::features::SparseVector;

/// Hyperparameters for logistic regression training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionConfig {
    /// Step size for gradient descent.
    pub learning_rate: f64,
    /// L2 regularization strength applied to weights (not intercepts).
    pub l2_penalty: f64,
    /// Maximum number of gradient descent iterations.
    pub max_iterations: usize,
    /// Convergence tolerance on the infinity norm of the gradient.
    pub tolerance: f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1.0,
            l2_penalty: 1e-4,
            max_iterations: 200,
            tolerance: 1e-4,
        }
    }
}

/// Outcome of the most recent training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Number of gradient descent iterations completed.
    pub iterations: usize,
    /// Whether the gradient tolerance was reached before the iteration cap.
    pub converged: bool,
    /// Cross-entropy loss at the final iterate.
    pub final_loss: f64,
}

/// Multinomial logistic regression classifier.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogisticRegression {
    config: LogisticRegressionConfig,
    /// Sorted label set learned during fitting.
    classes: Vec<String>,
    /// Weight matrix, one row per class, `n_features` columns.
    weights: Vec<Vec<f64>>,
    /// Per-class intercepts.
    intercepts: Vec<f64>,
    /// Feature dimensionality the weights are indexed against.
    n_features: usize,
    summary: Option<TrainingSummary>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new untrained classifier with default hyperparameters.
    pub fn new() -> Self {
        Self::with_config(LogisticRegressionConfig::default())
    }

    /// Create a new untrained classifier with the given hyperparameters.
    pub fn with_config(config: LogisticRegressionConfig) -> Self {
        LogisticRegression {
            config,
            classes: Vec::new(),
            weights: Vec::new(),
            intercepts: Vec::new(),
            n_features: 0,
            summary: None,
        }
    }

    /// Train the classifier on feature vectors and their labels.
    ///
    /// Fails with `InvalidArgument` if the inputs are empty, differ in
    /// length, or mix feature dimensionalities. Re-fitting an already trained
    /// instance replaces the previous model.
    pub fn fit(&mut self, features: &[SparseVector], labels: &[String]) -> Result<()> {
        if features.is_empty() {
            return Err(TaxonError::invalid_argument(
                "cannot fit classifier on empty training data",
            ));
        }
        if features.len() != labels.len() {
            return Err(TaxonError::invalid_argument(format!(
                "features and labels differ in length: {} vs {}",
                features.len(),
                labels.len()
            )));
        }

        let n_features = features[0].dim;
        if let Some(bad) = features.iter().find(|f| f.dim != n_features) {
            return Err(TaxonError::invalid_argument(format!(
                "inconsistent feature dimensions: expected {n_features}, got {}",
                bad.dim
            )));
        }

        let mut classes: Vec<String> = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        let n_classes = classes.len();

        let targets: Vec<usize> = labels
            .iter()
            .map(|label| {
                classes
                    .binary_search(label)
                    .expect("label came from the class list")
            })
            .collect();

        let n_samples = features.len();
        let mut weights = vec![vec![0.0; n_features]; n_classes];
        let mut intercepts = vec![0.0; n_classes];

        let mut iterations = 0;
        let mut converged = false;
        let mut final_loss = f64::INFINITY;

        for _ in 0..self.config.max_iterations {
            iterations += 1;

            // Per-sample probabilities; the numeric work parallelizes, the
            // external contract stays call-and-block.
            let probs: Vec<Vec<f64>> = features
                .par_iter()
                .map(|x| {
                    let scores: Vec<f64> = (0..n_classes)
                        .map(|c| x.dot(&weights[c]) + intercepts[c])
                        .collect();
                    softmax(&scores)
                })
                .collect();

            final_loss = cross_entropy(&probs, &targets);

            // Gradient accumulation over the sparse inputs.
            let mut grad_w = vec![vec![0.0; n_features]; n_classes];
            let mut grad_b = vec![0.0; n_classes];
            for (i, x) in features.iter().enumerate() {
                for c in 0..n_classes {
                    let indicator = if targets[i] == c { 1.0 } else { 0.0 };
                    let residual = probs[i][c] - indicator;
                    grad_b[c] += residual;
                    for (&j, &v) in x.indices.iter().zip(x.values.iter()) {
                        grad_w[c][j as usize] += residual * v;
                    }
                }
            }

            let scale = 1.0 / n_samples as f64;
            let mut max_grad: f64 = 0.0;
            for c in 0..n_classes {
                grad_b[c] *= scale;
                max_grad = max_grad.max(grad_b[c].abs());
                for j in 0..n_features {
                    grad_w[c][j] = grad_w[c][j] * scale + self.config.l2_penalty * weights[c][j];
                    max_grad = max_grad.max(grad_w[c][j].abs());
                }
            }

            for c in 0..n_classes {
                intercepts[c] -= self.config.learning_rate * grad_b[c];
                for j in 0..n_features {
                    weights[c][j] -= self.config.learning_rate * grad_w[c][j];
                }
            }

            if max_grad < self.config.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(
                iterations,
                final_loss,
                "optimizer hit the iteration cap before converging; keeping the last iterate"
            );
        }

        self.classes = classes;
        self.weights = weights;
        self.intercepts = intercepts;
        self.n_features = n_features;
        self.summary = Some(TrainingSummary {
            iterations,
            converged,
            final_loss,
        });

        Ok(())
    }

    /// Predict a probability distribution over the classes for each input.
    ///
    /// Each returned row is aligned with [`classes`](Self::classes) and sums
    /// to 1 within floating-point tolerance.
    pub fn predict_proba(&self, features: &[SparseVector]) -> Result<Vec<Vec<f64>>> {
        if !self.is_fitted() {
            return Err(TaxonError::not_fitted(
                "classifier must be fitted before predict_proba",
            ));
        }

        features
            .iter()
            .map(|x| {
                if x.dim != self.n_features {
                    return Err(TaxonError::invalid_argument(format!(
                        "feature dimension {} does not match model dimension {}",
                        x.dim, self.n_features
                    )));
                }
                let scores: Vec<f64> = (0..self.classes.len())
                    .map(|c| x.dot(&self.weights[c]) + self.intercepts[c])
                    .collect();
                Ok(softmax(&scores))
            })
            .collect()
    }

    /// Predict the most probable class for each input.
    pub fn predict(&self, features: &[SparseVector]) -> Result<Vec<String>> {
        let probs = self.predict_proba(features)?;
        Ok(probs
            .iter()
            .map(|row| self.classes[argmax(row)].clone())
            .collect())
    }

    /// The sorted set of labels learned during fitting.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Whether the classifier has been trained.
    pub fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }

    /// Feature dimensionality the model was trained against.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Outcome of the most recent training run, if any.
    pub fn training_summary(&self) -> Option<&TrainingSummary> {
        self.summary.as_ref()
    }
}

/// Numerically stable softmax.
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the maximum value; ties resolve to the earliest index, which is
/// the lexicographically lowest class in a sorted class list.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

fn cross_entropy(probs: &[Vec<f64>], targets: &[usize]) -> f64 {
    let total: f64 = probs
        .iter()
        .zip(targets.iter())
        .map(|(row, &t)| -(row[t].max(1e-15)).ln())
        .sum();
    total / targets.len() as f64
}
