//! Evaluation metrics for the held-out partition.
//!
//! The trainer produces an [`EvalReport`] with per-label precision, recall,
//! and F1 alongside overall accuracy, mirroring the classification report the
//! training run logs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaxonError};

/// Precision, recall, and F1 for one label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelMetrics {
    /// Fraction of predictions of this label that were correct.
    pub precision: f64,
    /// Fraction of true instances of this label that were found.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Number of true instances of this label in the evaluation set.
    pub support: usize,
}

/// Evaluation report over a held-out partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    /// Per-label metrics, keyed by label in sorted order.
    pub per_label: BTreeMap<String, LabelMetrics>,
    /// Fraction of all evaluation examples predicted correctly.
    pub accuracy: f64,
    /// Total number of evaluation examples.
    pub total: usize,
}

impl EvalReport {
    /// Compute a report from aligned true and predicted label sequences.
    ///
    /// Fails with `InvalidArgument` if the sequences differ in length.
    /// Labels appearing only in predictions get zero-support entries so the
    /// report covers every label the model emitted.
    pub fn compute(truth: &[String], predictions: &[String]) -> Result<Self> {
        if truth.len() != predictions.len() {
            return Err(TaxonError::invalid_argument(format!(
                "truth and predictions differ in length: {} vs {}",
                truth.len(),
                predictions.len()
            )));
        }

        let mut true_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut predicted_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut correct_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut correct = 0usize;

        for (t, p) in truth.iter().zip(predictions.iter()) {
            *true_counts.entry(t).or_insert(0) += 1;
            *predicted_counts.entry(p).or_insert(0) += 1;
            if t == p {
                *correct_counts.entry(t).or_insert(0) += 1;
                correct += 1;
            }
        }

        let mut labels: Vec<&str> = true_counts.keys().copied().collect();
        for &label in predicted_counts.keys() {
            if !true_counts.contains_key(label) {
                labels.push(label);
            }
        }
        labels.sort_unstable();

        let mut per_label = BTreeMap::new();
        for label in labels {
            let tp = *correct_counts.get(label).unwrap_or(&0) as f64;
            let predicted = *predicted_counts.get(label).unwrap_or(&0) as f64;
            let support = *true_counts.get(label).unwrap_or(&0);

            let precision = if predicted > 0.0 { tp / predicted } else { 0.0 };
            let recall = if support > 0 { tp / support as f64 } else { 0.0 };
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            per_label.insert(
                label.to_string(),
                LabelMetrics {
                    precision,
                    recall,
                    f1,
                    support,
                },
            );
        }

        let total = truth.len();
        let accuracy = if total > 0 {
            correct as f64 / total as f64
        } else {
            0.0
        };

        Ok(EvalReport {
            per_label,
            accuracy,
            total,
        })
    }
}
