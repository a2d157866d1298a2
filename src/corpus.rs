//! Corpus loading and splitting.
//!
//! A corpus is a newline-delimited JSON file, one [`Document`] per line, as
//! written by the data collector. Training consumes the whole file in one
//! pass; there is no streaming or incremental ingestion.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaxonError};

/// Seed for the stratified shuffle, fixed so splits are reproducible.
pub const SPLIT_SEED: u64 = 42;

/// A single document in the corpus.
///
/// `topic` is present in training data and absent for inference input. The
/// field names match the JSONL records produced by the page collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source page title, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Category label, present only in training data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Free-form text content.
    pub text: String,
}

/// Load a corpus from a newline-delimited JSON file.
///
/// Blank lines are skipped; a malformed line is a hard error rather than a
/// silent drop, so a truncated corpus never trains a smaller model unnoticed.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);

    let mut documents = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: Document = serde_json::from_str(&line)?;
        documents.push(doc);
    }

    Ok(documents)
}

/// A labeled train/test partition of a corpus.
#[derive(Debug)]
pub struct CorpusSplit {
    /// Training partition texts.
    pub train_texts: Vec<String>,
    /// Training partition labels, aligned with `train_texts`.
    pub train_labels: Vec<String>,
    /// Held-out partition texts.
    pub test_texts: Vec<String>,
    /// Held-out partition labels, aligned with `test_texts`.
    pub test_labels: Vec<String>,
}

/// Split labeled documents into train and held-out partitions, preserving
/// per-label proportions.
///
/// Every label contributes at least one document to each partition, so any
/// label with fewer than two examples fails with `InsufficientData`.
/// Documents without a `topic` field are rejected with `InvalidArgument`.
pub fn stratified_split(documents: &[Document], test_ratio: f64) -> Result<CorpusSplit> {
    if documents.is_empty() {
        return Err(TaxonError::insufficient_data("corpus is empty"));
    }
    if !(0.0..1.0).contains(&test_ratio) || test_ratio == 0.0 {
        return Err(TaxonError::invalid_argument(format!(
            "test_ratio must be in (0, 1), got {test_ratio}"
        )));
    }

    // Group document indices by label.
    let mut by_label: AHashMap<&str, Vec<usize>> = AHashMap::new();
    for (i, doc) in documents.iter().enumerate() {
        let label = doc.topic.as_deref().ok_or_else(|| {
            TaxonError::invalid_argument(format!("document {i} has no topic label"))
        })?;
        by_label.entry(label).or_default().push(i);
    }

    for (label, indices) in &by_label {
        if indices.len() < 2 {
            return Err(TaxonError::insufficient_data(format!(
                "label {label:?} has {} example(s); need at least 2 to stratify",
                indices.len()
            )));
        }
    }

    // Sort labels so the shuffle consumes randomness in a stable order.
    let mut labels: Vec<&str> = by_label.keys().copied().collect();
    labels.sort_unstable();

    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    let mut split = CorpusSplit {
        train_texts: Vec::new(),
        train_labels: Vec::new(),
        test_texts: Vec::new(),
        test_labels: Vec::new(),
    };

    for label in labels {
        let mut indices = by_label[label].clone();
        indices.shuffle(&mut rng);

        // At least one document on each side of the split.
        let n = indices.len();
        let n_test = ((n as f64 * test_ratio).round() as usize).clamp(1, n - 1);

        for (k, &i) in indices.iter().enumerate() {
            let doc = &documents[i];
            if k < n_test {
                split.test_texts.push(doc.text.clone());
                split.test_labels.push(label.to_string());
            } else {
                split.train_texts.push(doc.text.clone());
                split.train_labels.push(label.to_string());
            }
        }
    }

    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn doc(topic: &str, text: &str) -> Document {
        Document {
            title: None,
            topic: Some(topic.to_string()),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_load_corpus_jsonl() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"title":"Physics","topic":"Physics","text":"energy and matter"}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"topic":"History","text":"ancient empires"}}"#).unwrap();

        let docs = load_corpus(file.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title.as_deref(), Some("Physics"));
        assert_eq!(docs[1].topic.as_deref(), Some("History"));
        assert_eq!(docs[1].text, "ancient empires");
    }

    #[test]
    fn test_load_corpus_malformed_line_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();

        let result = load_corpus(file.path());
        assert!(matches!(result, Err(TaxonError::Json(_))));
    }

    #[test]
    fn test_stratified_split_preserves_proportions() {
        let mut docs = Vec::new();
        for i in 0..20 {
            docs.push(doc("A", &format!("alpha document {i}")));
        }
        for i in 0..10 {
            docs.push(doc("B", &format!("beta document {i}")));
        }

        let split = stratified_split(&docs, 0.2).unwrap();

        let test_a = split.test_labels.iter().filter(|l| *l == "A").count();
        let test_b = split.test_labels.iter().filter(|l| *l == "B").count();
        assert_eq!(test_a, 4);
        assert_eq!(test_b, 2);
        assert_eq!(split.train_texts.len(), 24);
        assert_eq!(split.test_texts.len(), 6);
    }

    #[test]
    fn test_stratified_split_is_deterministic() {
        let docs: Vec<Document> = (0..10)
            .map(|i| doc(if i % 2 == 0 { "A" } else { "B" }, &format!("text {i}")))
            .collect();

        let first = stratified_split(&docs, 0.2).unwrap();
        let second = stratified_split(&docs, 0.2).unwrap();
        assert_eq!(first.train_texts, second.train_texts);
        assert_eq!(first.test_texts, second.test_texts);
    }

    #[test]
    fn test_stratified_split_rejects_singleton_label() {
        let docs = vec![doc("A", "one"), doc("A", "two"), doc("B", "lonely")];
        let result = stratified_split(&docs, 0.2);
        assert!(matches!(result, Err(TaxonError::InsufficientData(_))));
    }

    #[test]
    fn test_stratified_split_rejects_empty_corpus() {
        let result = stratified_split(&[], 0.2);
        assert!(matches!(result, Err(TaxonError::InsufficientData(_))));
    }

    #[test]
    fn test_stratified_split_rejects_unlabeled_document() {
        let docs = vec![
            doc("A", "one"),
            Document {
                title: None,
                topic: None,
                text: "no label".to_string(),
            },
        ];
        let result = stratified_split(&docs, 0.2);
        assert!(matches!(result, Err(TaxonError::InvalidArgument(_))));
    }
}
