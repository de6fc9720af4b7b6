//! The in-memory gesture dataset: label to ordered example vectors.

use crate::error::{Result, SignshError};
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Labeled gesture examples, keyed by label.
///
/// Keys stay sorted so enumeration, serialization and tie-breaking between
/// equally distant examples are all deterministic. Example order within a
/// label is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GestureDataset {
    examples: BTreeMap<String, Vec<FeatureVector>>,
}

impl GestureDataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the dataset holds no examples at all.
    ///
    /// A label mapped to an empty list does not count as content.
    pub fn is_empty(&self) -> bool {
        self.examples.values().all(|examples| examples.is_empty())
    }

    /// Number of distinct labels.
    pub fn total_gestures(&self) -> usize {
        self.examples.len()
    }

    /// Number of examples across all labels.
    pub fn total_examples(&self) -> usize {
        self.examples.values().map(Vec::len).sum()
    }

    /// Whether the label exists in the dataset.
    pub fn contains_label(&self, label: &str) -> bool {
        self.examples.contains_key(label)
    }

    /// Number of examples recorded for one label, `None` when the label
    /// does not exist.
    pub fn example_count(&self, label: &str) -> Option<usize> {
        self.examples.get(label).map(Vec::len)
    }

    /// Iterates over `(label, examples)` pairs in sorted label order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<FeatureVector>)> {
        self.examples.iter()
    }

    /// Labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &String> {
        self.examples.keys()
    }

    /// Appends one example to a label, creating the label if needed.
    pub fn insert_example(&mut self, label: &str, vector: FeatureVector) {
        self.examples.entry(label.to_string()).or_default().push(vector);
    }

    /// Appends a batch of examples to a label, creating the label if needed.
    pub fn extend_label(&mut self, label: &str, vectors: Vec<FeatureVector>) {
        self.examples.entry(label.to_string()).or_default().extend(vectors);
    }

    /// Replaces a label's examples wholesale.
    pub fn replace_label(&mut self, label: &str, vectors: Vec<FeatureVector>) {
        self.examples.insert(label.to_string(), vectors);
    }

    /// Removes a label and returns its examples.
    pub fn remove_label(&mut self, label: &str) -> Option<Vec<FeatureVector>> {
        self.examples.remove(label)
    }

    /// Drops every label.
    pub fn clear(&mut self) {
        self.examples.clear();
    }

    /// Parses and validates a dataset from a JSON value.
    ///
    /// The document must be an object mapping labels to arrays of numeric
    /// vectors. The first offending label is named in the error, and nothing
    /// is returned on failure so callers never see a half-parsed dataset.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| SignshError::InvalidDataset {
            message: "document is not an object".to_string(),
        })?;

        let mut dataset = Self::new();
        for (label, examples) in object {
            let rows = examples
                .as_array()
                .ok_or_else(|| SignshError::InvalidDataset {
                    message: format!("examples for '{}' is not an array", label),
                })?;

            let mut vectors = Vec::with_capacity(rows.len());
            for (idx, row) in rows.iter().enumerate() {
                let values = row.as_array().ok_or_else(|| SignshError::InvalidDataset {
                    message: format!("example {} for '{}' is not an array", idx, label),
                })?;

                let mut vector = Vec::with_capacity(values.len());
                for value in values {
                    let number = value.as_f64().ok_or_else(|| SignshError::InvalidDataset {
                        message: format!("example {} for '{}' contains a non-numeric value", idx, label),
                    })?;
                    vector.push(number as f32);
                }
                vectors.push(vector);
            }
            dataset.examples.insert(label.clone(), vectors);
        }

        Ok(dataset)
    }
}

impl FromIterator<(String, Vec<FeatureVector>)> for GestureDataset {
    fn from_iter<I: IntoIterator<Item = (String, Vec<FeatureVector>)>>(iter: I) -> Self {
        Self {
            examples: iter.into_iter().collect(),
        }
    }
}
