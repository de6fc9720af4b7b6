//! Dataset backend trait and the in-memory reference implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{Result, SignshError};
use crate::features::FeatureVector;
use crate::store::dataset::GestureDataset;

/// A label present in both the stored and an incoming dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelConflict {
    pub label: String,
    pub existing_count: usize,
    pub incoming_count: usize,
}

/// Result of checking an incoming dataset against the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub has_conflicts: bool,
    pub conflicts: Vec<LabelConflict>,
    pub new_labels: Vec<String>,
}

/// Per-label choice for a conflicting merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// Overwrite the stored examples with the incoming ones.
    Replace,
    /// Keep the stored examples, drop the incoming ones.
    Reject,
}

/// Label counts from a completed merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    #[serde(rename = "addedCount")]
    pub added: usize,
    #[serde(rename = "replacedCount")]
    pub replaced: usize,
    #[serde(rename = "rejectedCount")]
    pub rejected: usize,
}

/// One label and its example count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Summary of what the store holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    pub total_gestures: usize,
    pub total_examples: usize,
    pub gestures: Vec<LabelCount>,
}

/// Storage for gesture examples.
///
/// `save` appends, it never removes; destructive changes go through
/// `merge`, `delete_label`, and `clear` so callers decide explicitly.
#[async_trait::async_trait]
pub trait DatasetBackend: Send + Sync {
    /// The complete stored dataset.
    async fn fetch(&self) -> Result<GestureDataset>;

    /// Append every example in `dataset` to the store.
    async fn save(&self, dataset: &GestureDataset) -> Result<()>;

    /// Compare `candidate` against the store without changing anything.
    async fn check_conflicts(&self, candidate: &GestureDataset) -> Result<ConflictReport>;

    /// Merge `candidate` into the store.
    ///
    /// Labels new to the store are always added. A conflicting label is
    /// replaced only under an explicit [`MergeDecision::Replace`]; with a
    /// `Reject` decision or no decision at all the incoming examples are
    /// dropped and the label counts as rejected.
    async fn merge(
        &self,
        candidate: &GestureDataset,
        decisions: &BTreeMap<String, MergeDecision>,
    ) -> Result<MergeOutcome>;

    /// Stored label and example counts.
    async fn stats(&self) -> Result<DatasetStats>;

    /// Remove one label and all its examples. Errors when the label is
    /// not stored.
    async fn delete_label(&self, label: &str) -> Result<()>;

    /// Remove everything.
    async fn clear(&self) -> Result<()>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// In-memory backend.
///
/// Defines the reference semantics the HTTP backend is expected to match;
/// also what the tests run against. Clones share the same store.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    dataset: Arc<Mutex<GestureDataset>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing dataset.
    pub fn with_dataset(dataset: GestureDataset) -> Self {
        Self {
            dataset: Arc::new(Mutex::new(dataset)),
        }
    }

    /// Convenience for seeding tests label by label.
    pub async fn insert(&self, label: &str, example: FeatureVector) {
        self.dataset.lock().await.insert_example(label, example);
    }
}

#[async_trait::async_trait]
impl DatasetBackend for MemoryBackend {
    async fn fetch(&self) -> Result<GestureDataset> {
        Ok(self.dataset.lock().await.clone())
    }

    async fn save(&self, dataset: &GestureDataset) -> Result<()> {
        let mut stored = self.dataset.lock().await;
        for (label, examples) in dataset.iter() {
            stored.extend_label(label, examples.to_vec());
        }
        Ok(())
    }

    async fn check_conflicts(&self, candidate: &GestureDataset) -> Result<ConflictReport> {
        let stored = self.dataset.lock().await;

        let mut conflicts = Vec::new();
        let mut new_labels = Vec::new();
        for (label, examples) in candidate.iter() {
            match stored.example_count(label) {
                Some(existing_count) => conflicts.push(LabelConflict {
                    label: label.to_string(),
                    existing_count,
                    incoming_count: examples.len(),
                }),
                None => new_labels.push(label.to_string()),
            }
        }

        Ok(ConflictReport {
            has_conflicts: !conflicts.is_empty(),
            conflicts,
            new_labels,
        })
    }

    async fn merge(
        &self,
        candidate: &GestureDataset,
        decisions: &BTreeMap<String, MergeDecision>,
    ) -> Result<MergeOutcome> {
        let mut stored = self.dataset.lock().await;

        let mut outcome = MergeOutcome {
            added: 0,
            replaced: 0,
            rejected: 0,
        };
        for (label, examples) in candidate.iter() {
            if !stored.contains_label(label) {
                stored.replace_label(label, examples.to_vec());
                outcome.added += 1;
                continue;
            }
            match decisions.get(label) {
                Some(MergeDecision::Replace) => {
                    stored.replace_label(label, examples.to_vec());
                    outcome.replaced += 1;
                }
                Some(MergeDecision::Reject) | None => outcome.rejected += 1,
            }
        }

        Ok(outcome)
    }

    async fn stats(&self) -> Result<DatasetStats> {
        let stored = self.dataset.lock().await;
        let gestures: Vec<LabelCount> = stored
            .iter()
            .map(|(label, examples)| LabelCount {
                label: label.to_string(),
                count: examples.len(),
            })
            .collect();

        Ok(DatasetStats {
            total_gestures: stored.total_gestures(),
            total_examples: stored.total_examples(),
            gestures,
        })
    }

    async fn delete_label(&self, label: &str) -> Result<()> {
        let mut stored = self.dataset.lock().await;
        if stored.remove_label(label).is_none() {
            return Err(SignshError::UnknownLabel {
                label: label.to_string(),
            });
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.dataset.lock().await.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
