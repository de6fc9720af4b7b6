//! Capture-side staging for new gesture examples.
//!
//! Examples are staged locally per label and only pushed to a backend once
//! every staged label has enough of them to classify against.

use crate::defaults::MIN_EXAMPLES_PER_LABEL;
use crate::error::{Result, SignshError};
use crate::features;
use crate::landmarks::Detection;
use crate::store::backend::DatasetBackend;
use crate::store::dataset::GestureDataset;

/// Staging area for recording gesture examples.
#[derive(Debug, Default)]
pub struct GestureRecorder {
    staged: GestureDataset,
}

impl GestureRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staged(&self) -> &GestureDataset {
        &self.staged
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Assemble `detection` into a feature vector and stage it under `label`.
    ///
    /// The label is trimmed first; a blank label is refused, as is a frame
    /// with no detected hand (there is no gesture to record in it). Returns
    /// the number of examples now staged for the label.
    pub fn add_example(&mut self, label: &str, detection: &Detection) -> Result<usize> {
        let label = label.trim();
        if label.is_empty() {
            return Err(SignshError::Other("Gesture label is empty".to_string()));
        }
        if !detection.has_hands() {
            return Err(SignshError::Detection {
                message: "no hand detected in frame".to_string(),
            });
        }

        self.staged.insert_example(label, features::assemble(detection));
        Ok(self.staged.example_count(label).unwrap_or(0))
    }

    /// Drop everything staged.
    pub fn clear(&mut self) {
        self.staged.clear();
    }

    /// Push all staged examples to `backend` and clear the staging area.
    ///
    /// Refused while any staged label has fewer than
    /// [`MIN_EXAMPLES_PER_LABEL`] examples; a thin label would classify
    /// poorly and drag its neighbors down with it. Staging is kept intact
    /// on any failure so the caller can record more and retry. Returns the
    /// number of examples committed.
    pub async fn commit(&mut self, backend: &dyn DatasetBackend) -> Result<usize> {
        if self.staged.is_empty() {
            return Err(SignshError::Other(
                "No examples staged. Record some gestures first.".to_string(),
            ));
        }

        let thin: Vec<&str> = self
            .staged
            .iter()
            .filter(|(_, examples)| examples.len() < MIN_EXAMPLES_PER_LABEL)
            .map(|(label, _)| label.as_str())
            .collect();
        if !thin.is_empty() {
            return Err(SignshError::Other(format!(
                "Labels with fewer than {} examples: {}",
                MIN_EXAMPLES_PER_LABEL,
                thin.join(", ")
            )));
        }

        backend.save(&self.staged).await?;
        let committed = self.staged.total_examples();
        self.staged.clear();
        Ok(committed)
    }
}
