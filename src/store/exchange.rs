//! Dataset file exchange.
//!
//! Exports wrap the dataset in a metadata envelope; imports accept either
//! that envelope or a bare label-to-examples mapping, and validate every
//! vector before anything reaches the store.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::defaults::DATASET_EXPORT_VERSION;
use crate::error::{Result, SignshError};
use crate::store::dataset::GestureDataset;

/// Envelope metadata written alongside an exported dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// RFC 3339 export timestamp.
    pub export_date: String,
    pub total_gestures: usize,
    pub total_examples: usize,
    pub version: String,
}

/// The on-disk export artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetExport {
    pub metadata: ExportMetadata,
    pub dataset: GestureDataset,
}

impl DatasetExport {
    /// Pretty-printed JSON, the shape import expects back.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SignshError::Other(format!("Failed to serialize dataset export: {e}")))
    }
}

/// Wrap a dataset in an export envelope stamped at `at`.
pub fn export_dataset(dataset: &GestureDataset, at: SystemTime) -> DatasetExport {
    DatasetExport {
        metadata: ExportMetadata {
            export_date: humantime::format_rfc3339_millis(at).to_string(),
            total_gestures: dataset.total_gestures(),
            total_examples: dataset.total_examples(),
            version: DATASET_EXPORT_VERSION.to_string(),
        },
        dataset: dataset.clone(),
    }
}

/// Dated filename for a dataset export, e.g. "gesture-dataset-2026-08-23.json".
pub fn export_filename(at: SystemTime) -> String {
    let stamp = humantime::format_rfc3339(at).to_string();
    format!("gesture-dataset-{}.json", &stamp[..10])
}

/// Parse a dataset from exported or hand-written JSON.
///
/// A top-level `dataset` object marks the wrapped export shape; anything
/// else is read as a bare mapping. A gesture label literally named
/// "dataset" maps to an array, not an object, so it still parses as bare.
pub fn import_dataset(text: &str) -> Result<GestureDataset> {
    let parsed: serde_json::Value =
        serde_json::from_str(text).map_err(|e| SignshError::InvalidDataset {
            message: format!("invalid JSON: {e}"),
        })?;

    let body = match parsed.get("dataset") {
        Some(inner) if inner.is_object() => inner,
        _ => &parsed,
    };
    GestureDataset::from_value(body)
}
