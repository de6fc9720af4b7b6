//! Gesture example storage.
//!
//! The dataset is a label-to-examples mapping owned by the session. Backends
//! persist it: an in-memory backend carries the authoritative merge semantics
//! and a remote backend speaks the same contract over HTTP.

pub mod backend;
pub mod dataset;
pub mod exchange;
#[cfg(feature = "remote")]
pub mod http;
pub mod recorder;

pub use backend::{
    ConflictReport, DatasetBackend, DatasetStats, LabelConflict, LabelCount, MemoryBackend,
    MergeDecision, MergeOutcome,
};
pub use dataset::GestureDataset;
pub use exchange::{export_dataset, export_filename, import_dataset, DatasetExport, ExportMetadata};
#[cfg(feature = "remote")]
pub use http::HttpBackend;
pub use recorder::GestureRecorder;
