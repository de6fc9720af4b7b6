//! Gesture-to-speech pipeline.
//!
//! One cooperative async loop samples landmark frames, classifies them,
//! smooths the results over a vote window, and turns stabilized labels
//! into utterances and transcript entries. Observers follow along on an
//! event channel.

pub mod events;
pub mod orchestrator;
pub mod reporter;

pub use events::PipelineEvent;
pub use orchestrator::{Pipeline, PipelineHandle, PipelineOptions};
pub use reporter::{ErrorReporter, LogReporter, MockReporter};
