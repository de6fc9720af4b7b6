//! JSON event stream emitted by the running pipeline.
//!
//! Observers (the CLI display, or anything tailing the event channel)
//! receive one event per state change. Emission never blocks the loop:
//! events are dropped when no observer keeps up.

use serde::{Deserialize, Serialize};

/// Events emitted by the pipeline loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A gesture won the vote window. `confidence` is its share of the
    /// surviving votes.
    Gesture { label: String, confidence: f32 },
    /// The vote window emptied; any displayed gesture should clear.
    Cleared,
    /// An utterance was handed to the synthesizer.
    Spoken { text: String, lang: String },
    /// The loop ended, carrying the final rendered transcript.
    Stopped { transcript: String },
}

impl PipelineEvent {
    /// Serialize event to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize event from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
