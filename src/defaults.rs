//! Default configuration constants for signsh.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

use std::time::Duration;

/// Default interval between classified frames in milliseconds.
///
/// The driving loop classifies at most once per interval even when the
/// detector delivers frames faster. 100ms (10 classifications per second)
/// keeps the vote window well populated without burning CPU on redundant
/// nearest-neighbor scans.
pub const FRAME_INTERVAL_MS: u64 = 100;

/// Default vote window duration in milliseconds.
///
/// A gesture must dominate the votes collected over this trailing window
/// before it is emitted. 1000ms absorbs per-frame classification jitter
/// while staying responsive enough for conversational signing.
pub const WINDOW_DURATION_MS: u64 = 1000;

/// Default classification confidence threshold.
///
/// Predictions at or below this fraction of neighbor votes are discarded
/// before they reach the vote window. With k=3 this admits only unanimous
/// (1.0) and two-of-three (0.667) predictions.
pub const CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Default number of nearest neighbors consulted per classification.
pub const K_NEIGHBORS: usize = 3;

/// Default refractory period for repeated speech in milliseconds.
///
/// The same label is not spoken again until this much time has passed
/// since it was last spoken. Different labels are unaffected.
pub const SPEAK_REFRACTORY_MS: u64 = 1500;

/// Number of landmark points reported per detected hand.
pub const HAND_LANDMARKS: usize = 21;

/// Maximum number of hands encoded into a feature vector.
pub const MAX_HANDS: usize = 2;

/// Pose landmark indices encoded into a feature vector (nose, shoulders).
pub const POSE_LANDMARKS: [usize; 3] = [0, 11, 12];

/// Length of every assembled feature vector.
///
/// Two hand slots of 21 points with (x, y, z) each, plus three pose
/// landmarks with (x, y, z, visibility) each. Absent hands and pose are
/// zero-filled so the length never varies between frames.
pub const FEATURE_DIM: usize = MAX_HANDS * HAND_LANDMARKS * 3 + POSE_LANDMARKS.len() * 4;

/// Minimum number of staged examples required to commit a new gesture.
pub const MIN_EXAMPLES_PER_LABEL: usize = 3;

/// Default spoken-language code. Labels are recorded in English.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default speech rate passed to the synthesizer (slightly slower than
/// normal so short labels stay intelligible).
pub const SPEECH_RATE: f32 = 0.9;

/// Default speech pitch.
pub const SPEECH_PITCH: f32 = 1.0;

/// Default speech volume.
pub const SPEECH_VOLUME: f32 = 1.0;

/// How long to wait for the synthesizer's voice catalog to populate
/// before speaking with whatever is available.
pub const VOICE_CATALOG_WAIT: Duration = Duration::from_millis(100);

/// Default dataset backend address.
pub const BACKEND_URL: &str = "http://localhost:3000";

/// Default dataset backend request timeout in milliseconds.
pub const BACKEND_TIMEOUT_MS: u64 = 10_000;

/// Dataset export format version.
pub const DATASET_EXPORT_VERSION: &str = "1.0";
