//! Landmark detection boundary.
//!
//! signsh does not run a keypoint model itself; frames of hand and pose
//! landmarks arrive through the [`LandmarkDetector`] trait. A replay
//! detector reads recorded frames from a JSONL file, and a scripted mock
//! drives the tests.

pub mod detector;
pub mod types;

pub use detector::{LandmarkDetector, MockDetector, ReplayDetector};
pub use types::{Detection, LandmarkPoint};
