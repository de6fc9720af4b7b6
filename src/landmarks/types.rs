//! Data types for per-frame landmark detections.

use serde::{Deserialize, Serialize};

/// A single normalized keypoint reported by the detector.
///
/// Coordinates are normalized to [0, 1] relative to the frame. `visibility`
/// is only reported for pose landmarks; hand landmarks leave it absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl LandmarkPoint {
    /// Creates a landmark without visibility (hand keypoints).
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }

    /// Creates a landmark with visibility (pose keypoints).
    pub fn with_visibility(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: Some(visibility),
        }
    }

    /// Visibility with absent treated as 0.
    pub fn visibility_or_zero(&self) -> f32 {
        self.visibility.unwrap_or(0.0)
    }
}

/// One frame's detection result: zero or more hands, zero or one pose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Hand landmark sets in the order the detector reported them.
    /// Each set holds 21 points in landmark-index order.
    #[serde(default)]
    pub hands: Vec<Vec<LandmarkPoint>>,
    /// Pose landmark set, when a body was in frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<Vec<LandmarkPoint>>,
}

impl Detection {
    /// Creates an empty detection (nothing in frame).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a detection from hand sets and an optional pose set.
    pub fn new(hands: Vec<Vec<LandmarkPoint>>, pose: Option<Vec<LandmarkPoint>>) -> Self {
        Self { hands, pose }
    }

    /// True when no hands were detected this frame.
    pub fn has_hands(&self) -> bool {
        !self.hands.is_empty()
    }
}
