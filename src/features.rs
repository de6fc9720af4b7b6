//! Feature assembly: one frame's detections to a fixed-shape vector.
//!
//! Every vector has length [`defaults::FEATURE_DIM`]: two hand slots of 21
//! points with (x, y, z) each, then pose landmarks {0, 11, 12} with
//! (x, y, z, visibility) each. Hands fill slots in the order the detector
//! reported them; absent hands and pose are zero-filled, so a one-handed
//! frame and a two-handed frame always compare over the same dimensions.

use crate::defaults::{FEATURE_DIM, HAND_LANDMARKS, MAX_HANDS, POSE_LANDMARKS};
use crate::landmarks::types::Detection;

/// A flattened numeric encoding of one frame's landmarks.
pub type FeatureVector = Vec<f32>;

/// Builds the feature vector for one frame's detections.
///
/// Absent inputs degrade to zero-fill; this never fails. Extra hands beyond
/// two and extra points beyond 21 per hand are ignored.
pub fn assemble(detection: &Detection) -> FeatureVector {
    let mut features = Vec::with_capacity(FEATURE_DIM);

    for slot in 0..MAX_HANDS {
        match detection.hands.get(slot) {
            Some(hand) => {
                for idx in 0..HAND_LANDMARKS {
                    match hand.get(idx) {
                        Some(point) => {
                            features.push(point.x);
                            features.push(point.y);
                            features.push(point.z);
                        }
                        None => features.extend_from_slice(&[0.0, 0.0, 0.0]),
                    }
                }
            }
            None => {
                features.extend(std::iter::repeat_n(0.0, HAND_LANDMARKS * 3));
            }
        }
    }

    match &detection.pose {
        Some(pose) => {
            for &idx in POSE_LANDMARKS.iter() {
                match pose.get(idx) {
                    Some(point) => {
                        features.push(point.x);
                        features.push(point.y);
                        features.push(point.z);
                        features.push(point.visibility_or_zero());
                    }
                    None => features.extend_from_slice(&[0.0, 0.0, 0.0, 0.0]),
                }
            }
        }
        None => {
            features.extend(std::iter::repeat_n(0.0, POSE_LANDMARKS.len() * 4));
        }
    }

    debug_assert_eq!(features.len(), FEATURE_DIM);
    features
}
