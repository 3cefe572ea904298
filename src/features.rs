//! Hand-pose feature normalization.
//!
//! Turns the 21 landmarks reported by a hand tracker into a 63-element
//! feature vector that is invariant to where the hand sits in the image and
//! to how far it is from the camera.
//!
//! # Feature Layout (63D)
//!
//! | Index | Landmark | Axis |
//! |-------|----------|------|
//! | 0:3 | 0 (wrist) | x, y, z (always zero) |
//! | 3:6 | 1 | x, y, z |
//! | ... | ... | ... |
//! | 60:63 | 20 | x, y, z |

use serde::{Deserialize, Serialize};

use crate::math::vector::norm3;
use crate::{FEATURE_DIM, HAND_LANDMARKS};

/// One tracked keypoint `[x, y, z]` in normalized image-space units.
pub type Landmark = [f64; 3];

/// Index of the wrist landmark.
pub const WRIST: usize = 0;

/// Normalized, flattened hand pose.
///
/// Always exactly [`FEATURE_DIM`] values in landmark-major, axis-minor order
/// (`x0, y0, z0, x1, y1, z1, ...`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FeatureVector([f64; FEATURE_DIM]);

impl FeatureVector {
    /// Wrap an already-normalized array.
    #[must_use]
    pub const fn from_array(values: [f64; FEATURE_DIM]) -> Self {
        Self(values)
    }

    /// Build from a slice, failing unless it has exactly [`FEATURE_DIM`] values.
    #[must_use]
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        <[f64; FEATURE_DIM]>::try_from(values).ok().map(Self)
    }

    /// Borrow the values.
    #[must_use]
    pub const fn as_array(&self) -> &[f64; FEATURE_DIM] {
        &self.0
    }

    /// Borrow the values as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Normalized position of one landmark.
    ///
    /// # Panics
    ///
    /// Panics if `index >= HAND_LANDMARKS`.
    #[must_use]
    pub fn landmark(&self, index: usize) -> Landmark {
        let base = index * 3;
        [self.0[base], self.0[base + 1], self.0[base + 2]]
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = String;

    fn try_from(values: Vec<f64>) -> std::result::Result<Self, Self::Error> {
        let len = values.len();
        Self::from_slice(&values)
            .ok_or_else(|| format!("feature vector needs {FEATURE_DIM} values, got {len}"))
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(features: FeatureVector) -> Self {
        features.0.to_vec()
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Normalize a hand pose into a feature vector.
///
/// Every landmark is translated so the wrist sits at the origin, then divided
/// by the mean distance of all 21 landmarks from the wrist. A collapsed pose
/// (mean distance of zero) is divided by `degenerate_eps` instead, which
/// yields an all-zero vector rather than NaN.
///
/// # Arguments
///
/// * `landmarks` - Tracker output; anything other than 21 points means no hand
/// * `degenerate_eps` - Substitute for a zero mean radius
///
/// # Returns
///
/// `None` when the input does not hold exactly [`HAND_LANDMARKS`] points.
///
/// # Example
///
/// ```
/// use hand_gesture::normalize_landmarks;
///
/// assert!(normalize_landmarks(&[], 1e-6).is_none());
///
/// let pose: Vec<[f64; 3]> = (0..21).map(|i| [0.5 + i as f64 * 0.01, 0.5, 0.0]).collect();
/// let features = normalize_landmarks(&pose, 1e-6).unwrap();
/// assert_eq!(features.as_slice().len(), 63);
/// ```
#[must_use]
pub fn normalize_landmarks(landmarks: &[Landmark], degenerate_eps: f64) -> Option<FeatureVector> {
    if landmarks.len() != HAND_LANDMARKS {
        return None;
    }

    let wrist = landmarks[WRIST];
    let mut centered = [[0.0f64; 3]; HAND_LANDMARKS];
    for (c, p) in centered.iter_mut().zip(landmarks) {
        *c = [p[0] - wrist[0], p[1] - wrist[1], p[2] - wrist[2]];
    }

    let mean_radius = centered.iter().map(norm3).sum::<f64>() / HAND_LANDMARKS as f64;
    let scale = if mean_radius > 0.0 && mean_radius.is_finite() {
        mean_radius
    } else {
        degenerate_eps
    };

    let mut out = [0.0f64; FEATURE_DIM];
    for (i, c) in centered.iter().enumerate() {
        out[i * 3] = c[0] / scale;
        out[i * 3 + 1] = c[1] / scale;
        out[i * 3 + 2] = c[2] / scale;
    }
    Some(FeatureVector(out))
}

/// Negate the x axis of every landmark in a feature vector.
///
/// Lets a model trained on one hand classify the other.
#[must_use]
pub fn mirror_x(features: &FeatureVector) -> FeatureVector {
    let mut out = features.0;
    for x in out.iter_mut().step_by(3) {
        *x = -*x;
    }
    FeatureVector(out)
}
