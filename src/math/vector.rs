//! Vector utilities for classification and frame comparison.
//!
//! The affine map `W·x + b` is computed with nalgebra; the frame-difference
//! metric is a plain mean absolute difference.

use nalgebra::{DMatrix, DVector};

/// Compute `W·x + b`.
///
/// # Arguments
///
/// * `w` - Weight matrix, one row per class
/// * `x` - Input vector, `w.ncols()` long
/// * `b` - Bias vector, `w.nrows()` long
///
/// # Panics
///
/// Panics if the shapes do not agree; callers validate shapes up front.
#[must_use]
pub fn mat_vec_bias(w: &DMatrix<f64>, x: &[f64], b: &DVector<f64>) -> DVector<f64> {
    debug_assert_eq!(w.ncols(), x.len());
    debug_assert_eq!(w.nrows(), b.len());
    let x = DVector::from_column_slice(x);
    w * x + b
}

/// Mean absolute difference between two equally long slices.
///
/// Returns `None` when the lengths differ. Two empty slices differ by zero.
///
/// # Example
///
/// ```
/// use hand_gesture::math::mean_absolute_difference;
///
/// let d = mean_absolute_difference(&[0.0, 1.0], &[0.5, 0.5]).unwrap();
/// assert!((d - 0.5).abs() < 1e-12);
/// ```
#[must_use]
pub fn mean_absolute_difference(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }
    if a.is_empty() {
        return Some(0.0);
    }
    let total: f64 = a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum();
    Some(total / a.len() as f64)
}

/// Euclidean length of a 3D vector.
#[inline]
#[must_use]
pub fn norm3(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
