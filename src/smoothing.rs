//! Temporal smoothing of class probabilities.
//!
//! This module provides [`ProbabilitySmoother`], an exponential moving
//! average over the probability vectors of one stream, and the
//! [`ProbabilityVector`] type that flows through the pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{GestureError, Result};
use crate::math::argmax;

/// Class probabilities, index-aligned with a label list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbabilityVector(Vec<f64>);

impl ProbabilityVector {
    /// Wrap raw probabilities.
    #[must_use]
    pub const fn new(probs: Vec<f64>) -> Self {
        Self(probs)
    }

    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Probability of class `i`.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<f64> {
        self.0.get(i).copied()
    }

    /// Borrow the values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Sum of all entries (1 within rounding for softmax output).
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Index and value of the most probable class; first occurrence wins ties.
    #[must_use]
    pub fn argmax(&self) -> Option<(usize, f64)> {
        argmax(&self.0)
    }

    /// Largest probability, or 0 when empty.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.argmax().map_or(0.0, |(_, p)| p)
    }

    /// Unwrap into the underlying vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for ProbabilityVector {
    fn from(probs: Vec<f64>) -> Self {
        Self(probs)
    }
}

impl AsRef<[f64]> for ProbabilityVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Exponential moving average over probability vectors.
///
/// The first observation is adopted as-is; every later one updates
/// `state = alpha * state + (1 - alpha) * probs`. Returned vectors are
/// copies, so callers can never reach the internal state.
///
/// # Example
///
/// ```
/// use hand_gesture::ProbabilitySmoother;
///
/// let mut smoother = ProbabilitySmoother::new(0.5);
/// let first = smoother.smooth(&[1.0, 0.0])?;
/// assert_eq!(first.as_slice(), &[1.0, 0.0]);
///
/// let second = smoother.smooth(&[0.0, 1.0])?;
/// assert_eq!(second.as_slice(), &[0.5, 0.5]);
/// # Ok::<(), hand_gesture::GestureError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProbabilitySmoother {
    /// History weight in `[0, 1)`.
    alpha: f64,

    /// EMA state; `None` until the first observation.
    state: Option<Vec<f64>>,

    /// Observations folded into the state since the last reset.
    n_updates: usize,
}

impl ProbabilitySmoother {
    /// Create a smoother with the given history weight.
    #[must_use]
    pub const fn new(alpha: f64) -> Self {
        Self {
            alpha,
            state: None,
            n_updates: 0,
        }
    }

    /// Fold one observation into the average using the configured alpha.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::DimensionMismatch`] if `probs` has a different
    /// length than the current state (e.g. weights with a different class
    /// count were loaded without a reset). The state is left untouched.
    pub fn smooth(&mut self, probs: &[f64]) -> Result<ProbabilityVector> {
        self.smooth_with(probs, self.alpha)
    }

    /// Fold one observation into the average with an explicit alpha.
    ///
    /// # Errors
    ///
    /// As [`smooth`](Self::smooth).
    pub fn smooth_with(&mut self, probs: &[f64], alpha: f64) -> Result<ProbabilityVector> {
        match &mut self.state {
            None => {
                self.state = Some(probs.to_vec());
            }
            Some(state) => {
                if state.len() != probs.len() {
                    return Err(GestureError::dimension_mismatch(state.len(), probs.len()));
                }
                for (s, &p) in state.iter_mut().zip(probs) {
                    *s = alpha * *s + (1.0 - alpha) * p;
                }
            }
        }
        self.n_updates += 1;
        Ok(ProbabilityVector::new(self.state.clone().unwrap_or_default()))
    }

    /// Clear the history so the next observation starts a fresh average.
    pub fn reset(&mut self) {
        if self.state.is_some() {
            log::debug!("Resetting probability smoother after {} updates", self.n_updates);
        }
        self.state = None;
        self.n_updates = 0;
    }

    /// Current average, if any observation has been seen.
    #[must_use]
    pub fn current(&self) -> Option<ProbabilityVector> {
        self.state.clone().map(ProbabilityVector::new)
    }

    /// Whether the smoother holds history.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Observations since the last reset.
    #[must_use]
    pub const fn n_updates(&self) -> usize {
        self.n_updates
    }

    /// History weight.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Change the history weight; existing state is kept.
    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }
}

impl Default for ProbabilitySmoother {
    fn default() -> Self {
        Self::new(0.6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_observation_passes_through() {
        let mut s = ProbabilitySmoother::new(0.9);
        let out = s.smooth(&[0.2, 0.3, 0.5]).unwrap();
        assert_eq!(out.as_slice(), &[0.2, 0.3, 0.5]);
        assert_eq!(s.n_updates(), 1);
    }

    #[test]
    fn test_ema_update() {
        let mut s = ProbabilitySmoother::new(0.6);
        s.smooth(&[1.0, 0.0]).unwrap();
        let out = s.smooth(&[0.0, 1.0]).unwrap();
        assert_relative_eq!(out.as_slice()[0], 0.6, epsilon = 1e-12);
        assert_relative_eq!(out.as_slice()[1], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_converges_to_constant_input() {
        let mut s = ProbabilitySmoother::new(0.8);
        s.smooth(&[1.0, 0.0, 0.0]).unwrap();
        let target = [0.1, 0.7, 0.2];
        let mut prev_err = f64::INFINITY;
        let mut out = s.smooth(&target).unwrap();
        for _ in 0..100 {
            out = s.smooth(&target).unwrap();
            let err: f64 = out.as_slice().iter().zip(&target).map(|(a, b)| (a - b).abs()).sum();
            assert!(err <= prev_err);
            prev_err = err;
        }
        for (a, b) in out.as_slice().iter().zip(&target) {
            assert_relative_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_returned_copy_cannot_corrupt_state() {
        let mut s = ProbabilitySmoother::new(0.5);
        let out = s.smooth(&[0.4, 0.6]).unwrap();
        let mut raw = out.into_inner();
        raw[0] = 99.0;
        assert_eq!(s.current().unwrap().as_slice(), &[0.4, 0.6]);
    }

    #[test]
    fn test_reset() {
        let mut s = ProbabilitySmoother::new(0.5);
        s.smooth(&[1.0, 0.0]).unwrap();
        s.reset();
        assert!(!s.is_initialized());
        let out = s.smooth(&[0.0, 1.0]).unwrap();
        assert_eq!(out.as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn test_length_change_is_rejected() {
        let mut s = ProbabilitySmoother::new(0.5);
        s.smooth(&[0.5, 0.5]).unwrap();
        let err = s.smooth(&[0.2, 0.3, 0.5]).unwrap_err();
        assert!(matches!(err, GestureError::DimensionMismatch { expected: 2, actual: 3 }));
        assert_eq!(s.current().unwrap().as_slice(), &[0.5, 0.5]);
        assert_eq!(s.n_updates(), 1);
    }

    #[test]
    fn test_zero_alpha_tracks_input() {
        let mut s = ProbabilitySmoother::new(0.0);
        s.smooth(&[1.0, 0.0]).unwrap();
        let out = s.smooth(&[0.3, 0.7]).unwrap();
        assert_eq!(out.as_slice(), &[0.3, 0.7]);
    }

    #[test]
    fn test_probability_vector_helpers() {
        let p = ProbabilityVector::from(vec![0.1, 0.6, 0.3]);
        assert_eq!(p.len(), 3);
        assert_eq!(p.argmax(), Some((1, 0.6)));
        assert_relative_eq!(p.max(), 0.6);
        assert_relative_eq!(p.sum(), 1.0, epsilon = 1e-12);
        assert_eq!(ProbabilityVector::default().max(), 0.0);
    }
}
