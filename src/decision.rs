//! Turning smoothed probabilities into a committed label.
//!
//! [`decide`] is the stateless single-frame rule: report the most probable
//! label if it clears the threshold, otherwise nothing. [`DecisionGate`] wraps
//! the same rule and can optionally add hysteresis so the reported label does
//! not flicker between frames.

use crate::config::{HysteresisConfig, PipelineConfig};
use crate::error::{GestureError, Result};
use crate::math::argmax;

/// Single-frame threshold decision.
///
/// Returns the label with the highest probability (first occurrence on ties)
/// if that probability is at least `tau`, otherwise `None`.
///
/// # Errors
///
/// Returns [`GestureError::DimensionMismatch`] if `labels` and `probs` differ
/// in length.
///
/// # Example
///
/// ```
/// use hand_gesture::decide;
///
/// let labels = ["A".to_string(), "B".to_string()];
/// assert_eq!(decide(&labels, &[0.72, 0.28], 0.7)?, Some("A"));
/// assert_eq!(decide(&labels, &[0.65, 0.35], 0.7)?, None);
/// # Ok::<(), hand_gesture::GestureError>(())
/// ```
pub fn decide<'a>(labels: &'a [String], probs: &[f64], tau: f64) -> Result<Option<&'a str>> {
    Ok(decide_index(labels, probs, tau)?.map(|i| labels[i].as_str()))
}

fn decide_index(labels: &[String], probs: &[f64], tau: f64) -> Result<Option<usize>> {
    if labels.len() != probs.len() {
        return Err(GestureError::dimension_mismatch(labels.len(), probs.len()));
    }
    Ok(argmax(probs).and_then(|(i, p)| (p >= tau).then_some(i)))
}

/// Outcome of one [`DecisionGate::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Index of the reported label, `None` when no label is committed.
    pub index: Option<usize>,
    /// Probability backing the decision: the reported label's probability,
    /// or the top probability when nothing is reported.
    pub confidence: f64,
}

/// Stateful decision gate with optional hysteresis.
///
/// Without hysteresis every call is exactly [`decide`]. With hysteresis:
///
/// - a reported label is held while its probability stays at or above the
///   exit threshold and no other label clears the entry threshold;
/// - any change of outcome (new label, or back to none) must be proposed on
///   `min_consecutive_frames` consecutive updates before it is reported.
#[derive(Debug, Clone)]
pub struct DecisionGate {
    threshold: f64,
    hysteresis: Option<HysteresisConfig>,
    reported: Option<usize>,
    pending: Option<usize>,
    streak: usize,
}

impl DecisionGate {
    /// Plain threshold gate.
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            hysteresis: None,
            reported: None,
            pending: None,
            streak: 0,
        }
    }

    /// Gate with hysteresis.
    #[must_use]
    pub const fn with_hysteresis(threshold: f64, hysteresis: HysteresisConfig) -> Self {
        Self {
            threshold,
            hysteresis: Some(hysteresis),
            reported: None,
            pending: None,
            streak: 0,
        }
    }

    /// Gate configured from a pipeline configuration.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        match config.hysteresis {
            Some(h) => Self::with_hysteresis(config.confidence_threshold, h),
            None => Self::new(config.confidence_threshold),
        }
    }

    /// Feed one smoothed probability vector.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::DimensionMismatch`] if `labels` and `probs`
    /// differ in length. State is unchanged in that case.
    pub fn update(&mut self, labels: &[String], probs: &[f64]) -> Result<Decision> {
        let candidate = decide_index(labels, probs, self.threshold)?;
        let top = argmax(probs).map_or(0.0, |(_, p)| p);

        let Some(h) = self.hysteresis else {
            self.reported = candidate;
            return Ok(Decision {
                index: candidate,
                confidence: top,
            });
        };

        // Held label survives while above the exit threshold, unless another
        // label is confidently winning.
        let proposal = match self.reported {
            Some(current) => {
                let held = probs.get(current).copied().unwrap_or(0.0) >= h.exit_threshold;
                match candidate {
                    Some(c) if c != current => Some(c),
                    _ if held => Some(current),
                    other => other,
                }
            }
            None => candidate,
        };

        if proposal == self.reported {
            self.pending = None;
            self.streak = 0;
        } else {
            if proposal == self.pending {
                self.streak += 1;
            } else {
                self.pending = proposal;
                self.streak = 1;
            }
            if self.streak >= h.min_consecutive_frames {
                log::trace!("Decision switched {:?} -> {:?}", self.reported, proposal);
                self.reported = proposal;
                self.pending = None;
                self.streak = 0;
            }
        }

        let confidence = self
            .reported
            .and_then(|i| probs.get(i).copied())
            .unwrap_or(top);
        Ok(Decision {
            index: self.reported,
            confidence,
        })
    }

    /// Index of the label currently reported.
    #[must_use]
    pub const fn reported(&self) -> Option<usize> {
        self.reported
    }

    /// Forget the reported label and any pending switch.
    pub fn reset(&mut self) {
        self.reported = None;
        self.pending = None;
        self.streak = 0;
    }

    /// Entry threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }
}
