//! Frame-to-frame change gating.
//!
//! This module provides [`FrameChangeGate`], which decides whether a new
//! frame differs enough from the previous one to be worth classifying. The
//! comparison metric is the mean absolute difference over all elements.
//!
//! The gate owns its previous-frame buffer outright. Frames handed to
//! [`observe`](FrameChangeGate::observe) are moved in and the displaced frame
//! is dropped on the spot; [`should_process`](FrameChangeGate::should_process)
//! copies into the existing allocation instead. Either way no caller can keep
//! a handle to the baseline, and [`release`](FrameChangeGate::release) frees
//! it when a stream is torn down.

use crate::math::mean_absolute_difference;

/// Change gate over flat numeric frames.
///
/// # Example
///
/// ```
/// use hand_gesture::FrameChangeGate;
///
/// let mut gate = FrameChangeGate::new(0.02);
/// assert!(gate.should_process(&[0.1, 0.2, 0.3]));   // first frame
/// assert!(!gate.should_process(&[0.1, 0.2, 0.3]));  // unchanged
/// assert!(gate.should_process(&[0.9, 0.2, 0.3]));   // moved
/// ```
#[derive(Debug, Clone)]
pub struct FrameChangeGate {
    /// Difference at or above which a frame is processed.
    threshold: f64,

    /// Previous frame, `None` before the first frame and after release.
    previous: Option<Vec<f64>>,

    /// Difference computed on the most recent comparison.
    last_difference: Option<f64>,

    /// Frames passed through.
    n_processed: usize,

    /// Frames skipped as unchanged.
    n_skipped: usize,
}

impl FrameChangeGate {
    /// Create a gate with the given difference threshold.
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            previous: None,
            last_difference: None,
            n_processed: 0,
            n_skipped: 0,
        }
    }

    /// Decide whether `frame` should be processed, then make it the baseline.
    ///
    /// The first frame, and any frame whose length differs from the
    /// baseline, is always processed. The baseline is replaced even when the
    /// frame is skipped, so slow drift is measured frame to frame.
    pub fn should_process(&mut self, frame: &[f64]) -> bool {
        let process = self.compare(frame);
        match &mut self.previous {
            Some(prev) => {
                prev.clear();
                prev.extend_from_slice(frame);
            }
            None => self.previous = Some(frame.to_vec()),
        }
        self.record(process)
    }

    /// Like [`should_process`](Self::should_process), taking ownership of
    /// the frame so it becomes the baseline without a copy.
    pub fn observe(&mut self, frame: Vec<f64>) -> bool {
        let process = self.compare(&frame);
        self.previous = Some(frame);
        self.record(process)
    }

    fn compare(&mut self, frame: &[f64]) -> bool {
        let Some(prev) = self.previous.as_deref() else {
            self.last_difference = None;
            return true;
        };
        match mean_absolute_difference(prev, frame) {
            Some(diff) => {
                self.last_difference = Some(diff);
                // NaN compares false, so a corrupt frame is processed
                !(diff < self.threshold)
            }
            None => {
                log::debug!(
                    "Frame size changed from {} to {}, processing",
                    prev.len(),
                    frame.len()
                );
                self.last_difference = None;
                true
            }
        }
    }

    fn record(&mut self, process: bool) -> bool {
        if process {
            self.n_processed += 1;
        } else {
            self.n_skipped += 1;
        }
        process
    }

    /// Drop the baseline and free its memory; the next frame is processed.
    pub fn release(&mut self) {
        self.previous = None;
        self.last_difference = None;
    }

    /// Drop the baseline and zero the counters.
    pub fn reset(&mut self) {
        self.release();
        self.n_processed = 0;
        self.n_skipped = 0;
    }

    /// Whether a baseline frame is held.
    #[must_use]
    pub const fn has_baseline(&self) -> bool {
        self.previous.is_some()
    }

    /// Difference measured on the most recent comparison.
    #[must_use]
    pub const fn last_difference(&self) -> Option<f64> {
        self.last_difference
    }

    /// Frames passed through since the last reset.
    #[must_use]
    pub const fn n_processed(&self) -> usize {
        self.n_processed
    }

    /// Frames skipped since the last reset.
    #[must_use]
    pub const fn n_skipped(&self) -> usize {
        self.n_skipped
    }

    /// Difference threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Change the difference threshold.
    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }
}

impl Default for FrameChangeGate {
    fn default() -> Self {
        Self::new(0.02)
    }
}

/// Scale 8-bit pixel intensities into `[0, 1]`.
///
/// This is the representation camera frames are compared in, so the
/// threshold means the same thing regardless of channel count or size.
#[must_use]
pub fn normalize_pixels(pixels: &[u8]) -> Vec<f64> {
    pixels.iter().map(|&p| f64::from(p) / 255.0).collect()
}
