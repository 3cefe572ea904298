//! Configuration for the per-frame classification pipeline.
//!
//! This module provides the [`PipelineConfig`] struct which centralizes all
//! tunable parameters of a gesture stream, along with presets for common
//! capture scenarios.
//!
//! # Example
//!
//! ```
//! use hand_gesture::PipelineConfig;
//!
//! // Use default configuration
//! let config = PipelineConfig::default();
//!
//! // Use a preset
//! let stable = PipelineConfig::stable();
//! let camera = PipelineConfig::camera();
//! ```

use crate::error::{GestureError, Result};

/// Configuration for a gesture classification stream.
///
/// The defaults reproduce the single-frame threshold behavior: EMA with
/// `alpha = 0.6`, confidence threshold `0.7`, no hysteresis and no change
/// gating on the landmark path.
///
/// # Core Parameters
///
/// - `smoothing_alpha`: weight given to history in the EMA (higher = steadier).
/// - `confidence_threshold`: minimum smoothed probability to commit a label.
/// - `change_threshold`: mean absolute difference below which a frame is skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// EMA history weight in `[0, 1)`.
    /// - 0.0: no smoothing, raw probabilities pass through
    /// - 0.6: balanced
    /// - 0.8+: very steady, slow to react
    pub smoothing_alpha: f64,

    /// Decision threshold tau in `(0, 1]`.
    pub confidence_threshold: f64,

    /// Whether consecutive frames are compared before classification.
    pub change_gate_enabled: bool,

    /// Mean absolute difference at or above which a frame counts as changed.
    pub change_threshold: f64,

    /// Substitute for a zero mean radius in normalization.
    pub degenerate_eps: f64,

    /// Negate the normalized x axis so both hands map onto one model.
    pub mirror_x: bool,

    /// Clear smoothing history whenever a frame reports no hand.
    pub reset_on_hand_loss: bool,

    /// Optional multi-frame hysteresis for the decision gate.
    pub hysteresis: Option<HysteresisConfig>,
}

/// Hysteresis parameters for [`DecisionGate`](crate::DecisionGate).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HysteresisConfig {
    /// Frames a new outcome must persist before it is reported.
    pub min_consecutive_frames: usize,

    /// Probability the reported label may sag to before it is released.
    /// Must not exceed the entry threshold.
    pub exit_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: 0.6,
            confidence_threshold: 0.7,
            change_gate_enabled: false,
            change_threshold: 0.02,
            degenerate_eps: 1e-6,
            mirror_x: false,
            reset_on_hand_loss: false,
            hysteresis: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.smoothing_alpha) {
            return Err(GestureError::invalid_config(
                "smoothing_alpha must be in [0, 1)",
            ));
        }
        if !(self.confidence_threshold > 0.0 && self.confidence_threshold <= 1.0) {
            return Err(GestureError::invalid_config(
                "confidence_threshold must be in (0, 1]",
            ));
        }
        if self.change_threshold.is_nan() || self.change_threshold < 0.0 {
            return Err(GestureError::invalid_config(
                "change_threshold must be non-negative",
            ));
        }
        if self.degenerate_eps.is_nan() || self.degenerate_eps <= 0.0 {
            return Err(GestureError::invalid_config("degenerate_eps must be positive"));
        }
        if let Some(h) = &self.hysteresis {
            if h.min_consecutive_frames == 0 {
                return Err(GestureError::invalid_config(
                    "min_consecutive_frames must be at least 1",
                ));
            }
            if !(h.exit_threshold > 0.0 && h.exit_threshold <= self.confidence_threshold) {
                return Err(GestureError::invalid_config(
                    "exit_threshold must be in (0, confidence_threshold]",
                ));
            }
        }
        Ok(())
    }

    /// Preset that reacts quickly at the cost of more flicker.
    #[must_use]
    pub fn responsive() -> Self {
        Self {
            smoothing_alpha: 0.3,
            ..Self::default()
        }
    }

    /// Preset for steady on-screen labels.
    ///
    /// Heavy smoothing plus hysteresis: a new label must win three frames in
    /// a row, and the current one is held until it sags below 0.55.
    #[must_use]
    pub fn stable() -> Self {
        Self {
            smoothing_alpha: 0.8,
            hysteresis: Some(HysteresisConfig {
                min_consecutive_frames: 3,
                exit_threshold: 0.55,
            }),
            ..Self::default()
        }
    }

    /// Preset for the camera-frame variant, where static scenes are skipped.
    #[must_use]
    pub fn camera() -> Self {
        Self {
            change_gate_enabled: true,
            change_threshold: 0.02,
            ..Self::default()
        }
    }

    /// Set the EMA history weight.
    #[must_use]
    pub const fn with_smoothing_alpha(mut self, alpha: f64) -> Self {
        self.smoothing_alpha = alpha;
        self
    }

    /// Set the decision threshold.
    #[must_use]
    pub const fn with_confidence_threshold(mut self, tau: f64) -> Self {
        self.confidence_threshold = tau;
        self
    }

    /// Enable change gating with the given threshold.
    #[must_use]
    pub const fn with_change_gate(mut self, threshold: f64) -> Self {
        self.change_gate_enabled = true;
        self.change_threshold = threshold;
        self
    }

    /// Enable/disable x-axis mirroring.
    #[must_use]
    pub const fn with_mirror_x(mut self, mirror: bool) -> Self {
        self.mirror_x = mirror;
        self
    }

    /// Enable/disable smoother reset when the hand disappears.
    #[must_use]
    pub const fn with_reset_on_hand_loss(mut self, reset: bool) -> Self {
        self.reset_on_hand_loss = reset;
        self
    }

    /// Enable hysteresis on the decision gate.
    #[must_use]
    pub const fn with_hysteresis(mut self, min_consecutive_frames: usize, exit_threshold: f64) -> Self {
        self.hysteresis = Some(HysteresisConfig {
            min_consecutive_frames,
            exit_threshold,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.smoothing_alpha, 0.6);
        assert_eq!(config.confidence_threshold, 0.7);
        assert!(config.hysteresis.is_none());
        assert!(!config.change_gate_enabled);
    }

    #[test]
    fn test_presets_validate() {
        assert!(PipelineConfig::responsive().validate().is_ok());
        assert!(PipelineConfig::stable().validate().is_ok());
        assert!(PipelineConfig::camera().validate().is_ok());
        assert!(PipelineConfig::camera().change_gate_enabled);
    }

    #[test]
    fn test_validation() {
        let mut config = PipelineConfig::default();

        config.smoothing_alpha = 1.0;
        assert!(config.validate().is_err());

        config.smoothing_alpha = 0.6;
        config.confidence_threshold = 0.0;
        assert!(config.validate().is_err());

        config.confidence_threshold = 0.7;
        config.change_threshold = -0.1;
        assert!(config.validate().is_err());

        config.change_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hysteresis_validation() {
        let config = PipelineConfig::default().with_hysteresis(0, 0.5);
        assert!(config.validate().is_err());

        // exit threshold above entry threshold
        let config = PipelineConfig::default().with_hysteresis(2, 0.9);
        assert!(config.validate().is_err());

        let config = PipelineConfig::default().with_hysteresis(2, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new()
            .with_smoothing_alpha(0.4)
            .with_confidence_threshold(0.8)
            .with_change_gate(0.05)
            .with_mirror_x(true);
        assert_eq!(config.smoothing_alpha, 0.4);
        assert_eq!(config.confidence_threshold, 0.8);
        assert!(config.change_gate_enabled);
        assert_eq!(config.change_threshold, 0.05);
        assert!(config.mirror_x);
    }
}
