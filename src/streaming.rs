//! Per-stream gesture classification.
//!
//! This module provides [`GestureStream`], which owns the order-dependent
//! state of one capture session (smoother, decision gate, change gate) and
//! runs one frame at a time through the full pipeline:
//!
//! ```text
//! landmarks -> normalize -> [change gate] -> classify -> smooth -> decide
//! ```
//!
//! Frames must be fed in arrival order. The classifier is borrowed per call,
//! so one loaded model can serve any number of streams.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::change_gate::{normalize_pixels, FrameChangeGate};
use crate::classifier::LinearClassifier;
use crate::config::PipelineConfig;
use crate::decision::DecisionGate;
use crate::error::{GestureError, Result};
use crate::features::{mirror_x, normalize_landmarks, Landmark};
use crate::smoothing::{ProbabilityVector, ProbabilitySmoother};

/// Per-frame output: a committed label, or none, with its confidence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Classification {
    /// Committed label; `None` when no hand was seen or confidence was too low.
    pub label: Option<String>,
    /// Smoothed probability in `[0, 1]` backing the decision.
    pub confidence: f64,
}

impl Classification {
    /// "No gesture" with zero confidence.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            label: None,
            confidence: 0.0,
        }
    }

    /// Whether a label was committed.
    #[must_use]
    pub const fn is_gesture(&self) -> bool {
        self.label.is_some()
    }

    /// Committed label as a string slice.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.label.as_deref().unwrap_or("-");
        write!(f, "{label} ({:.1}%)", self.confidence * 100.0)
    }
}

/// Frame counters for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StreamStats {
    /// Frames handed to the stream.
    pub frames_seen: u64,
    /// Frames that reached the classifier and produced a decision.
    pub frames_classified: u64,
    /// Frames skipped by the change gate.
    pub frames_skipped: u64,
    /// Frames without a usable hand pose.
    pub frames_without_hand: u64,
    /// Camera frames handed to [`GestureStream::should_process_pixels`].
    pub pixel_frames_seen: u64,
    /// Camera frames the pixel gate judged unchanged.
    pub pixel_frames_skipped: u64,
}

/// Stateful classification pipeline for a single stream.
///
/// # Example
///
/// ```
/// use hand_gesture::{GestureStream, LinearClassifier, PipelineConfig, WeightMatrix};
///
/// let classifier = LinearClassifier::with_weights(WeightMatrix::zeros(["A", "B"])?);
/// let mut stream = GestureStream::new(PipelineConfig::default())?;
///
/// // No hand: not an error, just no gesture
/// let out = stream.process(&classifier, &[])?;
/// assert!(!out.is_gesture());
///
/// // Uniform model never clears the 0.7 threshold
/// let pose: Vec<[f64; 3]> = (0..21).map(|i| [i as f64 * 0.01, 0.0, 0.0]).collect();
/// let out = stream.process(&classifier, &pose)?;
/// assert_eq!(out.label, None);
/// assert!((out.confidence - 0.5).abs() < 1e-12);
/// # Ok::<(), hand_gesture::GestureError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GestureStream {
    config: PipelineConfig,
    smoother: ProbabilitySmoother,
    decision: DecisionGate,
    change_gate: FrameChangeGate,
    /// Baseline for camera frames, kept apart from the landmark baseline.
    pixel_gate: FrameChangeGate,
    /// Labels the smoother state is aligned with.
    labels: Option<Arc<[String]>>,
    last: Classification,
    stats: StreamStats,
}

impl GestureStream {
    /// Create a stream after validating its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::InvalidConfig`] for out-of-range parameters.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            smoother: ProbabilitySmoother::new(config.smoothing_alpha),
            decision: DecisionGate::from_config(&config),
            change_gate: FrameChangeGate::new(config.change_threshold),
            pixel_gate: FrameChangeGate::new(config.change_threshold),
            labels: None,
            last: Classification::none(),
            stats: StreamStats::default(),
            config,
        })
    }

    /// Run one tracker frame through the pipeline.
    ///
    /// A frame without exactly 21 landmarks yields [`Classification::none`].
    /// A frame the change gate considers unchanged repeats the previous
    /// result without touching the classifier or the smoother. A frame
    /// without a hand drops the change-gate baseline, so the first frame
    /// after the hand reappears is always classified.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NotReady`] while the classifier has no
    /// weights. The frame still counts as seen and the change-gate baseline
    /// is dropped; smoothing and decision history are untouched.
    pub fn process(
        &mut self,
        classifier: &LinearClassifier,
        landmarks: &[Landmark],
    ) -> Result<Classification> {
        self.stats.frames_seen += 1;

        let Some(mut features) = normalize_landmarks(landmarks, self.config.degenerate_eps) else {
            self.stats.frames_without_hand += 1;
            self.change_gate.release();
            if self.config.reset_on_hand_loss {
                self.smoother.reset();
                self.decision.reset();
            }
            self.last = Classification::none();
            return Ok(Classification::none());
        };
        if self.config.mirror_x {
            features = mirror_x(&features);
        }

        if self.config.change_gate_enabled && !self.change_gate.should_process(features.as_slice()) {
            self.stats.frames_skipped += 1;
            return Ok(self.last.clone());
        }

        let prediction = match classifier.classify(&features) {
            Ok(p) => p,
            Err(e) => {
                // Unclassified frames must not become the comparison baseline
                self.change_gate.release();
                return Err(e);
            }
        };

        self.align_labels(&prediction.labels);
        let smoothed = self.smoother.smooth(prediction.probs.as_slice())?;
        let decision = self.decision.update(&prediction.labels, smoothed.as_slice())?;

        let result = Classification {
            label: decision.index.map(|i| prediction.labels[i].clone()),
            confidence: decision.confidence,
        };
        self.stats.frames_classified += 1;
        self.last = result.clone();
        Ok(result)
    }

    /// Camera-frame variant of the change gate.
    ///
    /// Scales 8-bit pixels to `[0, 1]` and reports whether the frame moved
    /// enough since the previous one to be worth running an image model on.
    /// The image model itself lives outside this crate.
    ///
    /// Camera frames have their own baseline and counters, so this can run
    /// alongside [`process`](Self::process) on the same stream.
    pub fn should_process_pixels(&mut self, pixels: &[u8]) -> bool {
        self.stats.pixel_frames_seen += 1;
        let process = self.pixel_gate.observe(normalize_pixels(pixels));
        if !process {
            self.stats.pixel_frames_skipped += 1;
        }
        process
    }

    /// Feed a probability vector produced by an external model.
    ///
    /// Used by the camera-frame variant: the image model's output is
    /// smoothed and gated exactly like the landmark classifier's.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::DimensionMismatch`] if `labels` and `probs`
    /// differ in length.
    pub fn process_probabilities(
        &mut self,
        labels: &Arc<[String]>,
        probs: &ProbabilityVector,
    ) -> Result<Classification> {
        if labels.len() != probs.len() {
            return Err(GestureError::dimension_mismatch(labels.len(), probs.len()));
        }
        self.align_labels(labels);
        let smoothed = self.smoother.smooth(probs.as_slice())?;
        let decision = self.decision.update(labels, smoothed.as_slice())?;
        let result = Classification {
            label: decision.index.map(|i| labels[i].clone()),
            confidence: decision.confidence,
        };
        self.stats.frames_classified += 1;
        self.last = result.clone();
        Ok(result)
    }

    /// Drop smoothing and decision history if the label set changed.
    fn align_labels(&mut self, labels: &Arc<[String]>) {
        let same = self
            .labels
            .as_ref()
            .is_some_and(|cur| Arc::ptr_eq(cur, labels) || cur[..] == labels[..]);
        if !same {
            if self.labels.is_some() {
                log::debug!("Label set changed to {:?}, resetting stream history", &labels[..]);
            }
            self.smoother.reset();
            self.decision.reset();
            self.labels = Some(Arc::clone(labels));
        }
    }

    /// End of session: free the change-gate baselines and clear all history.
    ///
    /// Counters are kept so the session can still be reported on.
    pub fn teardown(&mut self) {
        log::debug!(
            "Tearing down stream: {} frames seen, {} classified, {} skipped",
            self.stats.frames_seen,
            self.stats.frames_classified,
            self.stats.frames_skipped
        );
        self.change_gate.release();
        self.pixel_gate.release();
        self.smoother.reset();
        self.decision.reset();
        self.labels = None;
        self.last = Classification::none();
    }

    /// Clear all state and counters, ready for an unrelated stream.
    pub fn reset(&mut self) {
        self.teardown();
        self.change_gate.reset();
        self.pixel_gate.reset();
        self.stats = StreamStats::default();
    }

    /// Most recent result.
    #[must_use]
    pub const fn last(&self) -> &Classification {
        &self.last
    }

    /// Frame counters.
    #[must_use]
    pub const fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Current smoothed probabilities.
    #[must_use]
    pub fn smoothed(&self) -> Option<ProbabilityVector> {
        self.smoother.current()
    }

    /// Whether a landmark or camera-frame baseline is held.
    #[must_use]
    pub const fn has_frame_baseline(&self) -> bool {
        self.change_gate.has_baseline() || self.pixel_gate.has_baseline()
    }

    /// Stream configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
