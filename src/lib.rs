//! Hand Gesture Library
//!
//! Real-time classification of hand poses into sign-language gesture labels.
//!
//! This library takes the 21 landmarks an external hand tracker reports for
//! each video frame and turns them into a stable label-or-none output, one
//! frame at a time.
//!
//! # Pipeline
//!
//! - **Normalization**: wrist-centered, mean-radius scaled 63D feature vector
//! - **Classification**: linear softmax model over loaded weights
//! - **Smoothing**: exponential moving average of class probabilities
//! - **Decision**: confidence threshold, with optional hysteresis
//! - **Change gating**: skip frames that barely differ from the previous one
//!
//! # Quick Start
//!
//! ```
//! use hand_gesture::{GestureStream, LinearClassifier, PipelineConfig};
//!
//! let mut w = vec![vec![0.0; 63]; 2];
//! w[0][3] = 4.0;
//! let json = serde_json::json!({ "W": w, "b": [0.0, 0.0], "labels": ["A", "B"] });
//!
//! let mut classifier = LinearClassifier::new();
//! classifier.load_json_str(&json.to_string())?;
//!
//! let mut stream = GestureStream::new(PipelineConfig::default())?;
//! let mut pose = vec![[0.5, 0.5, 0.0]; 21];
//! pose[1] = [0.6, 0.5, 0.0];
//!
//! let out = stream.process(&classifier, &pose)?;
//! assert_eq!(out.label(), Some("A"));
//! # Ok::<(), hand_gesture::GestureError>(())
//! ```
//!
//! # Errors
//!
//! | Condition | Surfaces as |
//! |-----------|-------------|
//! | No hand / wrong landmark count | `None` / [`Classification::none`] |
//! | Classify before weights load | [`GestureError::NotReady`] |
//! | Malformed weight resource | [`GestureError::Format`] |
//! | Collapsed pose (zero spread) | handled internally, never an error |

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod change_gate;
pub mod classifier;
pub mod config;
pub mod decision;
pub mod error;
pub mod features;
pub mod math;
pub mod scheduler;
pub mod smoothing;
pub mod streaming;
pub mod weights;

// Re-exports for convenient access
pub use change_gate::{normalize_pixels, FrameChangeGate};
pub use classifier::{LinearClassifier, Prediction};
pub use config::{HysteresisConfig, PipelineConfig};
pub use decision::{decide, Decision, DecisionGate};
pub use error::{GestureError, Result};
pub use features::{mirror_x, normalize_landmarks, FeatureVector, Landmark};
pub use scheduler::{FrameScheduler, FrameTicket};
pub use smoothing::{ProbabilitySmoother, ProbabilityVector};
pub use streaming::{Classification, GestureStream, StreamStats};
pub use weights::WeightMatrix;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Landmarks in a full hand pose.
pub const HAND_LANDMARKS: usize = 21;

/// Feature vector dimension (21 landmarks x 3 axes).
pub const FEATURE_DIM: usize = HAND_LANDMARKS * 3;
