//! Linear softmax classifier over hand-pose features.
//!
//! The classifier owns its weights explicitly instead of reading a global:
//! construct one, [`load`](LinearClassifier::load) weights into it, then call
//! [`classify`](LinearClassifier::classify) from any number of streams. Clones
//! share the same immutable [`WeightMatrix`] through an [`Arc`], so reads
//! never lock.

use std::path::Path;
use std::sync::Arc;

use crate::error::{GestureError, Result};
use crate::features::FeatureVector;
use crate::math::{mat_vec_bias, softmax};
use crate::smoothing::ProbabilityVector;
use crate::weights::WeightMatrix;

/// Output of one classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Labels, index-aligned with `probs`.
    pub labels: Arc<[String]>,
    /// Softmax probabilities.
    pub probs: ProbabilityVector,
}

impl Prediction {
    /// Most probable label and its probability (first one wins ties).
    #[must_use]
    pub fn best(&self) -> Option<(&str, f64)> {
        self.probs
            .argmax()
            .map(|(i, p)| (self.labels[i].as_str(), p))
    }
}

/// Linear classifier `softmax(W·x + b)`.
///
/// # Example
///
/// ```
/// use hand_gesture::{FeatureVector, LinearClassifier, WeightMatrix, GestureError};
///
/// let mut clf = LinearClassifier::new();
/// let x = FeatureVector::from_array([0.0; 63]);
/// assert!(matches!(clf.classify(&x), Err(GestureError::NotReady)));
///
/// clf.load(WeightMatrix::zeros(["A", "B"])?);
/// let pred = clf.classify(&x)?;
/// assert!((pred.probs.get(0).unwrap() - 0.5).abs() < 1e-12);
/// # Ok::<(), hand_gesture::GestureError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    weights: Option<Arc<WeightMatrix>>,
    softmax_eps: f64,
}

impl LinearClassifier {
    /// Create a classifier with no weights loaded.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            weights: None,
            softmax_eps: 1e-6,
        }
    }

    /// Create a classifier with weights already loaded.
    #[must_use]
    pub fn with_weights(weights: WeightMatrix) -> Self {
        let mut clf = Self::new();
        clf.load(weights);
        clf
    }

    /// Set the softmax denominator floor.
    ///
    /// The floor belongs to the model rather than to a stream, so every
    /// stream sharing this classifier sees the same probabilities.
    #[must_use]
    pub const fn with_softmax_eps(mut self, eps: f64) -> Self {
        self.softmax_eps = eps;
        self
    }

    /// Softmax denominator floor.
    #[must_use]
    pub const fn softmax_eps(&self) -> f64 {
        self.softmax_eps
    }

    /// Adopt a validated weight matrix, replacing any previous one.
    pub fn load(&mut self, weights: WeightMatrix) {
        log::info!(
            "Loaded classifier weights: {} classes {:?}",
            weights.n_classes(),
            weights.labels()
        );
        self.weights = Some(Arc::new(weights));
    }

    /// Adopt weights already shared with another classifier.
    pub fn load_shared(&mut self, weights: Arc<WeightMatrix>) {
        log::debug!("Sharing classifier weights: {} classes", weights.n_classes());
        self.weights = Some(weights);
    }

    /// Parse and adopt a JSON weight resource.
    ///
    /// On failure the previously loaded weights, if any, stay in effect.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Format`] if the resource is malformed.
    pub fn load_json_str(&mut self, json: &str) -> Result<()> {
        let weights = WeightMatrix::from_json_str(json).map_err(|e| {
            log::warn!("Rejected weight resource: {e}");
            e
        })?;
        self.load(weights);
        Ok(())
    }

    /// Read and adopt a JSON weight file.
    ///
    /// On failure the previously loaded weights, if any, stay in effect.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Io`] or [`GestureError::Format`].
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let weights = WeightMatrix::from_path(path).map_err(|e| {
            log::warn!("Rejected weight file {}: {e}", path.display());
            e
        })?;
        self.load(weights);
        Ok(())
    }

    /// Drop the loaded weights.
    pub fn unload(&mut self) {
        log::debug!("Unloading classifier weights");
        self.weights = None;
    }

    /// Whether weights are loaded.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.weights.is_some()
    }

    /// Shared handle to the loaded weights.
    #[must_use]
    pub fn weights(&self) -> Option<Arc<WeightMatrix>> {
        self.weights.clone()
    }

    /// Labels of the loaded model.
    #[must_use]
    pub fn labels(&self) -> Option<&[String]> {
        self.weights.as_deref().map(WeightMatrix::labels)
    }

    fn loaded(&self) -> Result<&WeightMatrix> {
        self.weights.as_deref().ok_or(GestureError::NotReady)
    }

    /// Pre-softmax scores `W·x + b`.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NotReady`] if no weights are loaded.
    pub fn logits(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let wm = self.loaded()?;
        let z = mat_vec_bias(wm.weights(), features.as_slice(), wm.bias());
        Ok(z.iter().copied().collect())
    }

    /// Classify one feature vector.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NotReady`] if no weights are loaded. Callers
    /// should treat this as "still loading", not as a fault.
    pub fn classify(&self, features: &FeatureVector) -> Result<Prediction> {
        let wm = self.loaded()?;
        let z = mat_vec_bias(wm.weights(), features.as_slice(), wm.bias());
        let probs = softmax(z.as_slice(), self.softmax_eps);
        log::trace!("classify: logits {:?} -> probs {:?}", z.as_slice(), probs);
        Ok(Prediction {
            labels: wm.shared_labels(),
            probs: ProbabilityVector::new(probs),
        })
    }
}

impl Default for LinearClassifier {
    fn default() -> Self {
        Self::new()
    }
}
