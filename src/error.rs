//! Error types for gesture classification.
//!
//! "No hand detected" is deliberately absent here: it is an expected
//! steady-state condition and is expressed as `Option::None` by the
//! normalizer and as [`Classification::none`](crate::Classification::none)
//! by the streaming pipeline.

use thiserror::Error;

/// Main error type for gesture classification operations.
#[derive(Error, Debug)]
pub enum GestureError {
    /// The classifier was asked to run before any weights were loaded.
    #[error("Classifier not ready: weights have not been loaded")]
    NotReady,

    /// The weight resource is malformed.
    #[error("Invalid weight format: {0}")]
    Format(String),

    /// Reading a weight resource from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Two vectors that must be index-aligned have different lengths.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for gesture classification operations.
pub type Result<T> = std::result::Result<T, GestureError>;

impl GestureError {
    /// Create a weight format error.
    #[must_use]
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create a dimension mismatch error.
    #[must_use]
    pub const fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether the caller should retry once loading has completed.
    #[must_use]
    pub const fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady)
    }
}

impl From<serde_json::Error> for GestureError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GestureError::dimension_mismatch(3, 2);
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn test_not_ready_is_distinguishable() {
        assert!(GestureError::NotReady.is_not_ready());
        assert!(!GestureError::format("missing labels").is_not_ready());
    }

    #[test]
    fn test_json_errors_become_format_errors() {
        let err: GestureError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, GestureError::Format(_)));
    }

    #[test]
    fn test_error_constructors() {
        let _ = GestureError::format("W is not an array");
        let _ = GestureError::invalid_config("alpha out of range");
        let _ = GestureError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "weights.json"));
    }
}
