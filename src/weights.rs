//! Classifier parameters and their on-disk format.
//!
//! The weight resource is a JSON object with three fields:
//!
//! ```json
//! { "W": [[...63 floats...], ...], "b": [...], "labels": ["A", "B", ...] }
//! ```
//!
//! with one row of `W`, one entry of `b` and one label per class. Any
//! deviation is rejected with [`GestureError::Format`] before a
//! [`WeightMatrix`] is constructed, so a failed load can never leave a
//! half-built model behind.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GestureError, Result};
use crate::FEATURE_DIM;

/// Immutable parameters of a linear softmax classifier.
///
/// Invariant: `w.nrows() == b.len() == labels.len() >= 1` and
/// `w.ncols() == FEATURE_DIM`, all values finite.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    w: DMatrix<f64>,
    b: DVector<f64>,
    labels: Arc<[String]>,
}

/// Serialized form, field names as they appear in the resource.
#[derive(Serialize)]
struct WeightFile<'a> {
    #[serde(rename = "W")]
    w: Vec<Vec<f64>>,
    b: Vec<f64>,
    labels: &'a [String],
}

impl WeightMatrix {
    /// Build a weight matrix from rows, biases and labels.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Format`] if the shapes disagree, a row is not
    /// [`FEATURE_DIM`] wide, a value is not finite, or there are no classes.
    pub fn new(w: Vec<Vec<f64>>, b: Vec<f64>, labels: Vec<String>) -> Result<Self> {
        let n_classes = labels.len();
        if n_classes == 0 {
            return Err(GestureError::format("labels must not be empty"));
        }
        if w.len() != n_classes {
            return Err(GestureError::format(format!(
                "W has {} rows but there are {n_classes} labels",
                w.len()
            )));
        }
        if b.len() != n_classes {
            return Err(GestureError::format(format!(
                "b has {} entries but there are {n_classes} labels",
                b.len()
            )));
        }
        for (i, row) in w.iter().enumerate() {
            if row.len() != FEATURE_DIM {
                return Err(GestureError::format(format!(
                    "W row {i} has {} columns, expected {FEATURE_DIM}",
                    row.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(GestureError::format(format!("W row {i} contains a non-finite value")));
            }
        }
        if b.iter().any(|v| !v.is_finite()) {
            return Err(GestureError::format("b contains a non-finite value"));
        }

        let w = DMatrix::from_row_iterator(n_classes, FEATURE_DIM, w.into_iter().flatten());
        Ok(Self {
            w,
            b: DVector::from_vec(b),
            labels: labels.into(),
        })
    }

    /// Uniform model: all weights and biases zero.
    ///
    /// Every input classifies to `1 / n` per label. Useful for wiring up the
    /// pipeline before a trained model exists.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Format`] if `labels` is empty.
    pub fn zeros<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Result<Self> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let n = labels.len();
        Self::new(vec![vec![0.0; FEATURE_DIM]; n], vec![0.0; n], labels)
    }

    /// Parse a weight resource from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Format`] for invalid JSON or a malformed shape.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    /// Parse a weight resource from a reader.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Format`] for invalid JSON or a malformed shape.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_json_value(&value)
    }

    /// Read a weight resource from a file.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Io`] if the file cannot be opened, otherwise
    /// as [`from_reader`](Self::from_reader).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Validate a parsed JSON document field by field.
    ///
    /// Field-level checks give precise messages ("labels is missing") where
    /// a typed deserialize would only report the first mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Format`] if any field is missing or not an
    /// array of the right element type.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| GestureError::format("weight resource must be a JSON object"))?;

        let w_rows = array_field(obj, "W")?
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let row = row
                    .as_array()
                    .ok_or_else(|| GestureError::format(format!("W row {i} is not an array")))?;
                numbers(row, &format!("W row {i}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let b = numbers(array_field(obj, "b")?, "b")?;

        let labels = array_field(obj, "labels")?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| GestureError::format(format!("labels[{i}] is not a string")))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(w_rows, b, labels)
    }

    /// Serialize to the JSON resource format.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures as [`GestureError::Format`].
    pub fn to_json_string(&self) -> Result<String> {
        let file = WeightFile {
            w: self
                .w
                .row_iter()
                .map(|row| row.iter().copied().collect())
                .collect(),
            b: self.b.iter().copied().collect(),
            labels: &self.labels,
        };
        Ok(serde_json::to_string(&file)?)
    }

    /// Number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.labels.len()
    }

    /// Class labels in row order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Shared handle to the label list.
    #[must_use]
    pub fn shared_labels(&self) -> Arc<[String]> {
        Arc::clone(&self.labels)
    }

    /// Weight matrix, `n_classes x FEATURE_DIM`.
    #[must_use]
    pub const fn weights(&self) -> &DMatrix<f64> {
        &self.w
    }

    /// Bias vector, `n_classes` long.
    #[must_use]
    pub const fn bias(&self) -> &DVector<f64> {
        &self.b
    }
}

fn array_field<'a>(obj: &'a serde_json::Map<String, Value>, name: &str) -> Result<&'a Vec<Value>> {
    match obj.get(name) {
        None => Err(GestureError::format(format!("{name} is missing"))),
        Some(v) => v
            .as_array()
            .ok_or_else(|| GestureError::format(format!("{name} is not an array"))),
    }
}

fn numbers(values: &[Value], context: &str) -> Result<Vec<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(j, v)| {
            v.as_f64()
                .ok_or_else(|| GestureError::format(format!("{context}[{j}] is not a number")))
        })
        .collect()
}

/// Deserializing goes through the same validation as [`WeightMatrix::from_json_value`].
impl<'de> Deserialize<'de> for WeightMatrix {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json_value(&value).map_err(serde::de::Error::custom)
    }
}
