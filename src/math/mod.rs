//! Mathematical utilities for gesture classification.
//!
//! This module provides:
//! - [`vector`]: affine map `W·x + b`, mean absolute difference, 3D norm
//! - [`softmax`](mod@softmax): numerically stable softmax and argmax

pub mod softmax;
pub mod vector;

pub use self::softmax::{argmax, softmax};
pub use vector::{mat_vec_bias, mean_absolute_difference, norm3};
