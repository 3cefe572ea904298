//! Numerically stable softmax and argmax.

/// Convert logits into probabilities.
///
/// The maximum logit is subtracted before exponentiating so large scores do
/// not overflow. If the exponentials sum to zero (only possible with
/// non-finite input), `eps` is used as the denominator instead.
///
/// # Example
///
/// ```
/// use hand_gesture::math::softmax;
///
/// let p = softmax(&[1.0, 0.0], 1e-6);
/// assert!((p[0] - 0.7310585786).abs() < 1e-9);
/// assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn softmax(logits: &[f64], eps: f64) -> Vec<f64> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&z| (z - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    let denom = if sum > 0.0 { sum } else { eps };
    exps.into_iter().map(|e| e / denom).collect()
}

/// Index and value of the largest element.
///
/// Ties resolve to the first occurrence. Returns `None` for an empty slice.
#[must_use]
pub fn argmax(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, bv)) if v <= bv => {}
            _ => best = Some((i, v)),
        }
    }
    best
}
