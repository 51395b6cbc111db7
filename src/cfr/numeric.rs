//! Numeric helpers shared by the regret tables and the CFR driver.
//!
//! Every normalization here treats a non-positive total as "no information"
//! and falls back to the uniform distribution, so callers never divide by
//! zero or by a negative sum.

use rand::Rng;

/// Normalize non-negative weights into a probability distribution.
///
/// Positive weights are divided by the total in log space; non-positive
/// weights map to zero. If the total is not positive the result is uniform.
///
/// # Example
/// ```
/// use perturbed_cfr::cfr::numeric::normalized;
///
/// let p = normalized(&[1.0, 3.0]);
/// assert!((p[0] - 0.25).abs() < 1e-12 && (p[1] - 0.75).abs() < 1e-12);
/// assert_eq!(normalized(&[0.0, 0.0]), vec![0.5, 0.5]);
/// ```
pub fn normalized(weights: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; weights.len()];
    normalize_into(weights, &mut out);
    out
}

/// Normalize `from` into `to`, which must have the same length.
pub fn normalize_into(from: &[f64], to: &mut [f64]) {
    debug_assert_eq!(from.len(), to.len());

    let total: f64 = from.iter().sum();
    if total > 0.0 {
        let log_total = total.ln();
        for (slot, &weight) in to.iter_mut().zip(from) {
            *slot = if weight > 0.0 {
                (weight.ln() - log_total).exp()
            } else {
                0.0
            };
        }
    } else {
        uniform_into(to);
    }
}

/// Fill `to` with the uniform distribution over its length.
pub fn uniform_into(to: &mut [f64]) {
    let p = 1.0 / to.len() as f64;
    to.iter_mut().for_each(|slot| *slot = p);
}

/// Regret matching: play each action proportionally to its positive regret.
///
/// Falls back to uniform when no regret is positive.
pub fn regret_matching(regrets: &[f64]) -> Vec<f64> {
    let positive: Vec<f64> = regrets.iter().map(|&r| r.max(0.0)).collect();
    normalized(&positive)
}

/// Flip a coin that lands `true` with probability `prob_true`.
///
/// The probability is clamped into `[0, 1]`.
pub fn flip_coin<R: Rng + ?Sized>(prob_true: f64, rng: &mut R) -> bool {
    rng.gen_bool(prob_true.clamp(0.0, 1.0))
}

/// Inner product of two equally long vectors.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| x * y).sum()
}
