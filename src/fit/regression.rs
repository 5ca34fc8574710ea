//! Two-regressor weighted least squares.
//!
//! Both characteristic-function regressions have exactly two unknowns, so
//! the 2×2 normal equations are solved in closed form.

use crate::stats::kahan_sum;

/// Solves min Σ wᵢ (yᵢ − xᵢ·b)² for `b ∈ ℝ²`.
///
/// Add an intercept by putting 1 in the first column of every row.
///
/// # Returns
/// - `None` if fewer than two rows are given, the lengths disagree, or the
///   design is (numerically) singular.
pub(crate) fn least_squares_2(rows: &[[f64; 2]], y: &[f64], weights: &[f64]) -> Option<[f64; 2]> {
    if rows.len() < 2 || rows.len() != y.len() || rows.len() != weights.len() {
        return None;
    }

    let weighted = || rows.iter().zip(weights).zip(y);
    let s00 = kahan_sum(weighted().map(|((r, w), _)| w * r[0] * r[0]));
    let s01 = kahan_sum(weighted().map(|((r, w), _)| w * r[0] * r[1]));
    let s11 = kahan_sum(weighted().map(|((r, w), _)| w * r[1] * r[1]));
    let t0 = kahan_sum(weighted().map(|((r, w), v)| w * r[0] * v));
    let t1 = kahan_sum(weighted().map(|((r, w), v)| w * r[1] * v));

    let det = s00 * s11 - s01 * s01;
    if !(det.abs() > 1e-12 * s00 * s11) {
        return None;
    }
    let b0 = (t0 * s11 - s01 * t1) / det;
    let b1 = (s00 * t1 - s01 * t0) / det;
    (b0.is_finite() && b1.is_finite()).then_some([b0, b1])
}
