//! McCulloch's quantile estimator.
//!
//! # Algorithm
//! From the sample quantiles q₀.₀₅, q₀.₂₅, q₀.₅, q₀.₇₅, q₀.₉₅:
//!
//! ```text
//! ν_α = (q₀.₉₅ − q₀.₀₅) / (q₀.₇₅ − q₀.₂₅)
//! ν_β = (q₀.₉₅ + q₀.₀₅ − 2q₀.₅) / (q₀.₉₅ − q₀.₀₅)
//! ```
//!
//! α and β are read from tables indexed by (ν_α, |ν_β|), σ from the
//! interquartile range divided by a tabulated ν_c(α, β), and the S0
//! location from the median corrected by a tabulated ν_ζ(α, β). All table
//! lookups are bilinear with clamping at the edges.
//!
//! Reference: McCulloch (1986), "Simple consistent estimators of stable
//! distribution parameters", *Communications in Statistics. Simulation and
//! Computation* 15(4), pp. 1109–1136.

use crate::error::{Result, StableError};
use crate::params::{Parameterization, StableParams};
use crate::stats::{quantile_sorted, sorted_finite};

/// The five quantiles the estimator needs.
pub(crate) const MIN_OBSERVATIONS: usize = 5;

/// Smallest ν_α the tables cover; below it the sample looks Gaussian.
const NU_ALPHA_MIN: f64 = 2.439;

const NU_A: [f64; 15] = [
    2.439, 2.5, 2.6, 2.7, 2.8, 3.0, 3.2, 3.5, 4.0, 5.0, 6.0, 8.0, 10.0, 15.0, 25.0,
];
const NU_B: [f64; 7] = [0.0, 0.1, 0.2, 0.3, 0.5, 0.7, 1.0];

/// α(ν_α, ν_β)
const ALPHA_TABLE: [[f64; 7]; 15] = [
    [2.000, 2.000, 2.000, 2.000, 2.000, 2.000, 2.000],
    [1.916, 1.924, 1.924, 1.924, 1.924, 1.924, 1.924],
    [1.808, 1.813, 1.829, 1.829, 1.829, 1.829, 1.829],
    [1.729, 1.730, 1.737, 1.745, 1.745, 1.745, 1.745],
    [1.664, 1.663, 1.663, 1.668, 1.676, 1.676, 1.676],
    [1.563, 1.560, 1.553, 1.548, 1.547, 1.547, 1.547],
    [1.484, 1.480, 1.471, 1.460, 1.448, 1.438, 1.438],
    [1.391, 1.386, 1.378, 1.364, 1.337, 1.318, 1.318],
    [1.279, 1.273, 1.266, 1.250, 1.210, 1.184, 1.150],
    [1.128, 1.121, 1.114, 1.101, 1.067, 1.027, 0.973],
    [1.029, 1.021, 1.014, 1.004, 0.974, 0.935, 0.874],
    [0.896, 0.892, 0.884, 0.883, 0.855, 0.823, 0.769],
    [0.818, 0.812, 0.806, 0.801, 0.780, 0.756, 0.691],
    [0.698, 0.695, 0.692, 0.689, 0.676, 0.656, 0.597],
    [0.593, 0.590, 0.588, 0.586, 0.579, 0.563, 0.513],
];

/// β(ν_α, ν_β)
const BETA_TABLE: [[f64; 7]; 15] = [
    [0.0, 2.160, 1.000, 1.000, 1.000, 1.000, 1.000],
    [0.0, 1.592, 3.390, 1.000, 1.000, 1.000, 1.000],
    [0.0, 0.759, 1.800, 1.000, 1.000, 1.000, 1.000],
    [0.0, 0.482, 1.048, 1.694, 1.000, 1.000, 1.000],
    [0.0, 0.360, 0.760, 1.232, 2.229, 1.000, 1.000],
    [0.0, 0.253, 0.518, 0.823, 1.575, 1.000, 1.000],
    [0.0, 0.203, 0.410, 0.632, 1.244, 1.906, 1.000],
    [0.0, 0.165, 0.332, 0.499, 0.943, 1.560, 1.000],
    [0.0, 0.136, 0.271, 0.404, 0.689, 1.230, 2.195],
    [0.0, 0.109, 0.216, 0.323, 0.539, 0.827, 1.917],
    [0.0, 0.096, 0.190, 0.284, 0.472, 0.693, 1.759],
    [0.0, 0.082, 0.163, 0.243, 0.412, 0.601, 1.596],
    [0.0, 0.074, 0.147, 0.220, 0.377, 0.546, 1.482],
    [0.0, 0.064, 0.128, 0.191, 0.330, 0.478, 1.362],
    [0.0, 0.056, 0.112, 0.167, 0.285, 0.428, 1.274],
];

const ALPHA_ROWS: [f64; 16] = [
    2.0, 1.9, 1.8, 1.7, 1.6, 1.5, 1.4, 1.3, 1.2, 1.1, 1.0, 0.9, 0.8, 0.7, 0.6, 0.5,
];
const BETA_COLS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// ν_c(α, β) = (q₀.₇₅ − q₀.₂₅)/σ
const SCALE_TABLE: [[f64; 5]; 16] = [
    [1.908, 1.908, 1.908, 1.908, 1.908],
    [1.914, 1.915, 1.916, 1.918, 1.921],
    [1.921, 1.922, 1.927, 1.936, 1.947],
    [1.927, 1.930, 1.943, 1.961, 1.987],
    [1.933, 1.940, 1.962, 1.997, 2.043],
    [1.939, 1.952, 1.988, 2.045, 2.116],
    [1.946, 1.967, 2.022, 2.106, 2.211],
    [1.955, 1.984, 2.067, 2.188, 2.333],
    [1.965, 2.007, 2.125, 2.294, 2.491],
    [1.980, 2.040, 2.205, 2.435, 2.696],
    [2.000, 2.085, 2.311, 2.624, 2.973],
    [2.040, 2.149, 2.461, 2.886, 3.356],
    [2.098, 2.244, 2.676, 3.265, 3.912],
    [2.189, 2.392, 3.004, 3.844, 4.775],
    [2.337, 2.634, 3.542, 4.808, 6.247],
    [2.588, 3.073, 4.534, 6.636, 9.144],
];

/// ν_ζ(α, β) = (ζ − q₀.₅)/σ for β ≥ 0
const LOCATION_TABLE: [[f64; 5]; 16] = [
    [0.0, 0.000, 0.000, 0.000, 0.000],
    [0.0, -0.017, -0.032, -0.049, -0.064],
    [0.0, -0.030, -0.061, -0.092, -0.123],
    [0.0, -0.043, -0.088, -0.132, -0.179],
    [0.0, -0.056, -0.111, -0.170, -0.232],
    [0.0, -0.066, -0.134, -0.206, -0.283],
    [0.0, -0.075, -0.154, -0.241, -0.335],
    [0.0, -0.084, -0.173, -0.276, -0.390],
    [0.0, -0.090, -0.192, -0.310, -0.447],
    [0.0, -0.095, -0.208, -0.346, -0.508],
    [0.0, -0.098, -0.223, -0.380, -0.576],
    [0.0, -0.099, -0.237, -0.424, -0.652],
    [0.0, -0.096, -0.250, -0.469, -0.742],
    [0.0, -0.089, -0.262, -0.520, -0.853],
    [0.0, -0.078, -0.272, -0.581, -0.997],
    [0.0, -0.061, -0.279, -0.659, -1.198],
];

/// Cell index and fraction of `v` in a monotone `grid`, clamped to its
/// range. Works for ascending and descending grids.
pub(crate) fn locate(grid: &[f64], v: f64) -> (usize, f64) {
    let n = grid.len() - 1;
    let descending = grid[0] > grid[n];
    let at = |i: usize| if descending { grid[n - i] } else { grid[i] };
    let v = v.clamp(at(0), at(n));
    let mut i = 0;
    while i + 1 < n && v > at(i + 1) {
        i += 1;
    }
    let frac = (v - at(i)) / (at(i + 1) - at(i));
    if descending {
        (n - i - 1, 1.0 - frac)
    } else {
        (i, frac)
    }
}

/// Bilinear interpolation in `table[row][col]`.
pub(crate) fn bilinear<const C: usize>(
    table: &[[f64; C]],
    rows: &[f64],
    cols: &[f64],
    r: f64,
    c: f64,
) -> f64 {
    let (i, fi) = locate(rows, r);
    let (j, fj) = locate(cols, c);
    table[i][j] * (1.0 - fi) * (1.0 - fj)
        + table[i + 1][j] * fi * (1.0 - fj)
        + table[i][j + 1] * (1.0 - fi) * fj
        + table[i + 1][j + 1] * fi * fj
}

/// Quantile-based estimate of (α, β, σ, μ₀).
///
/// Non-finite observations are ignored. The result is in the
/// 0-parameterization.
///
/// # Errors
/// - [`StableError::InsufficientData`] with fewer than five finite values.
/// - [`StableError::DegenerateSample`] when q₀.₇₅ = q₀.₂₅ or q₀.₉₅ = q₀.₀₅.
///
/// # Examples
/// ```
/// use u_stable::fit::mcculloch_estimate;
/// let data: Vec<f64> = (1..=999).map(|i| ((i as f64) / 1000.0 - 0.5) * 3.0).collect();
/// let p = mcculloch_estimate(&data).unwrap();
/// // A uniform sample has light tails: the estimate sits at α = 2.
/// assert_eq!(p.alpha(), 2.0);
/// ```
pub fn mcculloch_estimate(data: &[f64]) -> Result<StableParams> {
    let sorted = sorted_finite(data);
    if sorted.len() < MIN_OBSERVATIONS {
        return Err(StableError::InsufficientData {
            needed: MIN_OBSERVATIONS,
            got: sorted.len(),
        });
    }
    let q = |p: f64| quantile_sorted(&sorted, p).ok_or(StableError::DegenerateSample);
    let (q05, q25, q50, q75, q95) = (q(0.05)?, q(0.25)?, q(0.5)?, q(0.75)?, q(0.95)?);
    if q75 <= q25 || q95 <= q05 {
        return Err(StableError::DegenerateSample);
    }

    let nu_alpha = (q95 - q05) / (q75 - q25);
    let nu_beta = (q95 + q05 - 2.0 * q50) / (q95 - q05);

    let (alpha, beta) = if nu_alpha >= NU_ALPHA_MIN {
        let alpha = bilinear(&ALPHA_TABLE, &NU_A, &NU_B, nu_alpha, nu_beta.abs());
        let beta = bilinear(&BETA_TABLE, &NU_A, &NU_B, nu_alpha, nu_beta.abs());
        (alpha.clamp(0.5, 2.0), (nu_beta.signum() * beta).clamp(-1.0, 1.0))
    } else {
        let beta = if nu_beta == 0.0 { 0.0 } else { nu_beta.signum() };
        (2.0, beta)
    };

    let sigma = (q75 - q25) / bilinear(&SCALE_TABLE, &ALPHA_ROWS, &BETA_COLS, alpha, beta.abs());
    let shift = if beta == 0.0 {
        0.0
    } else {
        beta.signum() * bilinear(&LOCATION_TABLE, &ALPHA_ROWS, &BETA_COLS, alpha, beta.abs())
    };
    StableParams::new(alpha, beta, sigma, q50 + sigma * shift, Parameterization::Zero)
}
