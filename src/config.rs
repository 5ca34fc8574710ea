//! Tunable numerical configuration.
//!
//! Tolerances, switch-over thresholds and estimator knobs are kept here as
//! plain structs with public fields and `Default` values, so callers can
//! override any of them per distribution handle or per fit.

use crate::integrate::QuadOptions;

/// When the asymptotic tail series replaces direct integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailConfig {
    /// The series is used once the leading-term tail probability drops
    /// below this value (default: 1e-10).
    pub probability_threshold: f64,
    /// Minimum distance from ζ, in standardized units, before the series
    /// is trusted at all. Scaled up by the series' own constant when the
    /// skewness term is large (default: 1e3).
    pub min_distance: f64,
    /// Number of series terms (default: 2).
    pub terms: usize,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            probability_threshold: 1e-10,
            min_distance: 1e3,
            terms: 2,
        }
    }
}

/// Quantile solver limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileConfig {
    /// Relative tolerance on the abscissa (default: 1e-12).
    pub rel_tol: f64,
    /// Absolute tolerance on the standardized abscissa (default: 1e-14).
    pub abs_tol: f64,
    /// Maximum Newton/bisection iterations (default: 100).
    pub max_iter: usize,
    /// Maximum number of bracket doublings (default: 1024).
    pub max_bracket_expansions: usize,
}

impl Default for QuantileConfig {
    fn default() -> Self {
        Self {
            rel_tol: 1e-12,
            abs_tol: 1e-14,
            max_iter: 100,
            max_bracket_expansions: 1024,
        }
    }
}

/// Evaluation settings carried by every [`StableDist`](crate::StableDist).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StableConfig {
    /// Adaptive quadrature tolerances. `abs_tol` is in output units
    /// (density or probability).
    pub integration: QuadOptions,
    /// Tail series switch-over.
    pub tail: TailConfig,
    /// Quantile solver limits.
    pub quantile: QuantileConfig,
    /// Half-width of the band around α = 1 in which the α = 1 integral
    /// representation is used (default: 1e-5).
    pub alpha_one_band: f64,
    /// Relative distance from ζ under which the closed-form values at ζ are
    /// returned (default: 1e-10).
    pub zeta_tolerance: f64,
}

impl Default for StableConfig {
    fn default() -> Self {
        Self {
            integration: QuadOptions::default(),
            tail: TailConfig::default(),
            quantile: QuantileConfig::default(),
            alpha_one_band: 1e-5,
            zeta_tolerance: 1e-10,
        }
    }
}

/// Frequency grid for the characteristic-function regressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrequencyGrid {
    /// Grid sizes interpolated from Koutrouvelis' tables over the current
    /// α estimate and the sample size.
    #[default]
    Tabulated,
    /// Fixed number of points: `k` for the modulus regression
    /// (t = πk/25), `l` for the phase regression (u = πl/50).
    Fixed {
        /// Modulus regression points.
        k: usize,
        /// Phase regression points.
        l: usize,
    },
}

/// Row weighting for the characteristic-function regressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegressionWeighting {
    /// Ordinary least squares.
    #[default]
    Uniform,
    /// Each row weighted by the squared modulus of the empirical
    /// characteristic function at its frequency, which damps the noisy
    /// high-frequency rows.
    Modulus,
}

/// Parameter estimation settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    /// Maximum refinement iterations (default: 10).
    pub max_iter: usize,
    /// Convergence tolerance on max(|Δα|, |Δβ|, |Δσ|/σ, |Δμ|/σ)
    /// (default: 1e-3).
    pub tol: f64,
    /// Frequency grid.
    pub grid: FrequencyGrid,
    /// Regression weighting.
    pub weighting: RegressionWeighting,
    /// Minimum number of finite observations (default: 5).
    pub min_observations: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iter: 10,
            tol: 1e-3,
            grid: FrequencyGrid::Tabulated,
            weighting: RegressionWeighting::Uniform,
            min_observations: 5,
        }
    }
}
