//! Parameter estimation from a sample.
//!
//! [`fit`] runs the two stages in sequence: McCulloch's quantile estimator
//! for a starting point, then Koutrouvelis' characteristic-function
//! regressions to refine it. Both stages are also public on their own.

mod koutrouvelis;
mod mcculloch;
mod regression;

pub use koutrouvelis::refine;
pub use mcculloch::mcculloch_estimate;

use tracing::debug;

use crate::config::FitConfig;
use crate::error::{FitStatus, Result, StableError};
use crate::params::StableParams;

/// Outcome of a refinement run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    /// Final estimate.
    pub params: StableParams,
    /// Whether the tolerance was met.
    pub status: FitStatus,
    /// Iterations performed.
    pub iterations: usize,
    /// Parameter change in the last iteration,
    /// max(|Δα|, |Δβ|, |Δσ|/σ, |Δμ₀|/σ).
    pub change: f64,
}

/// Estimates stable parameters from `data`.
///
/// Non-finite observations are ignored. The result is in the
/// 0-parameterization.
///
/// # Errors
/// - [`StableError::InsufficientData`] with fewer than
///   `config.min_observations` (and at least five) finite values.
/// - [`StableError::DegenerateSample`] when the sample quantiles coincide.
///
/// # Examples
/// ```
/// use u_stable::config::FitConfig;
/// use u_stable::fit::fit;
/// use u_stable::params::{Parameterization, StableParams};
/// use u_stable::random::{create_rng, StableSampler};
///
/// let truth = StableParams::new(1.6, 0.0, 1.0, 0.0, Parameterization::Zero).unwrap();
/// let data = StableSampler::new(&truth, 1e-5).sample_n(&mut create_rng(1), 5_000);
/// let report = fit(&data, &FitConfig::default()).unwrap();
/// assert!((report.params.alpha() - 1.6).abs() < 0.2);
/// ```
pub fn fit(data: &[f64], config: &FitConfig) -> Result<FitReport> {
    let finite: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    let needed = config.min_observations.max(mcculloch::MIN_OBSERVATIONS);
    if finite.len() < needed {
        return Err(StableError::InsufficientData {
            needed,
            got: finite.len(),
        });
    }

    let initial = mcculloch_estimate(&finite)?;
    debug!(
        alpha = initial.alpha(),
        beta = initial.beta(),
        sigma = initial.sigma(),
        mu_0 = initial.mu_0(),
        "quantile estimate"
    );
    refine(&finite, &initial, config)
}
