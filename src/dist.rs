//! The distribution handle.
//!
//! [`StableDist`] pairs validated [`StableParams`] with the evaluation
//! settings and the cached per-shape constants, and exposes density,
//! distribution function, quantiles, sampling and fitting. Batch methods
//! return one result per input, in input order.

use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{FitConfig, StableConfig};
use crate::cumulative::standard_probabilities;
use crate::density::{standard_density, Estimate};
use crate::error::{FitStatus, Result};
use crate::fit::{self, FitReport};
use crate::kernel::Kernel;
use crate::params::{Parameterization, StableParams};
use crate::quantile::standard_quantile;
use crate::random::{create_rng, StableSampler};
use crate::stats::kahan_sum;

/// An α-stable distribution S(α, β, σ, μ).
///
/// # Examples
/// ```
/// use u_stable::{Parameterization, StableDist};
///
/// let dist = StableDist::new(1.5, 0.5, 1.0, 0.0, Parameterization::Zero).unwrap();
/// let f = dist.pdf(&[-1.0, 0.4, 1.2]).unwrap();
/// assert!((f[0] - 0.2081944355431563).abs() < 1e-9);
///
/// let x = dist.quantile_point(0.9).unwrap();
/// assert!((dist.cdf_point(x).unwrap() - 0.9).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StableDist {
    params: StableParams,
    kernel: Kernel,
}

impl StableDist {
    /// Validates the parameters and prepares the per-shape constants.
    ///
    /// # Errors
    /// [`StableError::InvalidParameter`](crate::StableError::InvalidParameter)
    /// when a parameter is outside its domain.
    pub fn new(
        alpha: f64,
        beta: f64,
        sigma: f64,
        mu: f64,
        parameterization: Parameterization,
    ) -> Result<Self> {
        let params = StableParams::new(alpha, beta, sigma, mu, parameterization)?;
        Ok(Self::from_params(params))
    }

    /// Like [`StableDist::new`] with the parameterization as its integer tag.
    pub fn from_tag(alpha: f64, beta: f64, sigma: f64, mu: f64, tag: i32) -> Result<Self> {
        let params = StableParams::from_tag(alpha, beta, sigma, mu, tag)?;
        Ok(Self::from_params(params))
    }

    /// Builds a handle with default settings.
    pub fn from_params(params: StableParams) -> Self {
        Self::with_config(params, StableConfig::default())
    }

    /// Builds a handle with custom settings.
    pub fn with_config(params: StableParams, config: StableConfig) -> Self {
        let kernel = Kernel::new(params.alpha(), params.beta(), config);
        Self { params, kernel }
    }

    pub fn params(&self) -> &StableParams {
        &self.params
    }

    pub fn config(&self) -> &StableConfig {
        &self.kernel.config
    }

    // ------------------------------------------------------------------
    // Density
    // ------------------------------------------------------------------

    fn density_estimate(&self, x: f64) -> Result<Estimate> {
        let sigma = self.params.sigma();
        Ok(standard_density(&self.kernel, self.params.standardize(x))?.scale(1.0 / sigma))
    }

    /// Density at `x`.
    ///
    /// # Errors
    /// [`StableError::IntegrationFailure`](crate::StableError::IntegrationFailure)
    /// when quadrature fails and no tail approximation covers `x`.
    pub fn pdf_point(&self, x: f64) -> Result<f64> {
        Ok(self.density_estimate(x)?.value)
    }

    /// Densities at every `x`.
    pub fn pdf(&self, xs: &[f64]) -> Result<Vec<f64>> {
        xs.iter().map(|&x| self.pdf_point(x)).collect()
    }

    /// Densities with their absolute error estimates.
    pub fn pdf_with_error(&self, xs: &[f64]) -> Result<Vec<Estimate>> {
        xs.iter().map(|&x| self.density_estimate(x)).collect()
    }

    // ------------------------------------------------------------------
    // Distribution function
    // ------------------------------------------------------------------

    /// P(X ≤ x).
    pub fn cdf_point(&self, x: f64) -> Result<f64> {
        Ok(standard_probabilities(&self.kernel, self.params.standardize(x))?.lower)
    }

    /// P(X ≤ x) at every `x`.
    pub fn cdf(&self, xs: &[f64]) -> Result<Vec<f64>> {
        xs.iter().map(|&x| self.cdf_point(x)).collect()
    }

    /// P(X ≤ x) with absolute error estimates.
    pub fn cdf_with_error(&self, xs: &[f64]) -> Result<Vec<Estimate>> {
        xs.iter()
            .map(|&x| {
                let p = standard_probabilities(&self.kernel, self.params.standardize(x))?;
                Ok(Estimate {
                    value: p.lower,
                    abs_error: p.abs_error,
                })
            })
            .collect()
    }

    /// P(X > x), computed directly rather than as 1 − F(x).
    ///
    /// # Examples
    /// ```
    /// use u_stable::{Parameterization, StableDist};
    /// let dist = StableDist::new(1.5, 0.0, 1.0, 0.0, Parameterization::Zero).unwrap();
    /// assert_eq!(dist.cdf_point(1e12).unwrap(), 1.0);
    /// assert!(dist.ccdf_point(1e12).unwrap() > 0.0);
    /// ```
    pub fn ccdf_point(&self, x: f64) -> Result<f64> {
        Ok(standard_probabilities(&self.kernel, self.params.standardize(x))?.upper)
    }

    /// P(X > x) at every `x`.
    pub fn ccdf(&self, xs: &[f64]) -> Result<Vec<f64>> {
        xs.iter().map(|&x| self.ccdf_point(x)).collect()
    }

    // ------------------------------------------------------------------
    // Quantiles
    // ------------------------------------------------------------------

    /// The `q`-quantile. `q = 0` and `q = 1` give the support limits.
    ///
    /// # Errors
    /// - [`StableError::InvalidProbability`](crate::StableError::InvalidProbability)
    ///   when `q` is outside `[0, 1]`.
    /// - [`StableError::ConvergenceFailure`](crate::StableError::ConvergenceFailure)
    ///   when the root cannot be bracketed or refined within the limits of
    ///   [`QuantileConfig`](crate::config::QuantileConfig).
    pub fn quantile_point(&self, q: f64) -> Result<f64> {
        Ok(self.params.destandardize(standard_quantile(&self.kernel, q)?))
    }

    /// Quantiles at every level in `qs`.
    pub fn quantile(&self, qs: &[f64]) -> Result<Vec<f64>> {
        qs.iter().map(|&q| self.quantile_point(q)).collect()
    }

    // ------------------------------------------------------------------
    // Sampling
    // ------------------------------------------------------------------

    fn sampler(&self) -> StableSampler {
        StableSampler::new(&self.params, self.kernel.config.alpha_one_band)
    }

    /// `n` draws from a generator seeded with `seed`. Identical inputs give
    /// bit-identical output on every platform.
    pub fn sample(&self, n: usize, seed: u64) -> Vec<f64> {
        self.sampler().sample_n(&mut create_rng(seed), n)
    }

    /// `n` draws from a caller-owned generator.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<f64> {
        self.sampler().sample_n(rng, n)
    }

    /// One draw from a caller-owned generator.
    pub fn sample_point<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.sampler().sample(rng)
    }

    // ------------------------------------------------------------------
    // Estimation
    // ------------------------------------------------------------------

    /// Σ ln f(xᵢ). Returns −∞ when any observation has zero density.
    pub fn log_likelihood(&self, data: &[f64]) -> Result<f64> {
        let logs = data
            .iter()
            .map(|&x| self.pdf_point(x).map(f64::ln))
            .collect::<Result<Vec<f64>>>()?;
        if logs.iter().any(|l| *l == f64::NEG_INFINITY) {
            return Ok(f64::NEG_INFINITY);
        }
        Ok(kahan_sum(logs))
    }

    /// Replaces the parameters with estimates from `data`, using the
    /// default [`FitConfig`]. The parameterization tag is kept.
    ///
    /// Reaching the iteration cap is not an error: the last estimate is
    /// installed and [`FitStatus::MaxIterationsReached`] returned.
    ///
    /// # Errors
    /// [`StableError::InsufficientData`](crate::StableError::InsufficientData)
    /// or [`StableError::DegenerateSample`](crate::StableError::DegenerateSample);
    /// the handle is left unchanged.
    pub fn fit(&mut self, data: &[f64]) -> Result<FitStatus> {
        Ok(self.fit_with(data, &FitConfig::default())?.status)
    }

    /// [`StableDist::fit`] with explicit settings, returning the full report.
    pub fn fit_with(&mut self, data: &[f64], config: &FitConfig) -> Result<FitReport> {
        let report = fit::fit(data, config)?;
        let params = report
            .params
            .with_parameterization(self.params.parameterization());
        *self = Self::with_config(params, self.kernel.config);
        Ok(FitReport { params, ..report })
    }

    // ------------------------------------------------------------------
    // Parallel batches
    // ------------------------------------------------------------------

    /// [`StableDist::pdf`] evaluated across the rayon thread pool.
    #[cfg(feature = "parallel")]
    pub fn pdf_par(&self, xs: &[f64]) -> Result<Vec<f64>> {
        xs.par_iter().map(|&x| self.pdf_point(x)).collect()
    }

    /// [`StableDist::cdf`] evaluated across the rayon thread pool.
    #[cfg(feature = "parallel")]
    pub fn cdf_par(&self, xs: &[f64]) -> Result<Vec<f64>> {
        xs.par_iter().map(|&x| self.cdf_point(x)).collect()
    }

    /// [`StableDist::quantile`] evaluated across the rayon thread pool.
    #[cfg(feature = "parallel")]
    pub fn quantile_par(&self, qs: &[f64]) -> Result<Vec<f64>> {
        qs.par_iter().map(|&q| self.quantile_point(q)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StableError;
    use std::f64::consts::PI;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_reference_cdf_scenario() {
        let dist = StableDist::from_tag(
            1.3278285879842862,
            0.0816835526225623,
            0.0006409442772706084,
            -0.0000252748167384907,
            1,
        )
        .unwrap();
        let p = dist.cdf_point(-0.0097).unwrap();
        assert!((p - 0.006362143180580383).abs() < 1e-8, "cdf = {p}");
        assert_eq!(dist.cdf(&[-0.0097]).unwrap(), vec![p]);
    }

    #[test]
    fn test_gaussian_reduction() {
        // α = 2 with σ = s/√2 is N(μ, s²).
        let s: f64 = 1.7;
        let dist = StableDist::new(2.0, 0.0, s / 2.0_f64.sqrt(), 0.0, Parameterization::Zero).unwrap();
        let want = 1.0 / (s * (2.0 * PI).sqrt());
        assert!((dist.pdf_point(0.0).unwrap() - want).abs() < 1e-14);
        let p = dist.cdf_point(s).unwrap();
        assert!((p - crate::special::standard_normal_cdf(1.0)).abs() < 1e-14);
    }

    #[test]
    fn test_gaussian_far_out_stays_in_range() {
        let dist = StableDist::new(2.0, 0.0, 1.0, 0.0, Parameterization::Zero).unwrap();
        for x in [1e100, 1e155, 1e200, f64::MAX] {
            assert_eq!(dist.cdf_point(x).unwrap(), 1.0, "cdf({x})");
            assert_eq!(dist.cdf_point(-x).unwrap(), 0.0, "cdf(-{x})");
            assert_eq!(dist.ccdf_point(x).unwrap(), 0.0, "ccdf({x})");
            assert_eq!(dist.ccdf_point(-x).unwrap(), 1.0, "ccdf(-{x})");
        }
    }

    #[test]
    fn test_alpha_near_one_evaluates() {
        init_tracing();
        for (alpha, beta) in [(1.00002, 0.9), (1.0001, 1.0), (1.001, 1.0), (1.001, -1.0)] {
            let dist = StableDist::new(alpha, beta, 1.0, 0.0, Parameterization::Zero).unwrap();
            let xs: Vec<f64> = (0..=80).map(|i| -20.0 + 0.5 * i as f64).collect();
            let f = dist.pdf(&xs).unwrap();
            let p = dist.cdf(&xs).unwrap();
            assert!(f.iter().all(|v| *v >= 0.0));
            assert!(p.windows(2).all(|w| w[0] <= w[1] + 1e-8), "α={alpha} β={beta}");
            for x in [-1.65, 1.65] {
                dist.cdf_point(x).unwrap();
            }
            let q = dist.quantile_point(0.3).unwrap();
            assert!((dist.cdf_point(q).unwrap() - 0.3).abs() < 1e-9);
            assert!(dist.log_likelihood(&[-1.0, 0.0, 1.0, 2.0]).unwrap().is_finite());
        }
    }

    #[test]
    fn test_round_trip_at_bounded_support() {
        let dist = StableDist::new(0.1, -1.0, 1.0, 0.0, Parameterization::Zero).unwrap();
        let x = dist.quantile_point(0.999999).unwrap();
        let upper = dist.ccdf_point(x).unwrap();
        assert!((upper - 1e-6).abs() < 1e-10, "x={x}, ccdf {upper}");
        assert!(dist.cdf_point(x).unwrap() < 1.0);
    }

    #[test]
    fn test_cauchy_reduction() {
        let dist = StableDist::new(1.0, 0.0, 2.0, 1.0, Parameterization::One).unwrap();
        // f(x) = σ/(π(σ² + (x − μ)²))
        let x = 4.0;
        let want = 2.0 / (PI * (4.0 + 9.0));
        assert!((dist.pdf_point(x).unwrap() - want).abs() < 1e-15);
        let want = 0.5 + (1.5_f64).atan() / PI;
        assert!((dist.cdf_point(x).unwrap() - want).abs() < 1e-15);
        assert!((dist.quantile_point(want).unwrap() - x).abs() < 1e-12);
    }

    #[test]
    fn test_location_scale() {
        let unit = StableDist::new(1.3, 0.4, 1.0, 0.0, Parameterization::Zero).unwrap();
        let moved = StableDist::new(1.3, 0.4, 3.0, 2.0, Parameterization::Zero).unwrap();
        let z = 0.7;
        let a = unit.pdf_point(z).unwrap();
        let b = moved.pdf_point(2.0 + 3.0 * z).unwrap();
        assert!((a - 3.0 * b).abs() < 1e-12);
        let a = unit.cdf_point(z).unwrap();
        let b = moved.cdf_point(2.0 + 3.0 * z).unwrap();
        assert!((a - b).abs() < 1e-14);
    }

    #[test]
    fn test_batches_keep_order_and_length() {
        let dist = StableDist::new(0.8, 0.2, 1.0, 0.0, Parameterization::Zero).unwrap();
        let xs = [1.2, -1.0, 0.4];
        let f = dist.pdf(&xs).unwrap();
        assert_eq!(f.len(), 3);
        for (x, fx) in xs.iter().zip(&f) {
            assert_eq!(*fx, dist.pdf_point(*x).unwrap());
        }
        let with_err = dist.pdf_with_error(&xs).unwrap();
        assert!(with_err.iter().zip(&f).all(|(e, v)| e.value == *v && e.abs_error >= 0.0));
        let p = dist.cdf(&xs).unwrap();
        let c = dist.ccdf(&xs).unwrap();
        for (a, b) in p.iter().zip(&c) {
            assert!((a + b - 1.0).abs() < 1e-12);
        }
        assert!(dist.pdf(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_quantile_batch_and_errors() {
        let dist = StableDist::new(1.7, -0.5, 2.0, 1.0, Parameterization::One).unwrap();
        let qs = [0.1, 0.5, 0.95];
        let xs = dist.quantile(&qs).unwrap();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        let back = dist.cdf(&xs).unwrap();
        for (q, p) in qs.iter().zip(&back) {
            assert!((q - p).abs() < 1e-9);
        }
        assert_eq!(
            dist.quantile(&[0.5, 1.5]),
            Err(StableError::InvalidProbability(1.5))
        );
    }

    #[test]
    fn test_totally_skewed_quantile_support() {
        let dist = StableDist::new(0.5, 1.0, 2.0, 0.0, Parameterization::One).unwrap();
        // Lévy with μ₁ = 0 lives on [0, ∞).
        assert!(dist.quantile_point(0.0).unwrap().abs() < 1e-12);
        assert_eq!(dist.quantile_point(1.0).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let dist = StableDist::new(1.1, 0.3, 1.0, 0.0, Parameterization::Zero).unwrap();
        let a = dist.sample(1_000, 2024);
        let b = dist.sample(1_000, 2024);
        assert_eq!(a.len(), 1_000);
        assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
        let mut rng = create_rng(2024);
        assert_eq!(dist.sample_with(&mut rng, 1_000), a);
        let mut rng = create_rng(2024);
        assert_eq!(dist.sample_point(&mut rng), a[0]);
    }

    #[test]
    fn test_fit_in_place() {
        init_tracing();
        for &(alpha, beta, sigma, mu) in &[(1.5, 0.5, 2.0, 1.0), (1.2, -0.3, 1.0, 0.0)] {
            let truth = StableDist::new(alpha, beta, sigma, mu, Parameterization::One).unwrap();
            let data = truth.sample(10_000, 42);
            let mut dist = StableDist::new(1.0, 0.0, 1.0, 0.0, Parameterization::One).unwrap();
            let status = dist.fit(&data).unwrap();
            assert!(status.code() == 0 || status.code() == 1);
            let p = dist.params();
            assert_eq!(p.parameterization(), Parameterization::One);
            assert!((p.alpha() - alpha).abs() < 0.15 * alpha, "alpha {}", p.alpha());
            assert!((p.beta() - beta).abs() < 0.15 * beta.abs().max(0.5), "beta {}", p.beta());
            assert!((p.sigma() - sigma).abs() < 0.05 * sigma, "sigma {}", p.sigma());
            let mu_0 = truth.params().mu_0();
            assert!((p.mu_0() - mu_0).abs() < 0.05 * sigma, "mu_0 {} vs {mu_0}", p.mu_0());
        }
    }

    #[test]
    fn test_failed_fit_leaves_handle() {
        let mut dist = StableDist::new(1.5, 0.0, 1.0, 0.0, Parameterization::Zero).unwrap();
        let before = dist.clone();
        assert_eq!(
            dist.fit(&[1.0, 2.0]),
            Err(StableError::InsufficientData { needed: 5, got: 2 })
        );
        assert_eq!(dist, before);
    }

    #[test]
    fn test_log_likelihood_prefers_truth() {
        let truth = StableDist::new(1.4, 0.2, 1.0, 0.0, Parameterization::Zero).unwrap();
        let data = truth.sample(500, 9);
        let other = StableDist::new(1.9, 0.2, 1.0, 0.0, Parameterization::Zero).unwrap();
        assert!(truth.log_likelihood(&data).unwrap() > other.log_likelihood(&data).unwrap());
        // Outside the support of a totally skewed law.
        let levy = StableDist::new(0.5, 1.0, 1.0, 0.0, Parameterization::One).unwrap();
        assert_eq!(levy.log_likelihood(&[-1.0]).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_construction_rejects_bad_params() {
        for (alpha, beta, sigma) in [(0.0, 0.0, 1.0), (2.1, 0.0, 1.0), (1.5, 1.5, 1.0), (1.5, 0.0, 0.0), (1.5, 0.0, -1.0)] {
            assert!(matches!(
                StableDist::new(alpha, beta, sigma, 0.0, Parameterization::Zero),
                Err(StableError::InvalidParameter { .. })
            ));
        }
        assert_eq!(
            StableDist::from_tag(1.5, 0.0, 1.0, 0.0, 2),
            Err(StableError::InvalidParameterization(2))
        );
    }

    #[test]
    fn test_custom_config_is_kept() {
        let mut config = StableConfig::default();
        config.integration.rel_tol = 1e-8;
        let params = StableParams::new(1.5, 0.0, 1.0, 0.0, Parameterization::Zero).unwrap();
        let mut dist = StableDist::with_config(params, config);
        assert_eq!(dist.config().integration.rel_tol, 1e-8);
        let data = dist.sample(200, 1);
        dist.fit(&data).unwrap();
        assert_eq!(dist.config().integration.rel_tol, 1e-8);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_serial() {
        let dist = StableDist::new(1.2, 0.6, 1.0, 0.0, Parameterization::Zero).unwrap();
        let xs: Vec<f64> = (0..64).map(|i| -4.0 + i as f64 / 8.0).collect();
        assert_eq!(dist.pdf_par(&xs).unwrap(), dist.pdf(&xs).unwrap());
        assert_eq!(dist.cdf_par(&xs).unwrap(), dist.cdf(&xs).unwrap());
        let qs = [0.05, 0.5, 0.95];
        assert_eq!(dist.quantile_par(&qs).unwrap(), dist.quantile(&qs).unwrap());
    }
}
