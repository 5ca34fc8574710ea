//! Asymptotic tail expansion.
//!
//! Far from the mode the angular integrals lose precision (the integrand
//! collapses onto an ever-narrower spike), while the Bergström series
//! becomes exact. In the 1-parameterization coordinate y = (x − μ₁)/σ,
//! with τ = β tan(πα/2), c = √(1 + τ²) and ψ = atan τ:
//!
//! ```text
//! P(Y > y) ~ (1/π) Σₖ (−1)^{k+1} cᵏ Γ(kα)/k!   sin(k(πα/2 + ψ)) y^{−kα}
//! f(y)     ~ (1/π) Σₖ (−1)^{k+1} cᵏ Γ(kα+1)/k! sin(k(πα/2 + ψ)) y^{−kα−1}
//! ```
//!
//! The k = 1 term reduces to Γ(α) sin(πα/2)(1 + β)/π · y^{−α}. At α = 1
//! only the leading term (1 + β)/(πy) is used.
//!
//! Reference: Bergström (1952), "On some expansions of stable distribution
//! functions", *Arkiv för Matematik* 2(4); Nolan (2020), §3.5.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::config::TailConfig;
use crate::special::ln_gamma;

/// Series coefficients for the right tail of one skewness sign.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TailSeries {
    alpha: f64,
    probability: Vec<f64>,
    density: Vec<f64>,
    /// Distance scale below which the series is not trusted, c^{1/α}.
    scale: f64,
    config: TailConfig,
}

impl TailSeries {
    /// Series for skewness `beta` at `alpha ≠ 1`.
    pub(crate) fn new(alpha: f64, beta: f64, config: TailConfig) -> Self {
        let tau = beta * (FRAC_PI_2 * alpha).tan();
        let c = tau.hypot(1.0);
        let phase = FRAC_PI_2 * alpha + tau.atan();
        let terms = config.terms.max(1);

        let mut probability = Vec::with_capacity(terms);
        let mut density = Vec::with_capacity(terms);
        for k in 1..=terms {
            let kf = k as f64;
            let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
            let common = sign * c.powi(k as i32) * (kf * phase).sin() / PI;
            let ln_fact = ln_gamma(kf + 1.0);
            probability.push(common * (ln_gamma(kf * alpha) - ln_fact).exp());
            density.push(common * (ln_gamma(kf * alpha + 1.0) - ln_fact).exp());
        }

        Self {
            alpha,
            probability,
            density,
            scale: c.powf(1.0 / alpha).max(1.0),
            config,
        }
    }

    /// Leading-order series for the α = 1 representation.
    pub(crate) fn alpha_one(beta: f64, config: TailConfig) -> Self {
        let coef = (1.0 + beta) / PI;
        Self {
            alpha: 1.0,
            probability: vec![coef],
            density: vec![coef],
            scale: 1.0,
            config,
        }
    }

    /// Leading coefficient: P(Y > y) ≈ leading·y^{−α}.
    pub(crate) fn leading(&self) -> f64 {
        self.probability[0]
    }

    /// Whether `y` is far enough out for the series to be meaningful.
    pub(crate) fn usable(&self, y: f64) -> bool {
        y >= self.config.min_distance * self.scale
    }

    /// Whether the series should replace integration at `y`.
    pub(crate) fn applies(&self, y: f64) -> bool {
        self.usable(y) && self.probability[0] * y.powf(-self.alpha) < self.config.probability_threshold
    }

    /// Right-tail probability P(Y > y) and a truncation error bound.
    pub(crate) fn upper(&self, y: f64) -> (f64, f64) {
        sum_series(&self.probability, y, self.alpha, 0.0)
    }

    /// Density at `y` and a truncation error bound.
    pub(crate) fn density(&self, y: f64) -> (f64, f64) {
        sum_series(&self.density, y, self.alpha, 1.0)
    }
}

/// Σ coef[k]·y^{−(k+1)α − shift}; the error bound is the magnitude of the
/// last term kept, or a relative 1/y for a single-term series.
fn sum_series(coefs: &[f64], y: f64, alpha: f64, shift: f64) -> (f64, f64) {
    let mut total = 0.0;
    let mut last = 0.0;
    for (k, &coef) in coefs.iter().enumerate() {
        last = coef * y.powf(-((k + 1) as f64) * alpha - shift);
        total += last;
    }
    let bound = if coefs.len() > 1 {
        last.abs()
    } else {
        (total / y).abs()
    };
    (total.max(0.0), bound)
}
