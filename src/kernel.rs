//! Per-distribution constants and the angular integral representation.
//!
//! For α ≠ 1 and a standardized S0 argument z on the right of
//! ζ = −β tan(πα/2), Nolan's representation writes the density and the
//! tail probability as integrals over θ ∈ (−θ₀, π/2) of
//!
//! ```text
//! g(θ) = (z − ζ)^{α/(α−1)} · V(θ)
//! V(θ) = cos(αθ₀)^{1/(α−1)} · (cos θ / sin α(θ₀+θ))^{α/(α−1)}
//!        · cos(αθ₀ + (α−1)θ) / cos θ
//! θ₀   = atan(β tan(πα/2)) / α
//! ```
//!
//! Arguments left of ζ are handled by the reflection (z, β) → (−z, −β).
//! For α = 1 the domain is (−π/2, π/2) and, for β > 0,
//!
//! ```text
//! g(θ) = e^{−πz/(2β)} · (2/π) · ((π/2 + βθ)/cos θ) · exp((π/2 + βθ) tan θ / β)
//! ```
//!
//! g is monotone in θ and sweeps (0, ∞), so g·e^{−g} is a single spike whose
//! position moves with z. The domain is split where ln g crosses a few
//! fixed levels so the quadrature always sees that spike.
//!
//! Reference: Nolan (1997), "Numerical calculation of stable densities and
//! distribution functions", *Communications in Statistics. Stochastic
//! Models* 13(4), pp. 759–774.

use std::f64::consts::{FRAC_2_PI, FRAC_PI_2, PI};

use crate::config::StableConfig;
use crate::error::StableError;
use crate::integrate::{integrate, QuadOptions, QuadResult};
use crate::special::ln_gamma;
use crate::tail::TailSeries;

/// ln g levels at which the angular domain is split: the far edges of the
/// spike (g = e⁻⁴⁰ and g = 40) and its peak (g = 1).
const LEVELS: [f64; 3] = [-40.0, 0.0, 3.688_879_454_113_936];

/// Angular domains narrower than this are treated as empty.
const EMPTY_WIDTH: f64 = 1e-14;

const MAX_BISECTIONS: usize = 200;

// ============================================================================
// Regime dispatch
// ============================================================================

/// How a distribution is evaluated, decided once from (α, β).
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Regime {
    /// α = 2: N(μ₀, 2σ²).
    Gaussian,
    /// α = 1 (or within the α = 1 band), β = 0.
    Cauchy,
    /// α = 1/2, |β| = 1.
    Levy,
    /// α = 1 (or within the band), β ≠ 0.
    AlphaOne(AlphaOne),
    /// Everything else.
    General(General),
}

/// Cached evaluation state for one distribution shape (α, β).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Kernel {
    pub(crate) alpha: f64,
    pub(crate) beta: f64,
    pub(crate) regime: Regime,
    pub(crate) config: StableConfig,
}

impl Kernel {
    pub(crate) fn new(alpha: f64, beta: f64, config: StableConfig) -> Self {
        let near_one = (alpha - 1.0).abs() < config.alpha_one_band;
        let regime = if alpha == 2.0 {
            Regime::Gaussian
        } else if near_one && beta == 0.0 {
            Regime::Cauchy
        } else if alpha == 0.5 && beta.abs() == 1.0 {
            Regime::Levy
        } else if near_one {
            Regime::AlphaOne(AlphaOne::new(beta, &config))
        } else {
            Regime::General(General::new(alpha, beta, &config))
        };
        Self {
            alpha,
            beta,
            regime,
            config,
        }
    }

    /// Standardized support `[lower, upper]`. Finite only for α < 1 with
    /// |β| = 1.
    pub(crate) fn support(&self) -> (f64, f64) {
        if self.alpha < 1.0 && self.beta.abs() == 1.0 {
            let zeta = -self.beta * (FRAC_PI_2 * self.alpha).tan();
            if self.beta > 0.0 {
                (zeta, f64::INFINITY)
            } else {
                (f64::NEG_INFINITY, zeta)
            }
        } else {
            (f64::NEG_INFINITY, f64::INFINITY)
        }
    }
}

/// Maps an unconverged quadrature to an error, rescaled to output units.
pub(crate) fn integration_failure(result: &QuadResult, scale: f64) -> StableError {
    StableError::IntegrationFailure {
        value: result.value * scale,
        abs_error: result.abs_error * scale,
        subdivisions: result.subdivisions,
    }
}

/// Quadrature options for an integral that is multiplied by `scale` to
/// give the output; `abs_tol` stays expressed in output units.
pub(crate) fn scaled_options(opts: &QuadOptions, scale: f64) -> QuadOptions {
    QuadOptions {
        abs_tol: opts.abs_tol / scale,
        ..*opts
    }
}

// ============================================================================
// General α ≠ 1
// ============================================================================

/// Constants for one reflection of a general-α distribution.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Side {
    pub(crate) theta0: f64,
    pub(crate) zeta: f64,
    pub(crate) tail: TailSeries,
}

/// α ≠ 1 constants, computed once.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct General {
    pub(crate) alpha: f64,
    pub(crate) zeta: f64,
    pub(crate) theta0: f64,
    /// α/(α − 1)
    ratio: f64,
    /// ln cos(αθ₀)/(α − 1)
    ln_cos_term: f64,
    pub(crate) right: Side,
    pub(crate) left: Side,
    pub(crate) density_at_zeta: f64,
    pub(crate) cdf_at_zeta: f64,
    zeta_tolerance: f64,
    /// α < 1 with |β| = 1: ζ is an endpoint of the support.
    bounded: bool,
}

impl General {
    fn new(alpha: f64, beta: f64, config: &StableConfig) -> Self {
        let tan = (FRAC_PI_2 * alpha).tan();
        let zeta = -beta * tan;
        let theta0 = (beta * tan).atan() / alpha;
        let bounded = alpha < 1.0 && beta.abs() == 1.0;
        let (density_at_zeta, cdf_at_zeta) = if bounded {
            (0.0, if beta > 0.0 { 0.0 } else { 1.0 })
        } else {
            (
                ln_gamma(1.0 + 1.0 / alpha).exp() * theta0.cos()
                    / (PI * (1.0 + zeta * zeta).powf(0.5 / alpha)),
                (FRAC_PI_2 - theta0) / PI,
            )
        };
        Self {
            alpha,
            zeta,
            theta0,
            ratio: alpha / (alpha - 1.0),
            ln_cos_term: (alpha * theta0).cos().ln() / (alpha - 1.0),
            right: Side {
                theta0,
                zeta,
                tail: TailSeries::new(alpha, beta, config.tail),
            },
            left: Side {
                theta0: -theta0,
                zeta: -zeta,
                tail: TailSeries::new(alpha, -beta, config.tail),
            },
            density_at_zeta,
            cdf_at_zeta,
            zeta_tolerance: config.zeta_tolerance,
            bounded,
        }
    }

    /// Picks the reflection containing `z`. Returns the side, whether it is
    /// mirrored, and the distance |z − ζ|.
    pub(crate) fn locate(&self, z: f64) -> (&Side, bool, f64) {
        if z >= self.zeta {
            (&self.right, false, z - self.zeta)
        } else {
            (&self.left, true, self.zeta - z)
        }
    }

    /// Whether a distance from ζ is close enough to use the values at ζ.
    ///
    /// At a support endpoint the mass piles up against ζ, so only ζ itself
    /// qualifies there.
    pub(crate) fn at_zeta(&self, distance: f64) -> bool {
        if self.bounded {
            distance == 0.0
        } else {
            distance <= self.zeta_tolerance * self.zeta.abs().max(1.0)
        }
    }

    /// Factor turning ∫ g e^{−g} dθ into the density at distance `xz`.
    pub(crate) fn density_factor(&self, xz: f64) -> f64 {
        self.alpha / (PI * (self.alpha - 1.0).abs() * xz)
    }

    pub(crate) fn angular(&self, side: &Side, xz: f64) -> Angular {
        Angular {
            form: Form::General {
                alpha: self.alpha,
                theta0: side.theta0,
                ratio: self.ratio,
                offset: self.ratio * xz.ln() + self.ln_cos_term,
            },
            lo: -side.theta0,
            hi: FRAC_PI_2,
            increasing: self.alpha < 1.0,
        }
    }
}

// ============================================================================
// α = 1
// ============================================================================

/// α = 1 constants. Negative β is handled by reflecting z.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AlphaOne {
    /// |β|
    pub(crate) beta: f64,
    /// sign of β
    pub(crate) sign: f64,
    pub(crate) tail: TailSeries,
}

impl AlphaOne {
    fn new(beta: f64, config: &StableConfig) -> Self {
        Self {
            beta: beta.abs(),
            sign: beta.signum(),
            tail: TailSeries::alpha_one(beta.abs(), config.tail),
        }
    }

    /// Angular integrand at the reflected argument `z_eff = sign·z`.
    pub(crate) fn angular(&self, z_eff: f64) -> Angular {
        Angular {
            form: Form::AlphaOne {
                beta: self.beta,
                offset: FRAC_2_PI.ln() - PI * z_eff / (2.0 * self.beta),
            },
            lo: -FRAC_PI_2,
            hi: FRAC_PI_2,
            increasing: true,
        }
    }
}

// ============================================================================
// Angular integrand
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Form {
    General {
        alpha: f64,
        theta0: f64,
        ratio: f64,
        offset: f64,
    },
    AlphaOne {
        beta: f64,
        offset: f64,
    },
}

/// ln g on its angular domain, for one evaluation point.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Angular {
    form: Form,
    lo: f64,
    hi: f64,
    increasing: bool,
}

impl Angular {
    fn raw(&self, theta: f64) -> f64 {
        match self.form {
            Form::General {
                alpha,
                theta0,
                ratio,
                offset,
            } => {
                let ln_cos = theta.cos().ln();
                offset + ratio * (ln_cos - (alpha * (theta0 + theta)).sin().ln())
                    + (alpha * theta0 + (alpha - 1.0) * theta).cos().ln()
                    - ln_cos
            }
            Form::AlphaOne { beta, offset } => {
                let h = FRAC_PI_2 + beta * theta;
                offset + h.ln() - theta.cos().ln() + h * theta.tan() / beta
            }
        }
    }

    /// ln g(θ). Where rounding makes the formula indeterminate near an
    /// endpoint, returns that endpoint's limit.
    pub(crate) fn ln_g(&self, theta: f64) -> f64 {
        let v = self.raw(theta);
        if v.is_nan() {
            let near_lo = theta - self.lo < self.hi - theta;
            if near_lo == self.increasing {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }
        } else {
            v
        }
    }

    /// True when the domain has collapsed (α < 1 with |β| = 1 on the side
    /// beyond the support).
    pub(crate) fn is_empty(&self) -> bool {
        !(self.hi - self.lo > EMPTY_WIDTH)
    }

    /// θ where ln g crosses `level`, by bisection on the monotone ln g.
    fn level_crossing(&self, level: f64) -> Option<f64> {
        let (mut a, mut b) = (self.lo, self.hi);
        for _ in 0..MAX_BISECTIONS {
            let m = 0.5 * (a + b);
            if m <= a || m >= b {
                break;
            }
            if (self.ln_g(m) < level) == self.increasing {
                a = m;
            } else {
                b = m;
            }
        }
        let root = 0.5 * (a + b);
        (root > self.lo && root < self.hi).then_some(root)
    }

    /// Domain endpoints with the level crossings in between, ascending.
    pub(crate) fn breakpoints(&self) -> Vec<f64> {
        let mut points = Vec::with_capacity(LEVELS.len() + 2);
        points.push(self.lo);
        points.extend(LEVELS.iter().filter_map(|&level| self.level_crossing(level)));
        points.push(self.hi);
        points.sort_by(f64::total_cmp);
        points.dedup();
        points
    }

    /// ∫ g e^{−g} dθ
    pub(crate) fn integrate_density(&self, opts: &QuadOptions) -> QuadResult {
        integrate(
            |theta| {
                let l = self.ln_g(theta);
                (l - l.exp()).exp()
            },
            &self.breakpoints(),
            opts,
        )
    }

    /// ∫ e^{−g} dθ, or ∫ (1 − e^{−g}) dθ when `complement` is set.
    pub(crate) fn integrate_survival(&self, complement: bool, opts: &QuadOptions) -> QuadResult {
        integrate(
            |theta| {
                let g = self.ln_g(theta).exp();
                if complement { -(-g).exp_m1() } else { (-g).exp() }
            },
            &self.breakpoints(),
            opts,
        )
    }
}
