//! Inverse distribution function in standardized S0 coordinates.
//!
//! # Algorithm
//! 1. Closed forms for the Gaussian, Cauchy and Lévy cases.
//! 2. Otherwise start from a seed (the tail power law for extreme levels,
//!    0 elsewhere) and double a step outward until the root is bracketed.
//! 3. Safeguarded Newton inside the bracket, using the density as the
//!    derivative and bisecting whenever a step leaves the bracket.
//!
//! For q ≤ ½ the root of F(z) − q is sought; for q > ½ the root of
//! (1 − q) − P(Z > z), so upper-tail levels keep their precision.

use std::f64::consts::{PI, SQRT_2};

use tracing::trace;

use crate::cumulative::standard_probabilities;
use crate::density::standard_density;
use crate::error::{Result, StableError};
use crate::kernel::{Kernel, Regime};
use crate::special::inverse_normal_cdf;

/// Levels below which the tail power law seeds the search.
const TAIL_SEED_LEVEL: f64 = 1e-3;

/// Quantile of the standardized variable at probability `q`.
///
/// `q = 0` and `q = 1` return the support limits: ±∞, or ζ on the bounded
/// side of a totally skewed law with α < 1.
pub(crate) fn standard_quantile(kernel: &Kernel, q: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&q) {
        return Err(StableError::InvalidProbability(q));
    }
    let (lo, hi) = kernel.support();
    if q == 0.0 {
        return Ok(lo);
    }
    if q == 1.0 {
        return Ok(hi);
    }

    match &kernel.regime {
        Regime::Gaussian => Ok(SQRT_2 * inverse_normal_cdf(q)),
        Regime::Cauchy => Ok((PI * (q - 0.5)).tan()),
        Regime::Levy => {
            // β = 1: F(z) = erfc(1/√(2y)), y = z + 1.
            if kernel.beta > 0.0 {
                Ok(inverse_normal_cdf(0.5 * q).powi(-2) - 1.0)
            } else {
                Ok(1.0 - inverse_normal_cdf(0.5 * (1.0 - q)).powi(-2))
            }
        }
        Regime::AlphaOne(_) | Regime::General(_) => solve(kernel, q, seed(kernel, q), (lo, hi)),
    }
}

/// Starting point: the leading tail term inverted for extreme levels.
fn seed(kernel: &Kernel, q: f64) -> f64 {
    let Regime::General(general) = &kernel.regime else {
        return 0.0;
    };
    let inv_alpha = 1.0 / general.alpha;
    if q < TAIL_SEED_LEVEL {
        let lead = general.left.tail.leading();
        if lead > 0.0 {
            return general.zeta - (lead / q).powf(inv_alpha);
        }
    } else if 1.0 - q < TAIL_SEED_LEVEL {
        let lead = general.right.tail.leading();
        if lead > 0.0 {
            return general.zeta + (lead / (1.0 - q)).powf(inv_alpha);
        }
    }
    0.0
}

fn solve(kernel: &Kernel, q: f64, seed: f64, (lo, hi): (f64, f64)) -> Result<f64> {
    let config = &kernel.config.quantile;
    let failure = |iterations| StableError::ConvergenceFailure {
        probability: q,
        iterations,
    };

    // Increasing in z, zero at the quantile.
    let objective = |z: f64| -> Result<f64> {
        let p = standard_probabilities(kernel, z)?;
        Ok(if q <= 0.5 { p.lower - q } else { (1.0 - q) - p.upper })
    };

    let mut z = seed.clamp(lo, hi);
    let fz = objective(z)?;
    if fz == 0.0 {
        return Ok(z);
    }

    // Bracket [a, b] with objective(a) < 0 < objective(b).
    let (mut a, mut b) = (z, z);
    let mut step = z.abs().max(1.0);
    let mut expansions = 0;
    if fz < 0.0 {
        loop {
            b = (a + step).min(hi);
            if objective(b)? >= 0.0 {
                break;
            }
            a = b;
            step *= 2.0;
            expansions += 1;
            trace!(q, a, expansions, "expanding quantile bracket upward");
            if expansions >= config.max_bracket_expansions || !b.is_finite() {
                return Err(failure(expansions));
            }
        }
    } else {
        loop {
            a = (b - step).max(lo);
            if objective(a)? <= 0.0 {
                break;
            }
            b = a;
            step *= 2.0;
            expansions += 1;
            trace!(q, b, expansions, "expanding quantile bracket downward");
            if expansions >= config.max_bracket_expansions || !a.is_finite() {
                return Err(failure(expansions));
            }
        }
    }

    z = if fz < 0.0 { a } else { b };
    for _ in 0..config.max_iter {
        let fz = objective(z)?;
        if fz == 0.0 {
            return Ok(z);
        }
        if fz < 0.0 {
            a = z;
        } else {
            b = z;
        }

        let density = standard_density(kernel, z)?.value;
        let newton = z - fz / density;
        let next = if density > 0.0 && newton > a && newton < b {
            newton
        } else {
            0.5 * (a + b)
        };

        let tol = config.abs_tol + config.rel_tol * next.abs();
        if (next - z).abs() <= tol || b - a <= tol {
            return Ok(next.clamp(lo, hi));
        }
        z = next;
    }

    Err(failure(config.max_iter))
}
