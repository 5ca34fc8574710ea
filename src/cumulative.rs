//! Distribution function in standardized S0 coordinates.
//!
//! Both tails are computed directly: on each side of ζ the integral gives
//! the probability beyond the evaluation point, and the near-side value is
//! its complement. This keeps P(Z > z) accurate far in the right tail
//! instead of forming 1 − F(z).
//!
//! ```text
//! α > 1:  P(beyond) = (1/π) ∫ exp(−g(θ)) dθ
//! α < 1:  P(beyond) = (1/π) ∫ (1 − exp(−g(θ))) dθ
//! ```

use std::f64::consts::PI;

use tracing::{debug, warn};

use crate::error::Result;
use crate::kernel::{integration_failure, scaled_options, Kernel, Regime};
use crate::special::{erf, erfc};

/// P(Z ≤ z) and P(Z > z), each accurate in its own tail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Probabilities {
    pub(crate) lower: f64,
    pub(crate) upper: f64,
    pub(crate) abs_error: f64,
}

impl Probabilities {
    fn exact(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            abs_error: 0.0,
        }
    }

    /// From the upper-tail probability.
    fn from_upper(upper: f64, abs_error: f64) -> Self {
        Self {
            lower: 1.0 - upper,
            upper,
            abs_error,
        }
    }

    fn swapped(self) -> Self {
        Self {
            lower: self.upper,
            upper: self.lower,
            abs_error: self.abs_error,
        }
    }

    fn clamped(self) -> Self {
        Self {
            lower: self.lower.clamp(0.0, 1.0),
            upper: self.upper.clamp(0.0, 1.0),
            abs_error: self.abs_error,
        }
    }
}

/// Lower and upper tail probabilities of the standardized variable at `z`.
pub(crate) fn standard_probabilities(kernel: &Kernel, z: f64) -> Result<Probabilities> {
    if z.is_nan() {
        return Ok(Probabilities::exact(f64::NAN, f64::NAN));
    }
    if z == f64::INFINITY {
        return Ok(Probabilities::exact(1.0, 0.0));
    }
    if z == f64::NEG_INFINITY {
        return Ok(Probabilities::exact(0.0, 1.0));
    }

    let probabilities = match &kernel.regime {
        // N(0, 2)
        Regime::Gaussian => Probabilities::exact(0.5 * erfc(-z / 2.0), 0.5 * erfc(z / 2.0)),
        Regime::Cauchy => {
            if z < 0.0 {
                let lower = (-1.0 / z).atan() / PI;
                Probabilities::exact(lower, 1.0 - lower)
            } else if z > 0.0 {
                Probabilities::from_upper((1.0 / z).atan() / PI, 0.0)
            } else {
                Probabilities::exact(0.5, 0.5)
            }
        }
        Regime::Levy => {
            let y = kernel.beta.signum() * z + 1.0;
            let p = if y <= 0.0 {
                Probabilities::exact(0.0, 1.0)
            } else {
                let w = (0.5 / y).sqrt();
                Probabilities::exact(erfc(w), erf(w))
            };
            if kernel.beta > 0.0 { p } else { p.swapped() }
        }
        Regime::AlphaOne(one) => {
            let z_eff = one.sign * z;
            let on_tail = z_eff > 0.0;
            let p = if on_tail && one.tail.applies(z_eff) {
                let (upper, error) = one.tail.upper(z_eff);
                Probabilities::from_upper(upper, error)
            } else {
                let opts = scaled_options(&kernel.config.integration, 1.0 / PI);
                let r = one.angular(z_eff).integrate_survival(on_tail, &opts);
                let (beyond, error) = if r.accepted() {
                    (r.value / PI, r.abs_error / PI)
                } else if on_tail && one.tail.usable(z_eff) {
                    debug!(z, subdivisions = r.subdivisions, "probability integral fell back to tail series");
                    one.tail.upper(z_eff)
                } else {
                    warn!(z, alpha = kernel.alpha, beta = kernel.beta, "probability integral did not converge");
                    return Err(integration_failure(&r, 1.0 / PI));
                };
                if on_tail {
                    Probabilities::from_upper(beyond, error)
                } else {
                    Probabilities {
                        lower: beyond,
                        upper: 1.0 - beyond,
                        abs_error: error,
                    }
                }
            };
            if one.sign < 0.0 { p.swapped() } else { p }
        }
        Regime::General(general) => {
            let (side, mirrored, xz) = general.locate(z);
            if general.at_zeta(xz) {
                Probabilities::exact(general.cdf_at_zeta, 1.0 - general.cdf_at_zeta)
            } else {
                let angular = general.angular(side, xz);
                let (beyond, error) = if angular.is_empty() {
                    (0.0, 0.0)
                } else if side.tail.applies(xz) {
                    side.tail.upper(xz)
                } else {
                    let opts = scaled_options(&kernel.config.integration, 1.0 / PI);
                    let r = angular.integrate_survival(general.alpha < 1.0, &opts);
                    if r.accepted() {
                        (r.value / PI, r.abs_error / PI)
                    } else if side.tail.usable(xz) {
                        debug!(z, subdivisions = r.subdivisions, "probability integral fell back to tail series");
                        side.tail.upper(xz)
                    } else {
                        warn!(z, alpha = kernel.alpha, beta = kernel.beta, "probability integral did not converge");
                        return Err(integration_failure(&r, 1.0 / PI));
                    }
                };
                let p = Probabilities::from_upper(beyond, error);
                if mirrored { p.swapped() } else { p }
            }
        }
    };

    Ok(probabilities.clamped())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::config::StableConfig;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn probabilities_are_complementary(
            alpha in 0.3_f64..=2.0,
            beta in -1.0_f64..=1.0,
            z in -50.0_f64..50.0,
        ) {
            let kernel = Kernel::new(alpha, beta, StableConfig::default());
            let p = standard_probabilities(&kernel, z).unwrap();
            prop_assert!((0.0..=1.0).contains(&p.lower));
            prop_assert!((0.0..=1.0).contains(&p.upper));
            prop_assert!((p.lower + p.upper - 1.0).abs() < 1e-9);
        }

        #[test]
        fn probabilities_defined_near_alpha_one(
            alpha in 0.99_f64..=1.01,
            beta in -1.0_f64..=1.0,
            z in -20.0_f64..20.0,
        ) {
            let kernel = Kernel::new(alpha, beta, StableConfig::default());
            let p = standard_probabilities(&kernel, z);
            prop_assert!(p.is_ok(), "α={} β={} z={}: {:?}", alpha, beta, z, p);
            let p = p.unwrap();
            prop_assert!((0.0..=1.0).contains(&p.lower));
        }

        #[test]
        fn cdf_is_monotone(
            alpha in 0.3_f64..=2.0,
            beta in -1.0_f64..=1.0,
            z in -20.0_f64..20.0,
            step in 0.01_f64..5.0,
        ) {
            let kernel = Kernel::new(alpha, beta, StableConfig::default());
            let a = standard_probabilities(&kernel, z).unwrap().lower;
            let b = standard_probabilities(&kernel, z + step).unwrap().lower;
            prop_assert!(a <= b + 1e-10, "F({}) = {} > F({}) = {}", z, a, z + step, b);
        }
    }
}
