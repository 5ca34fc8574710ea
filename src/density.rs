//! Probability density in standardized S0 coordinates.
//!
//! Closed forms cover the Gaussian, Cauchy and Lévy cases. Everything else
//! integrates g·e^{−g} over the angular domain from [`crate::kernel`],
//! switching to the tail series far from ζ.

use std::f64::consts::{PI, SQRT_2};

use tracing::{debug, warn};

use crate::error::Result;
use crate::kernel::{integration_failure, scaled_options, Kernel, Regime};
use crate::special::{standard_normal_pdf, FRAC_1_SQRT_2PI};

/// A computed value with its absolute error estimate.
///
/// The error is 0 for closed forms, the quadrature estimate for integrals
/// and the truncation bound for tail series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub value: f64,
    pub abs_error: f64,
}

impl Estimate {
    pub(crate) fn exact(value: f64) -> Self {
        Self {
            value,
            abs_error: 0.0,
        }
    }

    fn from_pair((value, abs_error): (f64, f64)) -> Self {
        Self { value, abs_error }
    }

    /// Rescales value and error by a positive factor.
    pub(crate) fn scale(self, factor: f64) -> Self {
        Self {
            value: self.value * factor,
            abs_error: self.abs_error * factor,
        }
    }
}

/// Density of the standardized variable at `z`.
///
/// NaN propagates; ±∞ gives 0. The returned value is never negative.
pub(crate) fn standard_density(kernel: &Kernel, z: f64) -> Result<Estimate> {
    if z.is_nan() {
        return Ok(Estimate::exact(f64::NAN));
    }
    if z.is_infinite() {
        return Ok(Estimate::exact(0.0));
    }

    let estimate = match &kernel.regime {
        // N(0, 2)
        Regime::Gaussian => Estimate::exact(standard_normal_pdf(z / SQRT_2) / SQRT_2),
        Regime::Cauchy => Estimate::exact(1.0 / (PI * (1.0 + z * z))),
        Regime::Levy => {
            let y = kernel.beta.signum() * z + 1.0;
            if y <= 0.0 {
                Estimate::exact(0.0)
            } else {
                Estimate::exact(FRAC_1_SQRT_2PI * y.powf(-1.5) * (-0.5 / y).exp())
            }
        }
        Regime::AlphaOne(one) => {
            let z_eff = one.sign * z;
            let on_tail = z_eff > 0.0;
            if on_tail && one.tail.applies(z_eff) {
                Estimate::from_pair(one.tail.density(z_eff))
            } else {
                let factor = 1.0 / (2.0 * one.beta);
                let opts = scaled_options(&kernel.config.integration, factor);
                let r = one.angular(z_eff).integrate_density(&opts);
                if r.accepted() {
                    Estimate::from_pair((r.value, r.abs_error)).scale(factor)
                } else if on_tail && one.tail.usable(z_eff) {
                    debug!(z, subdivisions = r.subdivisions, "density integral fell back to tail series");
                    Estimate::from_pair(one.tail.density(z_eff))
                } else {
                    warn!(z, alpha = kernel.alpha, beta = kernel.beta, "density integral did not converge");
                    return Err(integration_failure(&r, factor));
                }
            }
        }
        Regime::General(general) => {
            let (side, _, xz) = general.locate(z);
            if general.at_zeta(xz) {
                Estimate::exact(general.density_at_zeta)
            } else {
                let angular = general.angular(side, xz);
                if angular.is_empty() {
                    Estimate::exact(0.0)
                } else if side.tail.applies(xz) {
                    Estimate::from_pair(side.tail.density(xz))
                } else {
                    let factor = general.density_factor(xz);
                    let opts = scaled_options(&kernel.config.integration, factor);
                    let r = angular.integrate_density(&opts);
                    if r.accepted() {
                        Estimate::from_pair((r.value, r.abs_error)).scale(factor)
                    } else if side.tail.usable(xz) {
                        debug!(z, subdivisions = r.subdivisions, "density integral fell back to tail series");
                        Estimate::from_pair(side.tail.density(xz))
                    } else {
                        warn!(z, alpha = kernel.alpha, beta = kernel.beta, "density integral did not converge");
                        return Err(integration_failure(&r, factor));
                    }
                }
            }
        }
    };

    Ok(Estimate {
        value: estimate.value.max(0.0),
        abs_error: estimate.abs_error,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::config::StableConfig;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn density_is_finite_and_non_negative(
            alpha in 0.3_f64..=2.0,
            beta in -1.0_f64..=1.0,
            z in -50.0_f64..50.0,
        ) {
            let kernel = Kernel::new(alpha, beta, StableConfig::default());
            let f = standard_density(&kernel, z).unwrap();
            prop_assert!(f.value.is_finite());
            prop_assert!(f.value >= 0.0);
            prop_assert!(f.abs_error >= 0.0);
        }

        #[test]
        fn density_defined_near_alpha_one(
            alpha in 0.99_f64..=1.01,
            beta in -1.0_f64..=1.0,
            z in -20.0_f64..20.0,
        ) {
            let kernel = Kernel::new(alpha, beta, StableConfig::default());
            let f = standard_density(&kernel, z);
            prop_assert!(f.is_ok(), "α={} β={} z={}: {:?}", alpha, beta, z, f);
            prop_assert!(f.unwrap().value >= 0.0);
        }

        #[test]
        fn reflection_symmetry(
            alpha in 0.4_f64..=2.0,
            beta in -1.0_f64..=1.0,
            z in -10.0_f64..10.0,
        ) {
            // f(z; α, β) = f(−z; α, −β)
            let a = standard_density(&Kernel::new(alpha, beta, StableConfig::default()), z).unwrap().value;
            let b = standard_density(&Kernel::new(alpha, -beta, StableConfig::default()), -z).unwrap().value;
            prop_assert!((a - b).abs() < 1e-10, "{} vs {}", a, b);
        }
    }
}
