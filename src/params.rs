//! Stable distribution parameters and their validation.
//!
//! A stable law S(α, β, σ, μ) is described in one of Nolan's two
//! parameterizations, which share α, β and σ and differ only in the
//! location:
//!
//! | Tag | Location | Property |
//! |---|---|---|
//! | [`Parameterization::Zero`] | μ₀ | density jointly continuous in all four parameters |
//! | [`Parameterization::One`] | μ₁ | simplest characteristic function |
//!
//! ```text
//! μ₀ = μ₁ + βσ tan(πα/2)          α ≠ 1
//! μ₀ = μ₁ + β(2/π)σ ln σ          α = 1
//! ```
//!
//! [`StableParams`] always carries both locations plus the tag of the one
//! supplied at construction.
//!
//! Reference: Nolan (2020), *Univariate Stable Distributions*, Springer,
//! §1.3.

use std::f64::consts::{FRAC_2_PI, FRAC_PI_2};

use crate::error::{Param, Result, StableError};

/// Which location convention a parameter set was given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameterization {
    /// Nolan's S0 (tag 0).
    Zero,
    /// Nolan's S1 (tag 1).
    One,
}

impl Parameterization {
    /// Native integer tag.
    pub fn code(self) -> i32 {
        match self {
            Parameterization::Zero => 0,
            Parameterization::One => 1,
        }
    }
}

impl TryFrom<i32> for Parameterization {
    type Error = StableError;

    fn try_from(tag: i32) -> Result<Self> {
        match tag {
            0 => Ok(Parameterization::Zero),
            1 => Ok(Parameterization::One),
            other => Err(StableError::InvalidParameterization(other)),
        }
    }
}

/// Checks parameter domains.
///
/// Fails with [`StableError::InvalidParameter`] when `alpha ∉ (0, 2]`,
/// `beta ∉ [-1, 1]`, `sigma ≤ 0` (or any of them, or `mu`, is not finite),
/// and with [`StableError::InvalidParameterization`] for a tag other than
/// 0 or 1.
///
/// # Examples
/// ```
/// use u_stable::params::{validate, Parameterization};
/// assert_eq!(validate(1.5, 0.0, 1.0, 0.0, 0).unwrap(), Parameterization::Zero);
/// assert!(validate(0.0, 0.0, 1.0, 0.0, 0).is_err());
/// assert!(validate(1.5, 0.0, 1.0, 0.0, 2).is_err());
/// ```
pub fn validate(
    alpha: f64,
    beta: f64,
    sigma: f64,
    mu: f64,
    parameterization: i32,
) -> Result<Parameterization> {
    if !(alpha > 0.0 && alpha <= 2.0) {
        return Err(StableError::InvalidParameter {
            param: Param::Alpha,
            value: alpha,
        });
    }
    if !(-1.0..=1.0).contains(&beta) {
        return Err(StableError::InvalidParameter {
            param: Param::Beta,
            value: beta,
        });
    }
    if !(sigma > 0.0 && sigma.is_finite()) {
        return Err(StableError::InvalidParameter {
            param: Param::Sigma,
            value: sigma,
        });
    }
    let tag = Parameterization::try_from(parameterization)?;
    if !mu.is_finite() {
        return Err(StableError::InvalidParameter {
            param: Param::Mu,
            value: mu,
        });
    }
    Ok(tag)
}

/// Status-code form of [`validate`]: `0` when valid, otherwise the code of
/// the first violation (alpha 1, beta 2, sigma 3, parameterization 4, mu 5).
///
/// # Examples
/// ```
/// use u_stable::params::check_params;
/// assert_eq!(check_params(1.5, 0.5, 1.0, 0.0, 1), 0);
/// assert_eq!(check_params(1.5, 1.5, 1.0, 0.0, 1), 2);
/// ```
pub fn check_params(alpha: f64, beta: f64, sigma: f64, mu: f64, parameterization: i32) -> i32 {
    match validate(alpha, beta, sigma, mu, parameterization) {
        Ok(_) => 0,
        Err(e) => e.status_code(),
    }
}

/// Shift between the two locations: μ₀ = μ₁ + `location_shift`.
fn location_shift(alpha: f64, beta: f64, sigma: f64) -> f64 {
    if alpha == 1.0 {
        beta * FRAC_2_PI * sigma * sigma.ln()
    } else {
        beta * sigma * (FRAC_PI_2 * alpha).tan()
    }
}

/// Converts a location between parameterizations.
///
/// # Examples
/// ```
/// use u_stable::params::{convert_location, Parameterization};
/// let mu0 = convert_location(1.5, 0.5, 2.0, 1.0, Parameterization::One, Parameterization::Zero);
/// // μ₀ = 1 + 0.5·2·tan(3π/4) = 0
/// assert!(mu0.abs() < 1e-12);
/// ```
pub fn convert_location(
    alpha: f64,
    beta: f64,
    sigma: f64,
    mu: f64,
    from: Parameterization,
    to: Parameterization,
) -> f64 {
    match (from, to) {
        (Parameterization::One, Parameterization::Zero) => mu + location_shift(alpha, beta, sigma),
        (Parameterization::Zero, Parameterization::One) => mu - location_shift(alpha, beta, sigma),
        _ => mu,
    }
}

/// Validated parameters of a stable distribution.
///
/// Immutable once built: the fitting pipeline produces new values rather
/// than editing an existing one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StableParams {
    alpha: f64,
    beta: f64,
    sigma: f64,
    mu_0: f64,
    mu_1: f64,
    parameterization: Parameterization,
}

impl StableParams {
    /// Creates a parameter set, validating domains and populating both
    /// locations.
    ///
    /// # Errors
    /// Returns [`StableError::InvalidParameter`] when a value is outside its
    /// domain.
    ///
    /// # Examples
    /// ```
    /// use u_stable::params::{StableParams, Parameterization};
    /// let p = StableParams::new(1.5, 0.5, 2.0, 1.0, Parameterization::One).unwrap();
    /// assert!(p.mu_0().abs() < 1e-12);
    /// assert_eq!(p.mu_1(), 1.0);
    /// ```
    pub fn new(
        alpha: f64,
        beta: f64,
        sigma: f64,
        mu: f64,
        parameterization: Parameterization,
    ) -> Result<Self> {
        validate(alpha, beta, sigma, mu, parameterization.code())?;
        let (mu_0, mu_1) = match parameterization {
            Parameterization::Zero => (
                mu,
                convert_location(alpha, beta, sigma, mu, parameterization, Parameterization::One),
            ),
            Parameterization::One => (
                convert_location(alpha, beta, sigma, mu, parameterization, Parameterization::Zero),
                mu,
            ),
        };
        Ok(Self {
            alpha,
            beta,
            sigma,
            mu_0,
            mu_1,
            parameterization,
        })
    }

    /// Like [`StableParams::new`] with the parameterization given as its
    /// native integer tag.
    ///
    /// # Errors
    /// Also returns [`StableError::InvalidParameterization`] for a tag
    /// other than 0 or 1.
    pub fn from_tag(alpha: f64, beta: f64, sigma: f64, mu: f64, tag: i32) -> Result<Self> {
        let parameterization = validate(alpha, beta, sigma, mu, tag)?;
        Self::new(alpha, beta, sigma, mu, parameterization)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Location in the 0-parameterization.
    pub fn mu_0(&self) -> f64 {
        self.mu_0
    }

    /// Location in the 1-parameterization.
    pub fn mu_1(&self) -> f64 {
        self.mu_1
    }

    /// The convention the location was supplied in.
    pub fn parameterization(&self) -> Parameterization {
        self.parameterization
    }

    /// The location as supplied at construction.
    pub fn mu(&self) -> f64 {
        match self.parameterization {
            Parameterization::Zero => self.mu_0,
            Parameterization::One => self.mu_1,
        }
    }

    /// The same distribution, reported in another parameterization.
    pub fn with_parameterization(self, parameterization: Parameterization) -> Self {
        Self {
            parameterization,
            ..self
        }
    }

    /// Maps `x` to the standardized S0 coordinate (x − μ₀)/σ.
    pub fn standardize(&self, x: f64) -> f64 {
        (x - self.mu_0) / self.sigma
    }

    /// Inverse of [`StableParams::standardize`].
    pub fn destandardize(&self, z: f64) -> f64 {
        self.mu_0 + self.sigma * z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_domain_violations() {
        assert_eq!(check_params(0.0, 0.0, 1.0, 0.0, 0), 1);
        assert_eq!(check_params(2.1, 0.0, 1.0, 0.0, 0), 1);
        assert_eq!(check_params(1.5, 1.5, 1.0, 0.0, 0), 2);
        assert_eq!(check_params(1.5, 0.0, 0.0, 0.0, 0), 3);
        assert_eq!(check_params(1.5, 0.0, -1.0, 0.0, 0), 3);
        assert_eq!(check_params(1.5, 0.0, 1.0, 0.0, 3), 4);
        assert_eq!(check_params(1.5, 0.0, 1.0, f64::NAN, 0), 5);
    }

    #[test]
    fn test_validate_rejects_nan() {
        assert_eq!(check_params(f64::NAN, 0.0, 1.0, 0.0, 0), 1);
        assert_eq!(check_params(1.0, f64::NAN, 1.0, 0.0, 0), 2);
        assert_eq!(check_params(1.0, 0.0, f64::NAN, 0.0, 0), 3);
        assert_eq!(check_params(1.0, 0.0, f64::INFINITY, 0.0, 0), 3);
    }

    #[test]
    fn test_validate_accepts_boundaries() {
        assert_eq!(check_params(2.0, 1.0, 1e-300, -1e300, 1), 0);
        assert_eq!(check_params(1e-3, -1.0, 5.0, 0.0, 0), 0);
    }

    #[test]
    fn test_reference_location_conversion() {
        let p = StableParams::new(
            1.3278285879842862,
            0.0816835526225623,
            0.0006409442772706084,
            -0.0000252748167384907,
            Parameterization::One,
        )
        .unwrap();
        assert!((p.mu_0() - -0.00011779403879886721).abs() < 1e-15, "mu_0 = {}", p.mu_0());
        assert_eq!(p.mu_1(), -0.0000252748167384907);
        assert_eq!(p.mu(), p.mu_1());
    }

    #[test]
    fn test_alpha_one_location_uses_log_scale() {
        let p = StableParams::new(1.0, 0.5, std::f64::consts::E, 0.0, Parameterization::One)
            .unwrap();
        // μ₀ = 0.5·(2/π)·e·ln e
        let want = 0.5 * FRAC_2_PI * std::f64::consts::E;
        assert!((p.mu_0() - want).abs() < 1e-14);
    }

    #[test]
    fn test_symmetric_locations_coincide() {
        let p = StableParams::new(1.7, 0.0, 3.0, 2.5, Parameterization::Zero).unwrap();
        assert_eq!(p.mu_0(), p.mu_1());
    }

    #[test]
    fn test_from_tag() {
        let p = StableParams::from_tag(1.2, 0.1, 1.0, 0.0, 1).unwrap();
        assert_eq!(p.parameterization(), Parameterization::One);
        assert!(matches!(
            StableParams::from_tag(1.2, 0.1, 1.0, 0.0, -1),
            Err(StableError::InvalidParameterization(-1))
        ));
    }

    #[test]
    fn test_standardize_round_trip() {
        let p = StableParams::new(1.1, -0.4, 2.0, 3.0, Parameterization::Zero).unwrap();
        assert_eq!(p.standardize(3.0), 0.0);
        assert!((p.destandardize(p.standardize(7.25)) - 7.25).abs() < 1e-14);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn conversion_round_trips(
            alpha in 0.1_f64..=2.0,
            beta in -1.0_f64..=1.0,
            sigma in 0.01_f64..100.0,
            mu in -100.0_f64..100.0,
        ) {
            let p = StableParams::new(alpha, beta, sigma, mu, Parameterization::Zero).unwrap();
            let q = StableParams::new(alpha, beta, sigma, p.mu_1(), Parameterization::One).unwrap();
            let tol = 1e-9 * (1.0 + p.mu_1().abs());
            prop_assert!((q.mu_0() - mu).abs() < tol, "{} vs {}", q.mu_0(), mu);
        }

        #[test]
        fn valid_params_pass_validation(
            alpha in 0.01_f64..=2.0,
            beta in -1.0_f64..=1.0,
            sigma in 1e-6_f64..1e6,
            tag in 0_i32..=1,
        ) {
            prop_assert_eq!(check_params(alpha, beta, sigma, 0.0, tag), 0);
        }
    }
}
