//! Error taxonomy and native status codes.
//!
//! Every fallible operation in this crate returns [`Result`]. Callers that
//! speak integer status codes (a C binding, a Python shim) can map errors
//! with [`StableError::status_code`] and fit outcomes with
//! [`FitStatus::code`]; zero always means success.

/// A distribution parameter, as named in [`StableError::InvalidParameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    Alpha,
    Beta,
    Sigma,
    Mu,
}

impl Param {
    /// Native status code of a violation of this parameter.
    pub fn code(self) -> i32 {
        match self {
            Param::Alpha => 1,
            Param::Beta => 2,
            Param::Sigma => 3,
            Param::Mu => 5,
        }
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Param::Alpha => "alpha",
            Param::Beta => "beta",
            Param::Sigma => "sigma",
            Param::Mu => "mu",
        })
    }
}

/// Errors raised by the stable distribution engine.
#[derive(Debug, Clone, PartialEq)]
pub enum StableError {
    /// A distribution parameter lies outside its domain.
    InvalidParameter {
        /// The offending parameter.
        param: Param,
        /// The rejected value.
        value: f64,
    },
    /// The parameterization tag is neither 0 nor 1.
    InvalidParameterization(i32),
    /// A probability level outside `[0, 1]` (or NaN) was requested.
    InvalidProbability(f64),
    /// Adaptive quadrature could not reach its tolerance and no asymptotic
    /// approximation covers the evaluation point.
    IntegrationFailure {
        /// Best estimate reached before giving up.
        value: f64,
        /// Absolute error estimate of `value`.
        abs_error: f64,
        /// Number of subdivisions performed.
        subdivisions: usize,
    },
    /// The quantile solver could not bracket or converge on the root.
    ConvergenceFailure {
        /// Target probability.
        probability: f64,
        /// Iterations (or bracket expansions) spent.
        iterations: usize,
    },
    /// Too few finite observations to estimate parameters.
    InsufficientData {
        /// Minimum number of observations required.
        needed: usize,
        /// Number of observations supplied.
        got: usize,
    },
    /// The sample quantiles used for estimation coincide, so no scale can
    /// be derived from the data.
    DegenerateSample,
}

impl StableError {
    /// Integer status code for callers that expect native conventions.
    ///
    /// Parameter-domain violations are positive and match
    /// [`check_params`](crate::params::check_params): alpha 1, beta 2,
    /// sigma 3, parameterization 4, mu 5. Runtime failures are negative.
    pub fn status_code(&self) -> i32 {
        match self {
            StableError::InvalidParameter { param, .. } => param.code(),
            StableError::InvalidParameterization(_) => 4,
            StableError::InvalidProbability(_) => -1,
            StableError::IntegrationFailure { .. } => -2,
            StableError::ConvergenceFailure { .. } => -3,
            StableError::InsufficientData { .. } => -4,
            StableError::DegenerateSample => -5,
        }
    }
}

impl std::fmt::Display for StableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StableError::InvalidParameter { param, value } => {
                write!(f, "invalid parameter {param}={value}")
            }
            StableError::InvalidParameterization(tag) => {
                write!(f, "invalid parameterization {tag}, expected 0 or 1")
            }
            StableError::InvalidProbability(p) => {
                write!(f, "probability {p} is outside [0, 1]")
            }
            StableError::IntegrationFailure {
                value,
                abs_error,
                subdivisions,
            } => write!(
                f,
                "integration did not converge after {subdivisions} subdivisions \
                 (value {value:e}, error estimate {abs_error:e})"
            ),
            StableError::ConvergenceFailure {
                probability,
                iterations,
            } => write!(
                f,
                "quantile solver failed for q={probability} after {iterations} iterations"
            ),
            StableError::InsufficientData { needed, got } => {
                write!(f, "insufficient data: need at least {needed} observations, got {got}")
            }
            StableError::DegenerateSample => {
                write!(f, "sample quantiles coincide, scale cannot be estimated")
            }
        }
    }
}

impl std::error::Error for StableError {}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, StableError>;

/// Non-fatal outcome of a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStatus {
    /// The parameter change fell below the configured tolerance.
    Converged,
    /// The iteration cap was hit; the last estimate is still returned.
    MaxIterationsReached,
}

impl FitStatus {
    /// Native status code: 0 for convergence, 1 for the iteration cap.
    pub fn code(self) -> i32 {
        match self {
            FitStatus::Converged => 0,
            FitStatus::MaxIterationsReached => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_codes_are_positive() {
        let e = StableError::InvalidParameter {
            param: Param::Sigma,
            value: -1.0,
        };
        assert_eq!(e.status_code(), 3);
        let codes: Vec<i32> = [Param::Alpha, Param::Beta, Param::Sigma, Param::Mu]
            .into_iter()
            .map(|param| StableError::InvalidParameter { param, value: f64::NAN }.status_code())
            .collect();
        assert_eq!(codes, vec![1, 2, 3, 5]);
        assert_eq!(StableError::InvalidParameterization(7).status_code(), 4);
    }

    #[test]
    fn test_runtime_codes_are_negative() {
        let errors = [
            StableError::InvalidProbability(1.5),
            StableError::IntegrationFailure {
                value: 0.0,
                abs_error: 1.0,
                subdivisions: 500,
            },
            StableError::ConvergenceFailure {
                probability: 0.3,
                iterations: 100,
            },
            StableError::InsufficientData { needed: 5, got: 2 },
            StableError::DegenerateSample,
        ];
        for e in &errors {
            assert!(e.status_code() < 0, "{e} should map to a negative code");
        }
    }

    #[test]
    fn test_display_mentions_values() {
        let msg = StableError::InvalidParameter {
            param: Param::Alpha,
            value: 2.1,
        }
        .to_string();
        assert!(msg.contains("alpha") && msg.contains("2.1"), "{msg}");
    }

    #[test]
    fn test_fit_status_codes() {
        assert_eq!(FitStatus::Converged.code(), 0);
        assert_eq!(FitStatus::MaxIterationsReached.code(), 1);
    }
}
