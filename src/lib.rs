//! # u-stable
//!
//! Alpha-stable distributions: density, distribution function, quantiles,
//! random variates and parameter estimation.
//!
//! A stable law S(α, β, σ, μ) has stability index α ∈ (0, 2], skewness
//! β ∈ [−1, 1], scale σ > 0 and a location μ given in one of Nolan's two
//! parameterizations (see [`params`]). Apart from the Gaussian, Cauchy and
//! Lévy cases there is no closed-form density, so values are computed from
//! Nolan's integral representation with adaptive quadrature, switching to
//! the asymptotic tail series far from the mode.
//!
//! ## Modules
//!
//! - [`dist`] — [`StableDist`], the distribution handle
//! - [`params`] — parameter validation and location conversion
//! - [`integrate`] — adaptive Gauss–Kronrod quadrature
//! - [`random`] — seeded Chambers–Mallows–Stuck sampling
//! - [`fit`] — McCulloch and Koutrouvelis estimators
//! - [`config`] — tolerances, thresholds and estimator knobs
//! - [`special`], [`stats`] — supporting numerics
//!
//! ## Example
//!
//! ```
//! use u_stable::{Parameterization, StableDist};
//!
//! let mut dist = StableDist::new(1.7, 0.3, 1.0, 0.0, Parameterization::One).unwrap();
//! let data = dist.sample(2_000, 42);
//! let p = dist.cdf(&[-1.0, 0.0, 1.0]).unwrap();
//! assert!(p[0] < p[1] && p[1] < p[2]);
//!
//! dist.fit(&data).unwrap();
//! assert!((dist.params().alpha() - 1.7).abs() < 0.3);
//! ```
//!
//! ## Design Philosophy
//!
//! - **Both tails computed directly**: P(X ≤ x) and P(X > x) each keep
//!   their relative precision
//! - **Errors, not garbage**: integration and solver failures surface as
//!   [`StableError`] unless an asymptotic approximation covers the point
//! - **Property-based testing**: mathematical invariants verified via proptest

pub mod config;
pub mod dist;
pub mod error;
pub mod fit;
pub mod integrate;
pub mod params;
pub mod random;
pub mod special;
pub mod stats;

mod cumulative;
mod density;
mod kernel;
mod quantile;
mod tail;

pub use config::{FitConfig, FrequencyGrid, QuantileConfig, RegressionWeighting, StableConfig, TailConfig};
pub use density::Estimate;
pub use dist::StableDist;
pub use error::{FitStatus, Param, Result, StableError};
pub use fit::FitReport;
pub use integrate::QuadOptions;
pub use params::{check_params, convert_location, Parameterization, StableParams};
