//! Special mathematical functions.
//!
//! Numerical approximations of the functions the closed-form stable
//! cases and the asymptotic expansions need: Γ, the error function and
//! the standard normal distribution.

/// 1/√(2π) ≈ 0.3989422804014327
pub(crate) const FRAC_1_SQRT_2PI: f64 = 0.3989422804014326779399460599343818684758586311649;

/// ln √π = ln Γ(1/2)
const LN_SQRT_PI: f64 = 0.5723649429247000870717136756012478164166;

/// erf(x) rounds to ±1 beyond this.
const ERF_SATURATION: f64 = 6.0;

/// erfc(x) is below the smallest subnormal beyond this.
const ERFC_UNDERFLOW: f64 = 27.3;

/// Standard normal PDF φ(x) = (1/√(2π)) exp(-x²/2).
///
/// # Examples
/// ```
/// use u_stable::special::standard_normal_pdf;
/// let peak = standard_normal_pdf(0.0);
/// assert!((peak - 0.3989422804014327).abs() < 1e-15);
/// ```
pub fn standard_normal_pdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF Φ(x) = ½ erfc(−x/√2).
///
/// Computed through [`erfc`], so both tails keep full relative precision.
///
/// # Examples
/// ```
/// use u_stable::special::standard_normal_cdf;
/// assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-15);
/// assert!((standard_normal_cdf(1.96) - 0.9750021048517795).abs() < 1e-14);
/// ```
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Inverse standard normal CDF (quantile function).
///
/// Given a probability `p ∈ (0, 1)`, returns `z` such that `Φ(z) = p`.
///
/// # Algorithm
/// Abramowitz & Stegun formula 26.2.23 gives a starting point accurate to
/// 4.5 × 10⁻⁴, which two Halley steps against [`standard_normal_cdf`]
/// polish to near machine precision.
///
/// Reference: Abramowitz & Stegun (1964), *Handbook of Mathematical
/// Functions*, formula 26.2.23, p. 933.
///
/// # Returns
/// - `f64::NAN` if `p` is outside `[0, 1]` or NaN.
/// - `f64::NEG_INFINITY` if `p == 0.0`.
/// - `f64::INFINITY` if `p == 1.0`.
///
/// # Examples
/// ```
/// use u_stable::special::inverse_normal_cdf;
/// assert!(inverse_normal_cdf(0.5).abs() < 1e-12);
/// assert!((inverse_normal_cdf(0.975) - 1.959963984540054).abs() < 1e-9);
/// ```
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    // Work in the lower half so the Halley residual is a small probability.
    let (q, sign) = if p > 0.5 { (1.0 - p, 1.0) } else { (p, -1.0) };

    let t = (-2.0 * q.ln()).sqrt();
    const C0: f64 = 2.515517;
    const C1: f64 = 0.802853;
    const C2: f64 = 0.010328;
    const D1: f64 = 1.432788;
    const D2: f64 = 0.189269;
    const D3: f64 = 0.001308;
    let mut z = -(t - (C0 + C1 * t + C2 * t * t) / (1.0 + D1 * t + D2 * t * t + D3 * t * t * t));

    for _ in 0..2 {
        let e = standard_normal_cdf(z) - q;
        let u = e / standard_normal_pdf(z);
        if !u.is_finite() {
            break;
        }
        z -= u / (1.0 + 0.5 * z * u);
    }

    -sign * z
}

/// Lanczos approximation of ln Γ(x).
///
/// Reference: Lanczos (1964), "A Precision Approximation of the Gamma
/// Function", *SIAM Journal on Numerical Analysis* 1(1).
///
/// # Accuracy
/// Relative error < 2 × 10⁻¹⁰ for x > 0, typically near 1e-15.
///
/// # Examples
/// ```
/// use u_stable::special::ln_gamma;
/// // Γ(5) = 24
/// assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
/// ```
pub fn ln_gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    const G: f64 = 7.0;

    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &c) in COEFFICIENTS[1..].iter().enumerate() {
        sum += c / (x + i as f64 + 1.0);
    }

    let t = x + G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// Gamma function Γ(x) = exp(ln_gamma(x)).
///
/// # Examples
/// ```
/// use u_stable::special::gamma;
/// // Γ(5) = 4! = 24
/// assert!((gamma(5.0) - 24.0).abs() < 1e-8);
/// // Γ(0.5) = √π
/// assert!((gamma(0.5) - std::f64::consts::PI.sqrt()).abs() < 1e-10);
/// ```
pub fn gamma(x: f64) -> f64 {
    ln_gamma(x).exp()
}

// ============================================================================
// Error Function
// ============================================================================

/// Error function erf(x).
///
/// # Definition
/// ```text
/// erf(x) = (2/√π) ∫₀ˣ exp(-t²) dt = P(1/2, x²)
/// ```
///
/// # Algorithm
/// The regularized incomplete gamma function at a = 1/2: power series for
/// x² < 1.5, Lentz continued fraction for the complement otherwise.
///
/// Reference: Press et al. (2007), *Numerical Recipes*, 3rd ed., §6.2.
///
/// # Examples
/// ```
/// use u_stable::special::erf;
/// assert_eq!(erf(0.0), 0.0);
/// assert!((erf(1.0) - 0.8427007929497149).abs() < 1e-15);
/// ```
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    let sign = x.signum();
    if x.abs() > ERF_SATURATION {
        return sign;
    }
    let s = x * x;
    if s < 1.5 {
        sign * gamma_series(0.5, s, LN_SQRT_PI)
    } else {
        sign * (1.0 - gamma_cf(0.5, s, LN_SQRT_PI))
    }
}

/// Complementary error function erfc(x) = 1 − erf(x).
///
/// Keeps full relative precision for large positive `x`, where
/// `1.0 - erf(x)` would underflow to zero.
///
/// # Examples
/// ```
/// use u_stable::special::erfc;
/// assert!((erfc(0.0) - 1.0).abs() < 1e-15);
/// assert!((erfc(3.0) - 2.209049699858544e-5).abs() < 1e-18);
/// ```
pub fn erfc(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x.abs() >= ERFC_UNDERFLOW {
        return if x > 0.0 { 0.0 } else { 2.0 };
    }
    let s = x * x;
    if s < 1.5 {
        return 1.0 - erf(x);
    }
    let upper = gamma_cf(0.5, s, LN_SQRT_PI);
    if x > 0.0 { upper } else { 2.0 - upper }
}

/// Series expansion for the regularized lower incomplete gamma P(a, x).
fn gamma_series(a: f64, x: f64, ln_gamma_a: f64) -> f64 {
    let mut term = 1.0 / a;
    let mut sum = term;
    let mut ap = a;
    for _ in 0..300 {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * f64::EPSILON {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma_a).exp()
}

/// Continued fraction for the upper incomplete gamma Q(a, x) = 1 − P(a, x).
fn gamma_cf(a: f64, x: f64, ln_gamma_a: f64) -> f64 {
    const TINY: f64 = 1e-300;
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=300 {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < f64::EPSILON {
            break;
        }
    }
    h * (-x + a * x.ln() - ln_gamma_a).exp()
}
