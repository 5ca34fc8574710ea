//! Adaptive numerical integration.
//!
//! Globally adaptive Gauss–Kronrod quadrature in the style of QUADPACK's
//! QAGP: the caller supplies breakpoints that isolate the integrand's
//! difficult regions, every piece gets a 21-point Kronrod estimate, and
//! the piece with the largest error estimate is bisected until the total
//! error meets the tolerance or the subdivision budget runs out.
//!
//! When bisection stops paying off (halves that reproduce their parent's
//! value but not a smaller error), the integrand is noise-limited. The run
//! then stops early and flags [`QuadResult::roundoff`], as QUADPACK's
//! `ier = 2` does, so the caller can decide whether the estimate is usable.
//!
//! Reference: Piessens, de Doncker-Kapenga, Überhuber & Kahaner (1983),
//! *QUADPACK: A Subroutine Package for Automatic Integration*, Springer.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::stats::kahan_sum;

/// Options for adaptive quadrature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadOptions {
    /// Relative tolerance (default: 1e-12).
    pub rel_tol: f64,
    /// Absolute tolerance (default: 1e-16).
    pub abs_tol: f64,
    /// Maximum number of bisections (default: 500).
    pub limit: usize,
}

impl Default for QuadOptions {
    fn default() -> Self {
        Self {
            rel_tol: 1e-12,
            abs_tol: 1e-16,
            limit: 500,
        }
    }
}

/// Result of adaptive quadrature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadResult {
    /// Computed integral.
    pub value: f64,
    /// Estimated absolute error.
    pub abs_error: f64,
    /// Number of integrand evaluations.
    pub evaluations: usize,
    /// Number of bisections performed.
    pub subdivisions: usize,
    /// Whether the error estimate met the tolerance.
    pub converged: bool,
    /// Whether subdivision stopped because roundoff in the integrand
    /// limits the attainable accuracy.
    pub roundoff: bool,
}

impl QuadResult {
    /// Whether the estimate can be used: converged, or stopped by roundoff
    /// with an error estimate within [`ROUNDOFF_REL_ERROR`] of the value.
    pub fn accepted(&self) -> bool {
        self.converged || (self.roundoff && self.abs_error <= ROUNDOFF_REL_ERROR * self.value.abs())
    }
}

/// Largest relative error accepted from a roundoff-limited integration.
pub const ROUNDOFF_REL_ERROR: f64 = 1e-8;

/// A bisection whose halves reproduce the parent value to this relative
/// level, without lowering the error, counts towards roundoff.
const ROUNDOFF_AGREEMENT: f64 = 1e-5;

/// Roundoff events tolerated before giving up, as in QUADPACK's QAG:
/// stalled-error bisections, and bisections that grew the error.
const MAX_STALLED: usize = 6;
const MAX_GROWN: usize = 20;

// Kronrod abscissae on [0, 1]; odd indices are the 10-point Gauss nodes.
const XGK: [f64; 11] = [
    0.995657163025808080735527280689003,
    0.973906528517171720077964012084452,
    0.930157491355708226001207180059508,
    0.865063366688984510732096688423493,
    0.780817726586416897063717578345042,
    0.679409568299024406234327365114874,
    0.562757134668604683339000099272694,
    0.433395394129247190799265943165784,
    0.294392862701460198131126603103866,
    0.148874338981631210884826001129720,
    0.000000000000000000000000000000000,
];

const WGK: [f64; 11] = [
    0.011694638867371874278064396062192,
    0.032558162307964727478818972459390,
    0.054755896574351996031381300244580,
    0.075039674810919952767043140916190,
    0.093125454583697605535065465083366,
    0.109387158802297641899210590325805,
    0.123491976262065851077208015759208,
    0.134709217311473325928054001771707,
    0.142775938577060080797094273138717,
    0.147739104901338491374841515972068,
    0.149445554002916905664936468389821,
];

const WG: [f64; 5] = [
    0.066671344308688137593568809893332,
    0.149451349150580593145776339657697,
    0.219086362515982043995534934228163,
    0.269266719309996355091226921569469,
    0.295524224714752870173892994651338,
];

/// One Gauss–Kronrod 10/21 estimate on `[a, b]`.
#[derive(Debug, Clone, Copy)]
struct Piece {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

impl PartialEq for Piece {
    fn eq(&self, other: &Self) -> bool {
        self.error.total_cmp(&other.error) == Ordering::Equal
    }
}

impl Eq for Piece {}

impl PartialOrd for Piece {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Piece {
    fn cmp(&self, other: &Self) -> Ordering {
        self.error.total_cmp(&other.error)
    }
}

/// Applies the 21-point Kronrod rule to `f` on `[a, b]`.
///
/// The error estimate is the QUADPACK heuristic
/// `resasc · min(1, (200·|K − G|/resasc)^1.5)`, floored at 50ε·∫|f|.
/// Non-finite integrand values are treated as zero.
fn gauss_kronrod_21<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> Piece {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let eval = |x: f64| {
        let v = f(x);
        if v.is_finite() { v } else { 0.0 }
    };

    let fc = eval(center);
    let mut res_kronrod = WGK[10] * fc;
    let mut res_gauss = 0.0;
    let mut res_abs = res_kronrod.abs();
    let mut f_minus = [0.0; 10];
    let mut f_plus = [0.0; 10];

    for j in 0..10 {
        let dx = half * XGK[j];
        let f1 = eval(center - dx);
        let f2 = eval(center + dx);
        f_minus[j] = f1;
        f_plus[j] = f2;
        res_kronrod += WGK[j] * (f1 + f2);
        res_abs += WGK[j] * (f1.abs() + f2.abs());
        if j % 2 == 1 {
            res_gauss += WG[j / 2] * (f1 + f2);
        }
    }

    let mean = 0.5 * res_kronrod;
    let mut res_asc = WGK[10] * (fc - mean).abs();
    for j in 0..10 {
        res_asc += WGK[j] * ((f_minus[j] - mean).abs() + (f_plus[j] - mean).abs());
    }

    let value = res_kronrod * half;
    let res_abs = res_abs * half.abs();
    let res_asc = res_asc * half.abs();
    let mut error = ((res_kronrod - res_gauss) * half).abs();
    if res_asc != 0.0 && error != 0.0 {
        error = res_asc * (200.0 * error / res_asc).powf(1.5).min(1.0);
    }
    if res_abs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        error = error.max(50.0 * f64::EPSILON * res_abs);
    }

    Piece { a, b, value, error }
}

/// Integrates `f` over `[points[0], points[last]]`, treating every
/// consecutive pair of `points` as an initial piece.
///
/// `points` must be sorted ascending; empty or reversed pairs are skipped.
/// Convergence means `abs_error ≤ max(abs_tol, rel_tol·|value|)`.
///
/// # Examples
/// ```
/// use u_stable::integrate::{integrate, QuadOptions};
/// // ∫₀^π sin x dx = 2
/// let r = integrate(f64::sin, &[0.0, std::f64::consts::PI], &QuadOptions::default());
/// assert!(r.converged);
/// assert!((r.value - 2.0).abs() < 1e-12);
/// ```
pub fn integrate<F: Fn(f64) -> f64>(f: F, points: &[f64], opts: &QuadOptions) -> QuadResult {
    let mut heap: BinaryHeap<Piece> = points
        .windows(2)
        .filter(|w| w[1] > w[0])
        .map(|w| gauss_kronrod_21(&f, w[0], w[1]))
        .collect();
    let mut evaluations = 21 * heap.len();
    let mut subdivisions = 0;
    let mut frozen: Vec<Piece> = Vec::new();
    let (mut stalled, mut grown) = (0, 0);
    let mut roundoff = false;

    let tolerance = |value: f64| opts.abs_tol.max(opts.rel_tol * value.abs());
    let mut value: f64 = heap.iter().map(|p| p.value).sum();
    let mut error: f64 = heap.iter().map(|p| p.error).sum();

    while error > tolerance(value) && subdivisions < opts.limit {
        let Some(worst) = heap.pop() else { break };
        let mid = 0.5 * (worst.a + worst.b);
        if mid <= worst.a || mid >= worst.b {
            // Interval at floating-point resolution; keep its estimate as is.
            frozen.push(worst);
            continue;
        }
        let left = gauss_kronrod_21(&f, worst.a, mid);
        let right = gauss_kronrod_21(&f, mid, worst.b);
        evaluations += 42;
        subdivisions += 1;
        let halves = left.value + right.value;
        let halves_error = left.error + right.error;
        if (worst.value - halves).abs() <= ROUNDOFF_AGREEMENT * halves.abs()
            && halves_error >= 0.99 * worst.error
        {
            stalled += 1;
        }
        if subdivisions > 10 && halves_error > worst.error {
            grown += 1;
        }
        value += halves - worst.value;
        error += halves_error - worst.error;
        heap.push(left);
        heap.push(right);
        if stalled >= MAX_STALLED || grown >= MAX_GROWN {
            roundoff = error > tolerance(value);
            break;
        }
    }

    let pieces = || heap.iter().chain(frozen.iter());
    let value = kahan_sum(pieces().map(|p| p.value));
    let abs_error = kahan_sum(pieces().map(|p| p.error));
    QuadResult {
        value,
        abs_error,
        evaluations,
        subdivisions,
        converged: abs_error <= tolerance(value),
        roundoff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_polynomial_exact() {
        // GK21 is exact for polynomials well beyond degree 20.
        let r = integrate(|x| x.powi(7) - 3.0 * x * x, &[-1.0, 2.0], &QuadOptions::default());
        let want = (2.0_f64.powi(8) - 1.0) / 8.0 - (8.0 + 1.0);
        assert!((r.value - want).abs() < 1e-12, "got {}", r.value);
        assert_eq!(r.subdivisions, 0);
    }

    #[test]
    fn test_endpoint_singularity() {
        // ∫₀¹ x^{-1/2} dx = 2
        let r = integrate(|x: f64| 1.0 / x.sqrt(), &[0.0, 1.0], &QuadOptions::default());
        assert!(r.converged, "{r:?}");
        assert!((r.value - 2.0).abs() < 1e-10, "got {}", r.value);
    }

    #[test]
    fn test_log_singularity() {
        // ∫₀¹ ln x dx = -1
        let r = integrate(f64::ln, &[0.0, 1.0], &QuadOptions::default());
        assert!((r.value + 1.0).abs() < 1e-11, "got {}", r.value);
    }

    #[test]
    fn test_breakpoints_catch_narrow_spike() {
        let spike = |x: f64| (-1e8 * (x - 0.7321).powi(2)).exp();
        let want = (PI / 1e8).sqrt();

        // No node lands inside the spike without help.
        let blind = integrate(spike, &[0.0, 1.0], &QuadOptions::default());
        assert!(blind.value < 1e-3 * want);

        let r = integrate(
            spike,
            &[0.0, 0.7316, 0.7321, 0.7326, 1.0],
            &QuadOptions::default(),
        );
        assert!(r.converged);
        assert!(((r.value - want) / want).abs() < 1e-10, "got {}", r.value);
    }

    #[test]
    fn test_limit_reports_non_convergence() {
        let opts = QuadOptions {
            rel_tol: 1e-15,
            abs_tol: 0.0,
            limit: 2,
        };
        let r = integrate(|x: f64| (1.0 / x).sin(), &[1e-6, 1.0], &opts);
        assert!(!r.converged);
        assert_eq!(r.subdivisions, 2);
    }

    #[test]
    fn test_noisy_integrand_stops_on_roundoff() {
        // A constant carrying 1e-10 of deterministic jitter: bisection can
        // never push the error below 1e-12.
        let jitter = |x: f64| {
            let h = (x * 129898.233).sin() * 43758.5453;
            h - h.floor() - 0.5
        };
        let opts = QuadOptions::default();
        let r = integrate(|x: f64| 1.0 + 1e-10 * jitter(x), &[0.0, 1.0], &opts);
        assert!(!r.converged, "{r:?}");
        assert!(r.roundoff, "{r:?}");
        assert!(r.subdivisions < opts.limit);
        assert!(r.accepted());
        assert!((r.value - 1.0).abs() < 1e-9, "got {}", r.value);
    }

    #[test]
    fn test_limit_is_not_roundoff() {
        let opts = QuadOptions {
            rel_tol: 1e-15,
            abs_tol: 0.0,
            limit: 2,
        };
        let r = integrate(|x: f64| (1.0 / x).sin(), &[1e-6, 1.0], &opts);
        assert!(!r.roundoff);
        assert!(!r.accepted());
    }

    #[test]
    fn test_empty_and_reversed_pieces_skipped() {
        let r = integrate(|_| 1.0, &[0.0, 0.0, 1.0], &QuadOptions::default());
        assert!((r.value - 1.0).abs() < 1e-15);
        let r = integrate(|_| 1.0, &[1.0, 0.0], &QuadOptions::default());
        assert_eq!(r.value, 0.0);
        assert!(r.converged);
    }

    #[test]
    fn test_non_finite_values_ignored() {
        let r = integrate(
            |x: f64| if x == 0.5 { f64::NAN } else { 1.0 },
            &[0.0, 1.0],
            &QuadOptions::default(),
        );
        // The center node returns NaN and is zeroed; the estimate is
        // off but finite.
        assert!(r.value.is_finite());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn exponential_integral_matches(a in -5.0_f64..5.0, w in 0.01_f64..10.0, k in -3.0_f64..3.0) {
            prop_assume!(k.abs() > 1e-3);
            let r = integrate(|x: f64| (k * x).exp(), &[a, a + w], &QuadOptions::default());
            let want = (k * a).exp() * (k * w).exp_m1() / k;
            prop_assert!(r.converged);
            prop_assert!((r.value - want).abs() <= 1e-11 * want.abs().max(1e-300));
        }

        #[test]
        fn splitting_does_not_change_value(c in 0.05_f64..0.95) {
            let f = |x: f64| (3.0 * x).cos() * x.exp();
            let whole = integrate(f, &[0.0, 1.0], &QuadOptions::default()).value;
            let split = integrate(f, &[0.0, c, 1.0], &QuadOptions::default()).value;
            prop_assert!((whole - split).abs() < 1e-13);
        }
    }
}
