use arrayvec::ArrayVec;
use core::f64::consts::PI;
use float_ord::FloatOrd;
use log::*;
use photo_core::nalgebra::Vector3;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Even radial polynomial expressed in the squared radius
///
/// $$
/// ρ(r^2) = R_0 ⋅ r^2 + R_1 ⋅ r^4 + R_2 ⋅ r^6
/// $$
///
/// A radially distorted point is `p + ρ(|p - C|²) ⋅ (p - C)`, so the distorted radius is
/// `r ⋅ (1 + ρ(r²))`. That function only stays monotonic up to the first positive root of its
/// derivative, which is what [`RadialPolynomial::bound`] computes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RadialPolynomial(pub Vector3<f64>);

impl RadialPolynomial {
    pub fn new(r0: f64, r1: f64, r2: f64) -> Self {
        Self(Vector3::new(r0, r1, r2))
    }

    /// Takes up to three coefficients from `coefficients`, lowest order first.
    ///
    /// Missing coefficients are zero. Extra coefficients are ignored with a warning naming
    /// `model`.
    pub fn from_slice(model: &str, coefficients: &[f64]) -> Self {
        let [r0, r1, r2] = truncated(model, "radial", coefficients);
        Self::new(r0, r1, r2)
    }

    /// Evaluates `ρ(r²)` in Horner form.
    pub fn evaluate(&self, r2: f64) -> f64 {
        let c = &self.0;
        r2 * (c[0] + r2 * (c[1] + r2 * c[2]))
    }

    /// Derivative of the distorted radius `r ⋅ (1 + ρ(r²))` with respect to `r`, expressed
    /// in `r²`:
    ///
    /// $$
    /// 1 + 3 R_0 ⋅ r^2 + 5 R_1 ⋅ r^4 + 7 R_2 ⋅ r^6
    /// $$
    pub fn radius_derivative(&self, r2: f64) -> f64 {
        let c = &self.0;
        1.0 + r2 * (3.0 * c[0] + r2 * (5.0 * c[1] + r2 * 7.0 * c[2]))
    }

    /// Largest squared radius over which the distorted radius keeps increasing.
    ///
    /// This is the smallest positive root of [`RadialPolynomial::radius_derivative`] or
    /// `f64::INFINITY` when the derivative never vanishes for a positive `r²`.
    ///
    /// ```
    /// use photo_pinhole::RadialPolynomial;
    ///
    /// let barrel = RadialPolynomial::new(-2e-7, 0.0, 0.0);
    /// assert!((barrel.bound() - 1.0 / 6e-7).abs() < 1e-6);
    /// assert_eq!(RadialPolynomial::new(1e-7, 0.0, 0.0).bound(), f64::INFINITY);
    /// ```
    pub fn bound(&self) -> f64 {
        let c = &self.0;
        cubic_roots(7.0 * c[2], 5.0 * c[1], 3.0 * c[0], 1.0)
            .into_iter()
            .filter(|&x| x > 0.0)
            .min_by_key(|&x| FloatOrd(x))
            .unwrap_or(f64::INFINITY)
    }
}

/// Copies up to `N` coefficients, warning when some of them are dropped.
pub(crate) fn truncated<const N: usize>(model: &str, kind: &str, coefficients: &[f64]) -> [f64; N] {
    if coefficients.len() > N {
        warn!(
            "{} distortion supports at most {} {} coefficients, ignoring the extra {}",
            model,
            N,
            kind,
            coefficients.len() - N
        );
    }
    let mut out = [0.0; N];
    for (slot, &c) in out.iter_mut().zip(coefficients) {
        *slot = c;
    }
    out
}

/// Real roots of `a x³ + b x² + c x + d`.
///
/// Falls back to the quadratic and linear solutions when the leading coefficients vanish.
pub(crate) fn cubic_roots(a: f64, b: f64, c: f64, d: f64) -> ArrayVec<f64, 3> {
    if a == 0.0 {
        return quadratic_roots(b, c, d);
    }
    let mut roots = ArrayVec::new();

    // Depressed cubic t³ + p t + q with x = t - b / 3a.
    let shift = -b / (3.0 * a);
    let p = c / a - b * b / (3.0 * a * a);
    let q = 2.0 * b * b * b / (27.0 * a * a * a) - b * c / (3.0 * a * a) + d / a;

    if p == 0.0 {
        roots.push((-q).cbrt() + shift);
        return roots;
    }

    let discriminant = q * q / 4.0 + p * p * p / 27.0;
    if discriminant > 0.0 {
        let s = discriminant.sqrt();
        roots.push((-q / 2.0 + s).cbrt() + (-q / 2.0 - s).cbrt() + shift);
    } else {
        // Three real roots, p is negative here.
        let m = 2.0 * (-p / 3.0).sqrt();
        let phi = (3.0 * q / (2.0 * p) * (-3.0 / p).sqrt())
            .clamp(-1.0, 1.0)
            .acos();
        for k in 0..3 {
            roots.push(m * ((phi - 2.0 * PI * k as f64) / 3.0).cos() + shift);
        }
    }
    roots
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> ArrayVec<f64, 3> {
    let mut roots = ArrayVec::new();
    if a == 0.0 {
        if b != 0.0 {
            roots.push(-c / b);
        }
        return roots;
    }
    let delta = b * b - 4.0 * a * c;
    if delta == 0.0 {
        roots.push(-b / (2.0 * a));
    } else if delta > 0.0 {
        let s = delta.sqrt();
        roots.push((-b - s) / (2.0 * a));
        roots.push((-b + s) / (2.0 * a));
    }
    roots
}
