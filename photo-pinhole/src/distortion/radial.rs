use super::polynomial::{truncated, RadialPolynomial};
use super::tangential::tangential_offset;
use photo_core::nalgebra::{Point2, Vector2};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Purely radial distortion around `center`.
///
/// ```
/// use photo_pinhole::RadialDistortion;
/// use photo_core::nalgebra::Point2;
///
/// let distortion = RadialDistortion::new(Point2::new(512.0, 384.0), &[-2e-7]);
/// let p = distortion.project(Point2::new(612.0, 384.0));
/// // 100 px from the center shrinks by 100 * 2e-7 * 100².
/// assert!((p.x - 611.8).abs() < 1e-9);
/// assert_eq!(p.y, 384.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RadialDistortion {
    pub center: Point2<f64>,
    pub polynomial: RadialPolynomial,
    /// Squared radius beyond which the model folds back, see [`RadialPolynomial::bound`].
    pub r2max: f64,
}

impl RadialDistortion {
    pub fn new(center: Point2<f64>, coefficients: &[f64]) -> Self {
        Self::from_polynomial(center, RadialPolynomial::from_slice("radial", coefficients))
    }

    pub fn from_polynomial(center: Point2<f64>, polynomial: RadialPolynomial) -> Self {
        Self {
            center,
            polynomial,
            r2max: polynomial.bound(),
        }
    }

    pub fn project(&self, point: Point2<f64>) -> Point2<f64> {
        let v = point - self.center;
        point + v * self.polynomial.evaluate(v.norm_squared())
    }
}

/// Brown-Conrady distortion as parameterized by photogrammetric software such as MicMac:
/// a radial polynomial, a decentering term and an affinity acting on x.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FraserDistortion {
    pub center: Point2<f64>,
    pub polynomial: RadialPolynomial,
    pub tangential: Vector2<f64>,
    /// `b0` scales x and `b1` shears y into x.
    pub affine: Vector2<f64>,
    pub r2max: f64,
}

impl FraserDistortion {
    pub fn new(center: Point2<f64>, radial: &[f64], tangential: &[f64], affine: &[f64]) -> Self {
        let polynomial = RadialPolynomial::from_slice("fraser", radial);
        let [p0, p1] = truncated("fraser", "tangential", tangential);
        let [b0, b1] = truncated("fraser", "affine", affine);
        Self {
            center,
            polynomial,
            tangential: Vector2::new(p0, p1),
            affine: Vector2::new(b0, b1),
            r2max: polynomial.bound(),
        }
    }

    pub fn project(&self, point: Point2<f64>) -> Point2<f64> {
        let v = point - self.center;
        let radial = self.polynomial.evaluate(v.norm_squared());
        let mut offset = v * radial + tangential_offset(&self.tangential, &v);
        offset.x += self.affine.x * v.x + self.affine.y * v.y;
        point + offset
    }

    /// Only the radially symmetric part of the model.
    pub fn project_radial(&self, point: Point2<f64>) -> Point2<f64> {
        let v = point - self.center;
        point + v * self.polynomial.evaluate(v.norm_squared())
    }
}
