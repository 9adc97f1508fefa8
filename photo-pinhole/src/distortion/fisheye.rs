use super::polynomial::{truncated, RadialPolynomial};
use super::tangential::tangential_offset;
use photo_core::nalgebra::{Point2, Vector2};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Fisheye lens model working on coordinates normalized by the focal length.
///
/// A normalized offset `(A, B)` of norm `R` is mapped onto the equidistant projection
/// `θ = atan R`, or the equisolid one `2 sin(θ / 2)`, before the radial, affine and
/// decentering corrections are applied. With all coefficients at zero this is *not* the
/// identity: it is the pure equidistant projection, which only agrees with the pinhole at
/// the center.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FishEyeDistortion {
    pub center: Point2<f64>,
    pub focal: f64,
    pub polynomial: RadialPolynomial,
    pub tangential: Vector2<f64>,
    pub affine: Vector2<f64>,
    pub equisolid: bool,
}

impl FishEyeDistortion {
    pub fn new(
        center: Point2<f64>,
        focal: f64,
        radial: &[f64],
        tangential: &[f64],
        affine: &[f64],
    ) -> Self {
        let [p0, p1] = truncated("fisheye", "tangential", tangential);
        let [l0, l1] = truncated("fisheye", "affine", affine);
        Self {
            center,
            focal,
            polynomial: RadialPolynomial::from_slice("fisheye", radial),
            tangential: Vector2::new(p0, p1),
            affine: Vector2::new(l0, l1),
            equisolid: false,
        }
    }

    #[must_use]
    pub fn equisolid(self, equisolid: bool) -> Self {
        Self { equisolid, ..self }
    }

    fn normalized(&self, point: Point2<f64>) -> Vector2<f64> {
        let ab = (point - self.center) / self.focal;
        let r = ab.norm();
        if r == 0.0 {
            return ab;
        }
        let mut theta = r.atan();
        if self.equisolid {
            theta = 2.0 * (theta / 2.0).sin();
        }
        ab * (theta / r)
    }

    pub fn project(&self, point: Point2<f64>) -> Point2<f64> {
        let v = self.normalized(point);
        let radial = 1.0 + self.polynomial.evaluate(v.norm_squared());
        let l = &self.affine;
        let mut q = Vector2::new(v.y * l.y + v.x * (radial + l.x), v.x * l.y + v.y * radial);
        q += tangential_offset(&self.tangential, &v);
        self.center + q * self.focal
    }

    /// Normalization and radial polynomial, without the affine and decentering terms.
    pub fn project_radial(&self, point: Point2<f64>) -> Point2<f64> {
        let v = self.normalized(point);
        self.center + v * ((1.0 + self.polynomial.evaluate(v.norm_squared())) * self.focal)
    }
}
