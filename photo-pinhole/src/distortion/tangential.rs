use super::polynomial::truncated;
use photo_core::nalgebra::{Point2, Vector2};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Decentering distortion on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TangentialDistortion {
    pub center: Point2<f64>,
    pub coefficients: Vector2<f64>,
}

impl TangentialDistortion {
    pub fn new(center: Point2<f64>, coefficients: &[f64]) -> Self {
        let [p0, p1] = truncated("tangential", "tangential", coefficients);
        Self {
            center,
            coefficients: Vector2::new(p0, p1),
        }
    }

    pub fn project(&self, point: Point2<f64>) -> Point2<f64> {
        point + tangential_offset(&self.coefficients, &(point - self.center))
    }
}

/// Brown decentering term for an offset `v` from the distortion center:
///
/// $$
/// ΔP = (P_0 (2x^2 + r^2) + 2 P_1 x y,\ P_1 (2y^2 + r^2) + 2 P_0 x y)
/// $$
pub(crate) fn tangential_offset(p: &Vector2<f64>, v: &Vector2<f64>) -> Vector2<f64> {
    let (x, y) = (v.x, v.y);
    let r2 = x * x + y * y;
    let xy2 = 2.0 * x * y;
    Vector2::new(
        p.x * (2.0 * x * x + r2) + p.y * xy2,
        p.y * (2.0 * y * y + r2) + p.x * xy2,
    )
}
