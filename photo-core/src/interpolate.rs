use nalgebra::{Point, SMatrix, UnitQuaternion};

/// Blends two values of the same type.
///
/// `t = 0` yields `self` and `t = 1` yields `other`. Values of `t` outside of `[0, 1]`
/// extrapolate for the linear implementations.
pub trait Interpolate {
    #[must_use]
    fn interpolate(&self, other: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    #[inline(always)]
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        self + t * (other - self)
    }
}

/// Componentwise linear interpolation, which covers vectors as well as the 4x4 image space
/// correction matrices of a camera.
impl<const R: usize, const C: usize> Interpolate for SMatrix<f64, R, C> {
    #[inline(always)]
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        *self + (*other - *self) * t
    }
}

impl<const D: usize> Interpolate for Point<f64, D> {
    #[inline(always)]
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        *self + (*other - *self) * t
    }
}

impl Interpolate for UnitQuaternion<f64> {
    /// Spherical linear interpolation along the shortest arc.
    ///
    /// Rotations half a turn apart still take a spherical path. Nearly identical rotations, for
    /// which the spherical formula is ill conditioned, fall back to normalized linear
    /// interpolation.
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        self.try_slerp(other, t, f64::EPSILON)
            .unwrap_or_else(|| self.nlerp(other, t))
    }
}
