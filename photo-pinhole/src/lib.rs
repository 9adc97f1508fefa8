//! This crate plugs into `photo-core` and provides the photogrammetric camera model: a pinhole
//! camera with skew and an arbitrary principal point, followed by an ordered list of lens
//! distortions. It converts world points into distorted pixel coordinates, texture coordinates
//! of the image and normalized device coordinates of a viewport. The distortions can be
//! inverted within a valid radius computed by a secant search.
//!
//! The pixel frame has its origin at the top left corner of the image with `y` pointing down,
//! while the camera frame looks down its negative Z axis with `y` pointing up.

mod camera;
mod distortion;
mod error;
mod settings;
mod undistort;
mod view;

pub use camera::*;
pub use distortion::*;
pub use error::*;
pub use settings::*;
pub use undistort::*;
pub use view::*;

use photo_core::nalgebra::{Matrix3, Point2, Vector2};
use photo_core::Interpolate;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// This contains intrinsic camera parameters as per
/// [this Wikipedia page](https://en.wikipedia.org/wiki/Camera_resectioning#Intrinsic_parameters).
///
/// Focals and principal point are expressed in pixels of the full image.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CameraIntrinsics {
    pub focals: Vector2<f64>,
    pub principal_point: Point2<f64>,
    pub skew: f64,
}

impl CameraIntrinsics {
    /// Creates camera intrinsics that would create an identity intrinsic matrix.
    /// This would imply that the pixel positions have an origin at `0,0`,
    /// the pixel distance unit is the focal length, pixels are square,
    /// and there is no skew.
    pub fn identity() -> Self {
        Self {
            focals: Vector2::new(1.0, 1.0),
            skew: 0.0,
            principal_point: Point2::new(0.0, 0.0),
        }
    }

    pub fn focals(self, focals: Vector2<f64>) -> Self {
        Self { focals, ..self }
    }

    pub fn focal(self, focal: f64) -> Self {
        Self {
            focals: Vector2::new(focal, focal),
            ..self
        }
    }

    pub fn principal_point(self, principal_point: Point2<f64>) -> Self {
        Self {
            principal_point,
            ..self
        }
    }

    pub fn skew(self, skew: f64) -> Self {
        Self { skew, ..self }
    }

    /// The calibration matrix `K`, mapping `(x, -y, -z)` of a camera point to homogeneous
    /// pixel coordinates.
    ///
    /// ```
    /// use photo_core::nalgebra::{Point2, Point3, Vector2, Vector3};
    /// use photo_pinhole::{CameraIntrinsics, PhotogrammetricCamera};
    ///
    /// let intrinsics = CameraIntrinsics::identity()
    ///     .focals(Vector2::new(800.0, 900.0))
    ///     .principal_point(Point2::new(500.0, 400.0))
    ///     .skew(1.7);
    /// let camera = PhotogrammetricCamera::default().intrinsics(intrinsics);
    /// let point = Point3::new(0.3, -0.2, -4.0);
    /// let pixel = intrinsics.matrix() * Vector3::new(point.x, -point.y, -point.z);
    /// let distorted = camera.distort(point).unwrap();
    /// assert!((distorted.xy().coords - pixel.xy() / pixel.z).norm() < 1e-9);
    /// ```
    #[rustfmt::skip]
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.focals.x,  self.skew,      self.principal_point.x,
            0.0,            self.focals.y,  self.principal_point.y,
            0.0,            0.0,            1.0,
        )
    }
}

impl Interpolate for CameraIntrinsics {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        Self {
            focals: self.focals.interpolate(&other.focals, t),
            principal_point: self.principal_point.interpolate(&other.principal_point, t),
            skew: self.skew.interpolate(&other.skew, t),
        }
    }
}
