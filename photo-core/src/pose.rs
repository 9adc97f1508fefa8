use crate::Interpolate;
use derive_more::{AsMut, AsRef, From, Into};
use nalgebra::{Isometry3, Matrix4, Point3, UnitQuaternion, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// This trait is implemented by the rigid transforms in this library:
///
/// * [`CameraToWorld`] - Transforms points in the camera frame into the world frame
/// * [`WorldToCamera`] - Transforms points in the world frame into the camera frame
pub trait Pose: From<Isometry3<f64>> + Clone + Copy {
    type Inverse: Pose;

    /// Retrieve the isometry.
    fn isometry(self) -> Isometry3<f64>;

    /// Creates a pose with no change in position or orientation.
    fn identity() -> Self {
        Isometry3::identity().into()
    }

    /// Takes the inverse of the pose.
    fn inverse(self) -> Self::Inverse {
        self.isometry().inverse().into()
    }

    /// Retrieve the homogeneous matrix.
    fn homogeneous(self) -> Matrix4<f64> {
        self.isometry().to_homogeneous()
    }

    /// Transform a point from the input frame of the pose to its output frame.
    fn transform(self, point: Point3<f64>) -> Point3<f64> {
        self.isometry() * point
    }
}

/// The placement of a camera in the world. This maps points expressed relative to the
/// camera into world points.
#[derive(Debug, Clone, Copy, PartialEq, AsMut, AsRef, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CameraToWorld(pub Isometry3<f64>);

impl Pose for CameraToWorld {
    type Inverse = WorldToCamera;

    #[inline(always)]
    fn isometry(self) -> Isometry3<f64> {
        self.into()
    }
}

/// The world as seen from the camera. This maps world points into the camera frame and is
/// often called the view matrix by rendering engines.
#[derive(Debug, Clone, Copy, PartialEq, AsMut, AsRef, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct WorldToCamera(pub Isometry3<f64>);

impl Pose for WorldToCamera {
    type Inverse = CameraToWorld;

    #[inline(always)]
    fn isometry(self) -> Isometry3<f64> {
        self.into()
    }
}

/// Position and orientation of a camera in world space.
///
/// This is stored in the decomposed form rather than as an isometry so that transitions can
/// interpolate the position linearly and the orientation spherically.
///
/// ```
/// use photo_core::nalgebra::{Point3, UnitQuaternion, Vector3};
/// use photo_core::{CameraPose, Pose};
///
/// let pose = CameraPose::identity()
///     .position(Point3::new(1.0, 2.0, 3.0))
///     .orientation(UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.3));
/// let world = Point3::new(0.5, -1.0, 7.0);
/// let local = pose.world_to_camera().transform(world);
/// let back = pose.camera_to_world().transform(local);
/// assert!((back - world).norm() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CameraPose {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl CameraPose {
    /// A camera at the world origin looking down the negative Z axis.
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            orientation: UnitQuaternion::identity(),
        }
    }

    pub fn new(position: Point3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    #[must_use]
    pub fn position(self, position: Point3<f64>) -> Self {
        Self { position, ..self }
    }

    #[must_use]
    pub fn orientation(self, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            orientation,
            ..self
        }
    }

    /// The camera placement as a rigid transform.
    pub fn camera_to_world(&self) -> CameraToWorld {
        CameraToWorld(Isometry3::from_parts(
            self.position.coords.into(),
            self.orientation,
        ))
    }

    /// The inverse of the camera placement, used to bring world points into the camera frame.
    pub fn world_to_camera(&self) -> WorldToCamera {
        self.camera_to_world().inverse()
    }

    /// Unit vector pointing where the camera looks, in world coordinates.
    pub fn view_direction(&self) -> Vector3<f64> {
        self.orientation * -Vector3::z()
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Interpolate for CameraPose {
    /// Linear interpolation of the position and shortest-arc spherical interpolation of the
    /// orientation.
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        Self {
            position: self.position.interpolate(&other.position, t),
            orientation: self.orientation.interpolate(&other.orientation, t),
        }
    }
}
