use crate::{
    valid_radius, CameraError, CameraIntrinsics, Distortion, RadiusBlend, RadiusSettings,
    RadiusSolution, ValidRadius, ViewRect,
};
use core::f64::consts::PI;
use log::*;
use photo_core::nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};
use photo_core::{CameraPose, Interpolate, Pose};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The matrices derived from the calibration of a [`PhotogrammetricCamera`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ProjectionMatrices {
    /// Camera frame to undistorted pixels, with the OpenGL depth convention in z.
    pub pre_projection: Matrix4<f64>,
    /// Distorted pixels to texture coordinates of the view rectangle.
    pub texture: Matrix4<f64>,
    /// Distorted pixels to normalized device coordinates, including zoom and aspect.
    pub post_projection: Matrix4<f64>,
    /// `post_projection * pre_projection`, which neglects the distortions.
    pub projection: Matrix4<f64>,
}

impl Default for ProjectionMatrices {
    fn default() -> Self {
        Self {
            pre_projection: Matrix4::identity(),
            texture: Matrix4::identity(),
            post_projection: Matrix4::identity(),
            projection: Matrix4::identity(),
        }
    }
}

/// Computes the pinhole projection from the camera frame to pixels.
///
/// The camera looks down its negative Z axis with y up, pixels have y down. Depth is mapped
/// to `[-1, 1]` between `near` and `far` after the homogeneous divide.
#[rustfmt::skip]
pub fn pre_projection_matrix(intrinsics: &CameraIntrinsics, near: f64, far: f64) -> Matrix4<f64> {
    let c = -(far + near) / (far - near);
    let d = -2.0 * far * near / (far - near);
    let f = &intrinsics.focals;
    let p = &intrinsics.principal_point;
    Matrix4::new(
        f.x,  -intrinsics.skew,  -p.x,  0.0,
        0.0,  -f.y,              -p.y,  0.0,
        0.0,  0.0,               c,     d,
        0.0,  0.0,               -1.0,  0.0,
    )
}

pub fn texture_matrix(view: &ViewRect, image_matrix: &Matrix4<f64>) -> Matrix4<f64> {
    let scale = Vector3::new(1.0 / view.full_size.x, 1.0 / view.full_size.y, 1.0);
    let texture = Matrix4::new_nonuniform_scaling(&scale) * image_matrix;
    match view.crop_matrix() {
        Some(crop) => crop * texture,
        None => texture,
    }
}

/// Computes the mapping of distorted pixels into normalized device coordinates.
///
/// The view rectangle is letterboxed into a viewport of the given `aspect` and then scaled by
/// `zoom`.
pub fn post_projection_matrix(
    view: &ViewRect,
    aspect: f64,
    zoom: f64,
    texture: &Matrix4<f64>,
) -> Matrix4<f64> {
    let ratio = aspect / view.texture_aspect();
    let mut zoom = Vector2::new(zoom, zoom);
    if ratio > 1.0 {
        zoom.x /= ratio;
    } else {
        zoom.y *= ratio;
    }
    Matrix4::new_nonuniform_scaling(&Vector3::new(zoom.x, zoom.y, 1.0)) * ndc_matrix() * texture
}

#[rustfmt::skip]
fn ndc_matrix() -> Matrix4<f64> {
    Matrix4::new(
        2.0,  0.0,   0.0,  -1.0,
        0.0,  -2.0,  0.0,  1.0,
        0.0,  0.0,   1.0,  0.0,
        0.0,  0.0,   0.0,  1.0,
    )
}

fn transform(matrix: &Matrix4<f64>, point: Point3<f64>) -> Option<Point3<f64>> {
    Point3::from_homogeneous(matrix * point.to_homogeneous())
}

/// A calibrated camera with lens distortions.
///
/// The public fields hold the calibration. After changing any of them, call
/// [`PhotogrammetricCamera::update_projection_matrix`] so that the cached
/// [`ProjectionMatrices`] follow.
///
/// ```
/// use photo_core::nalgebra::{Point2, Point3, Vector2};
/// use photo_pinhole::{Distortion, PhotogrammetricCamera, RadialDistortion};
///
/// let center = Point2::new(512.0, 384.0);
/// let camera = PhotogrammetricCamera::new(Vector2::new(1000.0, 1000.0), Vector2::new(1024, 768))
///     .distortions(vec![Distortion::Radial(RadialDistortion::new(center, &[-2e-7]))]);
/// // A point straight ahead hits the principal point, which is also the distortion center.
/// let pixel = camera.distort(Point3::new(0.0, 0.0, -10.0)).unwrap();
/// assert!((pixel.xy() - center).norm() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PhotogrammetricCamera {
    pub name: String,
    pub intrinsics: CameraIntrinsics,
    pub view: ViewRect,
    pub near: f64,
    pub far: f64,
    /// Aspect ratio of the viewport the camera renders to.
    pub aspect: f64,
    pub zoom: f64,
    /// Height in millimeters of the film, only used by the focal length conversions.
    pub film_gauge: f64,
    /// Projective correction applied to distorted pixels before texturing.
    pub image_matrix: Matrix4<f64>,
    /// Applied in order after the pinhole projection.
    pub distortions: Vec<Distortion>,
    pub pose: CameraPose,
    pub radius: ValidRadius,
    pub radius_settings: RadiusSettings,
    matrices: ProjectionMatrices,
}

impl PhotogrammetricCamera {
    /// A camera without distortion whose principal point is at the center of the image and
    /// whose viewport has the aspect ratio of the image.
    pub fn new(focals: Vector2<f64>, image_size: Vector2<u32>) -> Self {
        let size: Vector2<f64> = image_size.cast();
        let mut camera = Self {
            name: String::new(),
            intrinsics: CameraIntrinsics::identity()
                .focals(focals)
                .principal_point((size * 0.5).into()),
            view: ViewRect::full(size),
            near: 0.1,
            far: 2000.0,
            aspect: size.x / size.y,
            zoom: 1.0,
            film_gauge: 35.0,
            image_matrix: Matrix4::identity(),
            distortions: Vec::new(),
            pose: CameraPose::identity(),
            radius: ValidRadius::default(),
            radius_settings: RadiusSettings::default(),
            matrices: ProjectionMatrices::default(),
        };
        camera.update_projection_matrix();
        camera
    }

    #[must_use]
    pub fn name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    #[must_use]
    pub fn intrinsics(self, intrinsics: CameraIntrinsics) -> Self {
        Self { intrinsics, ..self }.updated()
    }

    #[must_use]
    pub fn principal_point(self, principal_point: Point2<f64>) -> Self {
        let intrinsics = self.intrinsics.principal_point(principal_point);
        self.intrinsics(intrinsics)
    }

    #[must_use]
    pub fn skew(self, skew: f64) -> Self {
        let intrinsics = self.intrinsics.skew(skew);
        self.intrinsics(intrinsics)
    }

    #[must_use]
    pub fn distortions(self, distortions: Vec<Distortion>) -> Self {
        Self {
            distortions,
            ..self
        }
    }

    #[must_use]
    pub fn pose(self, pose: CameraPose) -> Self {
        Self { pose, ..self }
    }

    #[must_use]
    pub fn near_far(self, near: f64, far: f64) -> Self {
        Self { near, far, ..self }.updated()
    }

    #[must_use]
    pub fn aspect(self, aspect: f64) -> Self {
        Self { aspect, ..self }.updated()
    }

    #[must_use]
    pub fn image_matrix(self, image_matrix: Matrix4<f64>) -> Self {
        Self {
            image_matrix,
            ..self
        }
        .updated()
    }

    #[must_use]
    pub fn radius_settings(self, radius_settings: RadiusSettings) -> Self {
        Self {
            radius_settings,
            ..self
        }
    }

    fn updated(mut self) -> Self {
        self.update_projection_matrix();
        self
    }

    pub fn matrices(&self) -> &ProjectionMatrices {
        &self.matrices
    }

    /// Checks that a projection can be built from the current state.
    pub fn validate(&self) -> Result<(), CameraError> {
        let (near, far) = (self.near, self.far);
        if !(far > near) {
            return Err(CameraError::DegenerateFrustum { near, far });
        }
        let f = self.intrinsics.focals;
        if f.x == 0.0 || f.y == 0.0 || !f.x.is_finite() || !f.y.is_finite() {
            return Err(CameraError::InvalidFocal { x: f.x, y: f.y });
        }
        let full = self.view.full_size;
        if !(full.x > 0.0 && full.y > 0.0) {
            return Err(CameraError::EmptyImage {
                width: full.x,
                height: full.y,
            });
        }
        let size = self.view.size;
        if self.view.enabled && !(size.x > 0.0 && size.y > 0.0) {
            return Err(CameraError::EmptyView {
                width: size.x,
                height: size.y,
            });
        }
        if !(self.aspect > 0.0 && self.aspect.is_finite()) {
            return Err(CameraError::InvalidAspect(self.aspect));
        }
        Ok(())
    }

    /// Recomputes the [`ProjectionMatrices`] or reports why they cannot be built, in which
    /// case the previous matrices are kept.
    pub fn try_update_projection_matrix(&mut self) -> Result<(), CameraError> {
        self.validate()?;
        let pre_projection = pre_projection_matrix(&self.intrinsics, self.near, self.far);
        let texture = texture_matrix(&self.view, &self.image_matrix);
        let post_projection = post_projection_matrix(&self.view, self.aspect, self.zoom, &texture);
        self.matrices = ProjectionMatrices {
            pre_projection,
            texture,
            post_projection,
            projection: post_projection * pre_projection,
        };
        Ok(())
    }

    /// Same as [`PhotogrammetricCamera::try_update_projection_matrix`], logging failures.
    pub fn update_projection_matrix(&mut self) {
        if let Err(e) = self.try_update_projection_matrix() {
            warn!(
                "keeping the previous projection of camera {:?}: {}",
                self.name, e
            );
        }
    }

    /// Maps a world point to pixel coordinates of the distorted image.
    ///
    /// `z` holds the depth mapped into `[-1, 1]` between the near and far planes. Returns
    /// `None` for points in the plane of the camera center.
    pub fn distort(&self, point: Point3<f64>) -> Option<Point3<f64>> {
        let local = self.pose.world_to_camera().transform(point);
        let projected = transform(&self.matrices.pre_projection, local)?;
        let pixel = self
            .distortions
            .iter()
            .fold(projected.xy(), |p, distortion| distortion.project(p));
        Some(Point3::new(pixel.x, pixel.y, projected.z))
    }

    /// Maps a world point to texture coordinates of the view rectangle, `(0, 0)` being the top
    /// left corner of the image.
    pub fn texture(&self, point: Point3<f64>) -> Option<Point3<f64>> {
        transform(&self.matrices.texture, self.distort(point)?)
    }

    /// Maps a world point to normalized device coordinates.
    pub fn project(&self, point: Point3<f64>) -> Option<Point3<f64>> {
        transform(&self.matrices.post_projection, self.distort(point)?)
    }

    /// Vertical field of view of the full image in degrees.
    pub fn fov(&self) -> f64 {
        self.view.full_size.y.atan2(2.0 * self.intrinsics.focals.y) * 360.0 / PI
    }

    /// Sets both focals so that the full image spans `fov` degrees vertically.
    pub fn set_fov(&mut self, fov: f64) {
        let focal = 0.5 * self.view.full_size.y / (fov * PI / 360.0).tan();
        self.intrinsics.focals = Vector2::new(focal, focal);
        self.update_projection_matrix();
    }

    /// Vertical field of view in degrees once the zoom is applied.
    pub fn effective_fov(&self) -> f64 {
        self.view
            .full_size
            .y
            .atan2(2.0 * self.intrinsics.focals.y * self.zoom)
            * 360.0
            / PI
    }

    pub fn film_height(&self) -> f64 {
        self.film_gauge / self.aspect.max(1.0)
    }

    /// Focal length in millimeters of the film.
    pub fn focal_length(&self) -> f64 {
        self.intrinsics.focals.y * self.film_height() / self.view.full_size.y
    }

    pub fn set_focal_length(&mut self, focal_length: f64) {
        let focal = focal_length * self.view.full_size.y / self.film_height();
        self.intrinsics.focals = Vector2::new(focal, focal);
        self.update_projection_matrix();
    }

    /// Computes and stores the radii within which the distortions can be trusted.
    pub fn set_distortion_radius(&mut self) -> RadiusSolution {
        let solution = valid_radius(
            &self.distortions,
            self.view.full_size,
            &self.radius_settings,
        );
        self.radius = solution.radius;
        solution
    }

    /// Inverts the radial part of the distortion of a pixel.
    ///
    /// This requires a single distortion and a radius computed by
    /// [`PhotogrammetricCamera::set_distortion_radius`]. A camera without distortion returns
    /// the pixel unchanged.
    pub fn undistort(&self, pixel: Point2<f64>) -> Option<Point2<f64>> {
        match self.distortions.as_slice() {
            [] => Some(pixel),
            [distortion] => distortion.undistort(pixel, self.radius.r2max, &self.radius_settings),
            _ => {
                debug!(
                    "camera {:?} chains {} distortions, which cannot be inverted",
                    self.name,
                    self.distortions.len()
                );
                None
            }
        }
    }

    /// Camera part of the way from `self` to `to`.
    ///
    /// The pose is interpolated along the shortest arc and every calibration value
    /// linearly. The distortions stay those of `self` while the valid radius follows `blend`,
    /// so that the distortions fade out of view before the cameras differ too much.
    pub fn lerp(&self, to: &Self, t: f64, blend: &RadiusBlend) -> Self {
        let r2max = self.radius.r2max.interpolate(&to.radius.r2max, t);
        let r2img = blend
            .r2img(self.radius.r2img, to.radius.r2img, t)
            .min(r2max);
        let mut camera = Self {
            name: self.name.clone(),
            intrinsics: self.intrinsics.interpolate(&to.intrinsics, t),
            view: self.view.interpolate(&to.view, t),
            near: self.near.interpolate(&to.near, t),
            far: self.far.interpolate(&to.far, t),
            aspect: self.aspect.interpolate(&to.aspect, t),
            zoom: self.zoom.interpolate(&to.zoom, t),
            film_gauge: self.film_gauge,
            image_matrix: self.image_matrix.interpolate(&to.image_matrix, t),
            distortions: self.distortions.clone(),
            pose: self.pose.interpolate(&to.pose, t),
            radius: ValidRadius { r2img, r2max },
            radius_settings: self.radius_settings,
            matrices: self.matrices,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Copies the whole calibration and pose of `source`.
    pub fn set_from(&mut self, source: &Self) {
        self.clone_from(source);
        self.update_projection_matrix();
    }
}

impl Default for PhotogrammetricCamera {
    fn default() -> Self {
        Self::new(Vector2::new(1024.0, 1024.0), Vector2::new(1024, 1024))
    }
}
