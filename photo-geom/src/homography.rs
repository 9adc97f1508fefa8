use float_ord::FloatOrd;
use log::*;
use photo_core::nalgebra::{Matrix3, Point2, SMatrix, SVector};
use photo_pinhole::{Distortion, PhotogrammetricCamera, RadiusSettings};
use thiserror::Error;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Smallest ratio between the extreme eigenvalues of the normal equations that is still solved.
const MIN_RECIPROCAL_CONDITION: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HomographyError {
    #[error("sample points are too close together to be normalized")]
    DegenerateSamples,
    #[error("normal equations are singular")]
    Singular,
    #[error("fitted homography is not finite")]
    NotFinite,
}

/// A projective mapping of distorted and undistorted pixels, along with its inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Homography {
    /// Undistorted to distorted pixels.
    pub h: Matrix3<f64>,
    /// Distorted to undistorted pixels.
    pub inv_h: Matrix3<f64>,
}

impl Homography {
    pub fn identity() -> Self {
        Self {
            h: Matrix3::identity(),
            inv_h: Matrix3::identity(),
        }
    }

    /// Fits the homography extrapolating the distortion of `camera` beyond its valid radius.
    ///
    /// Cameras that do not have exactly one distortion, or whose valid radius was not
    /// computed, get the identity. A fit that fails is logged and replaced by the identity.
    pub fn from_camera(camera: &PhotogrammetricCamera) -> Self {
        let (distortion, center) = match camera.distortions.as_slice() {
            [distortion] => match distortion.center() {
                Some(center) if camera.radius.r2img > 0.0 => (distortion, center),
                _ => return Self::identity(),
            },
            _ => return Self::identity(),
        };
        let r = camera.radius.r2img.sqrt();
        let undistorted = [
            Point2::new(center.x, center.y + r),
            Point2::new(center.x + r, center.y),
            Point2::new(center.x, center.y - r),
            Point2::new(center.x - r, center.y),
        ];
        let distorted = undistorted.map(|p| distortion.project(p));
        Self {
            h: fit_or_identity(&camera.name, &undistorted, &distorted),
            inv_h: fit_or_identity(&camera.name, &distorted, &undistorted),
        }
    }

    /// Maps an undistorted pixel to a distorted pixel.
    pub fn distort(&self, point: Point2<f64>) -> Option<Point2<f64>> {
        apply(&self.h, point)
    }

    /// Maps a distorted pixel to an undistorted pixel.
    pub fn undistort(&self, point: Point2<f64>) -> Option<Point2<f64>> {
        apply(&self.inv_h, point)
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

fn fit_or_identity(
    name: &str,
    source: &[Point2<f64>; 4],
    target: &[Point2<f64>; 4],
) -> Matrix3<f64> {
    match fit_homography(source, target) {
        Ok(h) => h,
        Err(e) => {
            warn!("using an identity homography for camera {:?}: {}", name, e);
            Matrix3::identity()
        }
    }
}

/// Applies a homography to a point, `None` when the point is sent to infinity.
pub fn apply(h: &Matrix3<f64>, point: Point2<f64>) -> Option<Point2<f64>> {
    Point2::from_homogeneous(h * point.to_homogeneous())
}

/// Fits the homography `H` with `H[(2, 2)] == 1` sending each `source` point onto the matching
/// `target` point.
///
/// The 8x8 linear system is built on Hartley normalized coordinates and solved through its
/// normal equations.
///
/// ```
/// use photo_core::nalgebra::{Matrix3, Point2};
/// use photo_geom::{apply, fit_homography};
///
/// let source = [
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(1.0, 1.0),
///     Point2::new(0.0, 1.0),
/// ];
/// let target = source.map(|p| Point2::new(2.0 * p.x + 3.0, p.y - 1.0));
/// let h = fit_homography(&source, &target).unwrap();
/// let p = apply(&h, Point2::new(0.5, 0.25)).unwrap();
/// assert!((p - Point2::new(4.0, -0.75)).norm() < 1e-9);
/// ```
pub fn fit_homography(
    source: &[Point2<f64>; 4],
    target: &[Point2<f64>; 4],
) -> Result<Matrix3<f64>, HomographyError> {
    let (source_n, t_source) = normalize(source).ok_or(HomographyError::DegenerateSamples)?;
    let (target_n, t_target) = normalize(target).ok_or(HomographyError::DegenerateSamples)?;

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for (i, (s, t)) in source_n.iter().zip(target_n.iter()).enumerate() {
        let (x, y, u, v) = (s.x, s.y, t.x, t.y);
        let r0 = 2 * i;
        let r1 = r0 + 1;

        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let ata = a.transpose() * a;
    let eigenvalues = ata.symmetric_eigenvalues();
    let largest = eigenvalues.iter().map(|&e| FloatOrd(e.abs())).max();
    let smallest = eigenvalues.iter().map(|&e| FloatOrd(e.abs())).min();
    match (smallest, largest) {
        (Some(FloatOrd(smallest)), Some(FloatOrd(largest)))
            if smallest > MIN_RECIPROCAL_CONDITION * largest => {}
        _ => return Err(HomographyError::Singular),
    }
    let ata_inv = ata.try_inverse().ok_or(HomographyError::Singular)?;
    let x = ata_inv * a.transpose() * b;

    let h_n = Matrix3::new(x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7], 1.0);
    let t_target_inv = t_target
        .try_inverse()
        .ok_or(HomographyError::DegenerateSamples)?;
    let mut h = t_target_inv * h_n * t_source;
    let scale = h[(2, 2)];
    if scale.abs() > f64::EPSILON {
        h /= scale;
    }
    if h.iter().all(|e| e.is_finite()) {
        Ok(h)
    } else {
        Err(HomographyError::NotFinite)
    }
}

/// Translates the points to their centroid and scales them to an average distance of `sqrt(2)`.
fn normalize(points: &[Point2<f64>; 4]) -> Option<([Point2<f64>; 4], Matrix3<f64>)> {
    let centroid = points
        .iter()
        .fold(Point2::<f64>::origin(), |c, p| c + p.coords / 4.0);
    let mean_distance = points.iter().map(|p| (p - centroid).norm()).sum::<f64>() / 4.0;
    if !mean_distance.is_finite() || mean_distance <= f64::EPSILON {
        return None;
    }
    let scale = 2.0f64.sqrt() / mean_distance;
    let t = Matrix3::new(
        scale,
        0.0,
        -scale * centroid.x,
        0.0,
        scale,
        -scale * centroid.y,
        0.0,
        0.0,
        1.0,
    );
    let normalized = points.map(|p| Point2::from((p - centroid) * scale));
    Some((normalized, t))
}

/// The distortion of a camera, replaced by its homography beyond the valid radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrapolatedDistortion {
    pub distortion: Distortion,
    pub r2img: f64,
    pub homography: Homography,
    pub settings: RadiusSettings,
}

impl ExtrapolatedDistortion {
    /// `None` unless the camera has exactly one distortion.
    pub fn from_camera(camera: &PhotogrammetricCamera) -> Option<Self> {
        match camera.distortions.as_slice() {
            [distortion] => Some(Self {
                distortion: *distortion,
                r2img: camera.radius.r2img,
                homography: Homography::from_camera(camera),
                settings: camera.radius_settings,
            }),
            _ => None,
        }
    }

    /// Distorts an undistorted pixel, with the homography taking over outside of the valid
    /// radius.
    pub fn distort(&self, point: Point2<f64>) -> Option<Point2<f64>> {
        let center = match self.distortion.center() {
            Some(center) => center,
            None => return Some(point),
        };
        if (point - center).norm_squared() <= self.r2img {
            Some(self.distortion.project(point))
        } else {
            self.homography.distort(point)
        }
    }

    /// Undistorts a distorted pixel, using the inverse homography where the valid radius does
    /// not reach.
    ///
    /// Inside the valid radius only the radial part of the distortion is inverted.
    pub fn undistort(&self, point: Point2<f64>) -> Option<Point2<f64>> {
        self.distortion
            .undistort(point, self.r2img, &self.settings)
            .or_else(|| self.homography.undistort(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use photo_core::nalgebra::{Matrix2, Vector2};
    use photo_pinhole::RadialDistortion;

    fn square() -> [Point2<f64>; 4] {
        [
            Point2::new(10.0, 10.0),
            Point2::new(200.0, 15.0),
            Point2::new(190.0, 180.0),
            Point2::new(5.0, 170.0),
        ]
    }

    fn barrel_camera() -> PhotogrammetricCamera {
        let center = Point2::new(512.0, 384.0);
        let mut camera =
            PhotogrammetricCamera::new(Vector2::new(1000.0, 1000.0), Vector2::new(1024, 768))
                .distortions(vec![Distortion::Radial(RadialDistortion::new(
                    center,
                    &[-2e-7],
                ))]);
        camera.set_distortion_radius();
        camera
    }

    #[test]
    fn recovers_affine_map() {
        let m = Matrix2::new(1.2, -0.3, 0.4, 0.9);
        let t = Vector2::new(-7.0, 12.5);
        let source = square();
        let target = source.map(|p| Point2::from(m * p.coords + t));
        let h = fit_homography(&source, &target).unwrap();
        #[rustfmt::skip]
        let expected = Matrix3::new(
            1.2, -0.3, -7.0,
            0.4,  0.9, 12.5,
            0.0,  0.0,  1.0,
        );
        assert_relative_eq!(h, expected, epsilon = 1e-7);

        let inv_h = fit_homography(&target, &source).unwrap();
        let product = h * inv_h;
        assert_relative_eq!(product / product[(2, 2)], Matrix3::identity(), epsilon = 1e-7);
        assert_relative_eq!(inv_h * h, Matrix3::identity(), epsilon = 1e-7);
    }

    #[test]
    fn recovers_projective_map() {
        #[rustfmt::skip]
        let expected = Matrix3::new(
            0.9,   0.1,   5.0,
            -0.2,  1.1,   -3.0,
            1e-4,  -2e-4, 1.0,
        );
        let source = square();
        let target = source.map(|p| apply(&expected, p).unwrap());
        let h = fit_homography(&source, &target).unwrap();
        assert_relative_eq!(h, expected, epsilon = 1e-7);
    }

    #[test]
    fn degenerate_samples() {
        let source = square();
        let target = [Point2::new(3.0, 4.0); 4];
        assert_eq!(
            fit_homography(&source, &target),
            Err(HomographyError::DegenerateSamples)
        );
        let collinear = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 3.0),
        ];
        assert_eq!(
            fit_homography(&collinear, &square()),
            Err(HomographyError::Singular)
        );
    }

    #[test]
    fn camera_homographies_are_mutual_inverses() {
        let homography = Homography::from_camera(&barrel_camera());
        let product = homography.h * homography.inv_h;
        assert_relative_eq!(product / product[(2, 2)], Matrix3::identity(), epsilon = 1e-9);
    }

    #[test]
    fn radial_distortion_extrapolates_as_scaling() {
        let camera = barrel_camera();
        let center = Point2::new(512.0, 384.0);
        let r = camera.radius.r2img.sqrt();
        let homography = Homography::from_camera(&camera);
        let scale = 1.0 - 2e-7 * camera.radius.r2img;
        let far = center + Vector2::new(3.0 * r, -r);
        let expected = center + (far - center) * scale;
        assert_relative_eq!(homography.distort(far).unwrap(), expected, epsilon = 1e-6);
    }

    #[test]
    fn identity_without_single_distortion() {
        let camera = PhotogrammetricCamera::default();
        assert_eq!(Homography::from_camera(&camera), Homography::identity());

        // Radius not computed yet.
        let center = Point2::new(512.0, 384.0);
        let camera = PhotogrammetricCamera::default().distortions(vec![Distortion::Radial(
            RadialDistortion::new(center, &[-2e-7]),
        )]);
        assert_eq!(Homography::from_camera(&camera), Homography::identity());
        assert!(ExtrapolatedDistortion::from_camera(&PhotogrammetricCamera::default()).is_none());
    }

    #[test]
    fn extrapolation_switches_at_valid_radius() {
        let camera = barrel_camera();
        let extrapolated = ExtrapolatedDistortion::from_camera(&camera).unwrap();
        let center = Point2::new(512.0, 384.0);
        let r = camera.radius.r2img.sqrt();

        let inside = center + Vector2::new(0.5 * r, 0.25 * r);
        assert_eq!(
            extrapolated.distort(inside),
            Some(extrapolated.distortion.project(inside))
        );
        let outside = center + Vector2::new(r, r);
        assert_eq!(
            extrapolated.distort(outside),
            extrapolated.homography.distort(outside)
        );
        // The homography agrees with the distortion on the samples.
        let sample = center + Vector2::new(r, 0.0);
        let fitted = extrapolated.homography.distort(sample).unwrap();
        assert_relative_eq!(fitted, extrapolated.distortion.project(sample), epsilon = 1e-6);
    }

    #[test]
    fn extrapolated_round_trip() {
        let extrapolated = ExtrapolatedDistortion::from_camera(&barrel_camera()).unwrap();
        let center = Point2::new(512.0, 384.0);
        for offset in [Vector2::new(1000.0, 200.0), Vector2::new(-300.0, 250.0)] {
            let p = center + offset;
            let undistorted = extrapolated.undistort(p).unwrap();
            let back = extrapolated.distort(undistorted).unwrap();
            assert!((back - p).norm() < 1.0, "{:?} came back as {:?}", p, back);
        }
    }
}
