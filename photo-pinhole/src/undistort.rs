//! Inverse distortion by secant search along rays from the distortion center.
//!
//! All the models in this crate keep a point on the ray from their center when only their
//! radial part is considered, so inverting them reduces to a one dimensional search for the
//! undistorted radius whose distorted radius matches a target.

use crate::{Distortion, RadiusSettings};
use float_ord::FloatOrd;
use log::*;
use photo_core::nalgebra::{Point2, Vector2};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Squared radii, measured from the distortion center, within which a distortion model can be
/// trusted.
///
/// `r2img` covers the image (plus margin) once undistorted and `r2max` is where the model stops
/// being invertible. `r2img <= r2max` always holds for values produced by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ValidRadius {
    pub r2img: f64,
    pub r2max: f64,
}

impl ValidRadius {
    /// Both radii set to the squared half diagonal of a `size` rectangle.
    pub fn half_diagonal(size: Vector2<f64>) -> Self {
        let r2 = 0.25 * size.norm_squared();
        Self {
            r2img: r2,
            r2max: r2,
        }
    }
}

/// What happened to the secant search while computing a [`ValidRadius`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadiusSearch {
    /// The camera does not have exactly one distortion, no search was run.
    Skipped,
    /// The search converged and scaled the image corner by this ratio.
    Converged(f64),
    /// The search did not converge, the unscaled corner radius was used.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusSolution {
    pub radius: ValidRadius,
    pub search: RadiusSearch,
}

/// Secant search of the radius `r` such that `distorted_radius(r) == target`.
///
/// The search starts from the trial radius `start` whose distorted radius is already known and
/// from the second trial radius `next`. Every step is clamped to `[0, rmax]`. Returns `None` when
/// the squared error is still above the tolerance after `settings.max_iterations` steps or when
/// the secant slope vanishes.
pub fn secant_radius<F>(
    distorted_radius: F,
    target: f64,
    start: (f64, f64),
    next: f64,
    rmax: f64,
    settings: &RadiusSettings,
) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let (mut r0, mut dr0) = start;
    let mut r1 = next;
    let mut dr1 = distorted_radius(r1);
    let mut err = target - dr1;
    for iteration in 0..settings.max_iterations {
        if err * err < settings.tolerance {
            break;
        }
        let slope = dr1 - dr0;
        if slope == 0.0 {
            debug!("secant search stalled after {} iterations", iteration);
            break;
        }
        let r = (r1 + err * (r1 - r0) / slope).clamp(0.0, rmax);
        r0 = r1;
        dr0 = dr1;
        r1 = r;
        dr1 = distorted_radius(r1);
        err = target - dr1;
        trace!("secant iteration {}: r = {}, err = {}", iteration, r1, err);
    }
    (err * err < settings.tolerance).then(|| r1)
}

/// Factor by which `corner - center` must be scaled so that its distortion lands on `corner`.
///
/// ```
/// use photo_core::nalgebra::Point2;
/// use photo_pinhole::{undistortion_ratio, Distortion, RadialDistortion, RadiusSettings};
///
/// let center = Point2::new(512.0, 384.0);
/// let distortion = Distortion::Radial(RadialDistortion::new(center, &[-2e-7]));
/// let corner = Point2::new(1124.0, 868.0);
/// let ratio = undistortion_ratio(&distortion, center, corner, &RadiusSettings::default())
///     .unwrap();
/// let undistorted = center + (corner - center) * ratio;
/// let error = (distortion.project(undistorted) - corner).norm_squared();
/// assert!(error < 0.5);
/// ```
pub fn undistortion_ratio(
    distortion: &Distortion,
    center: Point2<f64>,
    corner: Point2<f64>,
    settings: &RadiusSettings,
) -> Option<f64> {
    let offset = corner - center;
    let r2 = offset.norm_squared();
    if r2 == 0.0 {
        return Some(1.0);
    }
    let rd2 = (distortion.project(corner) - center).norm_squared();
    let guess = (r2 / rd2).sqrt();
    if !guess.is_finite() {
        return None;
    }
    let rd = r2.sqrt();
    let direction = offset / rd;
    let rmax = distortion.r2max().sqrt();
    let distorted_radius = |r: f64| (distortion.project(center + direction * r) - center).norm();
    secant_radius(
        distorted_radius,
        rd,
        (rd, rd2.sqrt()),
        rd * guess,
        rmax,
        settings,
    )
    .map(|r| r / rd)
}

/// Computes the radii within which `distortions` can be trusted on an image of `full_size`.
///
/// Only a single distortion with a center is searched. Any other configuration gets the half
/// diagonal of the image expanded by the margin.
pub fn valid_radius(
    distortions: &[Distortion],
    full_size: Vector2<f64>,
    settings: &RadiusSettings,
) -> RadiusSolution {
    let size = full_size.add_scalar(settings.image_margin);
    let searched = match distortions {
        [distortion] => distortion.center().map(|center| (distortion, center)),
        _ => None,
    };
    let (distortion, center) = match searched {
        Some(searched) => searched,
        None => {
            return RadiusSolution {
                radius: ValidRadius::half_diagonal(size),
                search: RadiusSearch::Skipped,
            }
        }
    };

    let corner = [
        Point2::new(0.0, 0.0),
        Point2::new(size.x, 0.0),
        Point2::new(0.0, size.y),
        Point2::new(size.x, size.y),
    ]
    .into_iter()
    .max_by_key(|corner| FloatOrd((*corner - center).norm_squared()))
    .unwrap_or(center);
    let offset = corner - center;

    let (r2img, search) = match undistortion_ratio(distortion, center, corner, settings) {
        Some(ratio) => ((offset * ratio).norm_squared(), RadiusSearch::Converged(ratio)),
        None => {
            warn!(
                "no undistorted radius maps onto the image corner {:?}, using it unscaled",
                corner
            );
            (offset.norm_squared(), RadiusSearch::Failed)
        }
    };
    let bound = distortion.r2max();
    let r2max = if bound.is_finite() { bound } else { r2img };
    let radius = ValidRadius {
        r2img: r2img.min(r2max),
        r2max,
    };
    debug!("valid radius {:?} found with {:?}", radius, search);
    RadiusSolution { radius, search }
}

impl Distortion {
    /// Inverts the radially symmetric part of the distortion.
    ///
    /// The search is limited to squared radii below both `r2max` and the model's own bound.
    /// Returns `None` when `point` lies beyond the distorted image of that limit or when the
    /// search does not converge. A point at the center, or any point for a model without a
    /// center, is returned as is.
    pub fn undistort(
        &self,
        point: Point2<f64>,
        r2max: f64,
        settings: &RadiusSettings,
    ) -> Option<Point2<f64>> {
        let center = match self.center() {
            Some(center) => center,
            None => return Some(point),
        };
        let v = point - center;
        let rd2 = v.norm_squared();
        if rd2 == 0.0 {
            return Some(point);
        }
        let limit = r2max.min(self.r2max());
        if !(limit.is_finite() && limit > 0.0) {
            return None;
        }
        let rmax = limit.sqrt();
        let rd = rd2.sqrt();
        let direction = v / rd;
        let radial = |r: f64| (self.project_radial(center + direction * r) - center).norm();
        let rd_max = radial(rmax);
        if rd >= rd_max {
            return None;
        }
        let ratio = rmax / rd_max;
        secant_radius(radial, rd, (rmax, rd_max), rd * ratio, rmax, settings)
            .map(|r| center + v * (r / rd))
    }
}
