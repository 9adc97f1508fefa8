//! Lens distortion models
//!
//! All models map an undistorted pixel position to its distorted position. They are pure
//! functions of the point: the center subtraction happens inside each model. A camera
//! applies its distortions in order after the pinhole projection.

mod fisheye;
mod polynomial;
mod radial;
mod tangential;

pub use fisheye::*;
pub use polynomial::RadialPolynomial;
pub use radial::*;
pub use tangential::TangentialDistortion;

use log::*;
use photo_core::nalgebra::Point2;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// One lens distortion model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum Distortion {
    None,
    Radial(RadialDistortion),
    Fraser(FraserDistortion),
    Tangential(TangentialDistortion),
    FishEye(FishEyeDistortion),
}

impl Distortion {
    /// Maps an undistorted pixel position to its distorted position.
    pub fn project(&self, point: Point2<f64>) -> Point2<f64> {
        match self {
            Self::None => point,
            Self::Radial(d) => d.project(point),
            Self::Fraser(d) => d.project(point),
            Self::Tangential(d) => d.project(point),
            Self::FishEye(d) => d.project(point),
        }
    }

    /// Applies only the radially symmetric part of the model.
    ///
    /// Models without a radial part leave the point untouched.
    pub fn project_radial(&self, point: Point2<f64>) -> Point2<f64> {
        match self {
            Self::None | Self::Tangential(_) => point,
            Self::Radial(d) => d.project(point),
            Self::Fraser(d) => d.project_radial(point),
            Self::FishEye(d) => d.project_radial(point),
        }
    }

    pub fn center(&self) -> Option<Point2<f64>> {
        match self {
            Self::None => None,
            Self::Radial(d) => Some(d.center),
            Self::Fraser(d) => Some(d.center),
            Self::Tangential(d) => Some(d.center),
            Self::FishEye(d) => Some(d.center),
        }
    }

    /// Squared radius up to which the model is invertible, `f64::INFINITY` when unbounded.
    pub fn r2max(&self) -> f64 {
        match self {
            Self::Radial(d) => d.r2max,
            Self::Fraser(d) => d.r2max,
            Self::None | Self::Tangential(_) | Self::FishEye(_) => f64::INFINITY,
        }
    }

    /// Builds a model from a loader supplied descriptor.
    ///
    /// Unknown type tags produce [`Distortion::None`] and a warning.
    ///
    /// ```
    /// use photo_core::nalgebra::Point2;
    /// use photo_pinhole::{Distortion, DistortionDescriptor};
    ///
    /// let descriptor = DistortionDescriptor::new("Radial", Point2::new(512.0, 384.0))
    ///     .radial(vec![-2e-7, 0.0, 0.0]);
    /// assert!(matches!(Distortion::from_descriptor(&descriptor), Distortion::Radial(_)));
    ///
    /// let unknown = DistortionDescriptor::new("ebner", Point2::new(512.0, 384.0));
    /// assert_eq!(Distortion::from_descriptor(&unknown), Distortion::None);
    /// ```
    pub fn from_descriptor(descriptor: &DistortionDescriptor) -> Self {
        let d = descriptor;
        match d.kind.to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "radial" => Self::Radial(RadialDistortion::new(d.center, &d.radial)),
            "fraser" => Self::Fraser(FraserDistortion::new(
                d.center,
                &d.radial,
                &d.tangential,
                &d.affine,
            )),
            "tangential" => Self::Tangential(TangentialDistortion::new(d.center, &d.tangential)),
            kind @ ("fisheye" | "equisolid") => {
                if !(d.focal.is_finite() && d.focal > 0.0) {
                    warn!(
                        "{} distortion with focal {}, which must be positive, ignoring it",
                        kind, d.focal
                    );
                    return Self::None;
                }
                let fisheye =
                    FishEyeDistortion::new(d.center, d.focal, &d.radial, &d.tangential, &d.affine);
                Self::FishEye(fisheye.equisolid(kind == "equisolid"))
            }
            kind => {
                warn!("unsupported distortion type {:?}, ignoring it", kind);
                Self::None
            }
        }
    }
}

impl Default for Distortion {
    fn default() -> Self {
        Self::None
    }
}

impl From<&DistortionDescriptor> for Distortion {
    fn from(descriptor: &DistortionDescriptor) -> Self {
        Self::from_descriptor(descriptor)
    }
}

/// Type tag and raw coefficients of a distortion, as read from an orientation file.
///
/// `focal` is only used by the fisheye models.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct DistortionDescriptor {
    pub kind: String,
    pub center: Point2<f64>,
    pub focal: f64,
    pub radial: Vec<f64>,
    pub tangential: Vec<f64>,
    pub affine: Vec<f64>,
}

impl DistortionDescriptor {
    pub fn new(kind: impl Into<String>, center: Point2<f64>) -> Self {
        Self {
            kind: kind.into(),
            center,
            focal: 1.0,
            radial: Vec::new(),
            tangential: Vec::new(),
            affine: Vec::new(),
        }
    }

    pub fn focal(self, focal: f64) -> Self {
        Self { focal, ..self }
    }

    pub fn radial(self, radial: Vec<f64>) -> Self {
        Self { radial, ..self }
    }

    pub fn tangential(self, tangential: Vec<f64>) -> Self {
        Self { tangential, ..self }
    }

    pub fn affine(self, affine: Vec<f64>) -> Self {
        Self { affine, ..self }
    }
}
