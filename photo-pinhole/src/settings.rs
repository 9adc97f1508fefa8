use crate::CameraError;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The settings of the valid radius search.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RadiusSettings {
    /// The maximum number of secant steps before giving up
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_max_iterations")
    )]
    pub max_iterations: usize,
    /// The squared distance in pixels under which a distorted radius matches its target
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_tolerance"))]
    pub tolerance: f64,
    /// The number of pixels added to both image dimensions when looking for the farthest corner
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_image_margin"))]
    pub image_margin: f64,
}

impl Default for RadiusSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            image_margin: default_image_margin(),
        }
    }
}

fn default_max_iterations() -> usize {
    50
}

fn default_tolerance() -> f64 {
    0.5
}

fn default_image_margin() -> f64 {
    100.0
}

/// How the valid radius travels between two cameras.
///
/// The radius from the source camera shrinks quadratically to zero by `shrink_end`, stays at
/// zero so that only the undistorted pinhole part is shown mid-flight, and grows linearly
/// from `grow_start` to reach the radius of the target camera at the end.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RadiusBlend {
    /// The progress at which the source radius has vanished
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_shrink_end"))]
    pub shrink_end: f64,
    /// The progress at which the target radius starts growing
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_grow_start"))]
    pub grow_start: f64,
}

impl RadiusBlend {
    /// Checks that `0 < shrink_end <= grow_start < 1`.
    pub fn validate(&self) -> Result<(), CameraError> {
        if 0.0 < self.shrink_end && self.shrink_end <= self.grow_start && self.grow_start < 1.0 {
            Ok(())
        } else {
            Err(CameraError::InvalidBlend {
                shrink_end: self.shrink_end,
                grow_start: self.grow_start,
            })
        }
    }

    /// Squared valid image radius at progress `t`, clamped to `[0, 1]`.
    ///
    /// Breakpoints that do not pass [`RadiusBlend::validate`] are replaced by the default ones.
    ///
    /// ```
    /// use photo_pinhole::RadiusBlend;
    ///
    /// let blend = RadiusBlend::default();
    /// assert_eq!(blend.r2img(100.0, 400.0, 0.0), 100.0);
    /// assert_eq!(blend.r2img(100.0, 400.0, 0.1), 25.0);
    /// assert_eq!(blend.r2img(100.0, 400.0, 0.5), 0.0);
    /// assert_eq!(blend.r2img(100.0, 400.0, 1.0), 400.0);
    /// ```
    pub fn r2img(&self, from: f64, to: f64, t: f64) -> f64 {
        if t.is_nan() || t <= 0.0 {
            return from;
        }
        if t >= 1.0 {
            return to;
        }
        let blend = match self.validate() {
            Ok(()) => *self,
            Err(_) => Self::default(),
        };
        if t < blend.shrink_end {
            let s = 1.0 - t / blend.shrink_end;
            from * s * s
        } else if t < blend.grow_start {
            0.0
        } else {
            to * (t - blend.grow_start) / (1.0 - blend.grow_start)
        }
    }
}

impl Default for RadiusBlend {
    fn default() -> Self {
        Self {
            shrink_end: default_shrink_end(),
            grow_start: default_grow_start(),
        }
    }
}

fn default_shrink_end() -> f64 {
    0.2
}

fn default_grow_start() -> f64 {
    0.8
}
