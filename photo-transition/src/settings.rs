use crate::SettingsError;
use log::*;
use photo_pinhole::RadiusBlend;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The settings of a camera transition.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransitionSettings {
    /// The duration of a transition in seconds
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_duration"))]
    pub duration: f64,
    /// Whether the zoom of the current view survives a change of camera
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_preserve_zoom"))]
    pub preserve_zoom: bool,
    /// How the valid radius of the distortion fades between the two cameras
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub radius: RadiusBlend,
}

impl TransitionSettings {
    #[must_use]
    pub fn duration(self, duration: f64) -> Self {
        Self { duration, ..self }
    }

    #[must_use]
    pub fn preserve_zoom(self, preserve_zoom: bool) -> Self {
        Self {
            preserve_zoom,
            ..self
        }
    }

    #[must_use]
    pub fn radius(self, radius: RadiusBlend) -> Self {
        Self { radius, ..self }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration * 1000.0
    }

    /// Checks that the duration is finite and non-negative and that the radius blend is valid.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(SettingsError::InvalidDuration(self.duration));
        }
        self.radius.validate()?;
        Ok(())
    }

    /// Replaces each invalid value by its default, with a warning.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut settings = self;
        if !(settings.duration.is_finite() && settings.duration >= 0.0) {
            warn!(
                "invalid transition duration {} s, using {} s",
                settings.duration, defaults.duration
            );
            settings.duration = defaults.duration;
        }
        if let Err(e) = settings.radius.validate() {
            warn!("{}, using the default radius blend", e);
            settings.radius = defaults.radius;
        }
        settings
    }
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            preserve_zoom: default_preserve_zoom(),
            radius: RadiusBlend::default(),
        }
    }
}

fn default_duration() -> f64 {
    3.0
}

fn default_preserve_zoom() -> bool {
    true
}
