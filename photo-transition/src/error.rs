use photo_pinhole::CameraError;
use thiserror::Error;

/// Transition settings that would keep a transition from starting at its source or reaching
/// its target.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SettingsError {
    #[error("transition duration must be finite and non-negative, got {0} s")]
    InvalidDuration(f64),
    #[error(transparent)]
    Blend(#[from] CameraError),
}
