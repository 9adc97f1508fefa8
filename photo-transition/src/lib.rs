//! Transitions of the view between calibrated cameras.
//!
//! When a new camera is selected, the [`TransitionController`] keeps the view it was showing as
//! the source of the transition and, on each frame tick, interpolates every calibration value
//! and the pose towards the selected camera. The lens distortion of the source camera fades out
//! early, the view travels with a plain pinhole projection, and the distortion of the target
//! camera fades in at the end. See [`RadiusBlend`] for the shape of that fade.
//!
//! The controller is driven by timestamps in milliseconds and never blocks. Cameras handed to
//! or taken from it are [`CameraSnapshot`]s, which can be kept around across ticks.

mod controller;
mod error;
mod settings;
mod snapshot;

pub use controller::*;
pub use error::*;
pub use photo_pinhole::RadiusBlend;
pub use settings::*;
pub use snapshot::*;
