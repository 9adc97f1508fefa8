//! # `photo`
//!
//! Batteries-included photogrammetric camera crate
//!
//! This crate gathers the photogrammetric camera workspace in one place, which is handy for
//! documentation and for quickly trying the camera model out. Applications should rather import
//! the crates they need individually. Default features can also be disabled to pick only some
//! of the modules.
//!
//! Poses and interpolation come from `photo-core` and live at the root of the crate.
//!
//! ## Modules
//! * [`camera`] - the photogrammetric camera model and its lens distortions
//! * [`geom`] - homographies extrapolating distortions beyond their valid radius
//! * [`transition`] - animated changes of camera

pub use photo_core::*;

/// Camera models
pub mod camera {
    /// The pinhole camera model with photogrammetric distortions
    #[cfg(feature = "photo-pinhole")]
    pub use photo_pinhole as pinhole;
}

/// Projective geometry
pub mod geom {
    #[cfg(feature = "photo-geom")]
    pub use photo_geom::*;
}

/// Camera transitions
pub mod transition {
    #[cfg(feature = "photo-transition")]
    pub use photo_transition::*;
}
