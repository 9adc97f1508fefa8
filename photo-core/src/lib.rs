//! # Photo Core
//!
//! This library provides the small set of types shared by every crate of the photogrammetric
//! camera workspace: the pose of a camera in the world and the interpolation primitives used
//! when a view travels from one calibrated camera to another. The crate is designed to stay very
//! small so that it adds negligable build time. It pulls in [`nalgebra`], which is re-exported
//! so that downstream crates agree on a single version of it.
//!
//! ## Coordinate frames
//!
//! Poses follow the convention of the rendering layers this core feeds: a camera sits at a
//! `position` in world space and is rotated by an `orientation`. In its local frame, the camera
//! looks down the negative Z axis with X to the right and Y up. A world point is brought into
//! the camera frame by the inverse of the camera placement, which is what [`WorldToCamera`]
//! holds.
//!
//! ```text
//!          +Y
//!           |
//!           |      image plane
//!           O------@@@@@@@@@@-----> -Z (viewing direction)
//!          /
//!        +X
//! ```
//!
//! ## Interpolation
//!
//! The [`Interpolate`] trait is implemented for scalars, fixed-size vectors and matrices,
//! points, unit quaternions (spherical, shortest arc) and [`CameraPose`]. It is the building
//! block of camera transitions.

mod interpolate;
mod pose;

pub use interpolate::*;
pub use nalgebra;
pub use pose::*;
