//! This crate contains the projective geometry used around the photogrammetric camera model.
//!
//! ## Distortion extrapolation
//!
//! Polynomial lens distortions are only meaningful up to some radius around their center.
//! Beyond the valid radius of a camera, the distortion is replaced by a homography fitted on four
//! points of the valid circle, so that the image still covers the whole viewport.
//!
//! - `C` the distortion center
//! - `r` the valid undistorted radius, the square root of `r2img`
//! - `+` the four samples on which the homography is fitted
//!
//! ```text
//!                 +
//!            .         .
//!         .               .
//!        +        C--r-----+
//!         .               .
//!            .         .
//!                 +
//!   true distortion inside, homography outside
//! ```
//!
//! The homography maps undistorted pixels to distorted pixels. Its counterpart maps them back
//! and is fitted separately with the roles of the samples swapped.

mod homography;

pub use homography::*;
