use photo_core::nalgebra::{Matrix4, Vector2};
use photo_core::Interpolate;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The part of the full image shown by a camera.
///
/// When `enabled`, only the `size` rectangle at `offset` within the `full_size` image is
/// mapped onto the viewport, which is how tiled or cropped renderings are produced.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ViewRect {
    pub enabled: bool,
    pub offset: Vector2<f64>,
    pub size: Vector2<f64>,
    pub full_size: Vector2<f64>,
}

impl ViewRect {
    /// Shows the whole of an image of `full_size` pixels.
    pub fn full(full_size: Vector2<f64>) -> Self {
        Self {
            enabled: false,
            offset: Vector2::zeros(),
            size: full_size,
            full_size,
        }
    }

    /// Restricts the view to the `size` rectangle at `offset`.
    pub fn set_view_offset(&mut self, offset: Vector2<f64>, size: Vector2<f64>) {
        self.enabled = true;
        self.offset = offset;
        self.size = size;
    }

    pub fn clear_view_offset(&mut self) {
        self.enabled = false;
    }

    /// Size of the rectangle that ends up on the viewport.
    pub fn texture_size(&self) -> Vector2<f64> {
        if self.enabled {
            self.size
        } else {
            self.full_size
        }
    }

    pub fn texture_aspect(&self) -> f64 {
        let size = self.texture_size();
        size.x / size.y
    }

    /// Maps full image texture coordinates to coordinates within the view rectangle.
    #[rustfmt::skip]
    pub fn crop_matrix(&self) -> Option<Matrix4<f64>> {
        if !self.enabled {
            return None;
        }
        let scale = self.full_size.component_div(&self.size);
        let shift = self.offset.component_div(&self.size);
        Some(Matrix4::new(
            scale.x,  0.0,      0.0,  -shift.x,
            0.0,      scale.y,  0.0,  -shift.y,
            0.0,      0.0,      1.0,  0.0,
            0.0,      0.0,      0.0,  1.0,
        ))
    }
}

impl Interpolate for ViewRect {
    /// Blends the rectangles, the `enabled` flag is kept from `self`.
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        Self {
            enabled: self.enabled,
            offset: self.offset.interpolate(&other.offset, t),
            size: self.size.interpolate(&other.size, t),
            full_size: self.full_size.interpolate(&other.full_size, t),
        }
    }
}
