use thiserror::Error;

/// A camera state from which no projection can be built.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CameraError {
    #[error("far plane ({far}) must lie beyond the near plane ({near})")]
    DegenerateFrustum { near: f64, far: f64 },
    #[error("focal lengths must be non-zero and finite, got ({x}, {y})")]
    InvalidFocal { x: f64, y: f64 },
    #[error("image must have a positive size, got {width}x{height}")]
    EmptyImage { width: f64, height: f64 },
    #[error("view rectangle must have a positive size, got {width}x{height}")]
    EmptyView { width: f64, height: f64 },
    #[error("aspect ratio must be positive and finite, got {0}")]
    InvalidAspect(f64),
    #[error("radius blend breakpoints must satisfy 0 < {shrink_end} <= {grow_start} < 1")]
    InvalidBlend { shrink_end: f64, grow_start: f64 },
}
