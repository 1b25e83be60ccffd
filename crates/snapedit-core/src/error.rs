//! Error type shared by buffer, transform and stitch operations.

use thiserror::Error;

/// Errors raised while building or transforming raster buffers.
///
/// Degenerate geometry (an empty crop rect, a zero-extent resize) is not an
/// error: those cases resolve to a no-op or a clamped result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// Stitching was requested with too few images.
    #[error("Stitching needs at least {min} images, got {count}")]
    InsufficientImages { count: usize, min: usize },

    /// Stitching was requested with more images than a layout can hold.
    #[error("Stitching accepts at most {max} images, got {count}")]
    TooManyImages { count: usize, max: usize },

    /// A buffer could not be allocated: its size overflows or the allocator
    /// refused the request.
    #[error("Cannot allocate a {width}x{height} buffer")]
    ResourceExhausted { width: u32, height: u32 },

    /// Width or height is zero.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match the dimensions and format.
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Rotation angle is not a quarter turn.
    #[error("Unsupported rotation: {0} degrees (must be a multiple of 90)")]
    UnsupportedRotation(i32),
}
