//! Resampling of raster buffers.
//!
//! Uses the `image` crate's resampling kernels. All functions return new
//! buffers in the input's pixel format without modifying the input.

use crate::error::EditError;
use crate::raster::{PixelFormat, RasterBuffer};

use super::FilterType;

/// Resize a buffer to exact dimensions.
///
/// A zero target dimension is treated as 1.
///
/// # Errors
///
/// Returns `EditError::ResourceExhausted` if the output cannot be allocated.
pub fn resize(
    buffer: &RasterBuffer,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<RasterBuffer, EditError> {
    let width = width.max(1);
    let height = height.max(1);

    if buffer.dimensions() == (width, height) {
        return buffer.try_clone();
    }

    let filter = filter.to_image_filter();
    match buffer.format() {
        PixelFormat::Rgba8 => {
            let resized = image::imageops::resize(&buffer.to_rgba_image(), width, height, filter);
            RasterBuffer::from_rgba_image(resized)
        }
        PixelFormat::Rgb8 => {
            let resized = image::imageops::resize(&buffer.to_rgb_image(), width, height, filter);
            RasterBuffer::from_rgb_image(resized)
        }
        PixelFormat::Rgb565 => {
            let resized = image::imageops::resize(&buffer.to_rgb_image(), width, height, filter);
            RasterBuffer::from_rgb_image(resized)?.convert(PixelFormat::Rgb565)
        }
    }
}

/// Resize a buffer so its longest edge is at most `max_edge`, preserving the
/// aspect ratio. Buffers that already fit are returned unchanged. A zero
/// `max_edge` is treated as 1.
pub fn resize_to_fit(
    buffer: &RasterBuffer,
    max_edge: u32,
    filter: FilterType,
) -> Result<RasterBuffer, EditError> {
    let max_edge = max_edge.max(1);
    let (src_width, src_height) = buffer.dimensions();
    if src_width <= max_edge && src_height <= max_edge {
        return buffer.try_clone();
    }

    let (new_width, new_height) = calculate_fit_dimensions(src_width, src_height, max_edge);
    resize(buffer, new_width, new_height, filter)
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}
