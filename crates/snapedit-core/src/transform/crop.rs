//! Image cropping.
//!
//! Crop rectangles are in pixel coordinates of the buffer being cropped. The
//! rectangle is clamped to the buffer first; a rectangle that is empty after
//! clamping leaves the buffer untouched.

use crate::error::EditError;
use crate::raster::{PixelRect, RasterBuffer};

/// Crop a buffer to `rect`.
///
/// # Behavior
///
/// - The rectangle is clamped to `[0, width] x [0, height]`
/// - A degenerate clamped rectangle (left >= right or top >= bottom) returns
///   the input buffer as is
/// - A rectangle covering the whole buffer returns the input buffer as is
///
/// # Errors
///
/// Returns `EditError::ResourceExhausted` if the output cannot be allocated.
pub fn crop(buffer: RasterBuffer, rect: PixelRect) -> Result<RasterBuffer, EditError> {
    let clamped = rect.clamped(buffer.width(), buffer.height());
    if clamped.is_degenerate() {
        log::debug!("Crop rect {:?} is empty after clamping, keeping buffer", rect);
        return Ok(buffer);
    }
    if clamped == PixelRect::full(buffer.width(), buffer.height()) {
        return Ok(buffer);
    }

    let out_width = (clamped.right - clamped.left) as u32;
    let out_height = (clamped.bottom - clamped.top) as u32;
    let mut output = RasterBuffer::new(out_width, out_height, buffer.format())?;

    // Copy pixel data row by row
    let bpp = buffer.format().bytes_per_pixel();
    let start = clamped.left as usize * bpp;
    let end = clamped.right as usize * bpp;
    for y in 0..out_height {
        let src_row = buffer.row(clamped.top as u32 + y);
        output.row_mut(y).copy_from_slice(&src_row[start..end]);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelFormat;

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> RasterBuffer {
        let mut buf = RasterBuffer::new(width, height, PixelFormat::Rgb8).unwrap();
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                buf.set_pixel(x, y, [v, v, v, 255]);
            }
        }
        buf
    }

    #[test]
    fn test_full_crop_returns_same_buffer() {
        let img = test_image(100, 100);
        let expected = img.clone();
        let result = crop(img, PixelRect::full(100, 100)).unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_center_crop() {
        let img = test_image(10, 10);
        let result = crop(img, PixelRect::new(2, 2, 8, 8)).unwrap();

        assert_eq!(result.dimensions(), (6, 6));
        // First pixel comes from (2, 2): 2 * 10 + 2 = 22
        assert_eq!(result.pixel(0, 0)[0], 22);
        assert_eq!(result.pixel(5, 5)[0], 77);
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let img = test_image(10, 10);
        let result = crop(img, PixelRect::new(8, 8, 15, 15)).unwrap();
        assert_eq!(result.dimensions(), (2, 2));
        assert_eq!(result.pixel(0, 0)[0], 88);
    }

    #[test]
    fn test_crop_handles_negative_coords() {
        let img = test_image(100, 100);
        let result = crop(img, PixelRect::new(-10, -10, 50, 50)).unwrap();
        assert_eq!(result.dimensions(), (50, 50));
        assert_eq!(result.pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_oversized_rect_returns_whole_buffer() {
        let img = test_image(20, 30);
        let expected = img.clone();
        let result = crop(img, PixelRect::new(-5, -5, 100, 100)).unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_degenerate_rect_is_noop() {
        let img = test_image(10, 10);
        let expected = img.clone();

        let result = crop(img, PixelRect::new(5, 5, 5, 9)).unwrap();
        assert_eq!(result, expected);

        let result = crop(result, PixelRect::new(7, 2, 3, 9)).unwrap();
        assert_eq!(result, expected);

        // Entirely outside the buffer clamps to an empty rect
        let result = crop(result, PixelRect::new(20, 20, 30, 30)).unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_crop_keeps_format() {
        let img = RasterBuffer::filled(8, 8, PixelFormat::Rgba8, [1, 2, 3, 4]).unwrap();
        let result = crop(img, PixelRect::new(1, 1, 4, 3)).unwrap();
        assert_eq!(result.format(), PixelFormat::Rgba8);
        assert_eq!(result.dimensions(), (3, 2));
        assert_eq!(result.pixel(2, 1), [1, 2, 3, 4]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
