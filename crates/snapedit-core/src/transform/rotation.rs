//! Quarter-turn rotation.
//!
//! Rotations move whole pixels, so they are exact: no interpolation and no
//! canvas padding. Positive angles turn the image clockwise as displayed
//! (y axis pointing down).
//!
//! # Mapping
//!
//! For a `w` x `h` source and a source pixel `(sx, sy)`:
//! ```text
//!  90 (clockwise):         dst = (h - 1 - sy, sx)      size h x w
//! -90 (counter-clockwise): dst = (sy, w - 1 - sx)      size h x w
//! 180:                     dst = (w - 1 - sx, h - 1 - sy)
//! ```

use crate::error::EditError;
use crate::raster::RasterBuffer;

/// A rotation reduced to one of the four quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterTurn {
    None,
    Clockwise,
    Half,
    CounterClockwise,
}

impl QuarterTurn {
    /// Reduce an angle in degrees to a quarter turn.
    ///
    /// # Errors
    ///
    /// Returns `EditError::UnsupportedRotation` for angles that are not a
    /// multiple of 90.
    pub fn from_degrees(degrees: i32) -> Result<Self, EditError> {
        if degrees % 90 != 0 {
            return Err(EditError::UnsupportedRotation(degrees));
        }
        Ok(match degrees.rem_euclid(360) {
            0 => QuarterTurn::None,
            90 => QuarterTurn::Clockwise,
            180 => QuarterTurn::Half,
            _ => QuarterTurn::CounterClockwise,
        })
    }

    /// Whether this turn exchanges width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, QuarterTurn::Clockwise | QuarterTurn::CounterClockwise)
    }
}

/// Dimensions of a `width` x `height` buffer after `turn`.
pub fn rotated_dimensions(width: u32, height: u32, turn: QuarterTurn) -> (u32, u32) {
    if turn.swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Rotate a buffer by a multiple of 90 degrees.
///
/// A zero rotation (including any multiple of 360) hands the input back
/// without copying. Every other rotation allocates a new buffer holding
/// exactly the rotated content.
///
/// # Errors
///
/// - `EditError::UnsupportedRotation` if `degrees` is not a multiple of 90.
/// - `EditError::ResourceExhausted` if the output cannot be allocated.
pub fn rotate(buffer: RasterBuffer, degrees: i32) -> Result<RasterBuffer, EditError> {
    let turn = QuarterTurn::from_degrees(degrees)?;
    if turn == QuarterTurn::None {
        return Ok(buffer);
    }

    let (src_w, src_h) = buffer.dimensions();
    let (dst_w, dst_h) = rotated_dimensions(src_w, src_h, turn);
    let mut output = RasterBuffer::new(dst_w, dst_h, buffer.format())?;

    let bpp = buffer.format().bytes_per_pixel();
    let src_stride = buffer.stride();
    let dst_stride = output.stride();
    let src = buffer.as_bytes();
    let dst = output.as_bytes_mut();

    for sy in 0..src_h as usize {
        for sx in 0..src_w as usize {
            let (dx, dy) = match turn {
                QuarterTurn::Clockwise => (src_h as usize - 1 - sy, sx),
                QuarterTurn::CounterClockwise => (sy, src_w as usize - 1 - sx),
                _ => (src_w as usize - 1 - sx, src_h as usize - 1 - sy),
            };
            let s = sy * src_stride + sx * bpp;
            let d = dy * dst_stride + dx * bpp;
            dst[d..d + bpp].copy_from_slice(&src[s..s + bpp]);
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelFormat;

    /// 3x2 buffer whose red channel encodes the position: 10 * y + x.
    fn labelled(format: PixelFormat) -> RasterBuffer {
        let mut buf = RasterBuffer::new(3, 2, format).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                buf.set_pixel(x, y, [(10 * y + x) as u8 * 8, 0, 0, 255]);
            }
        }
        buf
    }

    fn red(buf: &RasterBuffer, x: u32, y: u32) -> u8 {
        buf.pixel(x, y)[0]
    }

    #[test]
    fn test_quarter_turn_from_degrees() {
        assert_eq!(QuarterTurn::from_degrees(0).unwrap(), QuarterTurn::None);
        assert_eq!(QuarterTurn::from_degrees(360).unwrap(), QuarterTurn::None);
        assert_eq!(QuarterTurn::from_degrees(90).unwrap(), QuarterTurn::Clockwise);
        assert_eq!(QuarterTurn::from_degrees(-270).unwrap(), QuarterTurn::Clockwise);
        assert_eq!(QuarterTurn::from_degrees(-90).unwrap(), QuarterTurn::CounterClockwise);
        assert_eq!(QuarterTurn::from_degrees(270).unwrap(), QuarterTurn::CounterClockwise);
        assert_eq!(QuarterTurn::from_degrees(180).unwrap(), QuarterTurn::Half);
        assert_eq!(QuarterTurn::from_degrees(-180).unwrap(), QuarterTurn::Half);
    }

    #[test]
    fn test_unsupported_angle() {
        let err = rotate(labelled(PixelFormat::Rgb8), 45).unwrap_err();
        assert_eq!(err, EditError::UnsupportedRotation(45));
    }

    #[test]
    fn test_zero_rotation_returns_input() {
        let img = labelled(PixelFormat::Rgb8);
        let expected = img.clone();
        assert_eq!(rotate(img, 0).unwrap(), expected);
    }

    #[test]
    fn test_rotate_clockwise() {
        let out = rotate(labelled(PixelFormat::Rgb8), 90).unwrap();
        assert_eq!(out.dimensions(), (2, 3));
        // Bottom-left of the source becomes the top-left
        assert_eq!(red(&out, 0, 0), 10 * 8);
        // Top-left of the source becomes the top-right
        assert_eq!(red(&out, 1, 0), 0);
        assert_eq!(red(&out, 1, 2), 2 * 8);
    }

    #[test]
    fn test_rotate_counter_clockwise() {
        let out = rotate(labelled(PixelFormat::Rgb8), -90).unwrap();
        assert_eq!(out.dimensions(), (2, 3));
        // Top-right of the source becomes the top-left
        assert_eq!(red(&out, 0, 0), 2 * 8);
        assert_eq!(red(&out, 0, 2), 0);
        assert_eq!(red(&out, 1, 2), 10 * 8);
    }

    #[test]
    fn test_rotate_180() {
        let out = rotate(labelled(PixelFormat::Rgb8), 180).unwrap();
        assert_eq!(out.dimensions(), (3, 2));
        assert_eq!(red(&out, 0, 0), 12 * 8);
        assert_eq!(red(&out, 2, 1), 0);
    }

    #[test]
    fn test_rotate_keeps_format() {
        for format in [PixelFormat::Rgb8, PixelFormat::Rgba8, PixelFormat::Rgb565] {
            let out = rotate(labelled(format), 90).unwrap();
            assert_eq!(out.format(), format);
            assert_eq!(out.byte_size(), 6 * format.bytes_per_pixel());
        }
    }

    #[test]
    fn test_four_clockwise_turns_is_identity() {
        let img = labelled(PixelFormat::Rgba8);
        let mut out = img.clone();
        for _ in 0..4 {
            out = rotate(out, 90).unwrap();
        }
        assert_eq!(out, img);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
