//! Mirroring.

use crate::error::EditError;
use crate::raster::RasterBuffer;

/// Mirror a buffer.
///
/// With `horizontal` set, the image is mirrored across its vertical axis
/// (left and right swap); otherwise across its horizontal axis (top and
/// bottom swap). The output has identical dimensions and format.
///
/// # Errors
///
/// Returns `EditError::ResourceExhausted` if the output cannot be allocated.
pub fn flip(buffer: RasterBuffer, horizontal: bool) -> Result<RasterBuffer, EditError> {
    let (width, height) = buffer.dimensions();
    let mut output = RasterBuffer::new(width, height, buffer.format())?;
    let bpp = buffer.format().bytes_per_pixel();

    for y in 0..height {
        if horizontal {
            let src_row = buffer.row(y);
            let dst_row = output.row_mut(y);
            for (dst, src) in dst_row
                .chunks_exact_mut(bpp)
                .zip(src_row.chunks_exact(bpp).rev())
            {
                dst.copy_from_slice(src);
            }
        } else {
            output
                .row_mut(height - 1 - y)
                .copy_from_slice(buffer.row(y));
        }
    }

    Ok(output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::raster::PixelFormat;
    use proptest::prelude::*;

    fn buffer_strategy() -> impl Strategy<Value = RasterBuffer> {
        (1u32..=16, 1u32..=16, prop_oneof![
            Just(PixelFormat::Rgb8),
            Just(PixelFormat::Rgba8),
            Just(PixelFormat::Rgb565),
        ])
            .prop_flat_map(|(w, h, format)| {
                let len = (w * h) as usize * format.bytes_per_pixel();
                proptest::collection::vec(any::<u8>(), len)
                    .prop_map(move |data| RasterBuffer::from_raw(w, h, format, data).unwrap())
            })
    }

    proptest! {
        /// Property: flipping twice along the same axis is the identity.
        #[test]
        fn prop_double_flip_is_identity(img in buffer_strategy(), horizontal in any::<bool>()) {
            let original = img.clone();
            let out = flip(flip(img, horizontal).unwrap(), horizontal).unwrap();
            prop_assert_eq!(out, original);
        }

        /// Property: a horizontal and a vertical flip together equal a half turn.
        #[test]
        fn prop_both_flips_equal_half_turn(img in buffer_strategy()) {
            let turned = crate::transform::rotate(img.clone(), 180).unwrap();
            let flipped = flip(flip(img, true).unwrap(), false).unwrap();
            prop_assert_eq!(flipped, turned);
        }
    }
}
