//! Two-pass sampled decoding.
//!
//! The first pass reads only the header (dimensions and EXIF orientation).
//! A power-of-two sample factor is derived from it and the requested bound,
//! and the second pass decodes the pixels at that reduction.
//!
//! JPEG sources are scaled inside the decoder (1/2, 1/4 or 1/8 in the DCT
//! domain), so their full-resolution frame is never materialized. Other
//! formats decode at full size under an allocation limit of
//! [`DecodeConfig::max_decode_bytes`]. In both cases the frame is reduced
//! before EXIF orientation is applied, so only the reduced frame is rotated.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageError, ImageFormat, ImageReader, Limits};

use crate::config::DecodeConfig;
use crate::raster::RasterBuffer;

use super::orientation::{apply_orientation, read_orientation};
use super::{DecodeError, Orientation, SourceInfo};

/// Compute the power-of-two downscale factor for a source of
/// `source_width` x `source_height` decoded towards `req_width` x `req_height`.
///
/// Starting at 1, the factor doubles while both halved source dimensions
/// divided by the factor still reach the requested bound. A source that
/// already fits yields 1. Zero requests are treated as 1.
pub fn compute_sample_factor(
    source_width: u32,
    source_height: u32,
    req_width: u32,
    req_height: u32,
) -> u32 {
    let req_width = req_width.max(1);
    let req_height = req_height.max(1);
    let mut factor = 1u32;

    if source_height > req_height || source_width > req_width {
        let half_height = source_height / 2;
        let half_width = source_width / 2;

        while half_height / factor >= req_height && half_width / factor >= req_width {
            factor *= 2;
        }
    }

    factor
}

/// Read dimensions and orientation without decoding pixel data.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format is not recognized and
/// `DecodeError::InvalidBounds` if the header reports an empty image.
pub fn read_source_info(bytes: &[u8]) -> Result<SourceInfo, DecodeError> {
    let reader = guessed_reader(bytes)?;
    let (width, height) = reader.into_dimensions().map_err(map_image_error)?;
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidBounds { width, height });
    }

    Ok(SourceInfo {
        width,
        height,
        orientation: read_orientation(bytes),
    })
}

/// Decode `bytes` into an upright buffer no smaller than needed to cover
/// `req_width` x `req_height`, using the default decode budget.
pub fn decode_sampled(
    bytes: &[u8],
    req_width: u32,
    req_height: u32,
) -> Result<RasterBuffer, DecodeError> {
    decode_sampled_with(bytes, req_width, req_height, &DecodeConfig::default())
}

/// Decode `bytes` with an explicit decode budget.
///
/// # Errors
///
/// - `DecodeError::InvalidFormat` / `CorruptedFile` if the source cannot be
///   parsed.
/// - `DecodeError::ResourceExhausted` if the source exceeds
///   `config.max_source_pixels` or the decoder's allocation limits.
pub fn decode_sampled_with(
    bytes: &[u8],
    req_width: u32,
    req_height: u32,
    config: &DecodeConfig,
) -> Result<RasterBuffer, DecodeError> {
    let info = read_source_info(bytes)?;
    let (width, height) = info.oriented_dimensions();

    if width as u64 * height as u64 > config.max_source_pixels {
        log::warn!(
            "Rejecting {}x{} source: exceeds {} pixel budget",
            width,
            height,
            config.max_source_pixels
        );
        return Err(DecodeError::ResourceExhausted { width, height });
    }

    let factor = compute_sample_factor(width, height, req_width, req_height);
    log::debug!(
        "Sample factor {} for {}x{} source (requested {}x{})",
        factor,
        width,
        height,
        req_width,
        req_height
    );

    let target = stored_target(&info, factor);
    let reader = guessed_reader(bytes)?;
    let decoded = match reader.format() {
        Some(ImageFormat::Jpeg) => match decode_jpeg_scaled(bytes, target, config)? {
            Some(img) => img,
            None => decode_limited(guessed_reader(bytes)?, config)?,
        },
        _ => decode_limited(reader, config)?,
    };
    let img = reduce_and_orient(decoded, target, info.orientation);

    let buffer = RasterBuffer::from_dynamic(img).map_err(|_| DecodeError::ResourceExhausted {
        width,
        height,
    })?;

    log::info!(
        "Decoded {}x{} source to {}x{}",
        width,
        height,
        buffer.width(),
        buffer.height()
    );
    Ok(buffer)
}

/// Read a file and decode it with [`decode_sampled`].
///
/// # Errors
///
/// Returns `DecodeError::IoError` if the file cannot be read, otherwise the
/// errors of [`decode_sampled`].
pub fn decode_sampled_file(
    path: impl AsRef<Path>,
    req_width: u32,
    req_height: u32,
) -> Result<RasterBuffer, DecodeError> {
    let bytes = std::fs::read(path.as_ref()).map_err(|e| DecodeError::IoError(e.to_string()))?;
    decode_sampled(&bytes, req_width, req_height)
}

/// Reduced size in stored (pre-orientation) axes.
fn stored_target(info: &SourceInfo, factor: u32) -> (u32, u32) {
    ((info.width / factor).max(1), (info.height / factor).max(1))
}

/// Bring a decoded frame to `target`, then turn it upright.
fn reduce_and_orient(
    img: DynamicImage,
    target: (u32, u32),
    orientation: Orientation,
) -> DynamicImage {
    let img = if (img.width(), img.height()) == target {
        img
    } else {
        img.resize_exact(target.0, target.1, image::imageops::FilterType::Triangle)
    };
    apply_orientation(img, orientation)
}

/// Decode a JPEG with DCT scaling to the smallest size covering `target`.
///
/// Returns `None` for pixel layouts the scaled path does not handle
/// (16-bit gray, CMYK); the caller falls back to a full decode.
fn decode_jpeg_scaled(
    bytes: &[u8],
    target: (u32, u32),
    config: &DecodeConfig,
) -> Result<Option<DynamicImage>, DecodeError> {
    let mut decoder = jpeg_decoder::Decoder::new(bytes);
    decoder.set_max_decoding_buffer_size(
        usize::try_from(config.max_decode_bytes()).unwrap_or(usize::MAX),
    );
    decoder.read_info().map_err(map_jpeg_error)?;
    let Some(info) = decoder.info() else {
        return Err(DecodeError::CorruptedFile("missing JPEG header".to_string()));
    };
    let format = info.pixel_format;
    if !matches!(
        format,
        jpeg_decoder::PixelFormat::RGB24 | jpeg_decoder::PixelFormat::L8
    ) {
        log::debug!("Scaled JPEG decode skipped for {:?} pixels", format);
        return Ok(None);
    }

    let requested = (
        target.0.min(u16::MAX as u32) as u16,
        target.1.min(u16::MAX as u32) as u16,
    );
    let (width, height) = decoder
        .scale(requested.0, requested.1)
        .map_err(map_jpeg_error)?;
    let pixels = decoder.decode().map_err(map_jpeg_error)?;
    log::debug!(
        "JPEG decoded at {}x{} for target {}x{}",
        width,
        height,
        target.0,
        target.1
    );

    let (width, height) = (width as u32, height as u32);
    let img = match format {
        jpeg_decoder::PixelFormat::L8 => {
            image::GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
        }
        _ => image::RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
    };
    img.map(Some)
        .ok_or_else(|| DecodeError::CorruptedFile("short JPEG pixel data".to_string()))
}

/// Full decode through `image`, refusing allocations above the budget.
fn decode_limited(
    mut reader: ImageReader<Cursor<&[u8]>>,
    config: &DecodeConfig,
) -> Result<DynamicImage, DecodeError> {
    let mut limits = Limits::default();
    limits.max_alloc = Some(config.max_decode_bytes());
    reader.limits(limits);
    reader.decode().map_err(map_image_error)
}

fn guessed_reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::IoError(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }
    Ok(reader)
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        ImageError::Limits(_) => DecodeError::ResourceExhausted {
            width: 0,
            height: 0,
        },
        ImageError::IoError(e) => DecodeError::IoError(e.to_string()),
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}

fn map_jpeg_error(err: jpeg_decoder::Error) -> DecodeError {
    match err {
        jpeg_decoder::Error::Unsupported(_) => DecodeError::InvalidFormat,
        jpeg_decoder::Error::Io(e) => DecodeError::IoError(e.to_string()),
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelFormat;
    use image::{DynamicImage, ImageFormat};

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn png_rgb(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 77])
        });
        encode_png(DynamicImage::ImageRgb8(img))
    }

    fn jpeg(img: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    #[test]
    fn test_sample_factor_fits_returns_one() {
        assert_eq!(compute_sample_factor(100, 100, 1024, 1024), 1);
        assert_eq!(compute_sample_factor(1024, 1024, 1024, 1024), 1);
    }

    #[test]
    fn test_sample_factor_square_4000() {
        // halves are 2000: 2000/1 >= 1024 doubles, 2000/2 = 1000 < 1024 stops
        assert_eq!(compute_sample_factor(4000, 4000, 1024, 1024), 2);
    }

    #[test]
    fn test_sample_factor_2000_by_3000() {
        // half width 1000 < 1024 on the first check
        assert_eq!(compute_sample_factor(2000, 3000, 1024, 1024), 1);
    }

    #[test]
    fn test_sample_factor_large_source() {
        assert_eq!(compute_sample_factor(8000, 6000, 1000, 1000), 4);
        assert_eq!(compute_sample_factor(4096, 4096, 512, 512), 8);
    }

    #[test]
    fn test_sample_factor_zero_request() {
        let factor = compute_sample_factor(64, 64, 0, 0);
        assert!(factor.is_power_of_two());
        assert_eq!(factor, 64);
    }

    #[test]
    fn test_read_source_info() {
        let info = read_source_info(&png_rgb(30, 20)).unwrap();
        assert_eq!((info.width, info.height), (30, 20));
        assert_eq!(info.orientation, Orientation::Normal);
    }

    #[test]
    fn test_decode_without_sampling() {
        let buffer = decode_sampled(&png_rgb(40, 30), 1024, 1024).unwrap();
        assert_eq!(buffer.dimensions(), (40, 30));
        assert_eq!(buffer.format(), PixelFormat::Rgb8);
        assert_eq!(buffer.pixel(5, 7), [5, 7, 77, 255]);
    }

    #[test]
    fn test_decode_with_sampling() {
        // halves (200, 150) pass once against 100, then 150/2 = 75 stops
        let buffer = decode_sampled(&png_rgb(400, 300), 100, 100).unwrap();
        assert_eq!(buffer.dimensions(), (200, 150));
    }

    #[test]
    fn test_jpeg_decoded_at_reduced_scale() {
        let img = image::RgbImage::from_pixel(400, 300, image::Rgb([200, 40, 40]));
        let bytes = jpeg(DynamicImage::ImageRgb8(img));

        let buffer = decode_sampled(&bytes, 100, 100).unwrap();
        assert_eq!(buffer.dimensions(), (200, 150));
        assert_eq!(buffer.format(), PixelFormat::Rgb8);
        let [r, g, _, _] = buffer.pixel(100, 75);
        assert!(r > 150 && g < 90);

        let full = decode_sampled(&bytes, 1024, 1024).unwrap();
        assert_eq!(full.dimensions(), (400, 300));
    }

    #[test]
    fn test_gray_jpeg_decodes_to_rgb() {
        let img = image::GrayImage::from_pixel(64, 32, image::Luma([128]));
        let bytes = jpeg(DynamicImage::ImageLuma8(img));

        let buffer = decode_sampled(&bytes, 16, 8).unwrap();
        assert_eq!(buffer.dimensions(), (16, 8));
        let [r, g, b, _] = buffer.pixel(8, 4);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn test_stored_target_uses_stored_axes() {
        let info = SourceInfo {
            width: 8000,
            height: 6000,
            orientation: Orientation::Rotate90CW,
        };
        assert_eq!(stored_target(&info, 8), (1000, 750));
        assert_eq!(stored_target(&info, 1), (8000, 6000));
    }

    #[test]
    fn test_orientation_applied_to_reduced_frame() {
        // Stored 8x4, left half white; reduced to 4x2 then turned clockwise
        let img = image::RgbImage::from_fn(8, 4, |x, _| {
            if x < 4 {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        });
        let out = reduce_and_orient(
            DynamicImage::ImageRgb8(img),
            (4, 2),
            Orientation::Rotate90CW,
        )
        .to_rgb8();

        assert_eq!(out.dimensions(), (2, 4));
        // Stored left column becomes the top row
        assert!(out.get_pixel(0, 0)[0] > 250);
        assert!(out.get_pixel(1, 0)[0] > 250);
        assert!(out.get_pixel(0, 3)[0] < 5);
    }

    #[test]
    fn test_full_size_frame_is_only_oriented() {
        let img = image::RgbImage::from_pixel(3, 2, image::Rgb([9, 9, 9]));
        let out = reduce_and_orient(
            DynamicImage::ImageRgb8(img),
            (3, 2),
            Orientation::Rotate270CW,
        );
        assert_eq!((out.width(), out.height()), (2, 3));
    }

    #[test]
    fn test_decode_keeps_alpha() {
        let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([1, 2, 3, 4]));
        let bytes = encode_png(DynamicImage::ImageRgba8(img));
        let buffer = decode_sampled(&bytes, 8, 8).unwrap();
        assert_eq!(buffer.format(), PixelFormat::Rgba8);
        assert_eq!(buffer.pixel(0, 0), [1, 2, 3, 4]);
    }

    #[test]
    fn test_decode_garbage_is_invalid_format() {
        let err = decode_sampled(b"definitely not an image", 100, 100).unwrap_err();
        assert_eq!(err, DecodeError::InvalidFormat);
    }

    #[test]
    fn test_decode_truncated_fails() {
        let bytes = png_rgb(64, 64);
        let truncated = &bytes[..bytes.len() / 2];
        assert!(decode_sampled(truncated, 64, 64).is_err());
    }

    #[test]
    fn test_decode_budget_rejects_large_source() {
        let config = DecodeConfig {
            max_source_pixels: 100,
            ..Default::default()
        };
        let err = decode_sampled_with(&png_rgb(20, 20), 10, 10, &config).unwrap_err();
        assert_eq!(
            err,
            DecodeError::ResourceExhausted {
                width: 20,
                height: 20
            }
        );
    }

    #[test]
    fn test_decode_missing_file_is_io_error() {
        let err = decode_sampled_file("/nonexistent/snapedit/source.jpg", 10, 10).unwrap_err();
        assert!(matches!(err, DecodeError::IoError(_)));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the factor is always a power of two.
        #[test]
        fn prop_factor_is_power_of_two(
            src_w in 1u32..=20_000,
            src_h in 1u32..=20_000,
            req_w in 0u32..=4096,
            req_h in 0u32..=4096,
        ) {
            let factor = compute_sample_factor(src_w, src_h, req_w, req_h);
            prop_assert!(factor >= 1);
            prop_assert!(factor.is_power_of_two());
        }

        /// Property: a source within the requested bound is never sampled.
        #[test]
        fn prop_fitting_source_is_one(
            req_w in 1u32..=4096,
            req_h in 1u32..=4096,
            shrink_w in 0.0f64..=1.0,
            shrink_h in 0.0f64..=1.0,
        ) {
            let src_w = ((req_w as f64 * shrink_w) as u32).max(1);
            let src_h = ((req_h as f64 * shrink_h) as u32).max(1);
            prop_assert_eq!(compute_sample_factor(src_w, src_h, req_w, req_h), 1);
        }

        /// Property: every doubling was justified by both halved dimensions.
        #[test]
        fn prop_sampled_output_covers_request(
            src_w in 1u32..=20_000,
            src_h in 1u32..=20_000,
            req_w in 1u32..=4096,
            req_h in 1u32..=4096,
        ) {
            let factor = compute_sample_factor(src_w, src_h, req_w, req_h);
            if factor > 1 {
                let previous = factor / 2;
                prop_assert!((src_w / 2) / previous >= req_w);
                prop_assert!((src_h / 2) / previous >= req_h);
            }
            prop_assert!((src_w / 2) / factor < req_w || (src_h / 2) / factor < req_h
                || (src_w <= req_w && src_h <= req_h));
        }
    }
}
