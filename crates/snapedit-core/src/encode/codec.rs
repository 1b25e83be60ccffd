//! JPEG and PNG encoding using the `image` crate's encoders.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::raster::{PixelFormat, RasterBuffer};

/// Quality used when saving an edit.
pub const DEFAULT_QUALITY: u8 = 100;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The encoder rejected the image
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Container format of an encoded image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jpeg => f.write_str("jpeg"),
            OutputFormat::Png => f.write_str("png"),
        }
    }
}

/// A format name that matches none of the supported outputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown output format: {0}")]
pub struct UnknownOutputFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownOutputFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" | "image/jpeg" => Ok(OutputFormat::Jpeg),
            "png" | "image/png" => Ok(OutputFormat::Png),
            _ => Err(UnknownOutputFormat(s.to_string())),
        }
    }
}

/// Encode a buffer.
///
/// `quality` only affects JPEG and is clamped to 1-100.
///
/// # Errors
///
/// Returns `EncodeError::EncodingFailed` if the encoder rejects the image.
pub fn encode(
    buffer: &RasterBuffer,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = buffer.dimensions();
    let bytes = match (format, buffer.format()) {
        (OutputFormat::Jpeg, PixelFormat::Rgb8) | (OutputFormat::Png, PixelFormat::Rgb8) => {
            encode_pixels(buffer.as_bytes(), width, height, false, format, quality)?
        }
        (OutputFormat::Png, PixelFormat::Rgba8) => {
            encode_pixels(buffer.as_bytes(), width, height, true, format, quality)?
        }
        _ => {
            let rgb = buffer.to_rgb_image();
            encode_pixels(rgb.as_raw(), width, height, false, format, quality)?
        }
    };
    log::debug!(
        "Encoded {}x{} buffer as {} ({} bytes)",
        width,
        height,
        format,
        bytes.len()
    );
    Ok(bytes)
}

/// Encode a buffer as JPEG.
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for archival or further editing
/// * 60-90: Good quality for sharing
/// * Below 60: Low quality, visible artifacts
pub fn encode_jpeg(buffer: &RasterBuffer, quality: u8) -> Result<Vec<u8>, EncodeError> {
    encode(buffer, OutputFormat::Jpeg, quality)
}

/// Encode raw RGB (or RGBA when `alpha` is set) pixel data.
///
/// JPEG has no alpha channel, so RGBA input is flattened to RGB first.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` for a zero width or height,
/// `EncodeError::InvalidPixelData` if the data length doesn't match, and
/// `EncodeError::EncodingFailed` if the encoder rejects the image.
pub fn encode_pixels(
    pixels: &[u8],
    width: u32,
    height: u32,
    alpha: bool,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let channels = if alpha { 4 } else { 3 };
    let expected = (width as usize) * (height as usize) * channels;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }

    let mut output = Cursor::new(Vec::new());
    let result = match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));
            if alpha {
                let rgb: Vec<u8> = pixels
                    .chunks_exact(4)
                    .flat_map(|px| [px[0], px[1], px[2]])
                    .collect();
                encoder.write_image(&rgb, width, height, ExtendedColorType::Rgb8)
            } else {
                encoder.write_image(pixels, width, height, ExtendedColorType::Rgb8)
            }
        }
        OutputFormat::Png => {
            let color = if alpha {
                ExtendedColorType::Rgba8
            } else {
                ExtendedColorType::Rgb8
            };
            PngEncoder::new(&mut output).write_image(pixels, width, height, color)
        }
    };
    result.map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(output.into_inner())
}


// ============================================================================
// Property-Based Tests
// ============================================================================
