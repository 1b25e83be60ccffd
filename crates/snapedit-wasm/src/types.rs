//! WASM-compatible wrapper types for raster data.
//!
//! This module provides JavaScript-friendly types that wrap the core SnapEdit
//! types, handling the conversion between Rust and JavaScript data
//! representations.

use std::fmt::Display;

use snapedit_core::decode::FilterType;
use snapedit_core::raster::{PixelFormat, RasterBuffer};
use wasm_bindgen::prelude::*;

/// A raster buffer wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()` or
/// `to_rgba()`, a copy is made to JavaScript memory as a `Uint8Array`. Keep
/// buffers in WASM memory across a chain of edits and only extract pixels for
/// display.
///
/// The `free()` method can be called to explicitly release WASM memory, but this is
/// optional as wasm-bindgen's finalizer will handle cleanup automatically.
#[wasm_bindgen]
pub struct JsRasterBuffer {
    inner: RasterBuffer,
}

#[wasm_bindgen]
impl JsRasterBuffer {
    /// Wrap pixel data.
    ///
    /// # Arguments
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    /// * `format` - `"rgb8"`, `"rgba8"` or `"rgb565"`
    /// * `pixels` - Row-major pixel data in that format
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: u32,
        height: u32,
        format: &str,
        pixels: Vec<u8>,
    ) -> Result<JsRasterBuffer, JsValue> {
        Self::try_new(width, height, format, pixels).map_err(js_error)
    }

    /// Get the width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Get the height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Get the pixel format name
    #[wasm_bindgen(getter)]
    pub fn format(&self) -> String {
        format_name(self.inner.format()).to_string()
    }

    /// Get the number of bytes in the pixel buffer
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_size()
    }

    /// Returns the pixel data in the buffer's own format.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.as_bytes().to_vec()
    }

    /// Returns RGBA pixel data, ready for `ImageData`.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.inner.to_rgba_image().into_raw()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    /// Call this if you want to immediately release memory for a large image.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsRasterBuffer {
    pub(crate) fn try_new(
        width: u32,
        height: u32,
        format: &str,
        pixels: Vec<u8>,
    ) -> Result<Self, String> {
        let format = format_from_str(format)?;
        RasterBuffer::from_raw(width, height, format, pixels)
            .map(Self::from_buffer)
            .map_err(|e| e.to_string())
    }

    pub(crate) fn from_buffer(inner: RasterBuffer) -> Self {
        Self { inner }
    }

    pub(crate) fn buffer(&self) -> &RasterBuffer {
        &self.inner
    }
}

/// Parse a pixel format name.
pub(crate) fn format_from_str(name: &str) -> Result<PixelFormat, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "rgb8" | "rgb" => Ok(PixelFormat::Rgb8),
        "rgba8" | "rgba" => Ok(PixelFormat::Rgba8),
        "rgb565" => Ok(PixelFormat::Rgb565),
        _ => Err(format!("Unknown pixel format: {}", name)),
    }
}

pub(crate) fn format_name(format: PixelFormat) -> &'static str {
    match format {
        PixelFormat::Rgb8 => "rgb8",
        PixelFormat::Rgba8 => "rgba8",
        PixelFormat::Rgb565 => "rgb565",
    }
}

/// Convert a u8 filter type value to the core FilterType enum.
///
/// Values:
/// - 0 = Nearest (fastest, lowest quality)
/// - 1 = Bilinear (good balance of speed and quality)
/// - 2 = Lanczos3 (best quality, slowest)
///
/// Any other value defaults to Bilinear.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear,
    }
}

/// Convert any displayable error into a JS exception value.
pub(crate) fn js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}
