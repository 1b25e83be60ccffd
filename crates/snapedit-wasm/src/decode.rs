//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`compute_sample_factor`] - Power-of-two sample factor for a requested size
//! - [`read_source_info`] - Dimensions and EXIF orientation from the header
//! - [`decode_sampled`] - Decode to an upright, downsampled buffer
//! - [`resize`] - Resize a buffer to exact dimensions
//! - [`resize_to_fit`] - Resize a buffer to fit within a max edge, preserving aspect ratio
//!
//! # Example
//!
//! ```typescript
//! import { decode_sampled, read_source_info } from '@snapedit/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const info = read_source_info(bytes);
//! console.log(`Source ${info.width}x${info.height}`);
//!
//! const preview = decode_sampled(bytes, 1024, 1024);
//! ```

use crate::types::{filter_from_u8, js_error, JsRasterBuffer};
use snapedit_core::config::DecodeConfig;
use snapedit_core::decode;
use wasm_bindgen::prelude::*;

/// Largest power-of-two factor by which a source can be downsampled while
/// still covering `req_width` x `req_height`.
#[wasm_bindgen]
pub fn compute_sample_factor(
    source_width: u32,
    source_height: u32,
    req_width: u32,
    req_height: u32,
) -> u32 {
    decode::compute_sample_factor(source_width, source_height, req_width, req_height)
}

/// Read `{ width, height, orientation }` without decoding pixels.
#[wasm_bindgen]
pub fn read_source_info(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let info = decode::read_source_info(bytes).map_err(js_error)?;
    serde_wasm_bindgen::to_value(&info).map_err(js_error)
}

/// Decode image bytes into an upright buffer sampled towards the requested
/// size.
///
/// # Errors
///
/// Returns an error if:
/// - The bytes are not a supported image format
/// - The image is corrupted or truncated
/// - The source exceeds the decode budget
#[wasm_bindgen]
pub fn decode_sampled(
    bytes: &[u8],
    req_width: u32,
    req_height: u32,
) -> Result<JsRasterBuffer, JsValue> {
    decode::decode_sampled(bytes, req_width, req_height)
        .map(JsRasterBuffer::from_buffer)
        .map_err(js_error)
}

/// Decode with an explicit `DecodeConfig` passed as a plain object.
#[wasm_bindgen]
pub fn decode_sampled_with(
    bytes: &[u8],
    req_width: u32,
    req_height: u32,
    config: JsValue,
) -> Result<JsRasterBuffer, JsValue> {
    let config: DecodeConfig = if config.is_undefined() || config.is_null() {
        DecodeConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(js_error)?
    };
    decode::decode_sampled_with(bytes, req_width, req_height, &config)
        .map(JsRasterBuffer::from_buffer)
        .map_err(js_error)
}

/// Resize a buffer to exact dimensions.
///
/// `filter`: 0 = Nearest, 1 = Bilinear, 2 = Lanczos3.
#[wasm_bindgen]
pub fn resize(
    image: &JsRasterBuffer,
    width: u32,
    height: u32,
    filter: u8,
) -> Result<JsRasterBuffer, JsValue> {
    decode::resize(image.buffer(), width, height, filter_from_u8(filter))
        .map(JsRasterBuffer::from_buffer)
        .map_err(js_error)
}

/// Resize a buffer so its longest edge is at most `max_edge`.
#[wasm_bindgen]
pub fn resize_to_fit(
    image: &JsRasterBuffer,
    max_edge: u32,
    filter: u8,
) -> Result<JsRasterBuffer, JsValue> {
    decode::resize_to_fit(image.buffer(), max_edge, filter_from_u8(filter))
        .map(JsRasterBuffer::from_buffer)
        .map_err(js_error)
}


/// WASM-specific tests that require JsValue.
///
/// These tests use functions that return `Result<T, JsValue>` and can only
/// run on wasm32 targets. Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use snapedit_core::encode::{encode, OutputFormat};
    use snapedit_core::raster::{PixelFormat, RasterBuffer};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let buffer = RasterBuffer::filled(width, height, PixelFormat::Rgb8, [10, 20, 30, 255]).unwrap();
        encode(&buffer, OutputFormat::Png, 100).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_decode_sampled_halves_large_source() {
        let decoded = decode_sampled(&png_bytes(64, 32), 16, 16).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 16));
    }

    #[wasm_bindgen_test]
    fn test_decode_sampled_invalid_bytes() {
        assert!(decode_sampled(&[0u8; 16], 16, 16).is_err());
    }

    #[wasm_bindgen_test]
    fn test_resize_to_fit() {
        let image = decode_sampled(&png_bytes(40, 20), 40, 20).unwrap();
        let resized = resize_to_fit(&image, 10, 1).unwrap();
        assert_eq!((resized.width(), resized.height()), (10, 5));
    }
}
