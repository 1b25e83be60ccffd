//! Image encoding WASM bindings.
//!
//! The host persists the returned bytes however it likes (download, upload,
//! IndexedDB).
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const jpeg = encode_jpeg(edited, 100);
//! const blob = new Blob([jpeg], { type: 'image/jpeg' });
//! ```

use crate::types::{js_error, JsRasterBuffer};
use snapedit_core::encode::{self, OutputFormat};
use wasm_bindgen::prelude::*;

/// Encode a buffer as JPEG. `quality` is clamped to 1-100.
#[wasm_bindgen]
pub fn encode_jpeg(image: &JsRasterBuffer, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(image.buffer(), quality).map_err(js_error)
}

/// Encode a buffer as `jpeg` or `png`.
#[wasm_bindgen]
pub fn encode_image(image: &JsRasterBuffer, format: &str, quality: u8) -> Result<Vec<u8>, JsValue> {
    let format: OutputFormat = format.parse().map_err(js_error)?;
    encode::encode(image.buffer(), format, quality).map_err(js_error)
}

/// Encode raw RGB pixel data (3 bytes per pixel) as JPEG.
#[wasm_bindgen]
pub fn encode_jpeg_pixels(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, JsValue> {
    encode::encode_pixels(pixels, width, height, false, OutputFormat::Jpeg, quality)
        .map_err(js_error)
}

/// Tests for encode bindings.
///
/// Note: Most encode tests use functions that return `Result<T, JsValue>`, which
/// only work on wasm32 targets. For comprehensive encode testing, see the tests
/// in `snapedit_core::encode` which test the underlying functionality.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_buffer_creates_valid_jpeg() {
        let img = JsRasterBuffer::try_new(10, 10, "rgb565", vec![0x1F; 10 * 10 * 2]).unwrap();
        let jpeg = encode::encode_jpeg(img.buffer(), 90).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }
}

/// WASM-specific tests that require JsValue.
///
/// These tests use functions that return `Result<T, JsValue>` and can only
/// run on wasm32 targets. Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_encode_jpeg_pixels_basic() {
        let pixels = vec![128u8; 100 * 100 * 3];
        let jpeg = encode_jpeg_pixels(&pixels, 100, 100, 90).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[wasm_bindgen_test]
    fn test_encode_jpeg_pixels_invalid_data() {
        let pixels = vec![128u8; 50 * 50 * 3];
        assert!(encode_jpeg_pixels(&pixels, 100, 100, 90).is_err());
        assert!(encode_jpeg_pixels(&pixels, 0, 100, 90).is_err());
    }

    #[wasm_bindgen_test]
    fn test_encode_image_png() {
        let img = JsRasterBuffer::try_new(4, 4, "rgba8", vec![7u8; 64]).unwrap();
        let png = encode_image(&img, "png", 100).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert!(encode_image(&img, "gif", 100).is_err());
    }
}
