//! Brightness/contrast and color filter WASM bindings.

use crate::types::{js_error, JsRasterBuffer};
use snapedit_core::adjustments::BrightnessContrast;
use snapedit_core::filters::{self, ColorFilter};
use wasm_bindgen::prelude::*;

/// Apply brightness (-100 to 100) and contrast (-0.5 to 1.5).
///
/// Out-of-range values are clamped. Returns a new buffer in the source
/// format; alpha is preserved.
///
/// # Example (TypeScript)
/// ```typescript
/// const adjusted = adjust_brightness_contrast(sourceImage, 20, 0.3);
/// const pixels = adjusted.to_rgba();
/// ```
#[wasm_bindgen]
pub fn adjust_brightness_contrast(
    image: &JsRasterBuffer,
    brightness: i32,
    contrast: f32,
) -> Result<JsRasterBuffer, JsValue> {
    BrightnessContrast::new(brightness, contrast)
        .apply(image.buffer())
        .map(JsRasterBuffer::from_buffer)
        .map_err(js_error)
}

/// Apply brightness/contrast from the editor's 0-200 slider positions,
/// where 100 is neutral.
#[wasm_bindgen]
pub fn adjust_from_sliders(
    image: &JsRasterBuffer,
    brightness_progress: u32,
    contrast_progress: u32,
) -> Result<JsRasterBuffer, JsValue> {
    BrightnessContrast::from_sliders(brightness_progress, contrast_progress)
        .apply(image.buffer())
        .map(JsRasterBuffer::from_buffer)
        .map_err(js_error)
}

/// Apply a named color filter: `black_white`, `vintage`, `warm`, `cold` or
/// `fresh`.
#[wasm_bindgen]
pub fn apply_filter(image: &JsRasterBuffer, name: &str) -> Result<JsRasterBuffer, JsValue> {
    let filter: ColorFilter = name.parse().map_err(js_error)?;
    filters::apply_filter(image.buffer(), filter)
        .map(JsRasterBuffer::from_buffer)
        .map_err(js_error)
}

/// Names accepted by [`apply_filter`], in menu order.
#[wasm_bindgen]
pub fn filter_names() -> js_sys::Array {
    ColorFilter::ALL
        .iter()
        .map(|filter| JsValue::from_str(filter.name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(value: u8) -> JsRasterBuffer {
        JsRasterBuffer::try_new(4, 4, "rgba8", [value, value, value, 77].repeat(16)).unwrap()
    }

    #[test]
    fn test_sliders_at_center_are_neutral() {
        let img = gray(120);
        let adjusted = BrightnessContrast::from_sliders(100, 100)
            .apply(img.buffer())
            .unwrap();
        assert_eq!(adjusted.as_bytes(), img.buffer().as_bytes());
    }

    #[test]
    fn test_every_filter_name_parses() {
        let img = gray(120);
        for filter in ColorFilter::ALL {
            let parsed: ColorFilter = filter.name().parse().unwrap();
            let out = filters::apply_filter(img.buffer(), parsed).unwrap();
            assert_eq!(out.dimensions(), (4, 4));
            // Alpha untouched
            assert_eq!(out.pixel(0, 0)[3], 77);
        }
    }
}

/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_apply_filter_by_name() {
        let img = JsRasterBuffer::try_new(2, 2, "rgb8", vec![100u8; 12]).unwrap();
        let out = apply_filter(&img, "bw").unwrap();
        assert_eq!(out.pixels(), vec![100u8; 12]);
        assert!(apply_filter(&img, "sepia").is_err());
    }

    #[wasm_bindgen_test]
    fn test_filter_names() {
        assert_eq!(filter_names().length(), 5);
    }
}
