//! WASM bindings for geometry operations.
//!
//! The core operations consume their input; these bindings work on a copy so
//! the JavaScript-side buffer stays usable.

use crate::types::{js_error, JsRasterBuffer};
use snapedit_core::raster::{PixelRect, RasterBuffer};
use snapedit_core::transform;
use snapedit_core::EditError;
use wasm_bindgen::prelude::*;

/// Crop to the pixel rectangle `[left, right) x [top, bottom)`.
///
/// The rectangle is clamped to the image. An empty rectangle leaves the
/// image unchanged.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const rect = cropOverlay.pixel_rect();
/// const cropped = crop(image, rect.left, rect.top, rect.right, rect.bottom);
/// ```
#[wasm_bindgen]
pub fn crop(
    image: &JsRasterBuffer,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
) -> Result<JsRasterBuffer, JsValue> {
    let rect = PixelRect::new(left as i64, top as i64, right as i64, bottom as i64);
    apply(image, |buffer| transform::crop(buffer, rect))
}

/// Rotate by a multiple of 90 degrees. Positive angles turn clockwise.
#[wasm_bindgen]
pub fn rotate(image: &JsRasterBuffer, degrees: i32) -> Result<JsRasterBuffer, JsValue> {
    apply(image, |buffer| transform::rotate(buffer, degrees))
}

/// Mirror horizontally (left-right) or vertically (top-bottom).
#[wasm_bindgen]
pub fn flip(image: &JsRasterBuffer, horizontal: bool) -> Result<JsRasterBuffer, JsValue> {
    apply(image, |buffer| transform::flip(buffer, horizontal))
}

fn apply<F>(image: &JsRasterBuffer, op: F) -> Result<JsRasterBuffer, JsValue>
where
    F: FnOnce(RasterBuffer) -> Result<RasterBuffer, EditError>,
{
    run(image, op).map_err(js_error)
}

fn run<F>(image: &JsRasterBuffer, op: F) -> Result<JsRasterBuffer, EditError>
where
    F: FnOnce(RasterBuffer) -> Result<RasterBuffer, EditError>,
{
    let copy = image.buffer().try_clone()?;
    op(copy).map(JsRasterBuffer::from_buffer)
}
