//! SnapEdit WASM - WebAssembly bindings for SnapEdit
//!
//! This crate provides WASM bindings to expose the snapedit-core engine to
//! JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for raster data
//! - `decode` - Sampled decoding and resizing
//! - `transform` - Crop, quarter-turn rotation and flips
//! - `adjustments` - Brightness/contrast and color filters
//! - `stitch` - Multi-image stitching
//! - `overlay` - Crop and text overlay controllers
//! - `encode` - JPEG/PNG export
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_sampled, rotate, encode_jpeg } from '@snapedit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_sampled(bytes, 1024, 1024);
//! const upright = rotate(image, 90);
//! const jpeg = encode_jpeg(upright, 100);
//! ```

use log::LevelFilter;
use snapedit_core::config::EditorConfig;
use wasm_bindgen::prelude::*;

mod adjustments;
mod decode;
mod encode;
mod logging;
mod overlay;
mod stitch;
mod transform;
mod types;

// Re-export public types
pub use adjustments::{
    adjust_brightness_contrast, adjust_from_sliders, apply_filter, filter_names,
};
pub use decode::{
    compute_sample_factor, decode_sampled, decode_sampled_with, read_source_info, resize,
    resize_to_fit,
};
pub use encode::{encode_image, encode_jpeg, encode_jpeg_pixels};
pub use overlay::{JsCropOverlay, JsTextOverlay};
pub use stitch::JsStitchLayout;
pub use transform::{crop, flip, rotate};
pub use types::JsRasterBuffer;

/// Initialize the WASM module (called automatically on load)
///
/// Installs the console logger and routes panics to `console.error`.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::install(LevelFilter::Info);
}

/// Set the console log level: `off`, `error`, `warn`, `info`, `debug` or `trace`.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let level: LevelFilter = level.parse().map_err(types::js_error)?;
    logging::install(level);
    Ok(())
}

/// Default engine configuration as a plain object.
#[wasm_bindgen]
pub fn default_config() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&EditorConfig::default()).map_err(types::js_error)
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    snapedit_core::VERSION.to_string()
}
