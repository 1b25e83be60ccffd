//! Multi-image stitching WASM bindings.
//!
//! JavaScript cannot hand a slice of buffers across the boundary, so sources
//! are collected on a [`JsStitchLayout`] first.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const layout = new JsStitchLayout('grid');
//! for (const file of files) {
//!   layout.add(decode_sampled(await bytesOf(file), 512, 512));
//! }
//! const canvas = layout.render();
//! ```

use crate::types::{js_error, JsRasterBuffer};
use snapedit_core::config::StitchLimits;
use snapedit_core::raster::RasterBuffer;
use snapedit_core::stitch::{self, CanvasPlan, StitchMode};
use snapedit_core::EditError;
use wasm_bindgen::prelude::*;

/// Sources and mode of a pending stitch.
#[wasm_bindgen]
pub struct JsStitchLayout {
    mode: StitchMode,
    images: Vec<RasterBuffer>,
    limits: StitchLimits,
}

#[wasm_bindgen]
impl JsStitchLayout {
    /// Start a layout: `horizontal`, `vertical` or `grid`.
    #[wasm_bindgen(constructor)]
    pub fn new(mode: &str) -> Result<JsStitchLayout, JsValue> {
        let mode: StitchMode = mode.parse().map_err(js_error)?;
        Ok(Self::with_mode(mode))
    }

    /// Layout mode name.
    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.mode.to_string()
    }

    /// Number of sources added so far.
    #[wasm_bindgen(getter)]
    pub fn count(&self) -> usize {
        self.images.len()
    }

    /// Add a copy of `image` as the next source.
    pub fn add(&mut self, image: &JsRasterBuffer) -> Result<(), JsValue> {
        self.push(image).map_err(js_error)
    }

    /// Drop every source.
    pub fn clear(&mut self) {
        self.images.clear();
    }

    /// Canvas `{ width, height, cols, rows, reduced }` the sources would
    /// produce, without rendering.
    pub fn plan(&self) -> Result<JsValue, JsValue> {
        let plan = self.plan_canvas().map_err(js_error)?;
        serde_wasm_bindgen::to_value(&plan).map_err(js_error)
    }

    /// Render the sources onto one RGB565 canvas.
    ///
    /// # Errors
    ///
    /// Fails with fewer than two or more than four sources, or if the canvas
    /// cannot be allocated.
    pub fn render(&self) -> Result<JsRasterBuffer, JsValue> {
        self.render_canvas()
            .map(JsRasterBuffer::from_buffer)
            .map_err(js_error)
    }
}

impl JsStitchLayout {
    fn with_mode(mode: StitchMode) -> Self {
        Self {
            mode,
            images: Vec::new(),
            limits: StitchLimits::default(),
        }
    }

    fn push(&mut self, image: &JsRasterBuffer) -> Result<(), EditError> {
        if self.images.len() >= self.limits.max_inputs {
            return Err(EditError::TooManyImages {
                count: self.images.len() + 1,
                max: self.limits.max_inputs,
            });
        }
        self.images.push(image.buffer().try_clone()?);
        Ok(())
    }

    fn plan_canvas(&self) -> Result<CanvasPlan, EditError> {
        let dims: Vec<(u32, u32)> = self.images.iter().map(RasterBuffer::dimensions).collect();
        stitch::plan_canvas(self.mode, &dims, &self.limits)
    }

    fn render_canvas(&self) -> Result<RasterBuffer, EditError> {
        stitch::stitch_with_limits(&self.images, self.mode, &self.limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32) -> JsRasterBuffer {
        JsRasterBuffer::try_new(width, height, "rgb8", vec![200u8; (width * height * 3) as usize])
            .unwrap()
    }

    #[test]
    fn test_horizontal_layout() {
        let mut layout = JsStitchLayout::with_mode(StitchMode::Horizontal);
        layout.push(&image(30, 20)).unwrap();
        layout.push(&image(10, 40)).unwrap();

        let plan = layout.plan_canvas().unwrap();
        assert_eq!((plan.width, plan.height), (40, 40));

        let canvas = layout.render_canvas().unwrap();
        assert_eq!(canvas.dimensions(), (40, 40));
    }

    #[test]
    fn test_single_source_is_rejected() {
        let mut layout = JsStitchLayout::with_mode(StitchMode::Grid);
        layout.push(&image(10, 10)).unwrap();
        assert_eq!(
            layout.render_canvas().err(),
            Some(EditError::InsufficientImages { count: 1, min: 2 })
        );
    }

    #[test]
    fn test_fifth_source_is_rejected() {
        let mut layout = JsStitchLayout::with_mode(StitchMode::Grid);
        for _ in 0..4 {
            layout.push(&image(10, 10)).unwrap();
        }
        assert_eq!(
            layout.push(&image(10, 10)),
            Err(EditError::TooManyImages { count: 5, max: 4 })
        );
        assert_eq!(layout.count(), 4);
    }
}
