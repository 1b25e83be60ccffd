//! Crop and text overlay controllers for JavaScript.
//!
//! Both wrap the core overlay state machines. The host forwards its pointer
//! events, draws from the snapshots (`rect()`, `elements()`) and registers a
//! callback to hear about changes.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const crop = new JsCropOverlay(view.width, view.height);
//! crop.on_change((rect) => redraw(rect));
//! canvas.onpointerdown = (e) => crop.pointer_down(e.offsetX, e.offsetY);
//! canvas.onpointermove = (e) => crop.pointer_move(e.offsetX, e.offsetY);
//! canvas.onpointerup = () => crop.pointer_up();
//! ```

use crate::types::{js_error, JsRasterBuffer};
use snapedit_core::overlay::{
    AspectRatio, CropOverlay, CropRect, DragMode, ElementId, Manipulation, TextOverlay,
    TextOverlayEvent,
};
use snapedit_core::raster::Rgba;
use snapedit_core::text::FontRasterizer;
use wasm_bindgen::prelude::*;

/// Interactive crop rectangle.
#[wasm_bindgen]
pub struct JsCropOverlay {
    inner: CropOverlay,
}

#[wasm_bindgen]
impl JsCropOverlay {
    /// Overlay for an image displayed at `width` x `height`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> JsCropOverlay {
        Self {
            inner: CropOverlay::new(width, height),
        }
    }

    /// Call `callback(rect)` whenever the rectangle changes.
    pub fn on_change(&mut self, callback: js_sys::Function) {
        self.inner.set_listener(move |rect: &CropRect| {
            let result = serde_wasm_bindgen::to_value(rect)
                .map_err(|e| JsValue::from_str(&e.to_string()))
                .and_then(|value| callback.call1(&JsValue::NULL, &value));
            if result.is_err() {
                log::warn!("Crop change callback failed");
            }
        });
    }

    pub fn clear_listener(&mut self) {
        self.inner.clear_listener();
    }

    /// Switch preset: `free`, `1:1`, `4:3`, `16:9`, `3:4` or `9:16`.
    pub fn set_aspect_ratio(&mut self, name: &str) -> Result<(), JsValue> {
        let ratio: AspectRatio = name.parse().map_err(js_error)?;
        self.inner.set_aspect_ratio(ratio);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn aspect_ratio(&self) -> String {
        self.inner.aspect_ratio().to_string()
    }

    /// The displayed image changed size.
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        self.inner.set_bounds(width, height);
    }

    /// Replace the rectangle; it is constrained to the bounds and minimum size.
    pub fn set_rect(&mut self, left: f32, top: f32, right: f32, bottom: f32) {
        self.inner.set_rect(CropRect::new(left, top, right, bottom));
    }

    /// Current rectangle as `{ left, top, right, bottom }`.
    pub fn rect(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.rect()).map_err(js_error)
    }

    /// Current rectangle truncated to whole pixels.
    pub fn pixel_rect(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.rect().to_pixel_rect()).map_err(js_error)
    }

    /// Start a drag. Returns the drag mode, or `undefined` if the pointer
    /// missed the rectangle.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<String> {
        self.inner
            .pointer_down(x, y)
            .map(|mode| drag_mode_name(mode).to_string())
    }

    /// Returns true if the rectangle changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.inner.pointer_move(x, y)
    }

    pub fn pointer_up(&mut self) {
        self.inner.pointer_up();
    }
}

/// Text annotations drawn with one font.
#[wasm_bindgen]
pub struct JsTextOverlay {
    inner: TextOverlay<FontRasterizer>,
}

#[wasm_bindgen]
impl JsTextOverlay {
    /// Create an overlay from TrueType/OpenType font bytes.
    #[wasm_bindgen(constructor)]
    pub fn new(font: Vec<u8>) -> Result<JsTextOverlay, JsValue> {
        let rasterizer = FontRasterizer::from_bytes(font).map_err(js_error)?;
        Ok(Self {
            inner: TextOverlay::new(rasterizer),
        })
    }

    /// Call `callback(event)` on selection changes. The event is
    /// `{ Selected: id }` or `"Deselected"`.
    pub fn on_event(&mut self, callback: js_sys::Function) {
        self.inner.set_listener(move |event: &TextOverlayEvent| {
            let result = serde_wasm_bindgen::to_value(event)
                .map_err(|e| JsValue::from_str(&e.to_string()))
                .and_then(|value| callback.call1(&JsValue::NULL, &value));
            if result.is_err() {
                log::warn!("Text event callback failed");
            }
        });
    }

    pub fn clear_listener(&mut self) {
        self.inner.clear_listener();
    }

    /// Add white text at the default size, centered on `(x, y)`.
    pub fn add_text(&mut self, text: &str, x: f32, y: f32) -> f64 {
        self.inner.add_text(text, x, y).0 as f64
    }

    /// Add text with a `0xAARRGGBB` color and a base size in pixels.
    pub fn add_text_styled(&mut self, text: &str, x: f32, y: f32, argb: u32, size: f32) -> f64 {
        self.inner
            .add_text_styled(text, x, y, argb_to_rgba(argb), size)
            .0 as f64
    }

    pub fn remove(&mut self, id: f64) -> bool {
        self.inner.remove(element_id(id)).is_some()
    }

    /// Remove the selected element. Returns false if nothing was selected.
    pub fn remove_selected(&mut self) -> bool {
        self.inner.remove_selected().is_some()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn set_text(&mut self, id: f64, text: &str) -> bool {
        self.inner.set_text(element_id(id), text)
    }

    pub fn set_color(&mut self, id: f64, argb: u32) -> bool {
        self.inner.set_color(element_id(id), argb_to_rgba(argb))
    }

    pub fn set_size(&mut self, id: f64, size: f32) -> bool {
        self.inner.set_size(element_id(id), size)
    }

    /// Id of the selected element, or `undefined`.
    #[wasm_bindgen(getter)]
    pub fn selected(&self) -> Option<f64> {
        self.inner.selected().map(|id| id.0 as f64)
    }

    /// Snapshot of every element in drawing order.
    pub fn elements(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.elements()).map_err(js_error)
    }

    /// Start a gesture. Returns `drag`, `scale` or `rotate`, or `undefined`
    /// if no element is under the pointer.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<String> {
        self.inner
            .pointer_down(x, y)
            .map(|mode| manipulation_name(mode).to_string())
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.inner.pointer_move(x, y)
    }

    pub fn pointer_up(&mut self) {
        self.inner.pointer_up();
    }

    /// Flatten every element onto a copy of `image`.
    pub fn composite(&self, image: &JsRasterBuffer) -> Result<JsRasterBuffer, JsValue> {
        self.inner
            .composite(image.buffer())
            .map(JsRasterBuffer::from_buffer)
            .map_err(js_error)
    }
}

fn element_id(id: f64) -> ElementId {
    ElementId(id.max(0.0) as u64)
}

/// Convert a packed `0xAARRGGBB` color.
fn argb_to_rgba(argb: u32) -> Rgba {
    let [a, r, g, b] = argb.to_be_bytes();
    [r, g, b, a]
}

fn drag_mode_name(mode: DragMode) -> &'static str {
    match mode {
        DragMode::MoveInterior => "move",
        DragMode::ResizeLeft => "left",
        DragMode::ResizeTop => "top",
        DragMode::ResizeRight => "right",
        DragMode::ResizeBottom => "bottom",
    }
}

fn manipulation_name(mode: Manipulation) -> &'static str {
    match mode {
        Manipulation::Drag => "drag",
        Manipulation::Scale => "scale",
        Manipulation::Rotate => "rotate",
    }
}
