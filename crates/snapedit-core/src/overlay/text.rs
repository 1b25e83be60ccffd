//! Text annotations.
//!
//! A [`TextOverlay`] keeps an ordered list of [`TextElement`]s; later
//! elements sit on top. Each element is centered on its `(x, y)` position
//! and rotated about it, so hit-testing happens in the element's own rotated
//! frame.
//!
//! # Gestures
//!
//! A pointer-down selects the topmost element under the pointer and picks a
//! manipulation from where it landed:
//! - farther from the center than half the element's width: rotate
//! - inside the scale handle at the bottom-right corner: scale
//! - anywhere else: drag
//!
//! A pointer-down on empty space ends the selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::TextConfig;
use crate::error::EditError;
use crate::raster::{RasterBuffer, Rgba};
use crate::text::{composite_text, TextRasterizer};

use super::Point;

/// Stable identifier of a text element within one overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A positioned, styled text annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub id: ElementId,
    pub text: String,
    /// Center of the text.
    pub x: f32,
    pub y: f32,
    pub color: Rgba,
    /// Base font size in pixels.
    pub size: f32,
    /// Multiplier on `size`, within the configured scale bounds.
    pub scale: f32,
    /// Clockwise rotation in degrees, in `[0, 360)`.
    pub rotation: f32,
}

impl TextElement {
    /// Font size the element is drawn at.
    #[inline]
    pub fn font_size(&self) -> f32 {
        self.size * self.scale
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Offset of `p` from the center in the element's unrotated frame.
    fn to_local(&self, p: Point) -> (f32, f32) {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let dx = p.x - self.x;
        let dy = p.y - self.y;
        (dx * cos + dy * sin, -dx * sin + dy * cos)
    }
}

/// What a gesture does to the selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Manipulation {
    Drag,
    Scale,
    Rotate,
}

/// Interaction state of a [`TextOverlay`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum TextInteraction {
    #[default]
    Idle,
    Selected(ElementId),
    Manipulating {
        id: ElementId,
        mode: Manipulation,
        last: Point,
    },
}

impl TextInteraction {
    pub fn selected(&self) -> Option<ElementId> {
        match *self {
            TextInteraction::Idle => None,
            TextInteraction::Selected(id) | TextInteraction::Manipulating { id, .. } => Some(id),
        }
    }
}

/// Selection changes reported to the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextOverlayEvent {
    Selected(ElementId),
    Deselected,
}

type EventListener = Box<dyn FnMut(&TextOverlayEvent)>;

/// Text annotation controller.
pub struct TextOverlay<R> {
    rasterizer: R,
    elements: Vec<TextElement>,
    interaction: TextInteraction,
    config: TextConfig,
    next_id: u64,
    listener: Option<EventListener>,
}

impl<R: TextRasterizer> TextOverlay<R> {
    pub fn new(rasterizer: R) -> Self {
        Self::with_config(rasterizer, TextConfig::default())
    }

    pub fn with_config(rasterizer: R, config: TextConfig) -> Self {
        Self {
            rasterizer,
            elements: Vec::new(),
            interaction: TextInteraction::Idle,
            config,
            next_id: 1,
            listener: None,
        }
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Register the selection listener, replacing any previous one.
    pub fn set_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&TextOverlayEvent) + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Elements in drawing order.
    pub fn elements(&self) -> &[TextElement] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&TextElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn interaction(&self) -> TextInteraction {
        self.interaction
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.interaction.selected()
    }

    pub fn selected_element(&self) -> Option<&TextElement> {
        self.selected().and_then(|id| self.element(id))
    }

    /// Add text in the default style. The new element goes on top.
    pub fn add_text(&mut self, text: impl Into<String>, x: f32, y: f32) -> ElementId {
        let (color, size) = (self.config.default_color, self.config.default_size);
        self.add_text_styled(text, x, y, color, size)
    }

    /// Add text with an explicit color and base size.
    pub fn add_text_styled(
        &mut self,
        text: impl Into<String>,
        x: f32,
        y: f32,
        color: Rgba,
        size: f32,
    ) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.push(TextElement {
            id,
            text: text.into(),
            x,
            y,
            color,
            size: sanitize_size(size, self.config.default_size),
            scale: 1.0,
            rotation: 0.0,
        });
        log::debug!("Added text element {}", id);
        id
    }

    /// Remove an element, ending the selection if it was selected.
    pub fn remove(&mut self, id: ElementId) -> Option<TextElement> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        let removed = self.elements.remove(index);
        if self.selected() == Some(id) {
            self.deselect();
        }
        Some(removed)
    }

    /// Remove the selected element, if any.
    pub fn remove_selected(&mut self) -> Option<TextElement> {
        let id = self.selected()?;
        self.remove(id)
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.deselect();
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> bool {
        self.update(id, |e| e.text = text.into())
    }

    pub fn set_color(&mut self, id: ElementId, color: Rgba) -> bool {
        self.update(id, |e| e.color = color)
    }

    /// Change the base size. Non-positive sizes are ignored.
    pub fn set_size(&mut self, id: ElementId, size: f32) -> bool {
        if size.is_nan() || size <= 0.0 {
            return false;
        }
        self.update(id, |e| e.size = size)
    }

    /// Set the scale, clamped to the configured bounds.
    pub fn set_scale(&mut self, id: ElementId, scale: f32) -> bool {
        let (min, max) = (self.config.min_scale, self.config.max_scale);
        self.update(id, |e| e.scale = clamp_scale(scale, min, max))
    }

    /// Set the rotation, normalized into `[0, 360)`.
    pub fn set_rotation(&mut self, id: ElementId, degrees: f32) -> bool {
        self.update(id, |e| e.rotation = normalize_degrees(degrees))
    }

    /// Half width and half height of an element's hit box.
    pub fn half_extents(&self, element: &TextElement) -> (f32, f32) {
        let (w, h) = self
            .rasterizer
            .measure(&element.text, element.font_size());
        let min = self.config.min_hit_extent;
        (w.max(min) / 2.0, h.max(min) / 2.0)
    }

    /// Topmost element whose hit box contains `(x, y)`.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<ElementId> {
        let p = Point::new(x, y);
        self.elements
            .iter()
            .rev()
            .find(|e| {
                let (half_w, half_h) = self.half_extents(e);
                let (lx, ly) = e.to_local(p);
                lx.abs() <= half_w && ly.abs() <= half_h
            })
            .map(|e| e.id)
    }

    /// Pick the manipulation for a pointer at `p` on `element`.
    pub fn classify(&self, element: &TextElement, p: Point) -> Manipulation {
        let (half_w, half_h) = self.half_extents(element);
        let handle = self.config.scale_handle_extent;
        let (lx, ly) = element.to_local(p);

        if p.distance(element.center()) > half_w {
            Manipulation::Rotate
        } else if lx > half_w - handle && ly > half_h - handle {
            Manipulation::Scale
        } else {
            Manipulation::Drag
        }
    }

    /// Start a gesture: select the topmost element under the pointer, or
    /// end the selection if there is none.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<Manipulation> {
        let p = Point::new(x, y);
        let Some(id) = self.hit_test(x, y) else {
            self.deselect();
            return None;
        };

        let mode = self
            .element(id)
            .map(|e| self.classify(e, p))
            .unwrap_or(Manipulation::Drag);
        self.interaction = TextInteraction::Manipulating { id, mode, last: p };
        self.emit(TextOverlayEvent::Selected(id));
        Some(mode)
    }

    /// Continue a gesture. Returns `true` if the selected element changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let TextInteraction::Manipulating { id, mode, last } = self.interaction else {
            return false;
        };

        let p = Point::new(x, y);
        self.interaction = TextInteraction::Manipulating { id, mode, last: p };
        let (dx, dy) = (p.x - last.x, p.y - last.y);
        let config = self.config;

        self.update(id, |e| match mode {
            Manipulation::Drag => {
                e.x += dx;
                e.y += dy;
            }
            Manipulation::Scale => {
                let factor = 1.0 + dy * config.scale_sensitivity;
                e.scale = clamp_scale(e.scale * factor, config.min_scale, config.max_scale);
            }
            Manipulation::Rotate => {
                let before = (last.y - e.y).atan2(last.x - e.x);
                let after = (p.y - e.y).atan2(p.x - e.x);
                e.rotation = normalize_degrees(e.rotation + (after - before).to_degrees());
            }
        })
    }

    /// End the gesture, keeping the element selected.
    pub fn pointer_up(&mut self) {
        if let TextInteraction::Manipulating { id, .. } = self.interaction {
            self.interaction = TextInteraction::Selected(id);
        }
    }

    /// Draw every element onto a copy of `base`, in order.
    ///
    /// # Errors
    ///
    /// Returns `EditError::ResourceExhausted` if the copy cannot be allocated.
    pub fn composite(&self, base: &RasterBuffer) -> Result<RasterBuffer, EditError> {
        let mut output = base.try_clone()?;
        for element in &self.elements {
            let mask = self
                .rasterizer
                .rasterize(&element.text, element.font_size());
            composite_text(
                &mut output,
                &mask,
                (element.x, element.y),
                element.rotation,
                element.color,
            );
        }
        log::info!(
            "Composited {} text elements onto {}x{} buffer",
            self.elements.len(),
            output.width(),
            output.height()
        );
        Ok(output)
    }

    fn update<F>(&mut self, id: ElementId, f: F) -> bool
    where
        F: FnOnce(&mut TextElement),
    {
        match self.elements.iter_mut().find(|e| e.id == id) {
            Some(element) => {
                f(element);
                true
            }
            None => false,
        }
    }

    fn deselect(&mut self) {
        let was_selected = self.selected().is_some();
        self.interaction = TextInteraction::Idle;
        if was_selected {
            self.emit(TextOverlayEvent::Deselected);
        }
    }

    fn emit(&mut self, event: TextOverlayEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener(&event);
        }
    }
}

impl<R> fmt::Debug for TextOverlay<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextOverlay")
            .field("elements", &self.elements)
            .field("interaction", &self.interaction)
            .field("config", &self.config)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

#[inline]
fn clamp_scale(scale: f32, min: f32, max: f32) -> f32 {
    if scale.is_nan() {
        return min;
    }
    scale.max(min).min(max)
}

#[inline]
fn sanitize_size(size: f32, fallback: f32) -> f32 {
    if size > 0.0 {
        size
    } else {
        fallback
    }
}

/// Wrap an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
