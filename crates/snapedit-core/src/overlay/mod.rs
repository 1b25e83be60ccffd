//! Interactive overlay state.
//!
//! Overlays hold the geometry a user manipulates with pointer gestures (the
//! crop rectangle, the text annotations) and report every change through a
//! listener. Gestures arrive as a strict down, move*, up sequence; hosts
//! translate their native touch or mouse events into these calls.

pub mod crop;
pub mod text;

use serde::{Deserialize, Serialize};

pub use crop::{AspectRatio, CropGesture, CropOverlay, CropRect, DragMode, UnknownAspectRatio};
pub use text::{
    ElementId, Manipulation, TextElement, TextInteraction, TextOverlay, TextOverlayEvent,
};

/// A pointer position in overlay coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
