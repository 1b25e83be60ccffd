//! Crop rectangle manipulation.
//!
//! The overlay owns a [`CropRect`] inside a `width` x `height` image and
//! moves or resizes it in response to pointer drags. After every mutation
//! the rect is fully contained in the image and at least `min_extent` wide
//! and tall (or as large as the image, if the image is smaller).
//!
//! # Hit Regions
//!
//! With `b` the border hit width, a pointer-down is classified in order:
//! 1. Inside by more than `b` on every side: move the whole rect
//! 2. Within `b` of the left, right, top or bottom edge and inside the
//!    edge's perpendicular span: resize that edge
//! 3. Anything else starts no drag

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CropConfig;
use crate::raster::PixelRect;

use super::Point;

/// Crop rectangle in image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl CropRect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    /// Integer pixel rectangle, truncating each coordinate.
    pub fn to_pixel_rect(&self) -> PixelRect {
        PixelRect::new(
            self.left as i64,
            self.top as i64,
            self.right as i64,
            self.bottom as i64,
        )
    }
}

/// Crop aspect ratio presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    FourThree,
    #[serde(rename = "16:9")]
    SixteenNine,
    #[serde(rename = "3:4")]
    ThreeFour,
    #[serde(rename = "9:16")]
    NineSixteen,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 6] = [
        AspectRatio::Free,
        AspectRatio::Square,
        AspectRatio::FourThree,
        AspectRatio::SixteenNine,
        AspectRatio::ThreeFour,
        AspectRatio::NineSixteen,
    ];

    /// Width and height terms of the ratio, `None` for free cropping.
    pub fn terms(self) -> Option<(f32, f32)> {
        match self {
            AspectRatio::Free => None,
            AspectRatio::Square => Some((1.0, 1.0)),
            AspectRatio::FourThree => Some((4.0, 3.0)),
            AspectRatio::SixteenNine => Some((16.0, 9.0)),
            AspectRatio::ThreeFour => Some((3.0, 4.0)),
            AspectRatio::NineSixteen => Some((9.0, 16.0)),
        }
    }

    /// Initial rect for an image of the given size.
    ///
    /// Free cropping starts at 10%-90% of each side. Fixed ratios start with
    /// the largest rect of that ratio that fits, centered, with whole-pixel
    /// sides.
    pub fn initial_rect(self, width: f32, height: f32) -> CropRect {
        let Some((rw, rh)) = self.terms() else {
            return CropRect::new(width * 0.1, height * 0.1, width * 0.9, height * 0.9);
        };

        let (bw, bh) = (width.floor(), height.floor());
        let (w, h) = if rw >= rh {
            // Landscape and square: start from the full width
            let h = (bw * rh / rw).floor();
            if h > bh {
                ((bh * rw / rh).floor(), bh)
            } else {
                (bw, h)
            }
        } else {
            let w = (bh * rw / rh).floor();
            if w > bw {
                (bw, (bw * rh / rw).floor())
            } else {
                (w, bh)
            }
        };

        let left = ((bw - w) / 2.0).floor();
        let top = ((bh - h) / 2.0).floor();
        CropRect::new(left, top, left + w, top + h)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AspectRatio::Free => "free",
            AspectRatio::Square => "1:1",
            AspectRatio::FourThree => "4:3",
            AspectRatio::SixteenNine => "16:9",
            AspectRatio::ThreeFour => "3:4",
            AspectRatio::NineSixteen => "9:16",
        })
    }
}

/// An aspect ratio name that matches none of the presets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown aspect ratio: {0}")]
pub struct UnknownAspectRatio(pub String);

impl FromStr for AspectRatio {
    type Err = UnknownAspectRatio;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(AspectRatio::Free),
            "1:1" => Ok(AspectRatio::Square),
            "4:3" => Ok(AspectRatio::FourThree),
            "16:9" => Ok(AspectRatio::SixteenNine),
            "3:4" => Ok(AspectRatio::ThreeFour),
            "9:16" => Ok(AspectRatio::NineSixteen),
            _ => Err(UnknownAspectRatio(s.to_string())),
        }
    }
}

/// What a drag does to the rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragMode {
    MoveInterior,
    ResizeLeft,
    ResizeTop,
    ResizeRight,
    ResizeBottom,
}

/// Gesture state of a [`CropOverlay`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum CropGesture {
    #[default]
    Idle,
    Dragging { mode: DragMode, last: Point },
}

type RectListener = Box<dyn FnMut(&CropRect)>;

/// Crop rectangle controller.
pub struct CropOverlay {
    width: f32,
    height: f32,
    rect: CropRect,
    ratio: AspectRatio,
    gesture: CropGesture,
    config: CropConfig,
    listener: Option<RectListener>,
}

impl CropOverlay {
    /// Overlay for a `width` x `height` image with the free preset.
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_config(width, height, CropConfig::default())
    }

    pub fn with_config(width: f32, height: f32, config: CropConfig) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        let mut overlay = Self {
            width,
            height,
            rect: CropRect::default(),
            ratio: AspectRatio::Free,
            gesture: CropGesture::Idle,
            config,
            listener: None,
        };
        overlay.rect = overlay.constrain(AspectRatio::Free.initial_rect(width, height));
        overlay
    }

    /// Register the change listener, replacing any previous one.
    pub fn set_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&CropRect) + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Snapshot of the current rect.
    pub fn rect(&self) -> CropRect {
        self.rect
    }

    pub fn state(&self) -> CropGesture {
        self.gesture
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.ratio
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Replace the rect with the initial rect of `ratio`.
    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.ratio = ratio;
        let rect = self.constrain(ratio.initial_rect(self.width, self.height));
        log::debug!("Crop ratio {} gives rect {:?}", ratio, rect);
        self.commit(rect);
    }

    /// Replace the rect with a host-provided one, constrained to the image.
    pub fn set_rect(&mut self, rect: CropRect) {
        let rect = self.constrain(rect);
        self.commit(rect);
    }

    /// Change the image size. The rect resets to the current preset and any
    /// gesture in progress ends.
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.gesture = CropGesture::Idle;
        self.set_aspect_ratio(self.ratio);
    }

    /// Classify a point against the current rect.
    pub fn hit_test(&self, p: Point) -> Option<DragMode> {
        let r = &self.rect;
        let b = self.config.border_hit_width;

        if p.x > r.left + b && p.x < r.right - b && p.y > r.top + b && p.y < r.bottom - b {
            return Some(DragMode::MoveInterior);
        }

        let within_rows = p.y > r.top && p.y < r.bottom;
        let within_cols = p.x > r.left && p.x < r.right;
        if (p.x - r.left).abs() < b && within_rows {
            Some(DragMode::ResizeLeft)
        } else if (p.x - r.right).abs() < b && within_rows {
            Some(DragMode::ResizeRight)
        } else if (p.y - r.top).abs() < b && within_cols {
            Some(DragMode::ResizeTop)
        } else if (p.y - r.bottom).abs() < b && within_cols {
            Some(DragMode::ResizeBottom)
        } else {
            None
        }
    }

    /// Start a gesture. Returns the drag mode, or `None` if the point misses
    /// the rect and its borders.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<DragMode> {
        let p = Point::new(x, y);
        let mode = self.hit_test(p);
        self.gesture = match mode {
            Some(mode) => CropGesture::Dragging { mode, last: p },
            None => CropGesture::Idle,
        };
        mode
    }

    /// Continue a gesture. Returns `true` if the rect changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let CropGesture::Dragging { mode, last } = self.gesture else {
            return false;
        };

        let p = Point::new(x, y);
        let (dx, dy) = (p.x - last.x, p.y - last.y);
        self.gesture = CropGesture::Dragging { mode, last: p };

        let rect = match mode {
            DragMode::MoveInterior => self.moved(dx, dy),
            DragMode::ResizeLeft => {
                let mut r = self.rect;
                r.left = (r.left + dx).min(r.right - self.min_width()).max(0.0);
                r
            }
            DragMode::ResizeRight => {
                let mut r = self.rect;
                r.right = (r.right + dx).max(r.left + self.min_width()).min(self.width);
                r
            }
            DragMode::ResizeTop => {
                let mut r = self.rect;
                r.top = (r.top + dy).min(r.bottom - self.min_height()).max(0.0);
                r
            }
            DragMode::ResizeBottom => {
                let mut r = self.rect;
                r.bottom = (r.bottom + dy).max(r.top + self.min_height()).min(self.height);
                r
            }
        };

        if rect == self.rect {
            return false;
        }
        self.commit(rect);
        true
    }

    /// End the gesture.
    pub fn pointer_up(&mut self) {
        self.gesture = CropGesture::Idle;
    }

    fn moved(&self, dx: f32, dy: f32) -> CropRect {
        let r = self.rect;
        let (w, h) = (r.width(), r.height());
        let left = (r.left + dx).min(self.width - w).max(0.0);
        let top = (r.top + dy).min(self.height - h).max(0.0);
        CropRect::new(
            left,
            top,
            (left + w).min(self.width),
            (top + h).min(self.height),
        )
    }

    #[inline]
    fn min_width(&self) -> f32 {
        self.config.min_extent.min(self.width)
    }

    #[inline]
    fn min_height(&self) -> f32 {
        self.config.min_extent.min(self.height)
    }

    /// Order, contain and grow `rect` until it meets the invariants.
    fn constrain(&self, rect: CropRect) -> CropRect {
        let (left, right) = ordered(rect.left, rect.right);
        let (top, bottom) = ordered(rect.top, rect.bottom);
        let (left, right) = constrain_span(left, right, self.width, self.min_width());
        let (top, bottom) = constrain_span(top, bottom, self.height, self.min_height());
        CropRect::new(left, top, right, bottom)
    }

    fn commit(&mut self, rect: CropRect) {
        self.rect = rect;
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.rect);
        }
    }
}

impl fmt::Debug for CropOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropOverlay")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rect", &self.rect)
            .field("ratio", &self.ratio)
            .field("gesture", &self.gesture)
            .field("config", &self.config)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

#[inline]
fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Clamp `[start, end]` into `[0, limit]` with a length of at least `min`.
fn constrain_span(start: f32, end: f32, limit: f32, min: f32) -> (f32, f32) {
    let start = start.max(0.0).min(limit);
    let end = end.max(0.0).min(limit);
    if end - start >= min {
        return (start, end);
    }
    // Grow towards the far side, then slide back inside
    let start = start.min(limit - min).max(0.0);
    (start, (start + min).min(limit))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
