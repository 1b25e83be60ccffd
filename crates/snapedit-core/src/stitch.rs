//! Multi-image stitching.
//!
//! Two to four buffers are laid out side by side, stacked, or placed in a
//! grid on one canvas. Canvas size is negotiated against [`StitchLimits`]
//! before anything is allocated, and the canvas is always `Rgb565` to keep
//! the footprint of large layouts down.
//!
//! # Budget Reduction
//!
//! Linear layouts (horizontal, vertical):
//! 1. If either side exceeds `max_dimension`, both sides are scaled by
//!    `min(max_dimension / width, max_dimension / height)`.
//! 2. If the area still exceeds `max_area`, both sides are scaled by
//!    `sqrt(max_area / area)`.
//!
//! Sources are drawn at their natural size; the budget only bounds the
//! canvas, so content past a reduced canvas edge is clipped.
//!
//! Grid layouts cap each cell at `grid_cell_max`, cap each side of the
//! canvas at `grid_max_dimension`, apply the same area cap, and then resample
//! every source to exactly fill its cell.
//!
//! All scaled sizes are truncated towards zero.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::StitchLimits;
use crate::decode::{resize, FilterType};
use crate::error::EditError;
use crate::raster::{PixelFormat, RasterBuffer};

/// Fewest images a stitch accepts.
pub const MIN_STITCH_IMAGES: usize = 2;

/// Pixel format of every stitched canvas.
pub const CANVAS_FORMAT: PixelFormat = PixelFormat::Rgb565;

/// How images are arranged on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StitchMode {
    /// Left to right, vertically centered.
    #[default]
    Horizontal,
    /// Top to bottom, horizontally centered.
    Vertical,
    /// Up to two columns and two rows, each image resampled into its cell.
    Grid,
}

impl fmt::Display for StitchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StitchMode::Horizontal => "horizontal",
            StitchMode::Vertical => "vertical",
            StitchMode::Grid => "grid",
        })
    }
}

/// A stitch mode name that matches none of the known modes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown stitch mode: {0}")]
pub struct UnknownStitchMode(pub String);

impl FromStr for StitchMode {
    type Err = UnknownStitchMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(StitchMode::Horizontal),
            "vertical" => Ok(StitchMode::Vertical),
            "grid" | "grid2x2" => Ok(StitchMode::Grid),
            _ => Err(UnknownStitchMode(s.to_string())),
        }
    }
}

/// Canvas dimensions chosen for a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasPlan {
    pub width: u32,
    pub height: u32,
    /// Columns and rows of the layout. Linear layouts use one row or column.
    pub cols: u32,
    pub rows: u32,
    /// Whether a budget reduction shrank the canvas.
    pub reduced: bool,
}

impl CanvasPlan {
    /// Size of one grid cell on this canvas.
    pub fn cell_size(&self) -> (u32, u32) {
        (
            (self.width / self.cols).max(1),
            (self.height / self.rows).max(1),
        )
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Grid columns and rows for `count` images, as `(cols, rows)`.
///
/// One image gets a 1x1 grid, two images a 2x1 grid, three or four a 2x2
/// grid (three leaves the last cell empty).
pub fn grid_shape(count: usize) -> (u32, u32) {
    let rows = if count > 2 { 2 } else { 1 };
    let cols = if count == 1 { 1 } else { 2 };
    (cols, rows)
}

/// Plan the canvas for sources of the given dimensions.
///
/// Unlike [`stitch`], planning accepts a single source so the one-image grid
/// can be inspected.
///
/// # Errors
///
/// Returns `EditError::InsufficientImages` if `dims` is empty.
pub fn plan_canvas(
    mode: StitchMode,
    dims: &[(u32, u32)],
    limits: &StitchLimits,
) -> Result<CanvasPlan, EditError> {
    if dims.is_empty() {
        return Err(EditError::InsufficientImages { count: 0, min: 1 });
    }

    let plan = match mode {
        StitchMode::Horizontal => {
            let width = dims.iter().map(|d| d.0 as u64).sum::<u64>();
            let height = dims.iter().map(|d| d.1).max().unwrap_or(1) as u64;
            let (width, height, reduced) = reduce_linear(width, height, limits);
            CanvasPlan {
                width,
                height,
                cols: dims.len() as u32,
                rows: 1,
                reduced,
            }
        }
        StitchMode::Vertical => {
            let width = dims.iter().map(|d| d.0).max().unwrap_or(1) as u64;
            let height = dims.iter().map(|d| d.1 as u64).sum::<u64>();
            let (width, height, reduced) = reduce_linear(width, height, limits);
            CanvasPlan {
                width,
                height,
                cols: 1,
                rows: dims.len() as u32,
                reduced,
            }
        }
        StitchMode::Grid => plan_grid(dims, limits),
    };

    if plan.reduced {
        log::warn!(
            "{} stitch canvas reduced to {}x{} to stay within budget",
            mode,
            plan.width,
            plan.height
        );
    }
    log::debug!("Planned {} canvas {:?}", mode, plan);
    Ok(plan)
}

fn reduce_linear(width: u64, height: u64, limits: &StitchLimits) -> (u32, u32, bool) {
    let max_dim = limits.max_dimension as u64;
    let (mut w, mut h) = (width, height);
    let mut reduced = false;

    if w > max_dim || h > max_dim {
        let scale = (max_dim as f64 / w as f64).min(max_dim as f64 / h as f64);
        (w, h) = scale_dims(w, h, scale);
        reduced = true;
    }

    let (w, h, area_reduced) = cap_area(w, h, limits.max_area);
    (w as u32, h as u32, reduced || area_reduced)
}

fn plan_grid(dims: &[(u32, u32)], limits: &StitchLimits) -> CanvasPlan {
    let (cols, rows) = grid_shape(dims.len());
    let cell_w = dims.iter().map(|d| d.0).max().unwrap_or(1).min(limits.grid_cell_max);
    let cell_h = dims.iter().map(|d| d.1).max().unwrap_or(1).min(limits.grid_cell_max);

    let max_dim = limits.grid_max_dimension as u64;
    let mut w = cell_w as u64 * cols as u64;
    let mut h = cell_h as u64 * rows as u64;
    let mut reduced = false;

    if w > max_dim {
        (w, h) = scale_dims(w, h, max_dim as f64 / w as f64);
        reduced = true;
    }
    if h > max_dim {
        (w, h) = scale_dims(w, h, max_dim as f64 / h as f64);
        reduced = true;
    }

    let (w, h, area_reduced) = cap_area(w, h, limits.max_area);
    CanvasPlan {
        width: w as u32,
        height: h as u32,
        cols,
        rows,
        reduced: reduced || area_reduced,
    }
}

fn cap_area(width: u64, height: u64, max_area: u64) -> (u64, u64, bool) {
    let area = width * height;
    if area <= max_area {
        return (width, height, false);
    }

    let scale = (max_area as f64 / area as f64).sqrt();
    let (mut w, mut h) = scale_dims(width, height, scale);
    // Float truncation can leave the product a hair over the cap
    while w * h > max_area && (w > 1 || h > 1) {
        if w >= h {
            w -= 1;
        } else {
            h -= 1;
        }
    }
    (w, h, true)
}

#[inline]
fn scale_dims(width: u64, height: u64, scale: f64) -> (u64, u64) {
    (
        ((width as f64 * scale) as u64).max(1),
        ((height as f64 * scale) as u64).max(1),
    )
}

/// A stitch mode with its validated sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchLayout {
    mode: StitchMode,
    images: Vec<RasterBuffer>,
}

impl StitchLayout {
    /// Validate a layout against the default limits.
    ///
    /// # Errors
    ///
    /// - `EditError::InsufficientImages` for fewer than two images.
    /// - `EditError::TooManyImages` for more than four images.
    pub fn new(mode: StitchMode, images: Vec<RasterBuffer>) -> Result<Self, EditError> {
        Self::with_limits(mode, images, &StitchLimits::default())
    }

    /// Validate a layout against `limits.max_inputs`.
    pub fn with_limits(
        mode: StitchMode,
        images: Vec<RasterBuffer>,
        limits: &StitchLimits,
    ) -> Result<Self, EditError> {
        validate_count(images.len(), limits)?;
        Ok(Self { mode, images })
    }

    pub fn mode(&self) -> StitchMode {
        self.mode
    }

    pub fn images(&self) -> &[RasterBuffer] {
        &self.images
    }

    /// Hand the sources back.
    pub fn into_images(self) -> Vec<RasterBuffer> {
        self.images
    }

    /// Plan the canvas without allocating it.
    pub fn plan(&self, limits: &StitchLimits) -> Result<CanvasPlan, EditError> {
        let dims: Vec<(u32, u32)> = self.images.iter().map(RasterBuffer::dimensions).collect();
        plan_canvas(self.mode, &dims, limits)
    }

    /// Render the layout onto a new canvas.
    ///
    /// # Errors
    ///
    /// Returns `EditError::ResourceExhausted` if the canvas or a resampled
    /// cell cannot be allocated. Nothing is returned in that case; every
    /// intermediate buffer is released.
    pub fn render(&self, limits: &StitchLimits) -> Result<RasterBuffer, EditError> {
        render_images(self.mode, &self.images, limits)
    }
}

/// Stitch images with the default limits.
///
/// # Errors
///
/// - `EditError::InsufficientImages` for fewer than two images.
/// - `EditError::TooManyImages` for more than four images.
/// - `EditError::ResourceExhausted` if the canvas cannot be allocated.
pub fn stitch(images: &[RasterBuffer], mode: StitchMode) -> Result<RasterBuffer, EditError> {
    stitch_with_limits(images, mode, &StitchLimits::default())
}

/// Stitch images with explicit limits.
pub fn stitch_with_limits(
    images: &[RasterBuffer],
    mode: StitchMode,
    limits: &StitchLimits,
) -> Result<RasterBuffer, EditError> {
    validate_count(images.len(), limits)?;
    render_images(mode, images, limits)
}

fn validate_count(count: usize, limits: &StitchLimits) -> Result<(), EditError> {
    if count < MIN_STITCH_IMAGES {
        return Err(EditError::InsufficientImages {
            count,
            min: MIN_STITCH_IMAGES,
        });
    }
    if count > limits.max_inputs {
        return Err(EditError::TooManyImages {
            count,
            max: limits.max_inputs,
        });
    }
    Ok(())
}

fn render_images(
    mode: StitchMode,
    images: &[RasterBuffer],
    limits: &StitchLimits,
) -> Result<RasterBuffer, EditError> {
    let dims: Vec<(u32, u32)> = images.iter().map(RasterBuffer::dimensions).collect();
    let plan = plan_canvas(mode, &dims, limits)?;
    let mut canvas = RasterBuffer::new(plan.width, plan.height, CANVAS_FORMAT)?;

    match mode {
        StitchMode::Horizontal => {
            let mut x = 0i64;
            for img in images {
                let y = (plan.height as i64 - img.height() as i64) / 2;
                canvas.draw(img, x, y);
                x += img.width() as i64;
            }
        }
        StitchMode::Vertical => {
            let mut y = 0i64;
            for img in images {
                let x = (plan.width as i64 - img.width() as i64) / 2;
                canvas.draw(img, x, y);
                y += img.height() as i64;
            }
        }
        StitchMode::Grid => {
            let (cell_w, cell_h) = plan.cell_size();
            for (i, img) in images.iter().enumerate() {
                let col = i as u32 % plan.cols;
                let row = i as u32 / plan.cols;
                let cell = resize(img, cell_w, cell_h, FilterType::Bilinear)?;
                canvas.draw(&cell, (col * cell_w) as i64, (row * cell_h) as i64);
            }
        }
    }

    log::info!(
        "Stitched {} images ({}) into {}x{} canvas",
        images.len(),
        mode,
        plan.width,
        plan.height
    );
    Ok(canvas)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
