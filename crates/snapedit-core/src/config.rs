//! Host-supplied configuration.
//!
//! Every tunable of the engine lives here with the defaults the editor ships
//! with. All sections deserialize with `#[serde(default)]`, so a host only
//! needs to send the fields it overrides.

use serde::{Deserialize, Serialize};

use crate::raster::Rgba;

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub decode: DecodeConfig,
    pub crop: CropConfig,
    pub text: TextConfig,
    pub stitch: StitchLimits,
}

/// Bounds used when decoding sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Requested width for the editing preview.
    pub preview_width: u32,
    /// Requested height for the editing preview.
    pub preview_height: u32,
    /// Requested width for each stitch input.
    pub stitch_source_width: u32,
    /// Requested height for each stitch input.
    pub stitch_source_height: u32,
    /// Largest source (in pixels, before sampling) the decoder will accept.
    pub max_source_pixels: u64,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            preview_width: 1024,
            preview_height: 1024,
            stitch_source_width: 512,
            stitch_source_height: 512,
            max_source_pixels: 100_000_000,
        }
    }
}

impl DecodeConfig {
    /// Allocation ceiling handed to the decoders: one RGBA frame of
    /// `max_source_pixels`.
    pub fn max_decode_bytes(&self) -> u64 {
        self.max_source_pixels.saturating_mul(4)
    }
}

/// Crop overlay tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Distance from an edge within which a touch grabs that edge.
    pub border_hit_width: f32,
    /// Smallest width and height a crop rect may shrink to.
    pub min_extent: f32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            border_hit_width: 30.0,
            min_extent: 50.0,
        }
    }
}

/// Text overlay tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Font size of elements added without an explicit style.
    pub default_size: f32,
    /// Color of elements added without an explicit style.
    pub default_color: Rgba,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Scale change per unit of vertical pointer movement.
    pub scale_sensitivity: f32,
    /// Size of the square scale handle at the bottom-right of an element.
    pub scale_handle_extent: f32,
    /// Smallest hit-box width and height of an element.
    pub min_hit_extent: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            default_size: 60.0,
            default_color: [255, 255, 255, 255],
            min_scale: 0.5,
            max_scale: 3.0,
            scale_sensitivity: 0.01,
            scale_handle_extent: 50.0,
            min_hit_extent: 50.0,
        }
    }
}

/// Size budget for stitched canvases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchLimits {
    /// Largest number of images in one layout.
    pub max_inputs: usize,
    /// Per-axis cap for horizontal and vertical canvases.
    pub max_dimension: u32,
    /// Pixel-area cap for every canvas.
    pub max_area: u64,
    /// Per-axis cap of a grid cell.
    pub grid_cell_max: u32,
    /// Per-axis cap for grid canvases.
    pub grid_max_dimension: u32,
}

impl Default for StitchLimits {
    fn default() -> Self {
        Self {
            max_inputs: 4,
            max_dimension: 4096,
            max_area: 2048 * 2048,
            grid_cell_max: 512,
            grid_max_dimension: 2048,
        }
    }
}
