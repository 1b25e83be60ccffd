//! SnapEdit Core - Photo editing engine
//!
//! This crate provides the pixel and overlay engine behind the SnapEdit
//! editor: memory-bounded decoding, geometry transforms, brightness/contrast
//! and color filters, multi-image stitching, the interactive crop and text
//! overlays, and output encoding.
//!
//! Every pixel operation is a pure function from [`RasterBuffer`] to a new
//! `RasterBuffer`; the input is never mutated. Overlays are plain state
//! objects driven by pointer gestures and report changes through listeners.
//! Nothing here spawns threads or touches global state, so hosts may run
//! operations on worker threads as long as each overlay stays on one.

pub mod adjustments;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod filters;
pub mod overlay;
pub mod raster;
pub mod stitch;
pub mod text;
pub mod transform;

pub use adjustments::{adjust_brightness_contrast, BrightnessContrast};
pub use config::{CropConfig, DecodeConfig, EditorConfig, StitchLimits, TextConfig};
pub use decode::{compute_sample_factor, decode_sampled, DecodeError, SourceInfo};
pub use encode::{encode, encode_jpeg, EncodeError, OutputFormat, RasterSink};
pub use error::EditError;
pub use filters::{apply_filter, ColorFilter};
pub use overlay::{CropOverlay, CropRect, Point, TextOverlay};
pub use raster::{PixelFormat, PixelRect, RasterBuffer, Rgba};
pub use stitch::{stitch, StitchMode};
pub use text::{FontRasterizer, TextRasterizer};
pub use transform::{crop, flip, rotate};

/// Crate version, as reported to hosts.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
