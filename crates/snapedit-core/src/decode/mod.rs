//! Sampled decoding for SnapEdit.
//!
//! This module provides functionality for:
//! - Reading source dimensions and EXIF orientation from the header alone
//! - Computing a power-of-two sample factor against a requested bound
//! - Decoding to an upright, downsampled [`RasterBuffer`](crate::raster::RasterBuffer)
//! - Resampling buffers (grid stitching, thumbnails)
//!
//! # Architecture
//!
//! Decoding is two-pass to bound peak memory: the header is inspected first,
//! the decode budget is checked, and only then are pixels decoded. All
//! operations are synchronous and single-threaded.

mod orientation;
mod resize;
mod sampled;
mod types;

pub use orientation::read_orientation;
pub use resize::{resize, resize_to_fit};
pub use sampled::{
    compute_sample_factor, decode_sampled, decode_sampled_file, decode_sampled_with,
    read_source_info,
};
pub use types::{DecodeError, FilterType, Orientation, SourceInfo};
