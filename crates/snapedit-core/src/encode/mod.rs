//! Output encoding for SnapEdit.
//!
//! This module provides functionality for:
//! - Encoding raster buffers to JPEG (configurable quality) or PNG
//! - Encoding raw RGB/RGBA pixel data with length validation
//! - A [`RasterSink`] seam through which finished edits are handed to the
//!   host for persistence
//!
//! JPEG output is always 8-bit RGB: alpha is dropped and RGB565 buffers are
//! expanded. PNG keeps alpha when the buffer has it.

mod codec;
mod sink;

pub use codec::{
    encode, encode_jpeg, encode_pixels, EncodeError, OutputFormat, UnknownOutputFormat,
    DEFAULT_QUALITY,
};
pub use sink::{EncodedImage, EncodedSink, RasterSink};
