//! Hand-off of finished edits to the host.

use serde::{Deserialize, Serialize};

use crate::raster::RasterBuffer;

use super::codec::{encode, EncodeError, OutputFormat};

/// Accepts a finished buffer for persistence.
///
/// Where the bytes end up (gallery, file, upload) is the host's business.
/// Closures with the matching signature implement this trait.
pub trait RasterSink {
    /// Persist `buffer` in `format`. `quality` is 0-100 and only meaningful
    /// for lossy formats.
    fn accept(
        &mut self,
        buffer: &RasterBuffer,
        format: OutputFormat,
        quality: u8,
    ) -> Result<(), EncodeError>;
}

impl<F> RasterSink for F
where
    F: FnMut(&RasterBuffer, OutputFormat, u8) -> Result<(), EncodeError>,
{
    fn accept(
        &mut self,
        buffer: &RasterBuffer,
        format: OutputFormat,
        quality: u8,
    ) -> Result<(), EncodeError> {
        self(buffer, format, quality)
    }
}

/// One encoded output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Sink that encodes in memory and keeps every output.
#[derive(Debug, Clone, Default)]
pub struct EncodedSink {
    outputs: Vec<EncodedImage>,
}

impl EncodedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outputs(&self) -> &[EncodedImage] {
        &self.outputs
    }

    pub fn last(&self) -> Option<&EncodedImage> {
        self.outputs.last()
    }

    pub fn into_outputs(self) -> Vec<EncodedImage> {
        self.outputs
    }
}

impl RasterSink for EncodedSink {
    fn accept(
        &mut self,
        buffer: &RasterBuffer,
        format: OutputFormat,
        quality: u8,
    ) -> Result<(), EncodeError> {
        let bytes = encode(buffer, format, quality)?;
        log::info!(
            "Saved {}x{} {} ({} bytes)",
            buffer.width(),
            buffer.height(),
            format,
            bytes.len()
        );
        self.outputs.push(EncodedImage {
            format,
            width: buffer.width(),
            height: buffer.height(),
            bytes,
        });
        Ok(())
    }
}
