//! In-memory raster buffers.
//!
//! A [`RasterBuffer`] is a contiguous, row-major pixel grid in one of three
//! formats. Every engine operation consumes and produces these buffers.
//!
//! # Ownership
//!
//! A buffer has exactly one owner. Geometry operations take the buffer by
//! value so that their no-op cases can hand the very same buffer back without
//! copying; color operations borrow and always allocate a fresh output.
//!
//! # Pixel Access
//!
//! Pixels are exchanged as [`Rgba`] quadruples regardless of storage format.
//! Formats without alpha report an alpha of 255 and ignore written alpha.

use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// An RGBA color quadruple, 8 bits per channel.
pub type Rgba = [u8; 4];

/// Storage format of a [`RasterBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 3 bytes per pixel: R, G, B.
    #[default]
    Rgb8,
    /// 4 bytes per pixel: R, G, B, A (straight alpha).
    Rgba8,
    /// 2 bytes per pixel, little-endian `RRRRRGGG GGGBBBBB`. No alpha.
    Rgb565,
}

impl PixelFormat {
    /// Number of bytes used to store one pixel.
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb565 => 2,
        }
    }

    /// Whether the format carries an alpha channel.
    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Rgba8)
    }

    #[inline]
    fn read(self, bytes: &[u8]) -> Rgba {
        match self {
            PixelFormat::Rgb8 => [bytes[0], bytes[1], bytes[2], 255],
            PixelFormat::Rgba8 => [bytes[0], bytes[1], bytes[2], bytes[3]],
            PixelFormat::Rgb565 => unpack_rgb565(u16::from_le_bytes([bytes[0], bytes[1]])),
        }
    }

    #[inline]
    fn write(self, bytes: &mut [u8], px: Rgba) {
        match self {
            PixelFormat::Rgb8 => bytes.copy_from_slice(&px[..3]),
            PixelFormat::Rgba8 => bytes.copy_from_slice(&px),
            PixelFormat::Rgb565 => bytes.copy_from_slice(&pack_rgb565(px).to_le_bytes()),
        }
    }
}

/// Pack an RGBA pixel into RGB565, dropping alpha.
#[inline]
pub fn pack_rgb565(px: Rgba) -> u16 {
    let r = (px[0] >> 3) as u16;
    let g = (px[1] >> 2) as u16;
    let b = (px[2] >> 3) as u16;
    (r << 11) | (g << 5) | b
}

/// Expand an RGB565 value to RGBA using bit replication.
#[inline]
pub fn unpack_rgb565(value: u16) -> Rgba {
    let r5 = ((value >> 11) & 0x1F) as u8;
    let g6 = ((value >> 5) & 0x3F) as u8;
    let b5 = (value & 0x1F) as u8;
    [
        (r5 << 3) | (r5 >> 2),
        (g6 << 2) | (g6 >> 4),
        (b5 << 3) | (b5 >> 2),
        255,
    ]
}

/// Axis-aligned integer rectangle in pixel coordinates.
///
/// `right` and `bottom` are exclusive. Coordinates may lie outside a buffer;
/// consumers clamp them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl PixelRect {
    pub fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle covering a whole `width` x `height` buffer.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i64, height as i64)
    }

    /// Clamp the rectangle into `[0, width] x [0, height]`.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        let (w, h) = (width as i64, height as i64);
        Self {
            left: self.left.clamp(0, w),
            top: self.top.clamp(0, h),
            right: self.right.clamp(0, w),
            bottom: self.bottom.clamp(0, h),
        }
    }

    /// True when the rectangle encloses no pixels.
    pub fn is_degenerate(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }
}

/// A width x height grid of pixels stored contiguously in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Allocate a zero-filled (black, and transparent for `Rgba8`) buffer.
    ///
    /// # Errors
    ///
    /// - `EditError::InvalidDimensions` if either dimension is zero.
    /// - `EditError::ResourceExhausted` if the byte size overflows or the
    ///   allocation fails.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, EditError> {
        let len = checked_len(width, height, format)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| EditError::ResourceExhausted { width, height })?;
        data.resize(len, 0);
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Allocate a buffer filled with a single color.
    pub fn filled(
        width: u32,
        height: u32,
        format: PixelFormat,
        color: Rgba,
    ) -> Result<Self, EditError> {
        let mut buffer = Self::new(width, height, format)?;
        let bpp = format.bytes_per_pixel();
        for chunk in buffer.data.chunks_exact_mut(bpp) {
            format.write(chunk, color);
        }
        Ok(buffer)
    }

    /// Copy the buffer, reporting allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self, EditError> {
        let mut copy = Self::new(self.width, self.height, self.format)?;
        copy.data.copy_from_slice(&self.data);
        Ok(copy)
    }

    /// Wrap existing pixel bytes.
    ///
    /// # Errors
    ///
    /// - `EditError::InvalidDimensions` if either dimension is zero.
    /// - `EditError::InvalidPixelData` if `data` does not hold exactly
    ///   `width * height * bytes_per_pixel` bytes.
    pub fn from_raw(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, EditError> {
        let expected = checked_len(width, height, format)?;
        if data.len() != expected {
            return Err(EditError::InvalidPixelData {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Take ownership of an `image::RgbImage`.
    pub fn from_rgb_image(img: image::RgbImage) -> Result<Self, EditError> {
        let (width, height) = img.dimensions();
        Self::from_raw(width, height, PixelFormat::Rgb8, img.into_raw())
    }

    /// Take ownership of an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> Result<Self, EditError> {
        let (width, height) = img.dimensions();
        Self::from_raw(width, height, PixelFormat::Rgba8, img.into_raw())
    }

    /// Convert a decoded `DynamicImage`, keeping alpha only when present.
    pub fn from_dynamic(img: image::DynamicImage) -> Result<Self, EditError> {
        if img.color().has_alpha() {
            Self::from_rgba_image(img.into_rgba8())
        } else {
            Self::from_rgb_image(img.into_rgb8())
        }
    }

    /// Copy into an `image::RgbImage`, dropping alpha.
    pub fn to_rgb_image(&self) -> image::RgbImage {
        if self.format == PixelFormat::Rgb8 {
            if let Some(img) = image::RgbImage::from_raw(self.width, self.height, self.data.clone())
            {
                return img;
            }
        }
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            let [r, g, b, _] = self.pixel(x, y);
            image::Rgb([r, g, b])
        })
    }

    /// Copy into an `image::RgbaImage`.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        if self.format == PixelFormat::Rgba8 {
            if let Some(img) =
                image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            {
                return img;
            }
        }
        image::RgbaImage::from_fn(self.width, self.height, |x, y| image::Rgba(self.pixel(x, y)))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw pixel bytes in row-major order.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer, returning its pixel bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Number of pixels (`width * height`).
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Size of the pixel storage in bytes.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        y * self.stride() + x * self.format.bytes_per_pixel()
    }

    /// Read a pixel. Coordinates are clamped into the buffer.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let idx = self.offset(x, y);
        self.format
            .read(&self.data[idx..idx + self.format.bytes_per_pixel()])
    }

    /// Write a pixel. Coordinates are clamped into the buffer.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, px: Rgba) {
        let idx = self.offset(x, y);
        let bpp = self.format.bytes_per_pixel();
        self.format.write(&mut self.data[idx..idx + bpp], px);
    }

    /// Row `y` as raw bytes.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y.min(self.height - 1) as usize * self.stride();
        &self.data[start..start + self.stride()]
    }

    #[inline]
    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y.min(self.height - 1) as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Produce a new buffer of identical dimensions and format by mapping
    /// every pixel through `f`.
    pub fn map_pixels<F>(&self, f: F) -> Result<RasterBuffer, EditError>
    where
        F: Fn(Rgba) -> Rgba,
    {
        let mut output = RasterBuffer::new(self.width, self.height, self.format)?;
        let bpp = self.format.bytes_per_pixel();
        for (src, dst) in self
            .data
            .chunks_exact(bpp)
            .zip(output.data.chunks_exact_mut(bpp))
        {
            let px = self.format.read(src);
            self.format.write(dst, f(px));
        }
        Ok(output)
    }

    /// Convert to another pixel format.
    pub fn convert(&self, format: PixelFormat) -> Result<RasterBuffer, EditError> {
        if format == self.format {
            return self.try_clone();
        }
        let mut output = RasterBuffer::new(self.width, self.height, format)?;
        let (src_bpp, dst_bpp) = (self.format.bytes_per_pixel(), format.bytes_per_pixel());
        for (src, dst) in self
            .data
            .chunks_exact(src_bpp)
            .zip(output.data.chunks_exact_mut(dst_bpp))
        {
            format.write(dst, self.format.read(src));
        }
        Ok(output)
    }

    /// Draw `src` with its top-left corner at (`x`, `y`).
    ///
    /// Parts of `src` falling outside this buffer are clipped. Sources with
    /// alpha are blended source-over; opaque sources replace destination
    /// pixels.
    pub fn draw(&mut self, src: &RasterBuffer, x: i64, y: i64) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + src.width as i64).min(self.width as i64);
        let y1 = (y + src.height as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for dy in y0..y1 {
            let sy = (dy - y) as u32;
            for dx in x0..x1 {
                let sx = (dx - x) as u32;
                let top = src.pixel(sx, sy);
                if src.format.has_alpha() && top[3] < 255 {
                    let bottom = self.pixel(dx as u32, dy as u32);
                    self.set_pixel(dx as u32, dy as u32, blend_over(bottom, top, top[3]));
                } else {
                    self.set_pixel(dx as u32, dy as u32, top);
                }
            }
        }
    }
}

/// Blend `top` over `bottom` with coverage `alpha` (0-255).
#[inline]
pub(crate) fn blend_over(bottom: Rgba, top: Rgba, alpha: u8) -> Rgba {
    if alpha == 0 {
        return bottom;
    }
    if alpha == 255 {
        return [top[0], top[1], top[2], 255];
    }
    let a = alpha as f32 / 255.0;
    let inv = 1.0 - a;
    let mix = |t: u8, b: u8| (t as f32 * a + b as f32 * inv).round().clamp(0.0, 255.0) as u8;
    let out_alpha = (alpha as f32 + bottom[3] as f32 * inv).round().clamp(0.0, 255.0) as u8;
    [
        mix(top[0], bottom[0]),
        mix(top[1], bottom[1]),
        mix(top[2], bottom[2]),
        out_alpha,
    ]
}

fn checked_len(width: u32, height: u32, format: PixelFormat) -> Result<usize, EditError> {
    if width == 0 || height == 0 {
        return Err(EditError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(format.bytes_per_pixel()))
        .ok_or(EditError::ResourceExhausted { width, height })
}
