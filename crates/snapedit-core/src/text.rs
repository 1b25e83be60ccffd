//! Text rasterization and compositing.
//!
//! Text is first rendered into a [`GlyphMask`], a single-channel coverage
//! grid covering the laid-out line, and then blended onto a buffer centered
//! on a point and rotated about it. The rasterizer sits behind the
//! [`TextRasterizer`] trait so hosts can supply their own font.

use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use thiserror::Error;

use crate::raster::{blend_over, RasterBuffer, Rgba};

/// Errors raised while loading a font.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FontError {
    /// The bytes are not a TrueType or OpenType font.
    #[error("Invalid font data")]
    InvalidFont,
}

/// Single-channel coverage of a line of text, 0 (empty) to 255 (covered).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphMask {
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl GlyphMask {
    /// An empty mask of the given size.
    ///
    /// A size whose coverage cannot be allocated yields a zero-sized mask,
    /// which draws nothing.
    pub fn new(width: u32, height: u32) -> Self {
        let mut coverage = Vec::new();
        let reserved = (width as usize)
            .checked_mul(height as usize)
            .filter(|&len| coverage.try_reserve_exact(len).is_ok());
        let Some(len) = reserved else {
            log::warn!("Text mask of {}x{} cannot be allocated, dropping it", width, height);
            return Self::default();
        };
        coverage.resize(len, 0);
        Self {
            width,
            height,
            coverage,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Coverage at (`x`, `y`); zero outside the mask.
    #[inline]
    pub fn coverage(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0;
        }
        self.coverage[y as usize * self.width as usize + x as usize]
    }

    /// Raise the coverage at (`x`, `y`) to at least `value`. Out-of-bounds
    /// writes are ignored.
    #[inline]
    pub fn accumulate(&mut self, x: i64, y: i64, value: u8) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.coverage[idx] = self.coverage[idx].max(value);
    }

    /// Bilinear coverage at a continuous position, in texel units.
    fn sample(&self, x: f32, y: f32) -> f32 {
        let x = x - 0.5;
        let y = y - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let c00 = self.coverage(x0, y0) as f32;
        let c10 = self.coverage(x0 + 1, y0) as f32;
        let c01 = self.coverage(x0, y0 + 1) as f32;
        let c11 = self.coverage(x0 + 1, y0 + 1) as f32;

        let top = c00 * (1.0 - fx) + c10 * fx;
        let bottom = c01 * (1.0 - fx) + c11 * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

/// Renders a single line of text.
pub trait TextRasterizer {
    /// Width and height of the line's layout box at `size` pixels.
    fn measure(&self, text: &str, size: f32) -> (f32, f32);

    /// Render the line into a mask sized to its layout box.
    fn rasterize(&self, text: &str, size: f32) -> GlyphMask;
}

/// [`TextRasterizer`] backed by an `ab_glyph` font.
#[derive(Clone)]
pub struct FontRasterizer {
    font: FontArc,
}

impl FontRasterizer {
    /// Load a TrueType or OpenType font.
    ///
    /// # Errors
    ///
    /// Returns `FontError::InvalidFont` if the bytes cannot be parsed.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FontError> {
        let font = FontArc::try_from_vec(bytes).map_err(|_| FontError::InvalidFont)?;
        Ok(Self { font })
    }

    /// Lay out `text` on one line, returning the glyphs with their pen
    /// positions, the total advance and the ascent.
    fn layout(&self, text: &str, size: f32) -> (Vec<(GlyphId, f32)>, f32, f32, f32) {
        let scaled = self.font.as_scaled(size);
        let mut glyphs = Vec::with_capacity(text.len());
        let mut cursor_x = 0.0f32;
        let mut last_glyph: Option<GlyphId> = None;

        for ch in text.chars() {
            let glyph_id = self.font.glyph_id(ch);
            if let Some(prev) = last_glyph {
                cursor_x += scaled.kern(prev, glyph_id);
            }
            glyphs.push((glyph_id, cursor_x));
            cursor_x += scaled.h_advance(glyph_id);
            last_glyph = Some(glyph_id);
        }

        (glyphs, cursor_x, scaled.ascent(), scaled.descent())
    }
}

impl std::fmt::Debug for FontRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontRasterizer")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl TextRasterizer for FontRasterizer {
    fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        let (_, width, ascent, descent) = self.layout(text, size);
        (width, ascent - descent)
    }

    fn rasterize(&self, text: &str, size: f32) -> GlyphMask {
        let (glyphs, width, ascent, descent) = self.layout(text, size);
        let mut mask = GlyphMask::new(width.ceil().max(0.0) as u32, (ascent - descent).ceil() as u32);
        if mask.is_empty() {
            return mask;
        }

        for (glyph_id, x) in glyphs {
            let glyph = glyph_id.with_scale_and_position(size, point(x, ascent));
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, cov| {
                    let mx = bounds.min.x as i64 + px as i64;
                    let my = bounds.min.y as i64 + py as i64;
                    mask.accumulate(mx, my, (cov.clamp(0.0, 1.0) * 255.0).round() as u8);
                });
            }
        }
        mask
    }
}

/// Blend `mask` onto `target` in `color`, centered on `center` and rotated
/// about it by `rotation` degrees (clockwise as displayed).
pub fn composite_text(
    target: &mut RasterBuffer,
    mask: &GlyphMask,
    center: (f32, f32),
    rotation: f32,
    color: Rgba,
) {
    if mask.is_empty() || color[3] == 0 {
        return;
    }

    let (cx, cy) = center;
    let half_w = mask.width() as f32 / 2.0;
    let half_h = mask.height() as f32 / 2.0;
    let (sin, cos) = rotation.to_radians().sin_cos();

    // Bounding box of the rotated mask in target space
    let ext_x = half_w * cos.abs() + half_h * sin.abs();
    let ext_y = half_w * sin.abs() + half_h * cos.abs();
    let x0 = ((cx - ext_x).floor() as i64 - 1).max(0);
    let y0 = ((cy - ext_y).floor() as i64 - 1).max(0);
    let x1 = ((cx + ext_x).ceil() as i64 + 1).min(target.width() as i64);
    let y1 = ((cy + ext_y).ceil() as i64 + 1).min(target.height() as i64);

    for y in y0..y1 {
        for x in x0..x1 {
            // Inverse rotation of the pixel center into mask space
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let mx = dx * cos + dy * sin + half_w;
            let my = -dx * sin + dy * cos + half_h;

            let coverage = mask.sample(mx, my);
            if coverage <= 0.0 {
                continue;
            }
            let alpha = (coverage * color[3] as f32 / 255.0).round().clamp(0.0, 255.0) as u8;
            let (px, py) = (x as u32, y as u32);
            let bottom = target.pixel(px, py);
            target.set_pixel(px, py, blend_over(bottom, color, alpha));
        }
    }
}

/// Rasterizer drawing every character as a fully covered box half as wide
/// as it is tall.
#[cfg(test)]
pub(crate) struct BoxRasterizer;

#[cfg(test)]
impl TextRasterizer for BoxRasterizer {
    fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        (text.chars().count() as f32 * size * 0.5, size)
    }

    fn rasterize(&self, text: &str, size: f32) -> GlyphMask {
        let (w, h) = self.measure(text, size);
        let mut mask = GlyphMask::new(w.round() as u32, h.round() as u32);
        for y in 0..mask.height() as i64 {
            for x in 0..mask.width() as i64 {
                mask.accumulate(x, y, 255);
            }
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelFormat;

    const RED: Rgba = [255, 0, 0, 255];
    const BLACK: Rgba = [0, 0, 0, 255];

    fn canvas(width: u32, height: u32) -> RasterBuffer {
        RasterBuffer::filled(width, height, PixelFormat::Rgb8, BLACK).unwrap()
    }

    fn mono() -> FontRasterizer {
        let bytes = include_bytes!("../tests/fixtures/DejaVuSansMono.ttf");
        FontRasterizer::from_bytes(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_font_measure_grows_with_size() {
        let font = mono();
        let (w60, h60) = font.measure("Hi", 60.0);
        let (w120, h120) = font.measure("Hi", 120.0);

        assert!(w60 > 0.0 && h60 > 0.0);
        assert!((w120 - 2.0 * w60).abs() < 1.0, "{} vs {}", w120, w60);
        assert!((h120 - 2.0 * h60).abs() < 1.0);
        // Monospace: every glyph has the same advance
        let (w4, _) = font.measure("iiii", 60.0);
        assert!((w4 - 2.0 * w60).abs() < 0.01);
        assert_eq!(font.measure("", 60.0).0, 0.0);
    }

    #[test]
    fn test_font_mask_matches_measured_box() {
        let font = mono();
        let (w, h) = font.measure("Hi", 60.0);
        let mask = font.rasterize("Hi", 60.0);

        assert_eq!(mask.width(), w.ceil() as u32);
        assert_eq!(mask.height(), h.ceil() as u32);

        let mut covered = 0;
        let mut full = 0;
        for y in 0..mask.height() as i64 {
            for x in 0..mask.width() as i64 {
                match mask.coverage(x, y) {
                    0 => {}
                    255 => {
                        covered += 1;
                        full += 1;
                    }
                    _ => covered += 1,
                }
            }
        }
        assert!(covered > 0);
        assert!(full > 0);
        assert!(covered < mask.width() * mask.height());
    }

    #[test]
    fn test_font_glyphs_sit_on_baseline() {
        let font = mono();
        let mask = font.rasterize("H", 60.0);
        let row_has_ink =
            |y: i64| (0..mask.width() as i64).any(|x| mask.coverage(x, y) > 0);

        // Cap height lies below the ascent and the descender area stays empty
        assert!(!row_has_ink(0));
        assert!(!row_has_ink(mask.height() as i64 - 1));
        assert!((0..mask.height() as i64).any(row_has_ink));
    }

    #[test]
    fn test_font_composite_draws_inside_box() {
        let font = mono();
        let mut target = canvas(120, 120);
        let mask = font.rasterize("Hi", 40.0);
        composite_text(&mut target, &mask, (60.0, 60.0), 0.0, RED);

        let half_w = (mask.width() as f32 / 2.0).ceil() as u32 + 1;
        let half_h = (mask.height() as f32 / 2.0).ceil() as u32 + 1;
        let mut painted = 0;
        for y in 0..120 {
            for x in 0..120 {
                if target.pixel(x, y) != BLACK {
                    painted += 1;
                    assert!(x + half_w >= 60 && x <= 60 + half_w);
                    assert!(y + half_h >= 60 && y <= 60 + half_h);
                }
            }
        }
        assert!(painted > 0);
    }

    #[test]
    fn test_invalid_font() {
        let err = FontRasterizer::from_bytes(b"not a font".to_vec()).unwrap_err();
        assert_eq!(err, FontError::InvalidFont);
    }

    #[test]
    fn test_unallocatable_mask_is_empty() {
        let mask = GlyphMask::new(u32::MAX, u32::MAX);
        assert!(mask.is_empty());
        assert_eq!((mask.width(), mask.height()), (0, 0));
        assert_eq!(mask.coverage(0, 0), 0);
    }

    #[test]
    fn test_mask_bounds() {
        let mut mask = GlyphMask::new(2, 2);
        mask.accumulate(1, 1, 200);
        mask.accumulate(1, 1, 100);
        mask.accumulate(5, 5, 255);
        assert_eq!(mask.coverage(1, 1), 200);
        assert_eq!(mask.coverage(-1, 0), 0);
        assert_eq!(mask.coverage(2, 0), 0);
        assert!(GlyphMask::new(0, 10).is_empty());
    }

    #[test]
    fn test_composite_centered() {
        let mut target = canvas(40, 40);
        // "ab" at size 10 is a 10x10 box
        let mask = BoxRasterizer.rasterize("ab", 10.0);
        composite_text(&mut target, &mask, (20.0, 20.0), 0.0, RED);

        assert_eq!(target.pixel(15, 15), RED);
        assert_eq!(target.pixel(24, 24), RED);
        assert_eq!(target.pixel(14, 20), BLACK);
        assert_eq!(target.pixel(25, 20), BLACK);
        assert_eq!(target.pixel(20, 25), BLACK);
    }

    #[test]
    fn test_composite_quarter_turn_swaps_extent() {
        let mut target = canvas(40, 40);
        // 20 wide, 10 tall
        let mask = BoxRasterizer.rasterize("abcd", 10.0);
        composite_text(&mut target, &mask, (20.0, 20.0), 90.0, RED);

        // After a quarter turn the box is 10 wide and 20 tall
        assert_eq!(target.pixel(20, 11), RED);
        assert_eq!(target.pixel(20, 28), RED);
        assert_eq!(target.pixel(11, 20), BLACK);
        assert_eq!(target.pixel(28, 20), BLACK);
    }

    #[test]
    fn test_composite_clips_at_edges() {
        let mut target = canvas(10, 10);
        let mask = BoxRasterizer.rasterize("abcdefgh", 10.0);
        composite_text(&mut target, &mask, (0.0, 0.0), 45.0, RED);
        assert_eq!(target.pixel(0, 0), RED);
        assert_eq!(target.dimensions(), (10, 10));
    }

    #[test]
    fn test_composite_translucent_color() {
        let mut target = canvas(10, 10);
        let mask = BoxRasterizer.rasterize("ab", 10.0);
        composite_text(&mut target, &mask, (5.0, 5.0), 0.0, [255, 255, 255, 128]);
        let [r, _, _, _] = target.pixel(5, 5);
        assert!((r as i32 - 128).abs() <= 1);
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut target = canvas(10, 10);
        let expected = target.clone();
        let mask = BoxRasterizer.rasterize("", 10.0);
        composite_text(&mut target, &mask, (5.0, 5.0), 0.0, RED);
        assert_eq!(target, expected);
    }
}
