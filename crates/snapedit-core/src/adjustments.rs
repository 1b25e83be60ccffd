//! Brightness and contrast adjustment.
//!
//! Both adjustments act on every color channel independently, so they are
//! folded into a single 256-entry lookup table that is then applied to each
//! pixel. Alpha is left untouched.
//!
//! ## Per-channel Formula
//! ```text
//! offset = round(brightness / 100 * 255)
//! factor = 1 + contrast
//! c'     = clamp(c + offset, 0, 255)
//! c''    = clamp(round(((c' / 255 - 0.5) * factor + 0.5) * 255), 0, 255)
//! ```
//! Brightness is applied first; each step is clamped on its own.

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::raster::RasterBuffer;

/// Brightness range accepted by [`adjust_brightness_contrast`].
pub const BRIGHTNESS_RANGE: (i32, i32) = (-100, 100);

/// Contrast range accepted by [`adjust_brightness_contrast`].
pub const CONTRAST_RANGE: (f32, f32) = (-0.5, 1.5);

/// Brightness and contrast settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BrightnessContrast {
    /// Brightness (-100 to 100)
    pub brightness: i32,
    /// Contrast (-0.5 to 1.5), 0 leaves contrast unchanged
    pub contrast: f32,
}

impl BrightnessContrast {
    pub fn new(brightness: i32, contrast: f32) -> Self {
        Self {
            brightness,
            contrast,
        }
    }

    /// Map the editor's 0-200 sliders (100 is neutral) to adjustment values.
    pub fn from_sliders(brightness_progress: u32, contrast_progress: u32) -> Self {
        Self {
            brightness: brightness_progress as i32 - 100,
            contrast: (contrast_progress as f32 - 100.0) / 100.0,
        }
    }

    /// Check if both values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Clamp both values into their accepted ranges.
    pub fn clamped(&self) -> Self {
        let brightness = self.brightness.clamp(BRIGHTNESS_RANGE.0, BRIGHTNESS_RANGE.1);
        let contrast = if self.contrast.is_nan() {
            0.0
        } else {
            self.contrast.clamp(CONTRAST_RANGE.0, CONTRAST_RANGE.1)
        };
        Self {
            brightness,
            contrast,
        }
    }

    /// Build the channel lookup table for these settings.
    pub fn lut(&self) -> [u8; 256] {
        let offset = (self.brightness as f32 / 100.0 * 255.0).round() as i32;
        let factor = 1.0 + self.contrast;

        let mut lut = [0u8; 256];
        for (value, entry) in lut.iter_mut().enumerate() {
            let brightened = (value as i32 + offset).clamp(0, 255) as f32;
            let contrasted = (((brightened / 255.0 - 0.5) * factor + 0.5) * 255.0).round();
            *entry = contrasted.clamp(0.0, 255.0) as u8;
        }
        lut
    }

    /// Apply these settings to a buffer.
    pub fn apply(&self, buffer: &RasterBuffer) -> Result<RasterBuffer, EditError> {
        let settings = self.clamped();
        if settings != *self {
            log::warn!(
                "Brightness/contrast ({}, {}) out of range, clamped to ({}, {})",
                self.brightness,
                self.contrast,
                settings.brightness,
                settings.contrast
            );
        }

        let lut = settings.lut();
        buffer.map_pixels(|[r, g, b, a]| [lut[r as usize], lut[g as usize], lut[b as usize], a])
    }
}

/// Adjust brightness and contrast, producing a new buffer of the same
/// dimensions and format.
///
/// Out-of-range arguments are clamped to `[-100, 100]` and `[-0.5, 1.5]`.
///
/// # Errors
///
/// Returns `EditError::ResourceExhausted` if the output cannot be allocated.
pub fn adjust_brightness_contrast(
    buffer: &RasterBuffer,
    brightness: i32,
    contrast: f32,
) -> Result<RasterBuffer, EditError> {
    BrightnessContrast::new(brightness, contrast).apply(buffer)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
