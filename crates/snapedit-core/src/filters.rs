//! Fixed color-filter kernels.
//!
//! Each filter is a per-pixel function of the RGB channels. Alpha passes
//! through untouched and the output keeps the input's dimensions and format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::EditError;
use crate::raster::{RasterBuffer, Rgba};

/// The editor's color filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFilter {
    BlackWhite,
    Vintage,
    Warm,
    Cold,
    Fresh,
}

impl ColorFilter {
    pub const ALL: [ColorFilter; 5] = [
        ColorFilter::BlackWhite,
        ColorFilter::Vintage,
        ColorFilter::Warm,
        ColorFilter::Cold,
        ColorFilter::Fresh,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorFilter::BlackWhite => "black_white",
            ColorFilter::Vintage => "vintage",
            ColorFilter::Warm => "warm",
            ColorFilter::Cold => "cold",
            ColorFilter::Fresh => "fresh",
        }
    }

    /// The per-pixel kernel of this filter.
    pub fn kernel(self) -> fn(Rgba) -> Rgba {
        match self {
            ColorFilter::BlackWhite => black_white,
            ColorFilter::Vintage => vintage,
            ColorFilter::Warm => warm,
            ColorFilter::Cold => cold,
            ColorFilter::Fresh => fresh,
        }
    }
}

impl fmt::Display for ColorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A filter name that matches none of the known filters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown color filter: {0}")]
pub struct UnknownFilter(pub String);

impl FromStr for ColorFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black_white" | "blackwhite" | "bw" => Ok(ColorFilter::BlackWhite),
            "vintage" => Ok(ColorFilter::Vintage),
            "warm" => Ok(ColorFilter::Warm),
            "cold" => Ok(ColorFilter::Cold),
            "fresh" => Ok(ColorFilter::Fresh),
            _ => Err(UnknownFilter(s.to_string())),
        }
    }
}

/// Apply a color filter, producing a new buffer.
///
/// # Errors
///
/// Returns `EditError::ResourceExhausted` if the output cannot be allocated.
pub fn apply_filter(buffer: &RasterBuffer, filter: ColorFilter) -> Result<RasterBuffer, EditError> {
    log::debug!(
        "Applying {} filter to {}x{} buffer",
        filter,
        buffer.width(),
        buffer.height()
    );
    buffer.map_pixels(filter.kernel())
}

/// Luma grayscale: `round(0.299 r + 0.587 g + 0.114 b)` on all three channels.
#[inline]
pub fn black_white([r, g, b, a]: Rgba) -> Rgba {
    let gray = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
        .round()
        .min(255.0) as u8;
    [gray, gray, gray, a]
}

/// Sepia tone. Results are truncated and capped at 255.
#[inline]
pub fn vintage([r, g, b, a]: Rgba) -> Rgba {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let tone = |kr: f32, kg: f32, kb: f32| (kr * r + kg * g + kb * b).min(255.0) as u8;
    [
        tone(0.393, 0.769, 0.189),
        tone(0.349, 0.686, 0.168),
        tone(0.272, 0.534, 0.131),
        a,
    ]
}

/// Shift towards red: red +30, blue -30.
#[inline]
pub fn warm([r, g, b, a]: Rgba) -> Rgba {
    [r.saturating_add(30), g, b.saturating_sub(30), a]
}

/// Shift towards blue: red -30, blue +30.
#[inline]
pub fn cold([r, g, b, a]: Rgba) -> Rgba {
    [r.saturating_sub(30), g, b.saturating_add(30), a]
}

/// Green +20, blue +10.
#[inline]
pub fn fresh([r, g, b, a]: Rgba) -> Rgba {
    [r, g.saturating_add(20), b.saturating_add(10), a]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelFormat;

    #[test]
    fn test_black_white_weights() {
        assert_eq!(black_white([255, 0, 0, 255]), [76, 76, 76, 255]);
        assert_eq!(black_white([0, 255, 0, 255]), [150, 150, 150, 255]);
        assert_eq!(black_white([0, 0, 255, 255]), [29, 29, 29, 255]);
        assert_eq!(black_white([255, 255, 255, 9]), [255, 255, 255, 9]);
    }

    #[test]
    fn test_vintage() {
        // r' = 0.393*100 + 0.769*100 + 0.189*100 = 135.1
        assert_eq!(vintage([100, 100, 100, 255]), [135, 120, 93, 255]);
        assert_eq!(vintage([255, 255, 255, 255]), [255, 255, 238, 255]);
        assert_eq!(vintage([0, 0, 0, 4]), [0, 0, 0, 4]);
    }

    #[test]
    fn test_warm_cold_fresh() {
        assert_eq!(warm([100, 100, 100, 255]), [130, 100, 70, 255]);
        assert_eq!(warm([240, 7, 10, 255]), [255, 7, 0, 255]);
        assert_eq!(cold([100, 100, 100, 255]), [70, 100, 130, 255]);
        assert_eq!(cold([10, 7, 240, 255]), [0, 7, 255, 255]);
        assert_eq!(fresh([100, 100, 100, 255]), [100, 120, 110, 255]);
        assert_eq!(fresh([1, 250, 250, 255]), [1, 255, 255, 255]);
    }

    #[test]
    fn test_apply_filter_keeps_format_and_alpha() {
        let img = RasterBuffer::filled(3, 2, PixelFormat::Rgba8, [100, 100, 100, 50]).unwrap();
        let out = apply_filter(&img, ColorFilter::Warm).unwrap();
        assert_eq!(out.format(), PixelFormat::Rgba8);
        assert_eq!(out.dimensions(), (3, 2));
        assert_eq!(out.pixel(2, 1), [130, 100, 70, 50]);
        // Input untouched
        assert_eq!(img.pixel(2, 1), [100, 100, 100, 50]);
    }

    #[test]
    fn test_filter_names_round_trip() {
        for filter in ColorFilter::ALL {
            assert_eq!(filter.to_string().parse::<ColorFilter>().unwrap(), filter);
        }
        assert_eq!("BW".parse::<ColorFilter>().unwrap(), ColorFilter::BlackWhite);
        assert_eq!(
            "sepia".parse::<ColorFilter>().unwrap_err(),
            UnknownFilter("sepia".to_string())
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::raster::PixelFormat;
    use proptest::prelude::*;

    fn filter_strategy() -> impl Strategy<Value = ColorFilter> {
        prop::sample::select(ColorFilter::ALL.to_vec())
    }

    proptest! {
        /// Property: black and white output is always gray.
        #[test]
        fn prop_black_white_is_gray(px in any::<[u8; 4]>()) {
            let [r, g, b, a] = black_white(px);
            prop_assert_eq!(r, g);
            prop_assert_eq!(g, b);
            prop_assert_eq!(a, px[3]);
        }

        /// Property: every filter preserves alpha.
        #[test]
        fn prop_filters_preserve_alpha(px in any::<[u8; 4]>(), filter in filter_strategy()) {
            prop_assert_eq!(filter.kernel()(px)[3], px[3]);
        }

        /// Property: filtering a buffer matches filtering each pixel.
        #[test]
        fn prop_buffer_matches_kernel(
            data in proptest::collection::vec(any::<u8>(), 4 * 6),
            filter in filter_strategy(),
        ) {
            let img = RasterBuffer::from_raw(3, 2, PixelFormat::Rgba8, data).unwrap();
            let out = apply_filter(&img, filter).unwrap();
            for y in 0..2 {
                for x in 0..3 {
                    prop_assert_eq!(out.pixel(x, y), filter.kernel()(img.pixel(x, y)));
                }
            }
        }
    }
}
