//! EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;

use super::Orientation;

/// Extract the EXIF orientation from encoded image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply an EXIF orientation transformation so the image is upright.
pub(crate) fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked_image() -> DynamicImage {
        // 3x2 image with a single white pixel at the top-left corner
        let mut img = image::RgbImage::new(3, 2);
        img.put_pixel(0, 0, image::Rgb([255, 255, 255]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_no_exif_is_normal() {
        assert_eq!(read_orientation(&[]), Orientation::Normal);
        assert_eq!(read_orientation(b"not an image"), Orientation::Normal);
    }

    #[test]
    fn test_normal_is_identity() {
        let img = apply_orientation(marked_image(), Orientation::Normal);
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.to_rgb8().get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_rotate90_swaps_and_moves_marker() {
        let img = apply_orientation(marked_image(), Orientation::Rotate90CW).to_rgb8();
        assert_eq!(img.dimensions(), (2, 3));
        // Top-left moves to top-right under a clockwise quarter turn
        assert_eq!(img.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn test_flip_horizontal_moves_marker() {
        let img = apply_orientation(marked_image(), Orientation::FlipHorizontal).to_rgb8();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 0)[0], 255);
    }
}
