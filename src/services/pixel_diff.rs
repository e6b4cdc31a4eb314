//! Pixel-level image comparison.
//!
//! Pure and synchronous; callers run it on the blocking pool.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::error::{AppError, AppResult};
use crate::models::{DiffScore, IgnoreBox};

/// Colour painted over mismatched pixels. Treated as a wildcard when found in an input.
pub const MARKER: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// Rendered diff and its pixel counts.
#[derive(Debug, Clone)]
pub struct PixelDiff {
    pub image: RgbaImage,
    pub compared_pixels: u64,
    pub mismatched_pixels: u64,
}

impl PixelDiff {
    pub fn mismatch_percent(&self) -> f64 {
        if self.compared_pixels == 0 {
            return 0.0;
        }
        self.mismatched_pixels as f64 / self.compared_pixels as f64 * 100.0
    }

    pub fn score(&self, threshold_percent: f64) -> DiffScore {
        let mismatch_percent = self.mismatch_percent();
        DiffScore {
            width: self.image.width(),
            height: self.image.height(),
            compared_pixels: self.compared_pixels,
            mismatched_pixels: self.mismatched_pixels,
            mismatch_percent,
            matches: mismatch_percent <= threshold_percent,
        }
    }
}

pub fn decode(bytes: &[u8]) -> AppResult<DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|e| AppError::Io(format!("Failed to decode image: {}", e)))
}

pub fn encode_png(image: &RgbaImage) -> AppResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Downscale to fit within `max_width` x `max_height`, preserving aspect ratio.
/// Images already inside the bound are returned unchanged.
pub fn thumbnail(image: &DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if image.width() <= max_width && image.height() <= max_height {
        return image.clone();
    }
    image.thumbnail(max_width, max_height)
}

fn channels_differ(a: &Rgba<u8>, b: &Rgba<u8>, tolerance: u8) -> bool {
    a.0.iter().zip(b.0.iter()).any(|(x, y)| x.abs_diff(*y) > tolerance)
}

/// Compare `b` against `a` at `a`'s resolution.
///
/// Pixels inside an ignore box are copied from `a` and not counted. Marker pixels
/// in either input match anything and stay marked in the output.
pub fn diff_images(a: &RgbaImage, b: &RgbaImage, ignore: &[IgnoreBox], tolerance: u8) -> PixelDiff {
    let (width, height) = a.dimensions();
    let resized;
    let b = if b.dimensions() == (width, height) {
        b
    } else {
        resized = imageops::resize(b, width, height, FilterType::Triangle);
        &resized
    };

    let mut out = RgbaImage::new(width, height);
    let mut compared_pixels = 0u64;
    let mut mismatched_pixels = 0u64;

    for (x, y, pa) in a.enumerate_pixels() {
        if ignore.iter().any(|r| r.contains(x, y)) {
            out.put_pixel(x, y, *pa);
            continue;
        }

        compared_pixels += 1;
        let pb = b.get_pixel(x, y);

        if *pa == MARKER || *pb == MARKER {
            out.put_pixel(x, y, MARKER);
        } else if channels_differ(pa, pb, tolerance) {
            mismatched_pixels += 1;
            out.put_pixel(x, y, MARKER);
        } else {
            out.put_pixel(x, y, *pa);
        }
    }

    PixelDiff {
        image: out,
        compared_pixels,
        mismatched_pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREY: Rgba<u8> = Rgba([120, 120, 120, 255]);

    fn solid(width: u32, height: u32, colour: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, colour)
    }

    #[test]
    fn test_identical_images_match() {
        let a = solid(4, 4, GREY);
        let diff = diff_images(&a, &a.clone(), &[], 5);
        assert_eq!(diff.compared_pixels, 16);
        assert_eq!(diff.mismatched_pixels, 0);
        assert_eq!(diff.image, a);
        assert!(diff.score(0.5).matches);
    }

    #[test]
    fn test_tolerance_absorbs_small_drift() {
        let a = solid(2, 2, GREY);
        let b = solid(2, 2, Rgba([125, 115, 120, 255]));
        assert_eq!(diff_images(&a, &b, &[], 5).mismatched_pixels, 0);
        assert_eq!(diff_images(&a, &b, &[], 4).mismatched_pixels, 4);
    }

    #[test]
    fn test_mismatch_painted_with_marker() {
        let a = solid(2, 1, GREY);
        let mut b = a.clone();
        b.put_pixel(1, 0, Rgba([0, 0, 0, 255]));

        let diff = diff_images(&a, &b, &[], 5);
        assert_eq!(diff.mismatched_pixels, 1);
        assert_eq!(*diff.image.get_pixel(0, 0), GREY);
        assert_eq!(*diff.image.get_pixel(1, 0), MARKER);
        assert_eq!(diff.mismatch_percent(), 50.0);
        assert!(!diff.score(0.5).matches);
    }

    #[test]
    fn test_ignore_boxes_are_not_counted() {
        let a = solid(4, 4, GREY);
        let b = solid(4, 4, Rgba([0, 0, 0, 255]));
        let diff = diff_images(&a, &b, &[IgnoreBox::new(0, 0, 4, 2)], 5);
        assert_eq!(diff.compared_pixels, 8);
        assert_eq!(diff.mismatched_pixels, 8);
        assert_eq!(*diff.image.get_pixel(0, 0), GREY);
        assert_eq!(*diff.image.get_pixel(0, 3), MARKER);
    }

    #[test]
    fn test_marker_is_wildcard() {
        let mut a = solid(2, 1, GREY);
        a.put_pixel(0, 0, MARKER);
        let b = solid(2, 1, Rgba([0, 0, 0, 255]));
        let diff = diff_images(&a, &b, &[], 5);
        assert_eq!(diff.mismatched_pixels, 1);
        assert_eq!(*diff.image.get_pixel(0, 0), MARKER);
    }

    #[test]
    fn test_b_normalized_to_a_resolution() {
        let a = solid(4, 4, GREY);
        let b = solid(8, 8, GREY);
        let diff = diff_images(&a, &b, &[], 5);
        assert_eq!(diff.image.dimensions(), (4, 4));
        assert_eq!(diff.mismatched_pixels, 0);
    }

    #[test]
    fn test_thumbnail_only_downscales() {
        let small = DynamicImage::ImageRgba8(solid(10, 10, GREY));
        assert_eq!(thumbnail(&small, 320, 640).width(), 10);

        let large = DynamicImage::ImageRgba8(solid(640, 640, GREY));
        let thumb = thumbnail(&large, 320, 640);
        assert_eq!((thumb.width(), thumb.height()), (320, 320));
    }

    #[test]
    fn test_png_encode_decode() {
        let a = solid(3, 2, GREY);
        let decoded = decode(&encode_png(&a).unwrap()).unwrap().to_rgba8();
        assert_eq!(decoded, a);
        assert!(matches!(decode(b"not an image"), Err(AppError::Io(_))));
    }
}
