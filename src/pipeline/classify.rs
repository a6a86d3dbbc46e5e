//! Whiteness classification: reduce one page raster to a blankness score.
//!
//! The score is the fraction of sampled pixels that are *not* near-white.
//! A pixel is near-white when every RGB channel is strictly above
//! [`NEAR_WHITE_LEVEL`]. Alpha is discarded before the test, so a
//! transparent region counts by its colour channels alone.
//!
//! Rasters wider than [`MAX_SAMPLE_WIDTH`] are first shrunk with a bilinear
//! (triangle) filter, keeping the aspect ratio. That bounds the work per page
//! and makes the score nearly independent of the DPI the page was rendered at.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};

/// Channel value a pixel must exceed on R, G and B to count as white.
pub const NEAR_WHITE_LEVEL: u8 = 245;

/// Width cap applied before sampling.
pub const MAX_SAMPLE_WIDTH: u32 = 800;

/// Fraction of sampled pixels in `image` that are not near-white, in `[0, 1]`.
///
/// Returns `0.0` for a zero-area image.
pub fn classify(image: &DynamicImage) -> f64 {
    let rgb = sample(image);
    let total = rgb.width() as u64 * rgb.height() as u64;
    if total == 0 {
        return 0.0;
    }

    let inked = rgb
        .pixels()
        .filter(|p| !is_near_white(p.0))
        .count() as u64;

    inked as f64 / total as f64
}

/// `true` when every channel is strictly above [`NEAR_WHITE_LEVEL`].
pub fn is_near_white([r, g, b]: [u8; 3]) -> bool {
    r > NEAR_WHITE_LEVEL && g > NEAR_WHITE_LEVEL && b > NEAR_WHITE_LEVEL
}

/// Convert to RGB and shrink to at most [`MAX_SAMPLE_WIDTH`] columns.
fn sample(image: &DynamicImage) -> RgbImage {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width <= MAX_SAMPLE_WIDTH {
        return rgb;
    }

    let ratio = MAX_SAMPLE_WIDTH as f64 / width as f64;
    let new_height = ((height as f64 * ratio) as u32).max(1);
    imageops::resize(&rgb, MAX_SAMPLE_WIDTH, new_height, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const INK: Rgb<u8> = Rgb([0, 0, 0]);

    /// `width`×`height` page whose leftmost `ink_cols` columns are black.
    fn page_with_ink_columns(width: u32, height: u32, ink_cols: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, _| if x < ink_cols { INK } else { WHITE });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn all_white_scores_zero() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 80, WHITE));
        assert_eq!(classify(&img), 0.0);
    }

    #[test]
    fn off_white_above_level_scores_zero() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, Rgb([246, 250, 255])));
        assert_eq!(classify(&img), 0.0);
    }

    #[test]
    fn channel_at_level_is_not_white() {
        assert!(!is_near_white([245, 255, 255]));
        assert!(!is_near_white([255, 255, 245]));
        assert!(is_near_white([246, 246, 246]));
    }

    #[test]
    fn all_ink_scores_one() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 40, INK));
        assert_eq!(classify(&img), 1.0);
    }

    #[test]
    fn exact_fraction_without_downscale() {
        // 400 px wide, 100 inked columns: 25 %
        let img = page_with_ink_columns(400, 60, 100);
        assert!((classify(&img) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn scattered_pixels_counted() {
        let mut img = RgbImage::from_pixel(100, 100, WHITE);
        for i in 0..10 {
            img.put_pixel(i * 7, i * 3, Rgb([200, 255, 255]));
        }
        let score = classify(&DynamicImage::ImageRgb8(img));
        assert!((score - 0.001).abs() < 1e-12, "got {score}");
    }

    #[test]
    fn score_stable_across_resolutions() {
        // Same layout (left quarter inked) at 1×, 2× and 4× the cap.
        let expected = 0.25;
        for scale in [1u32, 2, 4] {
            let w = MAX_SAMPLE_WIDTH * scale;
            let img = page_with_ink_columns(w, 200 * scale, w / 4);
            let score = classify(&img);
            assert!(
                (score - expected).abs() < 0.01,
                "scale {scale}: got {score}, expected ≈{expected}"
            );
        }
    }

    #[test]
    fn downscale_keeps_aspect_ratio() {
        let img = page_with_ink_columns(1600, 2262, 0);
        let sampled = sample(&img);
        assert_eq!(sampled.width(), MAX_SAMPLE_WIDTH);
        assert_eq!(sampled.height(), 1131);
    }

    #[test]
    fn narrow_tall_raster_is_not_resized() {
        let img = page_with_ink_columns(600, 5000, 0);
        let sampled = sample(&img);
        assert_eq!(sampled.dimensions(), (600, 5000));
    }

    #[test]
    fn alpha_is_dropped() {
        // Fully transparent white is still white once alpha is discarded.
        let img = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 0]));
        assert_eq!(classify(&DynamicImage::ImageRgba8(img)), 0.0);
    }

    #[test]
    fn zero_area_guarded() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert_eq!(classify(&img), 0.0);
    }
}
