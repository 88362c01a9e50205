use image::{Rgba, RgbaImage, imageops};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};

/// Dimensions of the axis-aligned box enclosing a `width`x`height` rectangle
/// rotated by `degrees`.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let w = width as f64;
    let h = height as f64;

    // Trim float noise so that 90 degrees yields exactly (height, width)
    let fit = |v: f64| ((v - 1e-6).ceil().max(1.0)) as u32;
    (fit(w * cos + h * sin), fit(w * sin + h * cos))
}

/// Rotate an overlay clockwise about its center with bilinear filtering.
///
/// The result grows (or shrinks) to the rotated bounding box; uncovered
/// pixels are transparent.
pub fn rotate_overlay(overlay: &RgbaImage, degrees: f64) -> RgbaImage {
    let (width, height) = overlay.dimensions();
    let (target_w, target_h) = rotated_bounds(width, height, degrees);

    // Work on a canvas large enough for both the source and the rotated box
    let canvas_w = width.max(target_w);
    let canvas_h = height.max(target_h);
    let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, Rgba([0, 0, 0, 0]));
    imageops::replace(
        &mut canvas,
        overlay,
        ((canvas_w - width) / 2) as i64,
        ((canvas_h - height) / 2) as i64,
    );

    let rotated = rotate_about_center(
        &canvas,
        degrees.to_radians() as f32,
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
    );

    imageops::crop_imm(
        &rotated,
        (canvas_w - target_w) / 2,
        (canvas_h - target_h) / 2,
        target_w,
        target_h,
    )
    .to_image()
}

/// Scale every pixel's alpha by `opacity` (0-100).
pub fn multiply_alpha(overlay: &mut RgbaImage, opacity: u8) {
    let factor = opacity.min(100) as f32 / 100.0;
    for pixel in overlay.pixels_mut() {
        pixel[3] = (pixel[3] as f32 * factor).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotated_bounds() {
        assert_eq!(rotated_bounds(100, 50, 0.0), (100, 50));
        assert_eq!(rotated_bounds(100, 50, 90.0), (50, 100));
        assert_eq!(rotated_bounds(100, 50, -90.0), (50, 100));
        assert_eq!(rotated_bounds(100, 50, 180.0), (100, 50));

        // 45 degrees: (100 + 50) * sqrt(0.5) = 106.07
        assert_eq!(rotated_bounds(100, 50, 45.0), (107, 107));
    }

    #[test]
    fn test_rotate_overlay_changes_dimensions() {
        let overlay = RgbaImage::from_pixel(60, 20, Rgba([255, 0, 0, 255]));
        let rotated = rotate_overlay(&overlay, 90.0);
        assert_eq!(rotated.dimensions(), (20, 60));

        // The middle stays covered
        assert_eq!(rotated.get_pixel(10, 30)[3], 255);
    }

    #[test]
    fn test_rotate_overlay_leaves_corners_transparent() {
        let overlay = RgbaImage::from_pixel(40, 40, Rgba([0, 0, 255, 255]));
        let rotated = rotate_overlay(&overlay, 45.0);
        assert!(rotated.width() > 40);
        assert_eq!(rotated.get_pixel(0, 0)[3], 0);
        let center = rotated.get_pixel(rotated.width() / 2, rotated.height() / 2);
        assert_eq!(center[3], 255);
    }

    #[test]
    fn test_multiply_alpha() {
        let mut overlay = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 200]));
        multiply_alpha(&mut overlay, 50);
        assert_eq!(overlay.get_pixel(0, 0), &Rgba([10, 20, 30, 100]));

        multiply_alpha(&mut overlay, 0);
        assert_eq!(overlay.get_pixel(1, 1)[3], 0);
    }
}
