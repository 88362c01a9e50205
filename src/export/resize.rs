use super::settings::ResizeMode;
use image::{DynamicImage, imageops::FilterType};
use tracing::debug;

/// Target dimensions for an export resize. `None` (or a zero value) keeps
/// the original size; every result is at least 1x1.
pub fn target_dimensions(
    (width, height): (u32, u32),
    mode: ResizeMode,
    value: Option<u32>,
) -> (u32, u32) {
    let Some(value) = value.filter(|v| *v > 0) else {
        return (width, height);
    };
    if width == 0 || height == 0 {
        return (width, height);
    }

    let (w, h, v) = (width as f64, height as f64, value as f64);
    let (new_w, new_h) = match mode {
        ResizeMode::None => return (width, height),
        ResizeMode::Width => (v, (h * v / w).round()),
        ResizeMode::Height => ((w * v / h).round(), v),
        ResizeMode::Percent => ((w * v / 100.0).round(), (h * v / 100.0).round()),
    };

    ((new_w as u32).max(1), (new_h as u32).max(1))
}

/// Resize an image for export. The preview never goes through here.
pub fn resize_for_export(image: DynamicImage, mode: ResizeMode, value: Option<u32>) -> DynamicImage {
    let original = (image.width(), image.height());
    let (width, height) = target_dimensions(original, mode, value);
    if (width, height) == original {
        return image;
    }

    debug!(
        "Resizing from {}x{} to {}x{}",
        original.0, original.1, width, height
    );
    image.resize_exact(width, height, FilterType::Lanczos3)
}
