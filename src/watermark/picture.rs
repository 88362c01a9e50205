use super::WatermarkError;
use super::settings::ImageWatermark;
use image::{RgbaImage, imageops, imageops::FilterType};
use tracing::debug;

/// Load the watermark image and scale it so its width is `scale * base_width`.
///
/// Returns `Ok(None)` when no image is configured or the scale is unusable.
pub fn load_picture_overlay(
    settings: &ImageWatermark,
    base_width: u32,
) -> Result<Option<RgbaImage>, WatermarkError> {
    let Some(path) = settings.image_path.as_deref() else {
        return Ok(None);
    };
    if !settings.scale.is_finite() || settings.scale <= 0.0 {
        debug!("Ignoring watermark image with scale {}", settings.scale);
        return Ok(None);
    }
    if !path.is_file() {
        return Err(WatermarkError::ImageNotFound(path.to_path_buf()));
    }

    let source = image::open(path)?.to_rgba8();
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Ok(None);
    }

    let target_width = ((base_width as f64 * settings.scale) as u32).max(1);
    let target_height =
        ((height as f64 * target_width as f64 / width as f64).round() as u32).max(1);

    debug!(
        "Scaling watermark image {:?} from {}x{} to {}x{}",
        path, width, height, target_width, target_height
    );

    if (target_width, target_height) == (width, height) {
        return Ok(Some(source));
    }
    Ok(Some(imageops::resize(
        &source,
        target_width,
        target_height,
        FilterType::Lanczos3,
    )))
}
