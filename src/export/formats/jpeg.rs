use image::{DynamicImage, ImageEncoder, codecs::jpeg::JpegEncoder};
use tracing::debug;

use crate::export::ExportError;

/// Encode image as JPEG at `quality` (1-100).
pub fn encode(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ExportError> {
    // JPEG doesn't support alpha channel, so convert to RGB
    let rgb_image = image.to_rgb8();
    let mut buffer = Vec::new();

    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    encoder.write_image(
        &rgb_image,
        rgb_image.width(),
        rgb_image.height(),
        image::ExtendedColorType::Rgb8,
    )?;

    debug!("JPEG encoded at quality {}: {} bytes", quality, buffer.len());
    Ok(buffer)
}
