use image::{DynamicImage, codecs::png::PngEncoder};

use crate::export::ExportError;

/// Encode image as PNG, keeping any alpha channel.
pub fn encode(image: &DynamicImage) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new(&mut buffer);
    image.write_with_encoder(encoder)?;
    Ok(buffer)
}
