use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("No font available for family '{0}'")]
    FontNotFound(String),

    #[error("Failed to parse font file {0:?}")]
    InvalidFont(PathBuf),

    #[error("Watermark image not found: {0:?}")]
    ImageNotFound(PathBuf),
}
