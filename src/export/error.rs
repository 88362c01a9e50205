use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("No output directory configured")]
    MissingOutputDirectory,

    #[error("Cannot create output directory {path:?}: {source}")]
    CreateOutputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Output directory {output:?} is the folder of source image {source_image:?}")]
    OutputCollidesWithSource {
        output: PathBuf,
        source_image: PathBuf,
    },
}

impl ExportError {
    /// Configuration problems abort a batch before anything is written.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ExportError::MissingOutputDirectory
                | ExportError::CreateOutputDirectory { .. }
                | ExportError::OutputCollidesWithSource { .. }
        )
    }
}
