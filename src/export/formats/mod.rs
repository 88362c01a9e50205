pub mod jpeg;
pub mod png;

pub use super::settings::OutputFormat;

use super::ExportError;
use image::DynamicImage;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Encode `image` in the requested format.
pub fn encode(
    image: &DynamicImage,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, ExportError> {
    match format {
        OutputFormat::Png => png::encode(image),
        OutputFormat::Jpeg => jpeg::encode(image, jpeg_quality),
    }
}

/// Write `bytes` to a hidden sibling of `path` and rename it into place, so
/// `path` is either complete or absent.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let temp_path = temp_sibling(path);
    let result = (|| {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        std::fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    } else {
        debug!("Wrote {} bytes to {:?}", bytes.len(), path);
    }
    result
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.partial", name, std::process::id()))
}
