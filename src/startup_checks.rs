use crate::Config;
use crate::watermark::FontLibrary;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create storage directory: {0}")]
    StorageDirectoryCreationFailed(#[from] std::io::Error),

    #[error("No font directory exists")]
    FontDirectoriesMissing,

    #[error("No usable font found; text watermarks will not render")]
    NoUsableFont,
}

/// Check the storage and font setup. Every failure is reported, none is fatal.
pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    // Storage directory for settings and templates
    let storage_dir = config.storage_directory();
    if !storage_dir.exists() {
        info!("Storage directory does not exist, creating: {:?}", storage_dir);
        if let Err(e) = tokio::fs::create_dir_all(&storage_dir).await {
            error!("Failed to create storage directory {:?}: {}", storage_dir, e);
            errors.push(StartupCheckError::StorageDirectoryCreationFailed(e));
        }
    } else {
        info!("Storage directory exists: {:?}", storage_dir);
    }

    // Font directories
    let mut any_font_dir = false;
    for (index, font_dir) in config.fonts.directories.iter().enumerate() {
        if font_dir.is_dir() {
            info!("Font directory {} exists: {:?}", index, font_dir);
            any_font_dir = true;
        } else {
            warn!("Font directory {} does not exist: {:?}", index, font_dir);
        }
    }
    if !any_font_dir {
        errors.push(StartupCheckError::FontDirectoriesMissing);
    }

    // At least one face must parse, otherwise text watermarks silently vanish
    let directories = config.fonts.directories.clone();
    let library = tokio::task::spawn_blocking(move || FontLibrary::scan(&directories))
        .await
        .unwrap_or_default();
    let font_ok = match library.load("", false, false) {
        Ok(_) => true,
        Err(e) => {
            warn!("Default font cannot be loaded: {}", e);
            false
        }
    };
    if !font_ok {
        errors.push(StartupCheckError::NoUsableFont);
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}
