//! Named templates, one JSON file each.

use super::{SettingsSnapshot, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TEMPLATE_DIRNAME: &str = "templates";
const TEMPLATE_EXTENSION: &str = "json";

#[derive(Debug, Serialize, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    name: String,
    #[serde(flatten)]
    snapshot: SettingsSnapshot,
}

/// File stem for a template name: trimmed, with every run of characters
/// outside `[A-Za-z0-9_-]` replaced by a single `_`.
pub fn sanitize_template_name(name: &str) -> Result<String, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidTemplateName);
    }

    let mut sanitized = String::with_capacity(trimmed.len());
    let mut in_invalid_run = false;
    for c in trimmed.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            sanitized.push(c);
            in_invalid_run = false;
        } else if !in_invalid_run {
            sanitized.push('_');
            in_invalid_run = true;
        }
    }
    Ok(sanitized)
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    directory: PathBuf,
}

impl TemplateStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Templates kept in `templates/` under the storage directory.
    pub fn in_storage(storage: &Path) -> Self {
        Self::new(storage.join(TEMPLATE_DIRNAME))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn template_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let stem = sanitize_template_name(name)?;
        Ok(self
            .directory
            .join(format!("{}.{}", stem, TEMPLATE_EXTENSION)))
    }

    pub fn save(&self, name: &str, snapshot: &SettingsSnapshot) -> Result<PathBuf, StoreError> {
        let path = self.template_path(name)?;
        std::fs::create_dir_all(&self.directory)?;

        let file = TemplateFile {
            name: name.to_string(),
            snapshot: snapshot.clone(),
        };
        std::fs::write(&path, serde_json::to_string_pretty(&file)?)?;
        info!("Saved template '{}' to {:?}", name, path);
        Ok(path)
    }

    /// Load a template. A missing template is an error, never defaults.
    pub fn load(&self, name: &str) -> Result<SettingsSnapshot, StoreError> {
        let path = self.template_path(name)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::TemplateNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let file: TemplateFile = serde_json::from_str(&content)?;
        debug!("Loaded template '{}' from {:?}", file.name, path);
        Ok(file.snapshot)
    }

    /// Delete a template; deleting one that does not exist is not an error.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.template_path(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted template {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Sanitized names of all templates, sorted.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match std::fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_template = path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(TEMPLATE_EXTENSION);
            if let (true, Some(stem)) = (is_template, path.file_stem().and_then(|s| s.to_str())) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
