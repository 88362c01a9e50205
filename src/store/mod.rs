//! Persistence of the user's watermark and export settings.

pub mod error;
pub mod settings_store;
pub mod templates;

pub use error::StoreError;
pub use settings_store::SettingsStore;
pub use templates::{TemplateStore, sanitize_template_name};

use crate::export::ExportSettings;
use crate::watermark::WatermarkSettings;
use serde::{Deserialize, Serialize};

/// Everything the user configures, as saved on close and in templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsSnapshot {
    pub watermark: WatermarkSettings,
    pub export: ExportSettings,
}
