use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            other => Err(format!("unsupported output format: {}", other)),
        }
    }
}

/// How the output file stem is derived from the source stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingMode {
    Keep,
    Prefix,
    #[default]
    Suffix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    #[default]
    None,
    Width,
    Height,
    Percent,
}

/// Batch export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub output_format: OutputFormat,
    pub output_dir: Option<PathBuf>,
    pub naming_mode: NamingMode,
    pub custom_prefix: String,
    pub custom_suffix: String,
    /// Refuse to export into a folder that holds any of the source images.
    pub prevent_overwrite: bool,
    pub jpeg_quality: u8,
    pub resize_mode: ResizeMode,
    pub resize_value: Option<u32>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Png,
            output_dir: None,
            naming_mode: NamingMode::Suffix,
            custom_prefix: "wm_".to_string(),
            custom_suffix: "_watermarked".to_string(),
            prevent_overwrite: true,
            jpeg_quality: 90,
            resize_mode: ResizeMode::None,
            resize_value: None,
        }
    }
}

impl ExportSettings {
    /// JPEG quality accepted by the encoder.
    pub fn effective_jpeg_quality(&self) -> u8 {
        self.jpeg_quality.clamp(1, 100)
    }
}
