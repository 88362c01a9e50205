//! Watermark descriptors.
//!
//! Both descriptors stay resident in [`WatermarkSettings`] so that switching
//! between text and image keeps the other configuration intact. Field names
//! match the persisted JSON layout.

use super::anchor::{Anchor, canonical_position};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// RGBA color, serialized as `[r, g, b, a]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for [u8; 4] {
    fn from(color: Color) -> Self {
        [color.r, color.g, color.b, color.a]
    }
}

/// Which descriptor is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkKind {
    #[default]
    Text,
    Image,
}

/// Text watermark descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextWatermark {
    pub text: String,
    pub font_family: String,
    /// Pixel size at 100% scale
    pub font_size: u32,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
    /// 0-100
    pub opacity: u8,
    pub shadow_enabled: bool,
    pub outline_enabled: bool,
    pub outline_width: u32,
    pub shadow_offset: (i32, i32),
}

impl Default for TextWatermark {
    fn default() -> Self {
        Self {
            text: "Watermark".to_string(),
            font_family: "Arial".to_string(),
            font_size: 32,
            bold: false,
            italic: false,
            color: Color::white(),
            opacity: 80,
            shadow_enabled: false,
            outline_enabled: false,
            outline_width: 2,
            shadow_offset: (2, 2),
        }
    }
}

impl TextWatermark {
    /// Outline is drawn in black carrying the fill color's alpha.
    pub fn outline_color(&self) -> Color {
        Color::new(0, 0, 0, self.color.a)
    }
}

/// Image watermark descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageWatermark {
    /// `None` means no watermark image has been picked yet.
    pub image_path: Option<PathBuf>,
    /// Overlay width as a fraction of the base image width.
    pub scale: f64,
    /// 0-100
    pub opacity: u8,
}

impl Default for ImageWatermark {
    fn default() -> Self {
        Self {
            image_path: None,
            scale: 0.25,
            opacity: 70,
        }
    }
}

/// Normalized placement of the watermark relative to the base image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkLayout {
    /// `(x, y)`, each in `[0, 1]`
    pub position: (f64, f64),
    pub anchor: Anchor,
}

impl Default for WatermarkLayout {
    fn default() -> Self {
        Self {
            position: (0.5, 0.5),
            anchor: Anchor::Center,
        }
    }
}

impl WatermarkLayout {
    /// Layout produced by an anchor button: the anchor plus its canonical position.
    pub fn at_anchor(anchor: Anchor) -> Self {
        Self {
            position: canonical_position(anchor),
            anchor,
        }
    }

    /// Layout produced by a free drag, which is never one of the named anchors.
    pub fn dragged_to(x: f64, y: f64) -> Self {
        Self {
            position: (x, y),
            anchor: Anchor::Center,
        }
    }

    /// Anchor point in pixels for an image of the given size.
    pub fn anchor_point(&self, width: u32, height: u32) -> (f64, f64) {
        (
            self.position.0 * width as f64,
            self.position.1 * height as f64,
        )
    }
}

/// The complete watermark configuration edited by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkSettings {
    #[serde(rename = "watermark_type")]
    pub kind: WatermarkKind,
    #[serde(rename = "text_settings")]
    pub text: TextWatermark,
    #[serde(rename = "image_settings")]
    pub image: ImageWatermark,
    /// Degrees, clockwise, in `[-180, 180]`
    pub rotation: f64,
    pub layout: WatermarkLayout,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            kind: WatermarkKind::Text,
            text: TextWatermark::default(),
            image: ImageWatermark::default(),
            rotation: 0.0,
            layout: WatermarkLayout::default(),
        }
    }
}

/// Borrowed view of whichever descriptor is active.
#[derive(Debug, Clone, Copy)]
pub enum ActiveWatermark<'a> {
    Text(&'a TextWatermark),
    Image(&'a ImageWatermark),
}

impl WatermarkSettings {
    pub fn active(&self) -> ActiveWatermark<'_> {
        match self.kind {
            WatermarkKind::Text => ActiveWatermark::Text(&self.text),
            WatermarkKind::Image => ActiveWatermark::Image(&self.image),
        }
    }

    /// Rotation limited to the supported range.
    pub fn clamped_rotation(&self) -> f64 {
        if self.rotation.is_finite() {
            self.rotation.clamp(-180.0, 180.0)
        } else {
            0.0
        }
    }

    /// Copy of these settings with a different layout.
    pub fn with_layout(&self, layout: WatermarkLayout) -> Self {
        Self {
            layout,
            ..self.clone()
        }
    }
}
