//! Overlay construction and compositing.
//!
//! The preview and the batch exporter both go through [`WatermarkRenderer`],
//! so what is shown on screen is exactly what gets written to disk.

use super::WatermarkError;
use super::anchor::{Anchor, anchor_to_ratio};
use super::fonts::{FontLibrary, read_font};
use super::picture::load_picture_overlay;
use super::settings::{ActiveWatermark, WatermarkSettings};
use super::text::render_text_overlay;
use super::transform::{multiply_alpha, rotate_overlay};
use ab_glyph::FontVec;
use image::{DynamicImage, RgbaImage, imageops};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub struct WatermarkRenderer {
    fonts: FontLibrary,
    loaded: Mutex<HashMap<PathBuf, Arc<FontVec>>>,
}

impl WatermarkRenderer {
    pub fn new(fonts: FontLibrary) -> Self {
        Self {
            fonts,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// Build the overlay for a base image of `base_size`, degrading every
    /// failure to "no overlay".
    pub fn build_overlay(
        &self,
        base_size: (u32, u32),
        settings: &WatermarkSettings,
    ) -> Option<RgbaImage> {
        match self.try_build_overlay(base_size, settings) {
            Ok(overlay) => overlay,
            Err(e) => {
                warn!("Watermark not rendered: {}", e);
                None
            }
        }
    }

    /// Like [`build_overlay`](Self::build_overlay) but reports why a font or
    /// watermark image could not be used.
    pub fn try_build_overlay(
        &self,
        base_size: (u32, u32),
        settings: &WatermarkSettings,
    ) -> Result<Option<RgbaImage>, WatermarkError> {
        let rotation = settings.clamped_rotation();

        let overlay = match settings.active() {
            ActiveWatermark::Text(text) => {
                if text.text.trim().is_empty() || text.opacity == 0 {
                    return Ok(None);
                }
                let font = self.font(&text.font_family, text.bold, text.italic)?;
                let Some(overlay) = render_text_overlay(text, &font) else {
                    return Ok(None);
                };
                rotated(overlay, rotation)
            }
            ActiveWatermark::Image(picture) => {
                if picture.opacity == 0 {
                    return Ok(None);
                }
                let Some(overlay) = load_picture_overlay(picture, base_size.0)? else {
                    return Ok(None);
                };
                let mut overlay = rotated(overlay, rotation);
                if picture.opacity < 100 {
                    multiply_alpha(&mut overlay, picture.opacity);
                }
                overlay
            }
        };

        debug!(
            "Built {}x{} watermark overlay for {}x{} base",
            overlay.width(),
            overlay.height(),
            base_size.0,
            base_size.1
        );
        Ok(Some(overlay))
    }

    /// Return a copy of `base` with the watermark drawn so that its
    /// anchor-relative point lands on `anchor_point` (base pixels).
    ///
    /// The input is never modified; without an overlay the copy is unchanged.
    pub fn composite(
        &self,
        base: &DynamicImage,
        settings: &WatermarkSettings,
        anchor_point: (f64, f64),
    ) -> DynamicImage {
        let overlay = self.build_overlay((base.width(), base.height()), settings);
        composite_overlay(base, overlay.as_ref(), settings.layout.anchor, anchor_point)
    }

    fn font(&self, family: &str, bold: bool, italic: bool) -> Result<Arc<FontVec>, WatermarkError> {
        let path = self.fonts.resolve_or_err(family, bold, italic)?;

        let mut loaded = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(font) = loaded.get(&path) {
            return Ok(Arc::clone(font));
        }

        debug!("Caching font {:?} for family '{}'", path, family);
        let font = Arc::new(read_font(&path)?);
        loaded.insert(path, Arc::clone(&font));
        Ok(font)
    }
}

fn rotated(overlay: RgbaImage, rotation: f64) -> RgbaImage {
    if rotation == 0.0 {
        overlay
    } else {
        rotate_overlay(&overlay, rotation)
    }
}

/// Top-left corner of an overlay of `overlay_size` placed at `anchor_point`.
pub fn overlay_origin(
    anchor: Anchor,
    anchor_point: (f64, f64),
    overlay_size: (u32, u32),
) -> (i64, i64) {
    let (rx, ry) = anchor_to_ratio(anchor);
    (
        (anchor_point.0 - rx * overlay_size.0 as f64).round() as i64,
        (anchor_point.1 - ry * overlay_size.1 as f64).round() as i64,
    )
}

/// Source-over blend an already built overlay onto a copy of `base`.
///
/// Grayscale bases are promoted to RGBA first so the overlay keeps its colour.
pub fn composite_overlay(
    base: &DynamicImage,
    overlay: Option<&RgbaImage>,
    anchor: Anchor,
    anchor_point: (f64, f64),
) -> DynamicImage {
    let Some(overlay) = overlay else {
        return base.clone();
    };
    let mut output = if base.color().has_color() {
        base.clone()
    } else {
        DynamicImage::ImageRgba8(base.to_rgba8())
    };
    let (x, y) = overlay_origin(anchor, anchor_point, overlay.dimensions());
    imageops::overlay(&mut output, overlay, x, y);
    output
}
