//! Text watermark rasterisation.
//!
//! The text is laid out on a single line and rasterised into a coverage mask.
//! Shadow, fill and outline are then painted from that mask, in that order,
//! onto a transparent bitmap that leaves [`TEXT_MARGIN`] pixels around the
//! tight glyph bounds.

use super::settings::{Color, TextWatermark};
use ab_glyph::{Font, FontVec, Glyph, PxScale, Rect, ScaleFont, point};
use image::{GrayImage, Luma, Pixel, Rgba, RgbaImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};

/// Transparent border kept around the glyphs so outline and shadow are not clipped.
pub const TEXT_MARGIN: u32 = 16;

const MIN_OVERLAY_SIZE: u32 = 10;

/// Drop shadow is black at 40% alpha.
const SHADOW_COLOR: Color = Color::new(0, 0, 0, 102);

/// Render the unrotated text overlay, or `None` when there is nothing to draw.
pub fn render_text_overlay(settings: &TextWatermark, font: &FontVec) -> Option<RgbaImage> {
    if settings.text.trim().is_empty() || settings.font_size == 0 {
        return None;
    }

    let scale = PxScale::from(settings.font_size as f32);
    let glyphs = layout_line(font, scale, &settings.text);
    let bounds = glyph_bounds(font, &glyphs)?;

    let scaled = font.as_scaled(scale);
    let line_height = (scaled.ascent() - scaled.descent()).ceil() as u32;
    let width = (bounds.width().ceil() as u32 + TEXT_MARGIN * 2).max(MIN_OVERLAY_SIZE);
    let height = (line_height + TEXT_MARGIN * 2).max(MIN_OVERLAY_SIZE);

    let origin_x = TEXT_MARGIN as f32 - bounds.min.x;
    let baseline = TEXT_MARGIN as f32 + scaled.ascent();
    let mask = coverage_mask(font, &glyphs, width, height, origin_x, baseline);

    let opacity = settings.opacity.min(100) as f32 / 100.0;
    let mut overlay = RgbaImage::new(width, height);

    if settings.shadow_enabled {
        let (dx, dy) = settings.shadow_offset;
        paint_mask(&mut overlay, &mask, (dx, dy), SHADOW_COLOR, opacity);
    }

    paint_mask(&mut overlay, &mask, (0, 0), settings.color, opacity);

    if settings.outline_enabled {
        let stroke = stroke_mask(&mask, settings.outline_width);
        paint_mask(&mut overlay, &stroke, (0, 0), settings.outline_color(), opacity);
    }

    Some(overlay)
}

/// Position glyphs along a baseline at y = 0, applying kerning.
fn layout_line(font: &FontVec, scale: PxScale, text: &str) -> Vec<Glyph> {
    let scaled = font.as_scaled(scale);
    let mut glyphs = Vec::new();
    let mut caret = 0.0f32;
    let mut previous = None;

    for c in text.chars().filter(|c| !c.is_control()) {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        glyphs.push(id.with_scale_and_position(scale, point(caret, 0.0)));
        caret += scaled.h_advance(id);
        previous = Some(id);
    }

    glyphs
}

/// Tight pixel bounds of all glyph outlines, `None` if no glyph has ink.
fn glyph_bounds(font: &FontVec, glyphs: &[Glyph]) -> Option<Rect> {
    glyphs
        .iter()
        .filter_map(|glyph| font.outline_glyph(glyph.clone()))
        .map(|outlined| outlined.px_bounds())
        .reduce(|a, b| Rect {
            min: point(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
            max: point(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
        })
}

fn coverage_mask(
    font: &FontVec,
    glyphs: &[Glyph],
    width: u32,
    height: u32,
    origin_x: f32,
    baseline: f32,
) -> GrayImage {
    let mut mask = GrayImage::new(width, height);

    for glyph in glyphs {
        let mut glyph = glyph.clone();
        glyph.position.x += origin_x;
        glyph.position.y += baseline;

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let x = bounds.min.x as i32 + gx as i32;
            let y = bounds.min.y as i32 + gy as i32;
            if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                return;
            }
            let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            let pixel = mask.get_pixel_mut(x as u32, y as u32);
            pixel[0] = pixel[0].saturating_add(value);
        });
    }

    mask
}

/// Ring of `width` pixels centred on the glyph edges, with round joins.
fn stroke_mask(mask: &GrayImage, width: u32) -> GrayImage {
    let radius = width.max(1).div_ceil(2).min(u8::MAX as u32) as u8;
    let outer = dilate(mask, Norm::L2, radius);
    let inner = erode(mask, Norm::L2, radius);

    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        if outer.get_pixel(x, y)[0] > 0 && inner.get_pixel(x, y)[0] == 0 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Source-over paint `color` through `mask`, shifted by `offset`.
fn paint_mask(
    overlay: &mut RgbaImage,
    mask: &GrayImage,
    offset: (i32, i32),
    color: Color,
    opacity: f32,
) {
    let (width, height) = overlay.dimensions();

    for (x, y, coverage) in mask.enumerate_pixels() {
        if coverage[0] == 0 {
            continue;
        }
        let tx = x as i64 + offset.0 as i64;
        let ty = y as i64 + offset.1 as i64;
        if tx < 0 || ty < 0 || tx >= width as i64 || ty >= height as i64 {
            continue;
        }

        let alpha = color.a as f32 * (coverage[0] as f32 / 255.0) * opacity;
        let alpha = alpha.round() as u8;
        if alpha == 0 {
            continue;
        }
        overlay
            .get_pixel_mut(tx as u32, ty as u32)
            .blend(&Rgba([color.r, color.g, color.b, alpha]));
    }
}
