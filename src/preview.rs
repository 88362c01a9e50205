//! Interactive preview: maps between base-image pixels, normalized layout
//! coordinates and the fit-to-box viewport, and turns pointer drags into new
//! layouts.
//!
//! The canvas never edits the layout on its own during a drag. Each pointer
//! move yields a fresh [`WatermarkLayout`] that the owner applies back with
//! [`PreviewCanvas::set_layout`].

use crate::watermark::{
    WatermarkLayout, WatermarkRenderer, WatermarkSettings, anchor_to_ratio,
};
use image::{DynamicImage, Rgba, RgbaImage, imageops, imageops::FilterType};
use tracing::debug;

/// Axis-aligned rectangle in floating point coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// `grab` is the pointer position minus the overlay center, in base pixels.
    Dragging { grab: (f64, f64) },
}

pub struct PreviewCanvas {
    viewport: (u32, u32),
    base: Option<DynamicImage>,
    scaled_base: Option<RgbaImage>,
    overlay: Option<RgbaImage>,
    settings: WatermarkSettings,
    scale: f64,
    offset: (f64, f64),
    drag: DragState,
}

impl PreviewCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: (width.max(1), height.max(1)),
            base: None,
            scaled_base: None,
            overlay: None,
            settings: WatermarkSettings::default(),
            scale: 1.0,
            offset: (0.0, 0.0),
            drag: DragState::Idle,
        }
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn base_size(&self) -> Option<(u32, u32)> {
        self.base.as_ref().map(|base| (base.width(), base.height()))
    }

    pub fn overlay(&self) -> Option<&RgbaImage> {
        self.overlay.as_ref()
    }

    pub fn settings(&self) -> &WatermarkSettings {
        &self.settings
    }

    pub fn layout(&self) -> WatermarkLayout {
        self.settings.layout
    }

    /// Show a new base image (or none) and rebuild the overlay for its size.
    pub fn set_image(&mut self, base: Option<DynamicImage>, renderer: &WatermarkRenderer) {
        self.base = base;
        self.drag = DragState::Idle;
        self.update_geometry();
        self.rebuild_overlay(renderer);
    }

    /// Replace the watermark settings and rebuild the overlay.
    pub fn set_settings(&mut self, settings: WatermarkSettings, renderer: &WatermarkRenderer) {
        self.settings = settings;
        self.rebuild_overlay(renderer);
    }

    /// Replace only the layout. The overlay bitmap does not depend on it.
    pub fn set_layout(&mut self, layout: WatermarkLayout) {
        self.settings.layout = layout;
    }

    /// Recompute scale and offset for a new viewport size. The normalized
    /// layout is untouched.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
        self.update_geometry();
    }

    fn rebuild_overlay(&mut self, renderer: &WatermarkRenderer) {
        self.overlay = self
            .base_size()
            .and_then(|size| renderer.build_overlay(size, &self.settings));
    }

    fn update_geometry(&mut self) {
        let Some((base_w, base_h)) = self.base_size().filter(|&(w, h)| w > 0 && h > 0) else {
            self.scale = 1.0;
            self.offset = (0.0, 0.0);
            self.scaled_base = None;
            return;
        };
        let (view_w, view_h) = self.viewport;

        self.scale = (view_w as f64 / base_w as f64).min(view_h as f64 / base_h as f64);
        let (scaled_w, scaled_h) = self.scaled_size((base_w, base_h));
        self.offset = (
            (view_w as f64 - scaled_w as f64) / 2.0,
            (view_h as f64 - scaled_h as f64) / 2.0,
        );
        self.scaled_base = self.base.as_ref().map(|base| {
            base.resize_exact(scaled_w, scaled_h, FilterType::Triangle)
                .to_rgba8()
        });

        debug!(
            "Preview scale {:.4} offset ({:.1}, {:.1}) for {}x{} in {}x{}",
            self.scale, self.offset.0, self.offset.1, base_w, base_h, view_w, view_h
        );
    }

    fn scaled_size(&self, (width, height): (u32, u32)) -> (u32, u32) {
        (
            ((width as f64 * self.scale) as u32).max(1),
            ((height as f64 * self.scale) as u32).max(1),
        )
    }

    /// Overlay rectangle in base-image pixels.
    pub fn overlay_rect_base(&self) -> Option<Rect> {
        let (base_w, base_h) = self.base_size()?;
        let overlay = self.overlay.as_ref()?;
        let (rx, ry) = anchor_to_ratio(self.settings.layout.anchor);
        let (px, py) = self.settings.layout.anchor_point(base_w, base_h);
        let width = overlay.width() as f64;
        let height = overlay.height() as f64;
        Some(Rect {
            x: px - rx * width,
            y: py - ry * height,
            width,
            height,
        })
    }

    /// Overlay rectangle in viewport pixels.
    pub fn overlay_rect_screen(&self) -> Option<Rect> {
        let rect = self.overlay_rect_base()?;
        let (x, y) = self.base_to_screen(rect.x, rect.y);
        Some(Rect {
            x,
            y,
            width: rect.width * self.scale,
            height: rect.height * self.scale,
        })
    }

    pub fn screen_to_base(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.offset.0) / self.scale,
            (y - self.offset.1) / self.scale,
        )
    }

    pub fn base_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.offset.0 + x * self.scale,
            self.offset.1 + y * self.scale,
        )
    }

    /// Start a drag if the pointer is on the overlay. Returns whether it did.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        let (Some(screen), Some(base)) = (self.overlay_rect_screen(), self.overlay_rect_base())
        else {
            return false;
        };
        if !screen.contains(x, y) {
            return false;
        }

        let (pointer_x, pointer_y) = self.screen_to_base(x, y);
        let (center_x, center_y) = base.center();
        self.drag = DragState::Dragging {
            grab: (pointer_x - center_x, pointer_y - center_y),
        };
        debug!("Drag started with grab offset ({:.1}, {:.1})", pointer_x - center_x, pointer_y - center_y);
        true
    }

    /// Layout the overlay should move to, or `None` when not dragging.
    ///
    /// The overlay center is clamped so the overlay stays inside the base
    /// image; an overlay larger than the image is pinned to its middle.
    pub fn pointer_move(&self, x: f64, y: f64) -> Option<WatermarkLayout> {
        let DragState::Dragging { grab } = self.drag else {
            return None;
        };
        let (base_w, base_h) = self.base_size()?;
        let rect = self.overlay_rect_base()?;

        let (pointer_x, pointer_y) = self.screen_to_base(x, y);
        let center_x = clamp_center(pointer_x - grab.0, rect.width / 2.0, base_w as f64);
        let center_y = clamp_center(pointer_y - grab.1, rect.height / 2.0, base_h as f64);

        Some(WatermarkLayout::dragged_to(
            center_x / base_w as f64,
            center_y / base_h as f64,
        ))
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Draw the current frame: the scaled base centred on black with the
    /// scaled overlay at its mapped position.
    pub fn render_frame(&self) -> RgbaImage {
        let (view_w, view_h) = self.viewport;
        let mut frame = RgbaImage::from_pixel(view_w, view_h, Rgba([0, 0, 0, 255]));

        let Some(scaled_base) = self.scaled_base.as_ref() else {
            return frame;
        };
        imageops::overlay(
            &mut frame,
            scaled_base,
            self.offset.0.round() as i64,
            self.offset.1.round() as i64,
        );

        if let (Some(overlay), Some(rect)) = (self.overlay.as_ref(), self.overlay_rect_screen()) {
            let (width, height) = self.scaled_size(overlay.dimensions());
            let scaled = imageops::resize(overlay, width, height, FilterType::Triangle);
            imageops::overlay(
                &mut frame,
                &scaled,
                rect.x.round() as i64,
                rect.y.round() as i64,
            );
        }

        frame
    }
}

fn clamp_center(center: f64, half: f64, extent: f64) -> f64 {
    if half * 2.0 > extent {
        extent / 2.0
    } else {
        center.clamp(half, extent - half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::{Anchor, FontLibrary, ImageWatermark, WatermarkKind};
    use image::RgbImage;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        renderer: WatermarkRenderer,
        settings: WatermarkSettings,
    }

    /// Image watermark that is `scale` of the base width and square.
    fn fixture(scale: f64) -> Fixture {
        let dir = TempDir::new().unwrap();
        let logo = dir.path().join("logo.png");
        RgbaImage::from_pixel(10, 10, Rgba([255, 255, 0, 255]))
            .save(&logo)
            .unwrap();
        let settings = WatermarkSettings {
            kind: WatermarkKind::Image,
            image: ImageWatermark {
                image_path: Some(logo),
                scale,
                opacity: 100,
            },
            ..Default::default()
        };
        Fixture {
            _dir: dir,
            renderer: WatermarkRenderer::new(FontLibrary::default()),
            settings,
        }
    }

    fn base(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([40, 80, 120])))
    }

    fn canvas(fixture: &Fixture, view: (u32, u32), base_size: (u32, u32)) -> PreviewCanvas {
        let mut canvas = PreviewCanvas::new(view.0, view.1);
        canvas.set_settings(fixture.settings.clone(), &fixture.renderer);
        canvas.set_image(Some(base(base_size.0, base_size.1)), &fixture.renderer);
        canvas
    }

    #[test]
    fn test_fit_to_box_scale_and_offset() {
        let fixture = fixture(0.2);
        let canvas = canvas(&fixture, (400, 400), (800, 400));
        assert_eq!(canvas.scale(), 0.5);
        assert_eq!(canvas.offset(), (0.0, 100.0));

        let (x, y) = canvas.screen_to_base(200.0, 200.0);
        assert_eq!((x, y), (400.0, 200.0));
        assert_eq!(canvas.base_to_screen(x, y), (200.0, 200.0));
    }

    #[test]
    fn test_pointer_down_outside_overlay_stays_idle() {
        let fixture = fixture(0.2);
        let mut canvas = canvas(&fixture, (400, 400), (400, 400));
        assert!(!canvas.pointer_down(5.0, 5.0));
        assert_eq!(canvas.drag_state(), DragState::Idle);
        assert!(canvas.pointer_move(100.0, 100.0).is_none());
    }

    #[test]
    fn test_drag_preserves_grab_offset() {
        let fixture = fixture(0.2);
        let mut canvas = canvas(&fixture, (400, 400), (400, 400));
        // Overlay is 80x80 centred at (200, 200)
        assert!(canvas.pointer_down(210.0, 190.0));
        assert_eq!(canvas.drag_state(), DragState::Dragging { grab: (10.0, -10.0) });

        let layout = canvas.pointer_move(110.0, 290.0).unwrap();
        assert_eq!(layout.anchor, Anchor::Center);
        assert_eq!(layout.position, (0.25, 0.75));

        canvas.pointer_up();
        assert!(!canvas.is_dragging());
    }

    #[test]
    fn test_drag_beyond_right_edge_is_clamped() {
        let fixture = fixture(0.5);
        let mut canvas = canvas(&fixture, (500, 250), (1000, 500));
        let rect = canvas.overlay_rect_screen().unwrap();
        let (cx, cy) = rect.center();
        assert!(canvas.pointer_down(cx, cy));

        let layout = canvas.pointer_move(10_000.0, cy).unwrap();
        let overlay_width = canvas.overlay().unwrap().width() as f64;
        assert_eq!(layout.position.0, 1.0 - (overlay_width / 2.0) / 1000.0);
        assert_eq!(layout.position.0, 0.75);

        let layout = canvas.pointer_move(-10_000.0, -10_000.0).unwrap();
        assert_eq!(layout.position.0, 0.25);
        assert_eq!(layout.position.1, 0.5);
    }

    #[test]
    fn test_oversized_overlay_is_pinned_to_middle() {
        let fixture = fixture(2.0);
        let mut canvas = canvas(&fixture, (200, 200), (100, 100));
        let rect = canvas.overlay_rect_screen().unwrap();
        let (cx, cy) = rect.center();
        assert!(canvas.pointer_down(cx, cy));
        let layout = canvas.pointer_move(0.0, 199.0).unwrap();
        assert_eq!(layout.position, (0.5, 0.5));
    }

    #[test]
    fn test_applying_drag_layout_moves_overlay() {
        let fixture = fixture(0.2);
        let mut canvas = canvas(&fixture, (400, 400), (400, 400));
        assert!(canvas.pointer_down(200.0, 200.0));
        let layout = canvas.pointer_move(100.0, 100.0).unwrap();
        canvas.set_layout(layout);
        let rect = canvas.overlay_rect_base().unwrap();
        assert_eq!(rect.center(), (100.0, 100.0));
    }

    #[test]
    fn test_resize_keeps_normalized_layout() {
        let fixture = fixture(0.2);
        let mut canvas = canvas(&fixture, (400, 400), (800, 600));
        canvas.set_layout(WatermarkLayout::at_anchor(Anchor::BottomRight));
        let before = canvas.overlay_rect_base().unwrap();

        canvas.resize(1200, 300);
        assert_eq!(canvas.layout(), WatermarkLayout::at_anchor(Anchor::BottomRight));
        assert_eq!(canvas.overlay_rect_base().unwrap(), before);
        assert_eq!(canvas.scale(), 0.5);
        assert_eq!(canvas.offset(), (400.0, 0.0));
    }

    #[test]
    fn test_render_frame_letterboxes_and_draws_overlay() {
        let fixture = fixture(0.2);
        let canvas = canvas(&fixture, (400, 400), (800, 400));
        let frame = canvas.render_frame();

        assert_eq!(frame.dimensions(), (400, 400));
        // Letterbox bars are black
        assert_eq!(frame.get_pixel(200, 10), &Rgba([0, 0, 0, 255]));
        // Base shows through away from the overlay
        assert_eq!(frame.get_pixel(20, 200), &Rgba([40, 80, 120, 255]));
        // Yellow overlay sits in the middle
        assert_eq!(frame.get_pixel(200, 200), &Rgba([255, 255, 0, 255]));
    }

    #[test]
    fn test_render_frame_rounds_half_pixel_offsets() {
        let fixture = fixture(0.2);
        // Scale 1.0 with a 0.5px horizontal offset
        let canvas = canvas(&fixture, (101, 100), (100, 100));
        assert_eq!(canvas.offset(), (0.5, 0.0));
        let frame = canvas.render_frame();

        assert_eq!(frame.get_pixel(0, 50), &Rgba([0, 0, 0, 255]));
        assert_eq!(frame.get_pixel(100, 50), &Rgba([40, 80, 120, 255]));

        // Overlay spans 40.5..60.5 on screen and lands on 41..61
        assert_eq!(frame.get_pixel(40, 50), &Rgba([40, 80, 120, 255]));
        assert_eq!(frame.get_pixel(41, 50), &Rgba([255, 255, 0, 255]));
        assert_eq!(frame.get_pixel(60, 50), &Rgba([255, 255, 0, 255]));
        assert_eq!(frame.get_pixel(61, 50), &Rgba([40, 80, 120, 255]));
    }

    #[test]
    fn test_empty_canvas() {
        let fixture = fixture(0.2);
        let mut canvas = PreviewCanvas::new(320, 240);
        canvas.set_image(None, &fixture.renderer);
        assert!(canvas.overlay().is_none());
        assert!(!canvas.pointer_down(160.0, 120.0));
        assert!(canvas.render_frame().pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }
}
