//! Top-level controller. Owns the image list, the current settings and the
//! preview, and is the only place they are mutated.

use crate::Config;
use crate::collection::{ImageCollection, ImageItem};
use crate::export::{BatchExporter, ExportError, ExportReport, ExportSettings};
use crate::preview::PreviewCanvas;
use crate::store::{SettingsSnapshot, SettingsStore, StoreError, TemplateStore};
use crate::watermark::{
    Anchor, FontLibrary, WatermarkLayout, WatermarkRenderer, WatermarkSettings,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub struct Studio {
    renderer: Arc<WatermarkRenderer>,
    collection: ImageCollection,
    preview: PreviewCanvas,
    settings_store: SettingsStore,
    templates: TemplateStore,
    snapshot: SettingsSnapshot,
    selected: Option<usize>,
}

impl Studio {
    /// Build a controller from the application config, restoring the last
    /// saved settings.
    pub fn new(config: &Config) -> Self {
        let storage = config.storage_directory();
        let fonts = FontLibrary::scan(&config.fonts.directories);
        Self::with_parts(
            Arc::new(WatermarkRenderer::new(fonts)),
            SettingsStore::in_directory(&storage),
            TemplateStore::in_storage(&storage),
            (config.preview.width, config.preview.height),
            config.thumbnails.max_size,
        )
    }

    pub fn with_parts(
        renderer: Arc<WatermarkRenderer>,
        settings_store: SettingsStore,
        templates: TemplateStore,
        viewport: (u32, u32),
        thumbnail_size: u32,
    ) -> Self {
        let snapshot = settings_store.load();
        let mut preview = PreviewCanvas::new(viewport.0, viewport.1);
        preview.set_settings(snapshot.watermark.clone(), &renderer);

        Self {
            renderer,
            collection: ImageCollection::new(thumbnail_size),
            preview,
            settings_store,
            templates,
            snapshot,
            selected: None,
        }
    }

    pub fn renderer(&self) -> &Arc<WatermarkRenderer> {
        &self.renderer
    }

    pub fn collection(&self) -> &ImageCollection {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut ImageCollection {
        &mut self.collection
    }

    pub fn preview(&self) -> &PreviewCanvas {
        &self.preview
    }

    pub fn watermark(&self) -> &WatermarkSettings {
        &self.snapshot.watermark
    }

    pub fn export_settings(&self) -> &ExportSettings {
        &self.snapshot.export
    }

    pub fn snapshot(&self) -> &SettingsSnapshot {
        &self.snapshot
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&ImageItem> {
        self.selected.and_then(|index| self.collection.get(index))
    }

    // Images

    pub fn add_paths<I, P>(&mut self, paths: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let added = self.collection.add_paths(paths);
        self.after_import(added)
    }

    pub fn add_directory(&mut self, directory: &Path, recursive: bool) -> Vec<PathBuf> {
        let added = self.collection.add_directory(directory, recursive);
        self.after_import(added)
    }

    pub fn add_dropped<I, P>(&mut self, paths: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let added = self.collection.add_dropped(paths);
        self.after_import(added)
    }

    fn after_import(&mut self, added: Vec<PathBuf>) -> Vec<PathBuf> {
        info!("Added {} images", added.len());
        if self.selected.is_none() && !self.collection.is_empty() {
            self.select(0);
        }
        added
    }

    /// Remove an image; the next one (or the new last one) becomes selected.
    pub fn remove(&mut self, index: usize) -> Option<ImageItem> {
        let removed = self.collection.remove(index)?;
        if self.collection.is_empty() {
            self.deselect();
        } else {
            self.select(index.min(self.collection.len() - 1));
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.collection.clear();
        self.deselect();
    }

    /// Show the image at `index` in the preview. Returns false if it cannot
    /// be decoded.
    pub fn select(&mut self, index: usize) -> bool {
        let Some(item) = self.collection.get(index) else {
            return false;
        };
        match image::open(&item.path) {
            Ok(image) => {
                self.selected = Some(index);
                self.preview.set_image(Some(image), &self.renderer);
                true
            }
            Err(e) => {
                warn!("Cannot preview {:?}: {}", item.path, e);
                false
            }
        }
    }

    fn deselect(&mut self) {
        self.selected = None;
        self.preview.set_image(None, &self.renderer);
    }

    // Watermark

    pub fn update_watermark(&mut self, settings: WatermarkSettings) {
        self.snapshot.watermark = settings;
        self.preview
            .set_settings(self.snapshot.watermark.clone(), &self.renderer);
    }

    /// Anchor button: place the watermark at the anchor's canonical position.
    pub fn select_anchor(&mut self, anchor: Anchor) {
        self.apply_layout(WatermarkLayout::at_anchor(anchor));
    }

    fn apply_layout(&mut self, layout: WatermarkLayout) {
        self.snapshot.watermark.layout = layout;
        self.preview.set_layout(layout);
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.preview.pointer_down(x, y)
    }

    /// Forward a pointer move; while dragging the new layout replaces the
    /// current one and is returned.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<WatermarkLayout> {
        let layout = self.preview.pointer_move(x, y)?;
        self.apply_layout(layout);
        Some(layout)
    }

    pub fn pointer_up(&mut self) {
        self.preview.pointer_up();
    }

    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        self.preview.resize(width, height);
    }

    // Export

    pub fn set_export(&mut self, export: ExportSettings) {
        self.snapshot.export = export;
    }

    /// Exporter over a copy of the current settings.
    pub fn exporter(&self) -> BatchExporter {
        BatchExporter::new(
            Arc::clone(&self.renderer),
            self.snapshot.watermark.clone(),
            self.snapshot.export.clone(),
        )
    }

    /// Export the selected image. `Ok(None)` when nothing is selected.
    pub fn export_selected(&self) -> Result<Option<ExportReport>, ExportError> {
        let Some(item) = self.selected_item() else {
            info!("No image selected, nothing to export");
            return Ok(None);
        };
        self.exporter().run(std::slice::from_ref(item)).map(Some)
    }

    /// Export every image. `Ok(None)` when the list is empty.
    pub fn export_all(&self) -> Result<Option<ExportReport>, ExportError> {
        if self.collection.is_empty() {
            info!("No images to export");
            return Ok(None);
        }
        self.exporter().run(self.collection.items()).map(Some)
    }

    // Templates and persistence

    pub fn templates(&self) -> Result<Vec<String>, StoreError> {
        self.templates.list()
    }

    pub fn save_template(&self, name: &str) -> Result<PathBuf, StoreError> {
        self.templates.save(name, &self.snapshot)
    }

    /// Replace the current settings with a template's.
    pub fn load_template(&mut self, name: &str) -> Result<(), StoreError> {
        let snapshot = self.templates.load(name)?;
        self.snapshot.export = snapshot.export;
        self.update_watermark(snapshot.watermark);
        info!("Applied template '{}'", name);
        Ok(())
    }

    pub fn delete_template(&self, name: &str) -> Result<(), StoreError> {
        self.templates.delete(name)
    }

    /// Persist the current settings for the next session.
    pub fn close(&self) -> Result<(), StoreError> {
        self.settings_store.save(&self.snapshot)
    }
}
