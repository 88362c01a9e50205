//! Batch export: load, resize, watermark and write every selected image.

use super::ExportError;
use super::formats::{encode, write_atomically};
use super::naming::output_path;
use super::resize::resize_for_export;
use super::settings::ExportSettings;
use crate::watermark::{WatermarkRenderer, WatermarkSettings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Written(PathBuf),
    /// The source could not be decoded.
    Skipped,
}

/// Reported after each item of a batch.
#[derive(Debug, Clone)]
pub struct ExportProgress<'a> {
    /// 1-based position in the batch
    pub index: usize,
    pub total: usize,
    pub source: &'a Path,
    pub outcome: &'a ItemOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    /// The batch stopped early because cancellation was requested.
    pub cancelled: bool,
}

impl ExportReport {
    pub fn success_count(&self) -> usize {
        self.written.len()
    }
}

pub struct BatchExporter {
    renderer: Arc<WatermarkRenderer>,
    watermark: WatermarkSettings,
    export: ExportSettings,
    cancel: Option<Arc<AtomicBool>>,
}

impl BatchExporter {
    /// Settings are captured by value; later edits do not affect a running batch.
    pub fn new(
        renderer: Arc<WatermarkRenderer>,
        watermark: WatermarkSettings,
        export: ExportSettings,
    ) -> Self {
        Self {
            renderer,
            watermark,
            export,
            cancel: None,
        }
    }

    /// Stop between items once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn run<P: AsRef<Path>>(&self, items: &[P]) -> Result<ExportReport, ExportError> {
        self.run_with_progress(items, |_| {})
    }

    pub fn run_with_progress<P, F>(
        &self,
        items: &[P],
        mut on_progress: F,
    ) -> Result<ExportReport, ExportError>
    where
        P: AsRef<Path>,
        F: FnMut(&ExportProgress<'_>),
    {
        let output_dir = self.prepare_output_dir(items)?;
        let mut report = ExportReport::default();

        for (position, item) in items.iter().enumerate() {
            if self.is_cancelled() {
                info!(
                    "Export cancelled after {} of {} images",
                    position,
                    items.len()
                );
                report.cancelled = true;
                break;
            }

            let source = item.as_ref();
            let outcome = self.export_one(source, &output_dir)?;
            match &outcome {
                ItemOutcome::Written(path) => report.written.push(path.clone()),
                ItemOutcome::Skipped => report.skipped.push(source.to_path_buf()),
            }

            on_progress(&ExportProgress {
                index: position + 1,
                total: items.len(),
                source,
                outcome: &outcome,
            });
        }

        info!(
            "Exported {} images to {:?} ({} skipped)",
            report.success_count(),
            output_dir,
            report.skipped.len()
        );
        Ok(report)
    }

    /// Resolve and create the output directory, then refuse it if it would
    /// overwrite sources.
    pub fn prepare_output_dir<P: AsRef<Path>>(&self, items: &[P]) -> Result<PathBuf, ExportError> {
        let output_dir = self
            .export
            .output_dir
            .clone()
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or(ExportError::MissingOutputDirectory)?;

        std::fs::create_dir_all(&output_dir).map_err(|source| {
            ExportError::CreateOutputDirectory {
                path: output_dir.clone(),
                source,
            }
        })?;

        if self.export.prevent_overwrite {
            for item in items {
                let source = item.as_ref();
                let Some(parent) = source.parent() else {
                    continue;
                };
                if same_location(&output_dir, parent) {
                    warn!(
                        "Refusing to export into {:?}, it holds {:?}",
                        output_dir, source
                    );
                    return Err(ExportError::OutputCollidesWithSource {
                        output: output_dir,
                        source_image: source.to_path_buf(),
                    });
                }
            }
        }

        Ok(output_dir)
    }

    /// Export a single image into an already prepared directory.
    pub fn export_one(&self, source: &Path, output_dir: &Path) -> Result<ItemOutcome, ExportError> {
        let image = match image::open(source) {
            Ok(image) => image,
            Err(e) => {
                warn!("Skipping {:?}: {}", source, e);
                return Ok(ItemOutcome::Skipped);
            }
        };

        let image = resize_for_export(image, self.export.resize_mode, self.export.resize_value);
        let anchor_point = self
            .watermark
            .layout
            .anchor_point(image.width(), image.height());
        let watermarked = self.renderer.composite(&image, &self.watermark, anchor_point);

        let bytes = encode(
            &watermarked,
            self.export.output_format,
            self.export.effective_jpeg_quality(),
        )?;
        let target = output_path(output_dir, source, &self.export);
        write_atomically(&target, &bytes)?;

        debug!("Exported {:?} -> {:?}", source, target);
        Ok(ItemOutcome::Written(target))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Whether two paths name the same directory, following symlinks when both exist.
fn same_location(a: &Path, b: &Path) -> bool {
    let b = if b.as_os_str().is_empty() {
        Path::new(".")
    } else {
        b
    };
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
