use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
use photomark::export::{
    BatchExporter, ExportError, ExportSettings, NamingMode, OutputFormat, ResizeMode,
};
use photomark::watermark::{
    Anchor, FontLibrary, ImageWatermark, TextWatermark, WatermarkKind, WatermarkLayout,
    WatermarkRenderer, WatermarkSettings,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

fn renderer() -> Arc<WatermarkRenderer> {
    Arc::new(WatermarkRenderer::new(FontLibrary::default()))
}

fn write_photo(path: &Path, width: u32, height: u32) -> PathBuf {
    RgbImage::from_pixel(width, height, Rgb([30, 60, 90]))
        .save(path)
        .unwrap();
    path.to_path_buf()
}

fn logo_watermark(dir: &Path) -> WatermarkSettings {
    let logo = dir.join("logo.png");
    RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]))
        .save(&logo)
        .unwrap();
    WatermarkSettings {
        kind: WatermarkKind::Image,
        image: ImageWatermark {
            image_path: Some(logo),
            scale: 0.1,
            opacity: 100,
        },
        layout: WatermarkLayout::at_anchor(Anchor::TopLeft),
        ..Default::default()
    }
}

fn export_to(output: &Path) -> ExportSettings {
    ExportSettings {
        output_dir: Some(output.to_path_buf()),
        ..Default::default()
    }
}

#[test]
fn test_exports_with_suffix_naming() {
    let temp_dir = TempDir::new().unwrap();
    let sources = temp_dir.path().join("sources");
    let output = temp_dir.path().join("out").join("nested");
    std::fs::create_dir_all(&sources).unwrap();

    let a = write_photo(&sources.join("a.png"), 200, 100);
    let b = write_photo(&sources.join("b.jpg"), 120, 80);

    let exporter = BatchExporter::new(
        renderer(),
        logo_watermark(temp_dir.path()),
        export_to(&output),
    );
    let report = exporter.run(&[a, b]).unwrap();

    assert_eq!(report.success_count(), 2);
    assert!(!report.cancelled);
    assert_eq!(
        report.written,
        vec![output.join("a_watermarked.png"), output.join("b_watermarked.png")]
    );

    // Top-left anchor at (0.05, 0.05) of 200x100 puts the 20x20 logo at (10, 5)
    let exported = image::open(output.join("a_watermarked.png")).unwrap();
    assert_eq!(exported.dimensions(), (200, 100));
    assert_eq!(exported.get_pixel(15, 10), Rgba([255, 0, 0, 255]));
    assert_eq!(exported.get_pixel(5, 2), Rgba([30, 60, 90, 255]));
}

#[test]
fn test_name_collisions_get_counters() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out");
    let first_dir = temp_dir.path().join("one");
    let second_dir = temp_dir.path().join("two");
    let third_dir = temp_dir.path().join("three");
    for dir in [&output, &first_dir, &second_dir, &third_dir] {
        std::fs::create_dir_all(dir).unwrap();
    }

    std::fs::write(output.join("a_watermarked.png"), b"existing").unwrap();
    let first = write_photo(&first_dir.join("a.png"), 10, 10);
    let second = write_photo(&second_dir.join("a.png"), 10, 10);
    let third = write_photo(&third_dir.join("a.jpg"), 10, 10);

    let exporter = BatchExporter::new(
        renderer(),
        WatermarkSettings::default(),
        export_to(&output),
    );
    let report = exporter.run(&[first, second, third]).unwrap();

    assert_eq!(
        report.written,
        vec![
            output.join("a_watermarked_1.png"),
            output.join("a_watermarked_2.png"),
            output.join("a_watermarked_3.png"),
        ]
    );
    assert_eq!(std::fs::read(output.join("a_watermarked.png")).unwrap(), b"existing");
}

#[test]
fn test_prevent_overwrite_aborts_before_any_write() {
    let temp_dir = TempDir::new().unwrap();
    let sources = temp_dir.path().join("sources");
    let elsewhere = temp_dir.path().join("elsewhere");
    std::fs::create_dir_all(&sources).unwrap();
    std::fs::create_dir_all(&elsewhere).unwrap();

    let ok = write_photo(&elsewhere.join("first.png"), 10, 10);
    let clashing = write_photo(&sources.join("second.png"), 10, 10);

    let exporter = BatchExporter::new(
        renderer(),
        WatermarkSettings::default(),
        export_to(&sources),
    );
    let result = exporter.run(&[ok, clashing]);

    match result {
        Err(error @ ExportError::OutputCollidesWithSource { .. }) => {
            assert!(error.is_configuration_error())
        }
        other => panic!("expected configuration error, got {:?}", other),
    }
    let files: Vec<_> = std::fs::read_dir(&sources).unwrap().collect();
    assert_eq!(files.len(), 1);
    assert_eq!(std::fs::read_dir(&elsewhere).unwrap().count(), 1);
}

#[test]
fn test_same_directory_allowed_without_prevent_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_photo(&temp_dir.path().join("photo.png"), 10, 10);

    let export = ExportSettings {
        prevent_overwrite: false,
        naming_mode: NamingMode::Keep,
        ..export_to(temp_dir.path())
    };
    let exporter = BatchExporter::new(renderer(), WatermarkSettings::default(), export);
    let report = exporter.run(&[source]).unwrap();

    // The source keeps its name, the export takes the next free one
    assert_eq!(report.written, vec![temp_dir.path().join("photo_1.png")]);
}

#[test]
fn test_missing_output_dir_is_a_configuration_error() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_photo(&temp_dir.path().join("photo.png"), 10, 10);

    let exporter = BatchExporter::new(
        renderer(),
        WatermarkSettings::default(),
        ExportSettings::default(),
    );
    let error = exporter.run(&[source]).unwrap_err();
    assert!(matches!(error, ExportError::MissingOutputDirectory));
    assert!(error.is_configuration_error());
}

#[test]
fn test_corrupt_sources_are_skipped_not_counted() {
    let temp_dir = TempDir::new().unwrap();
    let sources = temp_dir.path().join("sources");
    let output = temp_dir.path().join("out");
    std::fs::create_dir_all(&sources).unwrap();

    let good = write_photo(&sources.join("good.png"), 16, 16);
    let corrupt = sources.join("broken.jpg");
    std::fs::write(&corrupt, b"not really a jpeg").unwrap();
    let missing = sources.join("vanished.png");

    let exporter = BatchExporter::new(
        renderer(),
        WatermarkSettings::default(),
        export_to(&output),
    );

    let mut seen = Vec::new();
    let report = exporter
        .run_with_progress(&[corrupt.clone(), good, missing.clone()], |progress| {
            seen.push((progress.index, progress.total))
        })
        .unwrap();

    assert_eq!(report.success_count(), 1);
    assert_eq!(report.skipped, vec![corrupt, missing]);
    assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(std::fs::read_dir(&output).unwrap().count(), 1);
}

#[test]
fn test_resize_and_jpeg_output() {
    let temp_dir = TempDir::new().unwrap();
    let sources = temp_dir.path().join("sources");
    let output = temp_dir.path().join("out");
    std::fs::create_dir_all(&sources).unwrap();
    let source = write_photo(&sources.join("wide.png"), 200, 100);

    let export = ExportSettings {
        output_format: OutputFormat::Jpeg,
        naming_mode: NamingMode::Prefix,
        jpeg_quality: 0,
        resize_mode: ResizeMode::Width,
        resize_value: Some(100),
        ..export_to(&output)
    };
    let exporter = BatchExporter::new(renderer(), logo_watermark(temp_dir.path()), export);
    let report = exporter.run(&[source]).unwrap();

    let written = &report.written[0];
    assert_eq!(written, &output.join("wm_wide.jpg"));
    let exported = image::open(written).unwrap();
    assert_eq!(exported.dimensions(), (100, 50));
    assert_eq!(image::ImageFormat::from_path(written).unwrap(), image::ImageFormat::Jpeg);
}

#[test]
fn test_watermark_scales_with_resized_output() {
    let temp_dir = TempDir::new().unwrap();
    let sources = temp_dir.path().join("sources");
    let output = temp_dir.path().join("out");
    std::fs::create_dir_all(&sources).unwrap();
    let source = write_photo(&sources.join("big.png"), 400, 400);

    let mut watermark = logo_watermark(temp_dir.path());
    watermark.layout = WatermarkLayout::at_anchor(Anchor::Center);
    let export = ExportSettings {
        resize_mode: ResizeMode::Percent,
        resize_value: Some(50),
        ..export_to(&output)
    };
    let report = BatchExporter::new(renderer(), watermark, export)
        .run(&[source])
        .unwrap();

    // 200x200 output with a 20x20 logo centred at (100, 100)
    let exported = image::open(&report.written[0]).unwrap();
    assert_eq!(exported.dimensions(), (200, 200));
    assert_eq!(exported.get_pixel(100, 100), Rgba([255, 0, 0, 255]));
    assert_eq!(exported.get_pixel(89, 100), Rgba([30, 60, 90, 255]));
    assert_eq!(exported.get_pixel(110, 100), Rgba([30, 60, 90, 255]));
}

#[test]
fn test_cancel_flag_stops_between_items() {
    let temp_dir = TempDir::new().unwrap();
    let sources = temp_dir.path().join("sources");
    let output = temp_dir.path().join("out");
    std::fs::create_dir_all(&sources).unwrap();
    let items: Vec<PathBuf> = (0..3)
        .map(|i| write_photo(&sources.join(format!("p{}.png", i)), 8, 8))
        .collect();

    let cancel = Arc::new(AtomicBool::new(false));
    let exporter = BatchExporter::new(renderer(), WatermarkSettings::default(), export_to(&output))
        .with_cancel_flag(Arc::clone(&cancel));

    let report = exporter
        .run_with_progress(&items, |progress| {
            if progress.index == 1 {
                cancel.store(true, Ordering::Relaxed);
            }
        })
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.success_count(), 1);
    assert_eq!(std::fs::read_dir(&output).unwrap().count(), 1);
}

#[test]
fn test_empty_text_exports_unchanged_pixels() {
    let temp_dir = TempDir::new().unwrap();
    let sources = temp_dir.path().join("sources");
    let output = temp_dir.path().join("out");
    std::fs::create_dir_all(&sources).unwrap();
    let source = write_photo(&sources.join("plain.png"), 24, 12);

    let watermark = WatermarkSettings {
        text: TextWatermark {
            text: "   ".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    let report = BatchExporter::new(renderer(), watermark, export_to(&output))
        .run(&[source.clone()])
        .unwrap();

    let original = image::open(&source).unwrap();
    let exported: DynamicImage = image::open(&report.written[0]).unwrap();
    assert_eq!(exported.to_rgb8(), original.to_rgb8());
}

#[test]
fn test_grayscale_source_keeps_coloured_watermark() {
    let temp_dir = TempDir::new().unwrap();
    let sources = temp_dir.path().join("sources");
    let output = temp_dir.path().join("out");
    std::fs::create_dir_all(&sources).unwrap();
    let source = sources.join("mono.png");
    image::GrayImage::from_pixel(200, 100, image::Luma([128]))
        .save(&source)
        .unwrap();

    let report = BatchExporter::new(renderer(), logo_watermark(temp_dir.path()), export_to(&output))
        .run(&[source])
        .unwrap();

    let exported = image::open(&report.written[0]).unwrap();
    assert!(exported.color().has_color());
    assert_eq!(exported.get_pixel(15, 10), Rgba([255, 0, 0, 255]));
    assert_eq!(exported.get_pixel(5, 2), Rgba([128, 128, 128, 255]));
}

#[test]
fn test_uncreatable_output_dir_fails_whole_batch() {
    let temp_dir = TempDir::new().unwrap();
    let sources = temp_dir.path().join("sources");
    std::fs::create_dir_all(&sources).unwrap();
    let source = write_photo(&sources.join("photo.png"), 10, 10);

    // A regular file blocks the directory path
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();
    let output = blocker.join("out");

    let exporter = BatchExporter::new(
        renderer(),
        WatermarkSettings::default(),
        export_to(&output),
    );
    let error = exporter.run(&[source]).unwrap_err();

    match &error {
        ExportError::CreateOutputDirectory { path, .. } => assert_eq!(path, &output),
        other => panic!("expected directory creation failure, got {:?}", other),
    }
    assert!(error.is_configuration_error());
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(&sources).unwrap().count(), 1);
    assert_eq!(std::fs::read(&blocker).unwrap(), b"file");
}
