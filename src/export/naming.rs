use super::settings::{ExportSettings, NamingMode};
use std::path::{Path, PathBuf};

/// Output stem for `source` under the configured naming mode.
pub fn output_stem(source: &Path, settings: &ExportSettings) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match settings.naming_mode {
        NamingMode::Keep => stem,
        NamingMode::Prefix => format!("{}{}", settings.custom_prefix, stem),
        NamingMode::Suffix => format!("{}{}", stem, settings.custom_suffix),
    }
}

/// First free path in `output_dir` for `source`: `stem.ext`, then `stem_1.ext`,
/// `stem_2.ext` and so on.
pub fn output_path(output_dir: &Path, source: &Path, settings: &ExportSettings) -> PathBuf {
    let stem = output_stem(source, settings);
    let extension = settings.output_format.extension();

    let mut candidate = output_dir.join(format!("{}.{}", stem, extension));
    let mut counter = 1u64;
    while candidate.exists() {
        candidate = output_dir.join(format!("{}_{}.{}", stem, counter, extension));
        counter += 1;
    }
    candidate
}
