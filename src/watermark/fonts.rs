//! Font family lookup over the configured font directories.
//!
//! Faces are matched on their normalized file stem, so `DejaVu Sans` with
//! bold requested resolves to `DejaVuSans-Bold.ttf`. When no face carries the
//! family name the closest style among all faces is used instead.

use super::WatermarkError;
use ab_glyph::FontVec;
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

#[derive(Debug, Clone)]
struct FontFace {
    path: PathBuf,
    key: String,
}

/// Index of font files available for text watermarks.
#[derive(Debug, Clone, Default)]
pub struct FontLibrary {
    faces: Vec<FontFace>,
}

impl FontLibrary {
    /// Walk the given directories (recursively) and index every font file.
    /// Missing directories are skipped.
    pub fn scan<P: AsRef<Path>>(directories: &[P]) -> Self {
        let mut paths = Vec::new();
        for directory in directories {
            let directory = directory.as_ref();
            if !directory.is_dir() {
                debug!("Font directory {:?} does not exist, skipping", directory);
                continue;
            }
            for entry in WalkDir::new(directory)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() && is_font_file(entry.path()) {
                    paths.push(entry.into_path());
                }
            }
        }

        let library = Self::from_files(paths);
        info!("Indexed {} font faces", library.len());
        library
    }

    /// Build a library from explicit font files.
    pub fn from_files<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        let mut faces: Vec<FontFace> = paths
            .into_iter()
            .filter_map(|path| {
                let key = normalize(path.file_stem()?.to_str()?);
                Some(FontFace { path, key })
            })
            .collect();
        faces.sort_by(|a, b| a.path.cmp(&b.path));
        faces.dedup_by(|a, b| a.path == b.path);
        Self { faces }
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Pick the font file for a family and style.
    ///
    /// A family that names an existing font file is used as-is.
    pub fn resolve(&self, family: &str, bold: bool, italic: bool) -> Option<PathBuf> {
        let as_path = Path::new(family);
        if is_font_file(as_path) && as_path.is_file() {
            return Some(as_path.to_path_buf());
        }

        let family_key = normalize(family);
        let matching: Vec<&FontFace> = if family_key.is_empty() {
            Vec::new()
        } else {
            self.faces
                .iter()
                .filter(|face| face.key.starts_with(&family_key))
                .collect()
        };

        let (candidates, prefix_len) = if matching.is_empty() {
            debug!("No face for family '{}', falling back to any face", family);
            (self.faces.iter().collect::<Vec<_>>(), 0)
        } else {
            (matching, family_key.len())
        };

        candidates
            .into_iter()
            .min_by_key(|face| {
                let style = &face.key[prefix_len..];
                (
                    Reverse(style_score(style, bold, italic)),
                    style.len(),
                    face.path.clone(),
                )
            })
            .map(|face| face.path.clone())
    }

    pub(crate) fn resolve_or_err(
        &self,
        family: &str,
        bold: bool,
        italic: bool,
    ) -> Result<PathBuf, WatermarkError> {
        self.resolve(family, bold, italic)
            .ok_or_else(|| WatermarkError::FontNotFound(family.to_string()))
    }

    /// Resolve and parse the font for a family and style.
    pub fn load(&self, family: &str, bold: bool, italic: bool) -> Result<FontVec, WatermarkError> {
        let path = self.resolve_or_err(family, bold, italic)?;
        debug!("Using font {:?} for family '{}'", path, family);
        read_font(&path)
    }
}

/// Read and parse a single font file.
pub(crate) fn read_font(path: &Path) -> Result<FontVec, WatermarkError> {
    let data = std::fs::read(path)?;
    FontVec::try_from_vec(data).map_err(|_| WatermarkError::InvalidFont(path.to_path_buf()))
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FONT_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Higher is better; an exact style match scores 2 per axis.
fn style_score(style: &str, bold: bool, italic: bool) -> u8 {
    let has_bold = style.contains("bold");
    let has_italic = style.contains("italic") || style.contains("oblique");
    let mut score = 0;
    if has_bold == bold {
        score += 2;
    }
    if has_italic == italic {
        score += 2;
    }
    score
}

/// First well-known system font present on this machine, for rasterisation tests.
#[cfg(test)]
pub(crate) fn system_test_font() -> Option<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|path| path.is_file())
}
