//! The ordered list of images queued for watermarking.

use image::RgbaImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

pub const DEFAULT_THUMBNAIL_SIZE: u32 = 96;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageItem {
    /// Absolute path, also the item's identity
    pub path: PathBuf,
}

impl ImageItem {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl AsRef<Path> for ImageItem {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Insertion-ordered, duplicate-free image list with a thumbnail memo.
#[derive(Debug)]
pub struct ImageCollection {
    items: Vec<ImageItem>,
    thumbnails: HashMap<PathBuf, RgbaImage>,
    thumbnail_size: u32,
}

impl Default for ImageCollection {
    fn default() -> Self {
        Self::new(DEFAULT_THUMBNAIL_SIZE)
    }
}

impl ImageCollection {
    pub fn new(thumbnail_size: u32) -> Self {
        Self {
            items: Vec::new(),
            thumbnails: HashMap::new(),
            thumbnail_size: thumbnail_size.max(1),
        }
    }

    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&ImageItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        let path = absolute(path);
        self.items.iter().any(|item| item.path == path)
    }

    /// Add existing, supported, not yet listed files. Returns the added paths.
    pub fn add_paths<I, P>(&mut self, paths: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut added = Vec::new();
        for path in paths {
            let path = absolute(path.as_ref());
            if !path.is_file() {
                debug!("Ignoring {:?}: not a file", path);
                continue;
            }
            if !is_supported_image(&path) {
                debug!("Ignoring {:?}: unsupported extension", path);
                continue;
            }
            if self.items.iter().any(|item| item.path == path) {
                continue;
            }
            self.items.push(ImageItem { path: path.clone() });
            added.push(path);
        }
        added
    }

    /// Add the supported images found in `directory`, in file name order.
    pub fn add_directory(&mut self, directory: &Path, recursive: bool) -> Vec<PathBuf> {
        if !directory.is_dir() {
            warn!("Not a directory: {:?}", directory);
            return Vec::new();
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let found: Vec<PathBuf> = WalkDir::new(directory)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_supported_image(e.path()))
            .map(|e| e.into_path())
            .collect();

        self.add_paths(found)
    }

    /// Add a dropped mix of files and folders; folders are walked recursively
    /// after the plain files.
    pub fn add_dropped<I, P>(&mut self, paths: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let (folders, files): (Vec<PathBuf>, Vec<PathBuf>) = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .filter(|p| p.exists())
            .partition(|p| p.is_dir());

        let mut added = self.add_paths(files);
        for folder in folders {
            added.extend(self.add_directory(&folder, true));
        }
        added
    }

    pub fn remove(&mut self, index: usize) -> Option<ImageItem> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        self.thumbnails.remove(&item.path);
        Some(item)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.thumbnails.clear();
    }

    /// Aspect-preserving thumbnail, decoded once per path.
    pub fn thumbnail(&mut self, path: &Path) -> Option<&RgbaImage> {
        let path = absolute(path);
        if !self.thumbnails.contains_key(&path) {
            let image = match image::open(&path) {
                Ok(image) => image,
                Err(e) => {
                    warn!("Cannot create thumbnail for {:?}: {}", path, e);
                    return None;
                }
            };
            let thumbnail = image
                .thumbnail(self.thumbnail_size, self.thumbnail_size)
                .to_rgba8();
            self.thumbnails.insert(path.clone(), thumbnail);
        }
        self.thumbnails.get(&path)
    }

    pub fn cached_thumbnails(&self) -> usize {
        self.thumbnails.len()
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
