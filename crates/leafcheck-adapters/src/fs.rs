//! Filesystem adapter for loading encoded images.

use anyhow::{Context, Result};
use image::ImageFormat;
use leafcheck_core::{EncodedImage, ImageSource};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Supported image extensions.
const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif", "tiff", "tif"];

/// Filesystem image source adapter.
///
/// Only reads bytes; decoding is left to the quality analyzer.
pub struct FsImageSource {
    paths: Vec<PathBuf>,
    recursive: bool,
    max_bytes: Option<u64>,
}

impl FsImageSource {
    /// Creates a new filesystem image source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self {
            paths,
            recursive,
            max_bytes: None,
        }
    }

    /// Skips reading files larger than `max_bytes`.
    ///
    /// Such files are yielded unread with their size on disk, so the intake
    /// still rejects them by size.
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Collects all image files from the configured paths.
    fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                if is_supported_image(path) {
                    files.push(path.clone());
                } else {
                    warn!("Unsupported file type: {}", path.display());
                }
            } else if path.is_dir() {
                self.collect_from_dir(path, &mut files);
            } else {
                warn!("Path does not exist: {}", path.display());
            }
        }

        files
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        let mut paths: Vec<_> = entries.flatten().map(|entry| entry.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_file() && is_supported_image(&path) {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }
}

impl ImageSource for FsImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = Result<EncodedImage>> + Send + '_> {
        let files = self.collect_files();
        debug!("Found {} image files", files.len());

        let max_bytes = self.max_bytes;
        Box::new(files.into_iter().map(move |path| load_image(&path, max_bytes)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.collect_files().len())
    }
}

/// Checks if a path has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| RASTER_EXTENSIONS.contains(&e.as_str()))
}

/// Reads an image file without decoding it.
///
/// The media type comes from the magic bytes, falling back to the file
/// extension when the content is not recognised. Files over `max_bytes`
/// are not read at all.
fn load_image(path: &Path, max_bytes: Option<u64>) -> Result<EncodedImage> {
    let name = path.to_string_lossy().into_owned();

    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat image: {}", path.display()))?
        .len();
    if max_bytes.is_some_and(|limit| size > limit) {
        debug!("Not reading {}: {size} bytes is over the limit", path.display());
        let media_type = ImageFormat::from_path(path)
            .map_or("application/octet-stream", |f| f.to_mime_type());
        return Ok(EncodedImage::unread(name, media_type, size));
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image: {}", path.display()))?;

    let sniffed = image::guess_format(&bytes).ok();
    let media_type = sniffed
        .or_else(|| ImageFormat::from_path(path).ok())
        .map_or("application/octet-stream", |f| f.to_mime_type());

    Ok(EncodedImage::new(name, media_type, bytes))
}
