//! Scanner module for image discovery and fingerprinting.
//!
//! This module provides functionality for:
//! - Non-recursive listing of recognized image files
//! - Folder inventories sorted by image count
//! - 64-bit perceptual fingerprints via `image_hasher`
//! - The per-run [`HashIndex`] of image → fingerprint
//!
//! # Architecture
//!
//! - [`walker`]: directory listing and folder inventories
//! - [`perceptual`]: fingerprint computation
//! - [`index`]: the hash index and its builder
//!
//! # Example
//!
//! ```no_run
//! use imgdedup::scanner::{list_folders, list_images};
//! use std::path::Path;
//!
//! for folder in list_folders(Path::new("dataset/raw")) {
//!     println!("{}: {} images", folder.name, folder.count());
//! }
//!
//! let images = list_images(Path::new("dataset/raw/cat"));
//! println!("{} images in cat/", images.len());
//! ```

pub mod index;
pub mod perceptual;
pub mod walker;

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

// Re-export main types
pub use index::{build_index, HashIndex, IndexOutcome};
pub use perceptual::{Fingerprint, Fingerprinter, PerceptualAlgorithm, PerceptualError, PerceptualHasher};
pub use walker::{is_image_path, list_folders, list_images, IMAGE_EXTENSIONS};

/// One discovered image, identified by its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ImageRef(PathBuf);

impl ImageRef {
    /// Create a reference to the image at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Path of the image on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Base file name, lossily decoded.
    #[must_use]
    pub fn file_name(&self) -> Cow<'_, str> {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    }

    /// Length of the base file name in characters.
    ///
    /// Used by the within-folder policy to decide which of two duplicates
    /// to discard.
    #[must_use]
    pub fn name_len(&self) -> usize {
        self.file_name().chars().count()
    }
}

impl AsRef<Path> for ImageRef {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Images found directly inside one class folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderInventory {
    /// Directory name (last path component)
    pub name: String,
    /// Full path of the directory
    pub path: PathBuf,
    /// Images directly inside the directory, ordered by file name
    pub images: Vec<ImageRef>,
}

impl FolderInventory {
    /// Build the inventory of `path` by listing its images.
    #[must_use]
    pub fn scan(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let images = list_images(&path);
        Self { name, path, images }
    }

    /// Number of images in the folder.
    #[must_use]
    pub fn count(&self) -> usize {
        self.images.len()
    }

    /// Returns true if the folder holds no images.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
