//! Non-recursive directory listing for dataset folders.
//!
//! # Overview
//!
//! A dataset root holds one subdirectory per class; each class folder holds
//! the images directly. Nothing here recurses: [`list_images`] looks at the
//! direct children of a folder and [`list_folders`] at the direct
//! subdirectories of the root.
//!
//! Listings use [`walkdir`] limited to depth 1 and sorted by file name so
//! that every run over the same tree sees the same order.

use std::ffi::OsStr;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use super::{FolderInventory, ImageRef};

/// Recognized image extensions (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff"];

/// Returns true if `path` has a recognized image extension.
#[must_use]
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// List the images directly inside `folder`.
///
/// Subdirectories, symlinks, hidden entries and files without a
/// recognized extension are skipped. A missing folder yields an empty list.
#[must_use]
pub fn list_images(folder: &Path) -> Vec<ImageRef> {
    if !folder.is_dir() {
        log::debug!("Not listing {}: not a directory", folder.display());
        return Vec::new();
    }

    direct_children(folder)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| !is_hidden(entry.file_name()))
        .filter(|entry| is_image_path(entry.path()))
        .map(|entry| ImageRef::new(entry.into_path()))
        .collect()
}

/// Inventory every direct subdirectory of `root`, smallest first.
///
/// Loose files in `root`, symlinked directories and hidden directories
/// (such as `.git`) are ignored. The sort is stable, so folders with equal counts keep their
/// file-name order.
#[must_use]
pub fn list_folders(root: &Path) -> Vec<FolderInventory> {
    if !root.is_dir() {
        log::debug!("Not listing {}: not a directory", root.display());
        return Vec::new();
    }

    let mut folders: Vec<FolderInventory> = direct_children(root)
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| !is_hidden(entry.file_name()))
        .map(|entry| FolderInventory::scan(entry.into_path()))
        .collect();

    folders.sort_by_key(FolderInventory::count);
    folders
}

fn direct_children(dir: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.path_is_symlink() => {
                log::debug!("Skipping symlink: {}", entry.path().display());
                None
            }
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}
