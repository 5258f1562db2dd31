//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::{Rgb, RgbImage};
use imgdedup::progress::LogSink;
use imgdedup::scanner::{Fingerprint, Fingerprinter, PerceptualError};

/// Reads each file's text as a hexadecimal fingerprint.
///
/// Files that do not parse fail with `UnsupportedFormat`, which stands in
/// for a corrupt image.
pub struct HexFingerprinter;

impl Fingerprinter for HexFingerprinter {
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, PerceptualError> {
        let unsupported = || PerceptualError::UnsupportedFormat(path.display().to_string());
        let text = fs::read_to_string(path).map_err(|_| unsupported())?;
        u64::from_str_radix(text.trim(), 16)
            .map(Fingerprint::new)
            .map_err(|_| unsupported())
    }
}

/// Write a fake image whose fingerprint is `bits`.
pub fn fake_image(folder: &Path, name: &str, bits: u64) -> PathBuf {
    fs::create_dir_all(folder).unwrap();
    let path = folder.join(name);
    fs::write(&path, format!("{:x}", bits)).unwrap();
    path
}

/// Names of the files left in `folder`, sorted.
pub fn survivors(folder: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(folder)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// File names of `paths`, in order.
pub fn names<P: AsRef<Path>>(paths: &[P]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.as_ref()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

/// 64x64 black and white quadrants.
pub fn checkerboard() -> RgbImage {
    RgbImage::from_fn(64, 64, |x, y| {
        let val = if (x / 32 + y / 32) % 2 == 0 { 255 } else { 0 };
        Rgb([val, val, val])
    })
}

/// 64x64 sparse diagonal noise, far from [`checkerboard`] under every hash.
pub fn noise() -> RgbImage {
    RgbImage::from_fn(64, 64, |x, y| {
        let val = if (x * 123 + y * 456) % 17 == 0 { 255 } else { 0 };
        Rgb([val, val, val])
    })
}

/// Save `img` as a PNG in `folder`.
pub fn save_png(folder: &Path, name: &str, img: &RgbImage) -> PathBuf {
    fs::create_dir_all(folder).unwrap();
    let path = folder.join(name);
    img.save(&path).unwrap();
    path
}

/// Collects every log line the engine emits.
#[derive(Clone, Default)]
pub struct LogCollector {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> Arc<dyn LogSink> {
        Arc::new(self.clone())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl LogSink for LogCollector {
    fn on_log(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}
