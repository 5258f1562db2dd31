//! Per-run hash index.
//!
//! The [`HashIndex`] maps every fingerprinted image to its [`Fingerprint`]
//! and is the single source of truth for whether an image is still part of
//! the run. Policies remove an entry the moment its file is discarded, and
//! look fingerprints up through the index before every comparison.

use std::collections::HashMap;

use super::{Fingerprint, Fingerprinter, ImageRef};
use crate::progress::{LogSink, ProgressSink};
use crate::signal::CancelCheck;

/// Mapping from image to fingerprint for the images still in play.
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    entries: HashMap<ImageRef, Fingerprint>,
}

impl HashIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the fingerprint of `image`.
    pub fn insert(&mut self, image: ImageRef, fingerprint: Fingerprint) {
        self.entries.insert(image, fingerprint);
    }

    /// Fingerprint of `image`, if it is still indexed.
    #[must_use]
    pub fn get(&self, image: &ImageRef) -> Option<Fingerprint> {
        self.entries.get(image).copied()
    }

    /// Returns true if `image` is still indexed.
    #[must_use]
    pub fn contains(&self, image: &ImageRef) -> bool {
        self.entries.contains_key(image)
    }

    /// Drop `image` from the index, returning its fingerprint.
    pub fn remove(&mut self, image: &ImageRef) -> Option<Fingerprint> {
        self.entries.remove(image)
    }

    /// Number of indexed images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no image is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of [`build_index`].
#[derive(Debug, Default)]
pub struct IndexOutcome {
    /// Fingerprints of every image that could be decoded
    pub index: HashIndex,
    /// Images excluded because they could not be fingerprinted
    pub decode_failures: usize,
    /// Whether cancellation was observed before all images were hashed
    pub cancelled: bool,
}

/// Fingerprint `images` into a fresh [`HashIndex`].
///
/// Cancellation is polled once before each image. Images that fail to
/// decode are reported to `log_sink` and left out of the index. Progress is
/// reported after each image and once more when hashing completes.
pub fn build_index(
    images: &[ImageRef],
    fingerprinter: &dyn Fingerprinter,
    progress: &dyn ProgressSink,
    log_sink: &dyn LogSink,
    cancel: &dyn CancelCheck,
) -> IndexOutcome {
    let total = images.len();
    let mut outcome = IndexOutcome::default();

    for (n, image) in images.iter().enumerate() {
        if cancel.is_cancelled() {
            log::debug!("Hashing cancelled after {} of {} images", n, total);
            outcome.cancelled = true;
            return outcome;
        }

        match fingerprinter.fingerprint(image.path()) {
            Ok(fingerprint) => {
                log::trace!("{} -> {}", image, fingerprint);
                outcome.index.insert(image.clone(), fingerprint);
            }
            Err(e) => {
                log::debug!("Excluding {} from the run: {}", image, e);
                outcome.decode_failures += 1;
                log_sink.on_log(&format!("Cannot process image {}: {}", image, e));
            }
        }

        progress.on_progress(n + 1, total, "Hashing images");
    }

    progress.on_progress(total, total, "Hashing complete");
    outcome
}
