//! Perceptual image fingerprints.
//!
//! This module provides the [`PerceptualHasher`] which reduces an image to
//! a 64-bit [`Fingerprint`] that stays stable under resizing, recompression
//! and small edits. Two fingerprints are compared by Hamming distance.
//!
//! The engine only depends on the [`Fingerprinter`] trait, so tests and
//! callers can substitute their own fingerprint source.

use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use image_hasher::{HashAlg, HasherConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 64-bit perceptual fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Number of bits in a fingerprint.
    pub const BITS: u32 = 64;

    /// Wrap raw fingerprint bits.
    #[must_use]
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Hamming distance to `other`.
    #[must_use]
    pub const fn distance(self, other: Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Supported perceptual hashing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PerceptualAlgorithm {
    /// pHash (Perceptual Hash) - DCT-based, most resilient to transformations.
    #[default]
    Phash,
    /// dHash (Difference Hash) - Gradient-based, very fast and effective.
    Dhash,
    /// aHash (Average Hash) - Mean-based, fast but less resilient.
    Ahash,
}

impl fmt::Display for PerceptualAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phash => write!(f, "pHash"),
            Self::Dhash => write!(f, "dHash"),
            Self::Ahash => write!(f, "aHash"),
        }
    }
}

/// Errors that can occur while fingerprinting an image.
#[derive(Debug, Error)]
pub enum PerceptualError {
    /// Failed to open or decode the image.
    #[error("Failed to load image {0}: {1}")]
    LoadError(String, #[source] image::ImageError),

    /// Image format not supported for hashing.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The hasher produced a hash that is not 64 bits wide.
    #[error("Unexpected hash size for {path}: {bits} bits")]
    UnexpectedHashSize {
        /// Image path
        path: String,
        /// Width of the produced hash
        bits: usize,
    },
}

/// Source of image fingerprints.
pub trait Fingerprinter: Send + Sync {
    /// Compute the fingerprint of the image at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`PerceptualError`] if the image cannot be decoded.
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, PerceptualError>;
}

/// Computes perceptual fingerprints with `image_hasher`.
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
    algorithm: PerceptualAlgorithm,
}

impl PerceptualHasher {
    /// Create a new `PerceptualHasher` with the given algorithm.
    ///
    /// The hash grid is fixed at 8x8 so every fingerprint is 64 bits.
    #[must_use]
    pub fn new(algorithm: PerceptualAlgorithm) -> Self {
        let config = HasherConfig::new().hash_size(8, 8);

        let config = match algorithm {
            PerceptualAlgorithm::Phash => config.hash_alg(HashAlg::Median).preproc_dct(),
            PerceptualAlgorithm::Dhash => config.hash_alg(HashAlg::Gradient),
            PerceptualAlgorithm::Ahash => config.hash_alg(HashAlg::Mean),
        };

        Self {
            hasher: config.to_hasher(),
            algorithm,
        }
    }

    /// Get the algorithm used by this hasher.
    #[must_use]
    pub fn algorithm(&self) -> PerceptualAlgorithm {
        self.algorithm
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(PerceptualAlgorithm::Phash)
    }
}

impl Fingerprinter for PerceptualHasher {
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, PerceptualError> {
        let img = image::open(path)
            .map_err(|e| PerceptualError::LoadError(path.display().to_string(), e))?;

        let hash = self.hasher.hash_image(&img);
        let bytes = hash.as_bytes();
        let bits: [u8; 8] = bytes
            .try_into()
            .map_err(|_| PerceptualError::UnexpectedHashSize {
                path: path.display().to_string(),
                bits: bytes.len() * 8,
            })?;

        Ok(Fingerprint::new(u64::from_be_bytes(bits)))
    }
}
