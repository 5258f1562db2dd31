//! Similarity metric and threshold.

use crate::error::ConfigurationError;
use crate::scanner::Fingerprint;

/// Similarity of two fingerprints in `[0, 1]`.
///
/// `1 - hamming(a, b) / 64`: symmetric, `1.0` for identical fingerprints,
/// decreasing as more bits differ.
#[must_use]
pub fn similarity(a: Fingerprint, b: Fingerprint) -> f64 {
    1.0 - f64::from(a.distance(b)) / f64::from(Fingerprint::BITS)
}

/// A validated similarity threshold in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    /// Validate `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidThreshold`] unless
    /// `0 < value <= 1`.
    pub fn new(value: f64) -> Result<Self, ConfigurationError> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(ConfigurationError::InvalidThreshold(value))
        }
    }

    /// The threshold value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns true if a pair with this `score` counts as a duplicate.
    #[must_use]
    pub fn matches(self, score: f64) -> bool {
        score >= self.0
    }
}
