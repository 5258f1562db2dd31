//! Layered run configuration.
//!
//! Sources are merged with `figment`, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config`, or `config.toml` in the platform config dir)
//! 3. `IMGDEDUP_*` environment variables (`IMGDEDUP_THRESHOLD=0.95`)
//! 4. Command-line flags
//!
//! ```toml
//! threshold = 0.95
//! algorithm = "dhash"
//! trash = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::DeleteMethod;
use crate::cli::RunArgs;
use crate::engine::Threshold;
use crate::error::ConfigurationError;
use crate::scanner::PerceptualAlgorithm;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "IMGDEDUP_";

/// Run settings after all layers are merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Similarity threshold in (0, 1]
    pub threshold: f64,
    /// Perceptual hash algorithm
    pub algorithm: PerceptualAlgorithm,
    /// Move deleted images to the trash instead of removing them
    pub trash: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            algorithm: PerceptualAlgorithm::Phash,
            trash: false,
        }
    }
}

impl Config {
    /// Load defaults, the config file and the environment.
    ///
    /// A missing file is not an error; a malformed one is.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Invalid`] if a layer cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        Self::load_from_path(path.map(Path::to_path_buf).or_else(Self::default_path))
    }

    /// Load defaults, the TOML file at `path` (if any) and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Invalid`] if a layer cannot be parsed.
    pub fn load_from_path(path: Option<PathBuf>) -> Result<Self, ConfigurationError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            log::debug!("Reading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| ConfigurationError::Invalid(e.to_string()))
    }

    /// `config.toml` in the platform configuration directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "imgdedup", "imgdedup")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply the flags given on the command line.
    #[must_use]
    pub fn merge_run_args(mut self, args: &RunArgs) -> Self {
        if let Some(threshold) = args.threshold {
            self.threshold = threshold;
        }
        if let Some(algorithm) = args.algorithm {
            self.algorithm = algorithm;
        }
        if args.trash {
            self.trash = true;
        }
        self
    }

    /// Check the merged settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidThreshold`] if the threshold is
    /// outside `(0, 1]`.
    pub fn validate(&self) -> Result<Threshold, ConfigurationError> {
        Threshold::new(self.threshold)
    }

    /// How discarded images are removed.
    #[must_use]
    pub fn delete_method(&self) -> DeleteMethod {
        if self.trash {
            DeleteMethod::Trash
        } else {
            DeleteMethod::Permanent
        }
    }
}
