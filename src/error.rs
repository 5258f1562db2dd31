//! Error taxonomy and exit codes.
//!
//! Per-image and per-file errors never abort a run:
//! - [`PerceptualError`](crate::scanner::PerceptualError): the image is
//!   excluded from the run
//! - [`DeleteError`](crate::actions::DeleteError): the failure is recorded
//!   and the scan moves on
//!
//! Only a [`ConfigurationError`] stops a run before it starts.

use std::path::PathBuf;

use serde::Serialize;

use crate::engine::{RunResult, RunStatus};

/// Preconditions that prevent a run from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// Threshold outside `(0, 1]` (or NaN).
    #[error("similarity threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    /// The root directory does not exist.
    #[error("root directory not found: {0}")]
    RootNotFound(PathBuf),

    /// The root path is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Configuration sources could not be merged or parsed.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Exit codes for the imgdedup binary.
///
/// - 0: Success (completed, at least one file removed)
/// - 1: General error (configuration or unexpected failure)
/// - 2: Nothing removed (completed, or skipped for lack of folders)
/// - 3: Partial success (completed with decode or deletion failures)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: run completed and files were removed.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Nothing removed: no pair reached the threshold.
    NothingRemoved = 2,
    /// Partial success: run completed but some images were skipped or kept.
    PartialSuccess = 3,
    /// Interrupted: run was cancelled.
    Interrupted = crate::signal::EXIT_CODE_INTERRUPTED as isize,
}

impl ExitCode {
    /// Pick the exit code that describes a finished run.
    #[must_use]
    pub fn for_run(result: &RunResult) -> Self {
        match result.status {
            RunStatus::Cancelled => Self::Interrupted,
            RunStatus::Skipped => Self::NothingRemoved,
            RunStatus::Completed if result.has_failures() => Self::PartialSuccess,
            RunStatus::Completed if result.deleted_files > 0 => Self::Success,
            RunStatus::Completed => Self::NothingRemoved,
        }
    }

    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "ID000",
            Self::GeneralError => "ID001",
            Self::NothingRemoved => "ID002",
            Self::PartialSuccess => "ID003",
            Self::Interrupted => "ID130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "ID001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the failure is a configuration problem
    pub configuration: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            configuration: err.downcast_ref::<ConfigurationError>().is_some(),
        }
    }
}
