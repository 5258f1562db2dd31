//! JSON output for run results and folder inventories.
//!
//! # Run report schema
//!
//! ```json
//! {
//!   "mode": "cross_folder",
//!   "root": "/data/raw",
//!   "threshold": 0.95,
//!   "generated_at": "2024-05-01T12:00:00Z",
//!   "result": {
//!     "status": "completed",
//!     "deleted_files": 1,
//!     "processed_folders": 2,
//!     "total_comparisons": 5,
//!     "deleted_file_paths": ["/data/raw/dog/d3.png"],
//!     "failed_deletions": [],
//!     "decode_failures": 0,
//!     "bytes_freed": 2048
//!   },
//!   "bytes_freed_display": "2.0 KiB",
//!   "exit_code": 0,
//!   "exit_code_name": "ID000"
//! }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::{Mode, RunResult};
use crate::error::ExitCode;
use crate::scanner::FolderInventory;

/// Report of one engine run.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRunReport {
    /// Policy that ran
    pub mode: Mode,
    /// Dataset root
    pub root: PathBuf,
    /// Similarity threshold used
    pub threshold: f64,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Counters and audit trail
    pub result: RunResult,
    /// `bytes_freed` in human-readable units
    pub bytes_freed_display: String,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "ID000")
    pub exit_code_name: String,
}

impl JsonRunReport {
    /// Build the report for a finished run.
    #[must_use]
    pub fn new(
        mode: Mode,
        root: &Path,
        threshold: f64,
        result: &RunResult,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            mode,
            root: root.to_path_buf(),
            threshold,
            generated_at: Utc::now(),
            result: result.clone(),
            bytes_freed_display: ByteSize::b(result.bytes_freed).to_string(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        write_json(writer, self)
    }
}

/// One folder of an inventory listing.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFolder {
    /// Folder name
    pub name: String,
    /// Folder path
    pub path: PathBuf,
    /// Number of images directly inside
    pub images: usize,
}

/// Folder census of a dataset root, smallest folder first.
#[derive(Debug, Clone, Serialize)]
pub struct JsonInventory {
    /// Dataset root
    pub root: PathBuf,
    /// Folders in ascending image count
    pub folders: Vec<JsonFolder>,
    /// Sum of all folder counts
    pub total_images: usize,
}

impl JsonInventory {
    /// Build the listing from folder inventories.
    #[must_use]
    pub fn new(root: &Path, folders: &[FolderInventory]) -> Self {
        Self {
            root: root.to_path_buf(),
            folders: folders
                .iter()
                .map(|f| JsonFolder {
                    name: f.name.clone(),
                    path: f.path.clone(),
                    images: f.count(),
                })
                .collect(),
            total_images: folders.iter().map(FolderInventory::count).sum(),
        }
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        write_json(writer, self)
    }
}

fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<(), JsonOutputError> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
