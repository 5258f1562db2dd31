//! Similarity engine.
//!
//! The engine fingerprints the images under a dataset root, compares them
//! pairwise, and discards near-duplicates under one of two policies:
//!
//! - [`CrossFolder`]: smaller class folders are canonical; larger folders
//!   lose images that duplicate anything in an earlier, smaller folder.
//! - [`WithinFolder`]: near-duplicates are removed inside each folder.
//!
//! Every discard is irreversible (unless the remover moves files to the
//! trash) and is mirrored immediately in the [`HashIndex`] and the policy's
//! candidate lists, so later comparisons never touch a discarded image.
//!
//! # Example
//!
//! ```no_run
//! use imgdedup::engine::SimilarityEngine;
//! use imgdedup::scanner::PerceptualHasher;
//! use std::path::Path;
//!
//! let engine = SimilarityEngine::new(PerceptualHasher::default());
//! let result = engine.run_within_folder(Path::new("dataset/raw"), 0.99)?;
//! println!("Deleted {} files", result.deleted_files);
//! # Ok::<(), imgdedup::error::ConfigurationError>(())
//! ```

pub mod cross_folder;
pub mod live;
pub mod similarity;
pub mod within_folder;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};

use crate::actions::{DeleteMethod, Remover};
use crate::error::ConfigurationError;
use crate::progress::{ChannelSink, EngineEvent, LogSink, NullSink, ProgressSink};
use crate::scanner::{build_index, Fingerprinter, HashIndex, ImageRef, IndexOutcome};
use crate::signal::{CancelCheck, CancellationToken};

pub use cross_folder::CrossFolder;
pub use live::LiveList;
pub use similarity::{similarity, Threshold};
pub use within_folder::WithinFolder;

/// Which elimination policy a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Balance classes by discarding cross-folder duplicates from larger folders.
    #[default]
    CrossFolder,
    /// Discard near-duplicates inside each folder.
    WithinFolder,
}

impl Mode {
    /// The policy implementing this mode.
    #[must_use]
    pub fn policy(self) -> Box<dyn DedupPolicy> {
        match self {
            Self::CrossFolder => Box::new(CrossFolder),
            Self::WithinFolder => Box::new(WithinFolder),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrossFolder => write!(f, "cross_folder"),
            Self::WithinFolder => write!(f, "within_folder"),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The policy walked everything it planned to.
    #[default]
    Completed,
    /// Cancellation was observed; results cover the work done so far.
    Cancelled,
    /// The policy had nothing to do (for example, too few folders).
    Skipped,
}

/// A discard whose file removal failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDeletion {
    /// Image that stayed on disk
    pub path: ImageRef,
    /// Error reported by the remover
    pub message: String,
}

/// Counters and audit trail of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// How the run ended
    pub status: RunStatus,
    /// Number of files removed
    pub deleted_files: usize,
    /// Number of folders the policy walked
    pub processed_folders: usize,
    /// Number of fingerprint pairs compared
    pub total_comparisons: usize,
    /// Removed files, in removal order
    pub deleted_file_paths: Vec<ImageRef>,
    /// Discards whose removal failed, in order
    pub failed_deletions: Vec<FailedDeletion>,
    /// Images left out because they could not be fingerprinted
    pub decode_failures: usize,
    /// Bytes removed from the dataset
    pub bytes_freed: u64,
}

impl RunResult {
    /// An empty result for a run that had nothing to do.
    #[must_use]
    pub fn skipped() -> Self {
        Self {
            status: RunStatus::Skipped,
            ..Self::default()
        }
    }

    /// Returns true if any image was skipped or could not be removed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.decode_failures > 0 || !self.failed_deletions.is_empty()
    }

    fn record_deletion(&mut self, image: ImageRef, size: u64) {
        self.deleted_files += 1;
        self.bytes_freed += size;
        self.deleted_file_paths.push(image);
    }

    fn record_failure(&mut self, image: ImageRef, message: String) {
        self.failed_deletions.push(FailedDeletion {
            path: image,
            message,
        });
    }
}

/// An elimination policy.
pub trait DedupPolicy {
    /// Short policy name used in logs.
    fn name(&self) -> &'static str;

    /// Walk the folders under `root` and discard duplicates.
    ///
    /// `root` has already been checked to be a directory.
    fn run(&self, engine: &SimilarityEngine, root: &Path, threshold: Threshold) -> RunResult;
}

/// Runs elimination policies against a dataset root.
///
/// Collaborators are injected through the `with_*` builders; by default
/// files are removed permanently, notifications are dropped and the run is
/// never cancelled.
#[derive(Clone)]
pub struct SimilarityEngine {
    fingerprinter: Arc<dyn Fingerprinter>,
    remover: Arc<dyn Remover>,
    progress: Arc<dyn ProgressSink>,
    log_sink: Arc<dyn LogSink>,
    cancel: Arc<dyn CancelCheck>,
}

impl fmt::Debug for SimilarityEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimilarityEngine").finish_non_exhaustive()
    }
}

impl SimilarityEngine {
    /// Create an engine that fingerprints images with `fingerprinter`.
    #[must_use]
    pub fn new(fingerprinter: impl Fingerprinter + 'static) -> Self {
        Self {
            fingerprinter: Arc::new(fingerprinter),
            remover: Arc::new(DeleteMethod::Permanent),
            progress: Arc::new(NullSink),
            log_sink: Arc::new(NullSink),
            cancel: Arc::new(CancellationToken::new()),
        }
    }

    /// Set how discarded images are removed.
    #[must_use]
    pub fn with_remover(mut self, remover: impl Remover + 'static) -> Self {
        self.remover = Arc::new(remover);
        self
    }

    /// Set the progress sink.
    #[must_use]
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Set the log sink.
    #[must_use]
    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = sink;
        self
    }

    /// Set the cancellation check polled between units of work.
    #[must_use]
    pub fn with_cancel_check(mut self, cancel: impl CancelCheck + 'static) -> Self {
        self.cancel = Arc::new(cancel);
        self
    }

    /// Run the cross-folder policy.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the threshold is outside `(0, 1]`
    /// or `root` is not a directory. Nothing is touched in that case.
    pub fn run_cross_folder(
        &self,
        root: &Path,
        threshold: f64,
    ) -> Result<RunResult, ConfigurationError> {
        self.run(Mode::CrossFolder, root, threshold)
    }

    /// Run the within-folder policy.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the threshold is outside `(0, 1]`
    /// or `root` is not a directory. Nothing is touched in that case.
    pub fn run_within_folder(
        &self,
        root: &Path,
        threshold: f64,
    ) -> Result<RunResult, ConfigurationError> {
        self.run(Mode::WithinFolder, root, threshold)
    }

    /// Run the policy selected by `mode`.
    ///
    /// # Errors
    ///
    /// See [`SimilarityEngine::run_cross_folder`].
    pub fn run(
        &self,
        mode: Mode,
        root: &Path,
        threshold: f64,
    ) -> Result<RunResult, ConfigurationError> {
        let threshold = Threshold::new(threshold)?;
        check_root(root)?;

        let policy = mode.policy();
        log::debug!(
            "Starting {} run on {} (threshold {})",
            policy.name(),
            root.display(),
            threshold.value()
        );

        let result = policy.run(self, root, threshold);

        log::debug!(
            "{} run finished ({:?}): {} deleted, {} folders, {} comparisons",
            policy.name(),
            result.status,
            result.deleted_files,
            result.processed_folders,
            result.total_comparisons
        );
        Ok(result)
    }

    pub(crate) fn log(&self, message: &str) {
        log::debug!("{}", message);
        self.log_sink.on_log(message);
    }

    pub(crate) fn progress(&self, current: usize, total: usize, message: &str) {
        self.progress.on_progress(current, total, message);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn index(&self, images: &[ImageRef]) -> IndexOutcome {
        build_index(
            images,
            self.fingerprinter.as_ref(),
            self.progress.as_ref(),
            self.log_sink.as_ref(),
            self.cancel.as_ref(),
        )
    }

    /// Drop `image` from the run and remove its file.
    ///
    /// The index entry goes away whether or not the removal succeeds.
    pub(crate) fn discard(
        &self,
        image: ImageRef,
        score: f64,
        index: &mut HashIndex,
        result: &mut RunResult,
    ) {
        index.remove(&image);

        match self.remover.remove(image.path()) {
            Ok(deleted) => {
                self.log(&format!(
                    "Deleted similar image: {} (similarity: {:.3})",
                    image.file_name(),
                    score
                ));
                result.record_deletion(image, deleted.size);
            }
            Err(e) => {
                self.log(&format!("Failed to delete {}: {}", image, e));
                result.record_failure(image, e.to_string());
            }
        }
    }
}

pub(crate) fn check_root(root: &Path) -> Result<(), ConfigurationError> {
    if !root.exists() {
        return Err(ConfigurationError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ConfigurationError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// A run executing on a worker thread.
pub struct RunHandle {
    /// Progress and log events pushed by the worker.
    ///
    /// The channel closes when the worker finishes.
    pub events: Receiver<EngineEvent>,
    worker: JoinHandle<Result<RunResult, ConfigurationError>>,
}

impl RunHandle {
    /// Wait for the worker and return its result.
    ///
    /// # Errors
    ///
    /// Returns the worker's [`ConfigurationError`], if any.
    pub fn join(self) -> Result<RunResult, ConfigurationError> {
        match self.worker.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Start `engine` on a worker thread.
///
/// The engine's progress and log sinks are replaced by a channel whose
/// receiving half is returned in the [`RunHandle`]; the caller never blocks
/// the worker by draining it slowly.
///
/// # Errors
///
/// Returns an I/O error if the thread cannot be spawned.
pub fn spawn(
    engine: SimilarityEngine,
    mode: Mode,
    root: PathBuf,
    threshold: f64,
) -> std::io::Result<RunHandle> {
    let (tx, events) = mpsc::channel();
    let sink = Arc::new(ChannelSink::new(tx));
    let engine = engine
        .with_progress_sink(sink.clone())
        .with_log_sink(sink);

    let worker = thread::Builder::new()
        .name(format!("imgdedup-{}", mode))
        .spawn(move || engine.run(mode, &root, threshold))?;

    Ok(RunHandle { events, worker })
}
