//! Plain-text summaries for the terminal.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::engine::{Mode, RunResult, RunStatus};
use crate::scanner::FolderInventory;

/// Write the end-of-run summary.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_summary<W: Write>(writer: &mut W, mode: Mode, result: &RunResult) -> io::Result<()> {
    let title = match result.status {
        RunStatus::Completed => "Processing complete".green().bold(),
        RunStatus::Cancelled => "Processing cancelled".yellow().bold(),
        RunStatus::Skipped => "Nothing to process".yellow().bold(),
    };
    writeln!(writer, "{} ({})", title, mode)?;
    writeln!(writer, "Deleted files: {}", result.deleted_files)?;
    writeln!(writer, "Processed folders: {}", result.processed_folders)?;
    writeln!(writer, "Total comparisons: {}", result.total_comparisons)?;
    writeln!(writer, "Space freed: {}", ByteSize::b(result.bytes_freed))?;

    if result.decode_failures > 0 {
        writeln!(
            writer,
            "{} {} image(s) could not be decoded and were skipped",
            "warning:".yellow().bold(),
            result.decode_failures
        )?;
    }

    if !result.failed_deletions.is_empty() {
        writeln!(
            writer,
            "{} {} image(s) could not be deleted:",
            "error:".red().bold(),
            result.failed_deletions.len()
        )?;
        for failure in &result.failed_deletions {
            writeln!(writer, "  {} ({})", failure.path, failure.message)?;
        }
    }

    Ok(())
}

/// Write the folder census, smallest folder first.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_inventory<W: Write>(writer: &mut W, folders: &[FolderInventory]) -> io::Result<()> {
    if folders.is_empty() {
        return writeln!(writer, "No subfolders found");
    }

    let width = folders.iter().map(|f| f.name.chars().count()).max().unwrap_or(0);
    for folder in folders {
        writeln!(writer, "{:<width$}  {:>6}", folder.name, folder.count(), width = width)?;
    }

    let total: usize = folders.iter().map(FolderInventory::count).sum();
    writeln!(
        writer,
        "{} folder(s), {} image(s)",
        folders.len().bold(),
        total.bold()
    )
}
