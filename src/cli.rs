//! Command-line interface definitions for imgdedup.
//!
//! Global options (verbosity, color, config file) apply to every
//! subcommand. Run subcommands leave unset options to the configuration
//! layers so the config file and `IMGDEDUP_*` variables can supply them.
//!
//! # Example
//!
//! ```bash
//! # Balance classes: larger folders lose duplicates of smaller ones
//! imgdedup cross-folder dataset/raw --threshold 0.95
//!
//! # Remove near-duplicates inside each folder, into the trash
//! imgdedup within-folder dataset/raw --threshold 99% --trash
//!
//! # Folder census as JSON
//! imgdedup inventory dataset/raw --output json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::scanner::PerceptualAlgorithm;

/// Perceptual-hash deduplication for image classification datasets.
///
/// The root directory's direct subdirectories are class folders. Images are
/// compared by 64-bit perceptual hash and near-duplicates are deleted.
#[derive(Debug, Parser)]
#[command(name = "imgdedup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress and log lines; only the summary and errors print
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as a JSON object on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Delete images in larger folders that duplicate images in smaller ones
    CrossFolder(RunArgs),
    /// Delete near-duplicate images inside each folder
    WithinFolder(RunArgs),
    /// List class folders sorted by image count
    Inventory(InventoryArgs),
}

/// Arguments shared by the run subcommands.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Dataset root whose subdirectories are class folders
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Similarity threshold in (0, 1], e.g. 0.95 or 95%
    ///
    /// A pair is a duplicate when 1 - hamming/64 reaches the threshold.
    #[arg(short, long, value_name = "T", value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Perceptual hash algorithm
    #[arg(short, long, value_enum)]
    pub algorithm: Option<PerceptualAlgorithm>,

    /// Move deleted images to the system trash instead of removing them
    #[arg(long)]
    pub trash: bool,

    /// Summary format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the inventory subcommand.
#[derive(Debug, Args)]
pub struct InventoryArgs {
    /// Dataset root whose subdirectories are class folders
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output format for summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a similarity threshold.
///
/// Accepts a fraction (`0.95`) or a percentage (`95%`). Range checking is
/// left to the engine so that config-file values go through the same path.
///
/// ```
/// use imgdedup::cli::parse_threshold;
///
/// assert_eq!(parse_threshold("0.95").unwrap(), 0.95);
/// assert_eq!(parse_threshold("85%").unwrap(), 0.85);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty or not a number.
pub fn parse_threshold(s: &str) -> Result<f64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Threshold cannot be empty".to_string());
    }

    let (num_str, percent) = match s.strip_suffix('%') {
        Some(rest) => (rest.trim(), true),
        None => (s, false),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    Ok(if percent { num / 100.0 } else { num })
}
