//! Output formatters for run summaries and folder inventories.
//!
//! - [`text`]: human-readable summary for the terminal
//! - [`json`]: machine-readable report for scripting
//!
//! # Example
//!
//! ```no_run
//! use imgdedup::engine::{Mode, SimilarityEngine};
//! use imgdedup::error::ExitCode;
//! use imgdedup::output::json::JsonRunReport;
//! use imgdedup::scanner::PerceptualHasher;
//! use std::path::Path;
//!
//! let root = Path::new("dataset/raw");
//! let engine = SimilarityEngine::new(PerceptualHasher::default());
//! let result = engine.run_cross_folder(root, 0.95).unwrap();
//!
//! let exit_code = ExitCode::for_run(&result);
//! let report = JsonRunReport::new(Mode::CrossFolder, root, 0.95, &result, exit_code);
//! println!("{}", report.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonInventory, JsonOutputError, JsonRunReport};
pub use text::{write_inventory, write_summary};
