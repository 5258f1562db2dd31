//! imgdedup - perceptual-hash culling for image classification datasets.
//!
//! A dataset root holds one subdirectory per class. imgdedup fingerprints
//! every image with a 64-bit perceptual hash and deletes near-duplicates
//! under one of two policies:
//!
//! - **cross-folder**: smaller class folders are canonical; larger folders
//!   lose images that duplicate anything in a smaller one
//! - **within-folder**: near-duplicates are removed inside each folder,
//!   keeping the image with the shorter name
//!
//! The library entry point is [`engine::SimilarityEngine`]; the binary
//! wraps it in [`run_app`].

pub mod actions;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;

use crate::cli::{Cli, Commands, InventoryArgs, OutputFormat, RunArgs};
use crate::config::Config;
use crate::engine::{Mode, SimilarityEngine};
use crate::error::ExitCode;
use crate::output::{write_inventory, write_summary, JsonInventory, JsonRunReport};
use crate::progress::Progress;
use crate::scanner::{list_folders, PerceptualHasher};

/// Run the command described by `cli`.
///
/// # Errors
///
/// Returns an error for invalid configuration, an unusable root directory,
/// or a failure writing the summary. Per-image problems are reported in
/// the summary and reflected in the exit code instead.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let Cli {
        verbose,
        quiet,
        no_color,
        config,
        command,
        ..
    } = cli;

    if no_color {
        yansi::disable();
    }
    logging::init_logging(verbose, quiet);
    log::debug!(
        "imgdedup {} (log level {})",
        env!("CARGO_PKG_VERSION"),
        logging::current_level_name()
    );

    match command {
        Commands::CrossFolder(args) => run_dedup(Mode::CrossFolder, &args, config, quiet),
        Commands::WithinFolder(args) => run_dedup(Mode::WithinFolder, &args, config, quiet),
        Commands::Inventory(args) => run_inventory(&args),
    }
}

fn run_dedup(
    mode: Mode,
    args: &RunArgs,
    config_path: Option<PathBuf>,
    quiet: bool,
) -> anyhow::Result<ExitCode> {
    let config = Config::load(config_path.as_deref())
        .context("Failed to load configuration")?
        .merge_run_args(args);
    let threshold = config.validate()?;

    log::info!(
        "{} on {} (threshold {}, {}, {})",
        mode,
        args.root.display(),
        threshold.value(),
        config.algorithm,
        config.delete_method()
    );

    let token = signal::install_handler()?;
    let engine = SimilarityEngine::new(PerceptualHasher::new(config.algorithm))
        .with_remover(config.delete_method())
        .with_cancel_check(token);

    let handle = engine::spawn(engine, mode, args.root.clone(), threshold.value())
        .context("Failed to start worker thread")?;

    let progress = Progress::new(quiet);
    for event in handle.events.iter() {
        progress.handle(&event);
    }
    progress.finish();

    let result = handle.join()?;
    let exit_code = ExitCode::for_run(&result);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => write_summary(&mut out, mode, &result)?,
        OutputFormat::Json => {
            JsonRunReport::new(mode, &args.root, threshold.value(), &result, exit_code)
                .write_to(&mut out)?;
        }
    }
    out.flush()?;

    Ok(exit_code)
}

fn run_inventory(args: &InventoryArgs) -> anyhow::Result<ExitCode> {
    engine::check_root(&args.root)?;
    let folders = list_folders(&args.root);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => write_inventory(&mut out, &folders)?,
        OutputFormat::Json => JsonInventory::new(&args.root, &folders).write_to(&mut out)?,
    }
    out.flush()?;

    Ok(ExitCode::Success)
}
