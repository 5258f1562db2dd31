//! End-to-end tests through `run_app`.

mod common;

use clap::Parser;
use common::{checkerboard, noise, save_png, survivors};
use imgdedup::cli::Cli;
use imgdedup::error::{ConfigurationError, ExitCode};
use std::fs;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["imgdedup", "-q", "--no-color"];
    argv.extend_from_slice(args);
    imgdedup::run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_within_folder_exit_codes() {
    let temp_dir = tempdir().unwrap();
    let folder = temp_dir.path().join("cat");
    let original = save_png(&folder, "a.png", &checkerboard());
    fs::copy(&original, folder.join("a_copy.png")).unwrap();
    save_png(&folder, "b.png", &noise());
    let root = temp_dir.path().to_str().unwrap();

    let code = run(&["within-folder", root, "--threshold", "0.99"]).unwrap();
    assert_eq!(code, ExitCode::Success);
    assert_eq!(survivors(&folder), vec!["a.png", "b.png"]);

    let code = run(&["within-folder", root, "--threshold", "0.99", "--output", "json"]).unwrap();
    assert_eq!(code, ExitCode::NothingRemoved);
}

#[test]
fn test_cross_folder_with_single_folder_removes_nothing() {
    let temp_dir = tempdir().unwrap();
    save_png(&temp_dir.path().join("only"), "a.png", &checkerboard());

    let code = run(&["cross-folder", temp_dir.path().to_str().unwrap()]).unwrap();
    assert_eq!(code, ExitCode::NothingRemoved);
}

#[test]
fn test_invalid_threshold_is_a_configuration_error() {
    let temp_dir = tempdir().unwrap();

    let err = run(&["cross-folder", temp_dir.path().to_str().unwrap(), "-t", "150%"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigurationError>(),
        Some(ConfigurationError::InvalidThreshold(_))
    ));
}

#[test]
fn test_inventory() {
    let temp_dir = tempdir().unwrap();
    save_png(&temp_dir.path().join("cat"), "a.png", &checkerboard());
    let root = temp_dir.path().to_str().unwrap();

    assert_eq!(run(&["inventory", root]).unwrap(), ExitCode::Success);
    assert_eq!(
        run(&["inventory", root, "--output", "json"]).unwrap(),
        ExitCode::Success
    );

    let missing = temp_dir.path().join("missing");
    let err = run(&["inventory", missing.to_str().unwrap()]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigurationError>(),
        Some(ConfigurationError::RootNotFound(_))
    ));
}
