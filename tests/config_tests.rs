//! Integration tests for the layered configuration.
//!
//! Environment variables are process-global, so every test that reads them
//! holds `ENV_MUTEX`.

use clap::Parser;
use imgdedup::actions::DeleteMethod;
use imgdedup::cli::{Cli, Commands};
use imgdedup::config::Config;
use imgdedup::error::ConfigurationError;
use imgdedup::scanner::PerceptualAlgorithm;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("IMGDEDUP_") {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_load_without_file_gives_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    let config = Config::load_from_path(None).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_missing_file_is_not_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();

    let config = Config::load(Some(dir.path().join("absent.toml").as_path())).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_toml_file_overrides_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let written = Config {
        threshold: 0.97,
        algorithm: PerceptualAlgorithm::Dhash,
        trash: true,
    };
    fs::write(&path, toml::to_string(&written).unwrap()).unwrap();

    let config = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(config, written);
    assert_eq!(config.delete_method(), DeleteMethod::Trash);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "algorithm = \"ahash\"\n").unwrap();

    let config = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(config.algorithm, PerceptualAlgorithm::Ahash);
    assert_eq!(config.threshold, Config::default().threshold);
}

#[test]
fn test_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "threshold = 0.9\n").unwrap();

    std::env::set_var("IMGDEDUP_THRESHOLD", "0.99");
    let config = Config::load(Some(path.as_path()));
    clear_env();

    assert_eq!(config.unwrap().threshold, 0.99);
}

#[test]
fn test_cli_overrides_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    std::env::set_var("IMGDEDUP_THRESHOLD", "0.99");
    let config = Config::load_from_path(None);
    clear_env();

    let cli = Cli::try_parse_from(["imgdedup", "within-folder", "/data", "-t", "90%"]).unwrap();
    let Commands::WithinFolder(args) = cli.command else {
        panic!("Expected WithinFolder command");
    };

    let config = config.unwrap().merge_run_args(&args);
    assert_eq!(config.threshold, 0.9);
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_toml_is_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "threshold = [not toml").unwrap();

    assert!(matches!(
        Config::load(Some(path.as_path())),
        Err(ConfigurationError::Invalid(_))
    ));
}

#[test]
fn test_out_of_range_threshold_fails_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "threshold = 0.0\n").unwrap();

    let config = Config::load(Some(path.as_path())).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigurationError::InvalidThreshold(_))
    ));
}
