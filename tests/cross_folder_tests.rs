//! Cross-folder policy tests.

mod common;

use common::{
    checkerboard, fake_image, names, noise, save_png, survivors, HexFingerprinter, LogCollector,
};
use imgdedup::engine::{RunStatus, SimilarityEngine};
use imgdedup::scanner::PerceptualHasher;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_larger_folder_loses_its_duplicate() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fake_image(&root.join("x"), "x1.png", 0);
    let y = root.join("y");
    fake_image(&y, "y1.png", 0xFF);
    fake_image(&y, "y2.png", 0xFF00);
    fake_image(&y, "y3.png", 0);
    fake_image(&y, "y4.png", 0xFF_0000);
    fake_image(&y, "y5.png", 0xFF00_0000);

    let engine = SimilarityEngine::new(HexFingerprinter);
    let result = engine.run_cross_folder(root, 0.95).unwrap();

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.deleted_files, 1);
    assert_eq!(result.processed_folders, 2);
    assert_eq!(result.total_comparisons, 5);
    assert_eq!(names(&result.deleted_file_paths), vec!["y3.png"]);
    assert_eq!(survivors(&root.join("x")), vec!["x1.png"]);
    assert_eq!(survivors(&y).len(), 4);
}

#[test]
fn test_real_images_across_folders() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    let source = save_png(&root.join("helmet"), "h1.png", &checkerboard());
    save_png(&root.join("vest"), "v1.png", &noise());
    fs::copy(&source, root.join("vest").join("v2.png")).unwrap();

    let engine = SimilarityEngine::new(PerceptualHasher::default());
    let result = engine.run_cross_folder(root, 0.95).unwrap();

    assert_eq!(result.total_comparisons, 2);
    assert_eq!(names(&result.deleted_file_paths), vec!["v2.png"]);
    assert!(source.exists());
    assert_eq!(survivors(&root.join("vest")), vec!["v1.png"]);
}

#[test]
fn test_single_subfolder_is_skipped() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fake_image(&root.join("only"), "a.png", 0);
    fake_image(&root.join("only"), "b.png", 0);

    let logs = LogCollector::new();
    let engine = SimilarityEngine::new(HexFingerprinter).with_log_sink(logs.sink());
    let result = engine.run_cross_folder(root, 0.9).unwrap();

    assert_eq!(result.status, RunStatus::Skipped);
    assert_eq!(result.deleted_files, 0);
    assert_eq!(result.processed_folders, 0);
    assert!(logs.contains("At least 2 non-empty subfolders are required"));
    assert_eq!(survivors(&root.join("only")).len(), 2);
}

#[test]
fn test_three_folders_cascade() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fake_image(&root.join("a"), "a0.png", 0);
    fake_image(&root.join("b"), "b0.png", 0);
    fake_image(&root.join("b"), "b1.png", 0xFF);
    fake_image(&root.join("c"), "c0.png", 0);
    fake_image(&root.join("c"), "c1.png", 0xFF);
    fake_image(&root.join("c"), "c2.png", 0xFF00_FF00);

    let engine = SimilarityEngine::new(HexFingerprinter);
    let result = engine.run_cross_folder(root, 1.0).unwrap();

    // (a,b): 1x2, (a,c): 1x3, (b,c): b1 against c1 and c2.
    assert_eq!(result.total_comparisons, 7);
    assert_eq!(result.processed_folders, 3);
    assert_eq!(
        names(&result.deleted_file_paths),
        vec!["b0.png", "c0.png", "c1.png"]
    );
    assert_eq!(survivors(&root.join("a")), vec!["a0.png"]);
    assert_eq!(survivors(&root.join("b")), vec!["b1.png"]);
    assert_eq!(survivors(&root.join("c")), vec!["c2.png"]);
}

#[test]
fn test_empty_folders_do_not_count() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fake_image(&root.join("a"), "a.png", 0);
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::create_dir_all(root.join(".cache")).unwrap();
    fake_image(&root.join(".cache"), "hidden.png", 0);
    fake_image(&root.join("z"), "z.png", 0);

    let engine = SimilarityEngine::new(HexFingerprinter);
    let result = engine.run_cross_folder(root, 1.0).unwrap();

    assert_eq!(result.processed_folders, 2);
    assert_eq!(result.total_comparisons, 1);
    assert_eq!(names(&result.deleted_file_paths), vec!["z.png"]);
    assert!(root.join(".cache").join("hidden.png").exists());
}

#[test]
fn test_folder_census_is_logged_smallest_first() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fake_image(&root.join("big"), "b1.png", 0x1);
    fake_image(&root.join("big"), "b2.png", 0x2);
    fake_image(&root.join("small"), "s1.png", 0xF0);

    let logs = LogCollector::new();
    let engine = SimilarityEngine::new(HexFingerprinter).with_log_sink(logs.sink());
    let result = engine.run_cross_folder(root, 1.0).unwrap();

    assert_eq!(result.deleted_files, 0);
    let lines = logs.lines();
    assert_eq!(lines[0], "Folder small: 1 images");
    assert_eq!(lines[1], "Folder big: 2 images");
}

#[cfg(unix)]
#[test]
fn test_symlinked_folder_is_not_a_class() {
    use std::os::unix::fs::symlink;

    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    let cat = root.join("cat");
    fake_image(&cat, "a.png", 0);
    fake_image(&cat, "b.png", 0xFFFF);
    symlink(&cat, root.join("alias")).unwrap();

    let engine = SimilarityEngine::new(HexFingerprinter);
    let result = engine.run_cross_folder(root, 0.95).unwrap();

    assert_eq!(result.status, RunStatus::Skipped);
    assert_eq!(result.deleted_files, 0);
    assert!(cat.join("a.png").exists());
    assert!(cat.join("b.png").exists());
}
