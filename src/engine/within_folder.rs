//! Within-folder policy: near-duplicate removal inside each class folder.

use std::ops::ControlFlow;
use std::path::Path;

use super::{similarity, DedupPolicy, LiveList, RunResult, RunStatus, SimilarityEngine, Threshold};
use crate::scanner::{list_folders, FolderInventory, HashIndex, ImageRef};

/// Removes near-duplicates inside each folder, keeping the shorter name.
///
/// Folders are walked in ascending image count and fingerprinted one at a
/// time. Within a folder every live pair `(i, j)` with `j > i` is compared
/// once. On a match the image whose base name is strictly longer is
/// deleted, `img2` on a tie. Deleting `img1` ends its inner scan and the
/// outer scan resumes at the next live slot after it, so every pair of
/// survivors has been compared while both were live.
#[derive(Debug, Clone, Copy, Default)]
pub struct WithinFolder;

impl DedupPolicy for WithinFolder {
    fn name(&self) -> &'static str {
        "within_folder"
    }

    fn run(&self, engine: &SimilarityEngine, root: &Path, threshold: Threshold) -> RunResult {
        let folders = list_folders(root);
        let mut result = RunResult::default();

        for folder in &folders {
            if folder.count() < 2 {
                log::debug!(
                    "Skipping {}: {} image(s), nothing to compare",
                    folder.name,
                    folder.count()
                );
                continue;
            }

            engine.log(&format!(
                "Processing folder: {} ({} images)",
                folder.name,
                folder.count()
            ));

            if dedup_folder(engine, folder, threshold, &mut result).is_break() {
                engine.log("Processing cancelled");
                result.status = RunStatus::Cancelled;
                break;
            }
            result.processed_folders += 1;
        }

        result
    }
}

fn dedup_folder(
    engine: &SimilarityEngine,
    folder: &FolderInventory,
    threshold: Threshold,
    result: &mut RunResult,
) -> ControlFlow<()> {
    let outcome = engine.index(&folder.images);
    result.decode_failures += outcome.decode_failures;
    if outcome.cancelled {
        return ControlFlow::Break(());
    }

    let mut index = outcome.index;
    let mut live = LiveList::new(
        folder
            .images
            .iter()
            .filter(|image| index.contains(image))
            .cloned()
            .collect(),
    );

    scan(engine, &folder.name, &mut live, &mut index, threshold, result)
}

fn scan(
    engine: &SimilarityEngine,
    name: &str,
    live: &mut LiveList<ImageRef>,
    index: &mut HashIndex,
    threshold: Threshold,
    result: &mut RunResult,
) -> ControlFlow<()> {
    let total = live.len();
    let mut outer = 0;
    let mut i = live.next_live(0);

    while let Some(slot_i) = i {
        outer += 1;
        engine.progress(outer, total, &format!("Comparing images in {}", name));

        let mut j = live.next_live(slot_i + 1);
        while let Some(slot_j) = j {
            if engine.is_cancelled() {
                return ControlFlow::Break(());
            }

            let (Some(img1), Some(img2)) = (live.get(slot_i), live.get(slot_j)) else {
                break;
            };
            let (Some(fp1), Some(fp2)) = (index.get(img1), index.get(img2)) else {
                j = live.next_live(slot_j + 1);
                continue;
            };

            result.total_comparisons += 1;
            let score = similarity(fp1, fp2);

            if threshold.matches(score) {
                let victim = if img1.name_len() > img2.name_len() {
                    slot_i
                } else {
                    slot_j
                };
                if let Some(image) = live.remove(victim) {
                    engine.discard(image, score, index, result);
                }
                if victim == slot_i {
                    break;
                }
            }

            j = live.next_live(slot_j + 1);
        }

        i = live.next_live(slot_i + 1);
    }

    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{DeleteError, DeleteResult};
    use crate::scanner::{Fingerprint, Fingerprinter, PerceptualError};
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    /// Fingerprint is the file's text content parsed as hex.
    struct TextFingerprinter;

    impl Fingerprinter for TextFingerprinter {
        fn fingerprint(&self, path: &Path) -> Result<Fingerprint, PerceptualError> {
            let text = fs::read_to_string(path)
                .map_err(|_| PerceptualError::UnsupportedFormat(path.display().to_string()))?;
            u64::from_str_radix(text.trim(), 16)
                .map(Fingerprint::new)
                .map_err(|_| PerceptualError::UnsupportedFormat(path.display().to_string()))
        }
    }

    fn write(folder: &Path, name: &str, hex: &str) {
        fs::create_dir_all(folder).unwrap();
        fs::write(folder.join(name), hex).unwrap();
    }

    fn survivors(folder: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(folder)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_longer_name_deleted() {
        let dir = tempdir().unwrap();
        let cat = dir.path().join("cat");
        write(&cat, "a.png", "0");
        write(&cat, "b_long.png", "0");

        let engine = SimilarityEngine::new(TextFingerprinter);
        let result = engine.run_within_folder(dir.path(), 1.0).unwrap();

        assert_eq!(result.deleted_files, 1);
        assert_eq!(result.total_comparisons, 1);
        assert_eq!(survivors(&cat), vec!["a.png"]);
    }

    #[test]
    fn test_img1_deleted_resumes_at_next_slot() {
        // aaaa is deleted against b; the scan then continues from b, which
        // still meets c.
        let dir = tempdir().unwrap();
        let cat = dir.path().join("cat");
        write(&cat, "aaaa.png", "0");
        write(&cat, "b.png", "0");
        write(&cat, "c.png", "0");

        let engine = SimilarityEngine::new(TextFingerprinter);
        let result = engine.run_within_folder(dir.path(), 1.0).unwrap();

        assert_eq!(result.deleted_files, 2);
        assert_eq!(result.total_comparisons, 2);
        assert_eq!(survivors(&cat), vec!["b.png"]);
    }

    #[test]
    fn test_small_folders_skipped() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("solo"), "a.png", "0");
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        let engine = SimilarityEngine::new(TextFingerprinter);
        let result = engine.run_within_folder(dir.path(), 0.9).unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(result.processed_folders, 0);
        assert_eq!(result.total_comparisons, 0);
    }

    #[test]
    fn test_failed_deletion_still_leaves_live_list() {
        let dir = tempdir().unwrap();
        let cat = dir.path().join("cat");
        write(&cat, "a.png", "0");
        write(&cat, "b.png", "0");
        write(&cat, "c.png", "0");

        let engine = SimilarityEngine::new(TextFingerprinter).with_remover(
            |path: &Path| -> Result<DeleteResult, DeleteError> {
                Err(DeleteError::PermissionDenied(path.to_path_buf()))
            },
        );
        let result = engine.run_within_folder(dir.path(), 1.0).unwrap();

        // b and c are each dropped once; a is never compared against a
        // dropped image again.
        assert_eq!(result.total_comparisons, 2);
        assert_eq!(result.deleted_files, 0);
        assert_eq!(result.failed_deletions.len(), 2);
        assert_eq!(survivors(&cat).len(), 3);
    }

    #[test]
    fn test_logs_processing_and_deletion() {
        let dir = tempdir().unwrap();
        let cat = dir.path().join("cat");
        write(&cat, "a.png", "0");
        write(&cat, "bb.png", "1");

        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let engine = SimilarityEngine::new(TextFingerprinter).with_log_sink(Arc::new(
            move |line: &str| sink.lock().unwrap().push(line.to_string()),
        ));
        engine.run_within_folder(dir.path(), 0.98).unwrap();

        let lines = lines.lock().unwrap();
        assert_eq!(lines[0], "Processing folder: cat (2 images)");
        assert_eq!(lines[1], "Deleted similar image: bb.png (similarity: 0.984)");
    }
}
