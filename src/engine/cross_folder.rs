//! Cross-folder policy: class balancing across folders.

use std::ops::ControlFlow;
use std::path::Path;

use super::{similarity, DedupPolicy, LiveList, RunResult, RunStatus, SimilarityEngine, Threshold};
use crate::scanner::{list_folders, Fingerprint, FolderInventory, HashIndex, ImageRef};

/// Treats smaller folders as canonical and prunes larger ones.
///
/// Non-empty folders are ordered by ascending image count and fingerprinted
/// once. For every folder pair `(i, j)` with `i < j`, each live image of
/// folder `i` is compared against each live image of folder `j`; a match
/// deletes the folder `j` image. An image of folder `i` is never deleted
/// while `i` is the source of a pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossFolder;

impl DedupPolicy for CrossFolder {
    fn name(&self) -> &'static str {
        "cross_folder"
    }

    fn run(&self, engine: &SimilarityEngine, root: &Path, threshold: Threshold) -> RunResult {
        let folders: Vec<FolderInventory> = list_folders(root)
            .into_iter()
            .filter(|folder| !folder.is_empty())
            .collect();

        if folders.len() < 2 {
            engine.log(&format!(
                "At least 2 non-empty subfolders are required for cross-folder comparison (found {})",
                folders.len()
            ));
            return RunResult::skipped();
        }

        for folder in &folders {
            engine.log(&format!("Folder {}: {} images", folder.name, folder.count()));
        }

        let mut result = RunResult::default();
        let images: Vec<ImageRef> = folders
            .iter()
            .flat_map(|folder| folder.images.iter().cloned())
            .collect();

        let outcome = engine.index(&images);
        result.decode_failures = outcome.decode_failures;
        if outcome.cancelled {
            engine.log("Processing cancelled");
            result.status = RunStatus::Cancelled;
            return result;
        }

        let mut index = outcome.index;
        let mut candidates: Vec<LiveList<ImageRef>> = folders
            .iter()
            .map(|folder| {
                LiveList::new(
                    folder
                        .images
                        .iter()
                        .filter(|image| index.contains(image))
                        .cloned()
                        .collect(),
                )
            })
            .collect();

        let n = folders.len();
        let total_pairs = n * (n - 1) / 2;
        let mut pair = 0;

        for i in 0..n - 1 {
            for j in i + 1..n {
                pair += 1;
                engine.progress(
                    pair,
                    total_pairs,
                    &format!("Comparing {} with {}", folders[i].name, folders[j].name),
                );

                let sources: Vec<(ImageRef, Fingerprint)> = candidates[i]
                    .iter()
                    .filter_map(|image| index.get(image).map(|fp| (image.clone(), fp)))
                    .collect();

                let flow = prune_target(
                    engine,
                    &sources,
                    &mut candidates[j],
                    &mut index,
                    threshold,
                    &mut result,
                );
                if flow.is_break() {
                    engine.log("Processing cancelled");
                    result.status = RunStatus::Cancelled;
                    return result;
                }
            }
        }

        result.processed_folders = n;
        result
    }
}

/// Compare every source against every live target, deleting matched targets.
fn prune_target(
    engine: &SimilarityEngine,
    sources: &[(ImageRef, Fingerprint)],
    targets: &mut LiveList<ImageRef>,
    index: &mut HashIndex,
    threshold: Threshold,
    result: &mut RunResult,
) -> ControlFlow<()> {
    for (source, source_fp) in sources {
        let mut slot = targets.next_live(0);

        while let Some(s) = slot {
            if engine.is_cancelled() {
                return ControlFlow::Break(());
            }

            if let Some(target_fp) = targets.get(s).and_then(|target| index.get(target)) {
                result.total_comparisons += 1;
                let score = similarity(*source_fp, target_fp);

                if threshold.matches(score) {
                    if let Some(target) = targets.remove(s) {
                        log::trace!("{} duplicates {}", target, source);
                        engine.discard(target, score, index, result);
                    }
                }
            }

            slot = targets.next_live(s + 1);
        }
    }

    ControlFlow::Continue(())
}
