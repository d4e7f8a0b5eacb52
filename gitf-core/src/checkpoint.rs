//! Per-project LIFO stack of working-tree snapshots.
//!
//! A checkpoint's ID is the stack depth when it was taken, so a stack of
//! depth N always holds IDs `0..N` in creation order. Only the top is ever
//! restored and removed.

use crate::binary::is_binary_file;
use crate::error::{Error, Result};
use crate::models::Project;
use crate::paths::{relative_to_project, StorageLayout};
use crate::vcs::Vcs;
use crate::workspace::{copy_file, prune_empty_dirs, Batch, Workspace};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointCreated {
    pub id: u32,
    pub files: Vec<PathBuf>,
    /// Tracked files that were not captured: directories, binaries, and
    /// files deleted from the working tree.
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointSummary {
    pub id: u32,
    pub file_count: usize,
}

/// Result of popping one checkpoint off the stack.
#[derive(Debug)]
pub enum Popped {
    /// Files were copied back; `files` holds each working-tree path written.
    Restored { id: u32, files: Batch<PathBuf> },
    /// Some files could not be copied back. Their snapshot copies and the
    /// ID are kept so a later restore can retry them.
    Incomplete { id: u32, files: Batch<PathBuf> },
    /// The checkpoint's directory was gone. The ID was dropped from the
    /// stack so later checkpoints are not blocked behind it.
    Missing { id: u32, dir: PathBuf },
}

impl Popped {
    pub fn id(&self) -> u32 {
        match self {
            Popped::Restored { id, .. }
            | Popped::Incomplete { id, .. }
            | Popped::Missing { id, .. } => *id,
        }
    }
}

impl<V: Vcs> Workspace<V> {
    /// Snapshots every tracked, non-binary file and pushes the new ID.
    ///
    /// Fails without touching the stack if the checkpoint directory already
    /// exists. A copy failure removes the partial snapshot.
    pub fn create_checkpoint(&self, project: &mut Project) -> Result<CheckpointCreated> {
        let tracked = self.vcs().tracked_files(&project.file_path)?;

        let mut files = Vec::new();
        let mut skipped = Vec::new();
        for file in tracked {
            let eligible = file.is_file()
                && !is_binary_file(&file)
                && relative_to_project(project, &file).is_ok();
            if eligible {
                files.push(file);
            } else {
                skipped.push(file);
            }
        }

        let id = project.checkpoints.len() as u32;
        let dir = self.layout().checkpoint_dir(project, id);
        if dir.exists() {
            return Err(Error::CheckpointExists(dir.display().to_string()));
        }
        fs::create_dir_all(&dir)?;

        if let Err(e) = self.snapshot(project, id, &files) {
            if let Err(cleanup) = fs::remove_dir_all(&dir) {
                warn!("Failed to remove partial checkpoint {:?}: {}", dir, cleanup);
            }
            return Err(e);
        }

        project.checkpoints.push(id);
        info!(
            "Created checkpoint {} for {} with {} file(s)",
            id,
            project.name,
            files.len()
        );

        Ok(CheckpointCreated { id, files, skipped })
    }

    fn snapshot(&self, project: &Project, id: u32, files: &[PathBuf]) -> Result<()> {
        for file in files {
            let destination = self.layout().checkpoint_path(project, id, file)?;
            copy_file(file, &destination)?;
        }
        Ok(())
    }

    /// `(id, file count)` for each checkpoint, oldest first.
    pub fn list_checkpoints<'a>(
        &'a self,
        project: &'a Project,
    ) -> impl Iterator<Item = CheckpointSummary> + Clone + 'a {
        summaries(self.layout(), project)
    }

    /// Restores and removes the most recent checkpoint.
    ///
    /// Returns `Ok(None)` when there is nothing to restore. Files that fail
    /// to copy back are recorded and the rest are still restored; in that
    /// case only the failed copies are kept and the ID stays on the stack.
    pub fn restore_last_checkpoint(&self, project: &mut Project) -> Result<Option<Popped>> {
        let Some(id) = project.top_checkpoint() else {
            return Ok(None);
        };

        let dir = self.layout().checkpoint_dir(project, id);
        if !dir.is_dir() {
            warn!(
                "Checkpoint {} of {} has no directory at {:?}, dropping it",
                id, project.name, dir
            );
            project.checkpoints.pop();
            return Ok(Some(Popped::Missing { id, dir }));
        }

        let files = restore_tree(&dir, &project.file_path);

        if !files.is_clean() {
            for restored in &files.done {
                if let Ok(copy) = self.layout().checkpoint_path(project, id, restored) {
                    if let Err(e) = fs::remove_file(&copy) {
                        warn!("Failed to remove restored copy {:?}: {}", copy, e);
                    }
                    if let Some(parent) = copy.parent() {
                        prune_empty_dirs(parent, &dir);
                    }
                }
            }
            warn!(
                "Checkpoint {} of {} kept, {} file(s) could not be restored",
                id,
                project.name,
                files.failed.len()
            );
            return Ok(Some(Popped::Incomplete { id, files }));
        }

        if let Err(e) = fs::remove_dir_all(&dir) {
            warn!("Failed to remove checkpoint directory {:?}: {}", dir, e);
        }
        project.checkpoints.pop();

        info!(
            "Restored checkpoint {} of {} ({} file(s))",
            id,
            project.name,
            files.done.len()
        );
        Ok(Some(Popped::Restored { id, files }))
    }

    /// Pops up to `count` checkpoints, stopping early once the stack is
    /// empty or a checkpoint could only be partly restored.
    pub fn restore_checkpoints(
        &self,
        project: &mut Project,
        count: usize,
    ) -> Vec<Result<Popped>> {
        let mut results = Vec::new();
        for _ in 0..count {
            if !project.has_pending_checkpoints() {
                break;
            }
            match self.restore_last_checkpoint(project) {
                Ok(Some(popped @ Popped::Incomplete { .. })) => {
                    results.push(Ok(popped));
                    break;
                }
                Ok(Some(popped)) => results.push(Ok(popped)),
                Ok(None) => break,
                Err(e) => results.push(Err(e)),
            }
        }
        results
    }
}

fn summaries<'a>(
    layout: &'a StorageLayout,
    project: &'a Project,
) -> impl Iterator<Item = CheckpointSummary> + Clone + 'a {
    project.checkpoints.iter().map(move |&id| CheckpointSummary {
        id,
        file_count: count_files(&layout.checkpoint_dir(project, id)),
    })
}

fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}

/// Copies every file under `snapshot` to the same relative path under `root`.
fn restore_tree(snapshot: &Path, root: &Path) -> Batch<PathBuf> {
    let mut batch = Batch::new();

    for entry in WalkDir::new(snapshot).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(snapshot).to_path_buf();
                batch.record(&path, Err(Error::Io(e.into())));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let source = entry.path();
        let result = source
            .strip_prefix(snapshot)
            .map(|relative| root.join(relative))
            .map_err(|_| Error::OutsideProject {
                path: source.to_path_buf(),
                root: snapshot.to_path_buf(),
            })
            .and_then(|destination| copy_file(source, &destination).map(|()| destination));
        batch.record(source, result);
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::testing::FakeVcs;
    use crate::workspace::fixtures::Fixture;

    fn fixture_tracking(files: &[(&str, &str)]) -> Fixture {
        let fx = Fixture::new();
        let paths: Vec<_> = files.iter().map(|(rel, body)| fx.write(rel, body)).collect();
        *fx.workspace.vcs().tracked.borrow_mut() = paths;
        fx
    }

    #[test]
    fn test_checkpoint_captures_tracked_text_files() {
        let mut fx = fixture_tracking(&[("a.txt", "a"), ("src/b.rs", "b")]);

        let created = fx.workspace.create_checkpoint(&mut fx.project).unwrap();

        assert_eq!(created.id, 0);
        assert_eq!(created.files.len(), 2);
        assert_eq!(fx.project.checkpoints, vec![0]);
        assert_eq!(
            fs::read_to_string(fx.storage_path("checkpoints/0/src/b.rs")).unwrap(),
            "b"
        );

        let listed: Vec<_> = fx.workspace.list_checkpoints(&fx.project).collect();
        assert_eq!(listed, vec![CheckpointSummary { id: 0, file_count: 2 }]);
    }

    #[test]
    fn test_checkpoint_skips_binaries_directories_and_deleted_files() {
        let mut fx = fixture_tracking(&[("a.txt", "a"), ("app.exe", "MZ"), ("fonts/x.ttf", "f")]);
        let deleted = fx.tree.path().join("gone.txt");
        let dir = fx.tree.path().join("fonts");
        fx.workspace
            .vcs()
            .tracked
            .borrow_mut()
            .extend([deleted.clone(), dir.clone()]);

        let created = fx.workspace.create_checkpoint(&mut fx.project).unwrap();

        assert_eq!(created.files, vec![fx.tree.path().join("a.txt")]);
        assert_eq!(created.skipped.len(), 4);
        assert!(created.skipped.contains(&deleted));
        assert!(created.skipped.contains(&dir));
        assert!(!fx.storage_path("checkpoints/0/app.exe").exists());
    }

    #[test]
    fn test_stack_ids_follow_creation_order() {
        let mut fx = fixture_tracking(&[("a.txt", "a")]);

        for expected in 0..3 {
            let created = fx.workspace.create_checkpoint(&mut fx.project).unwrap();
            assert_eq!(created.id, expected);
        }

        assert_eq!(fx.project.checkpoints, vec![0, 1, 2]);
        let ids: Vec<_> = fx
            .workspace
            .list_checkpoints(&fx.project)
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_existing_checkpoint_dir_aborts_without_mutation() {
        let mut fx = fixture_tracking(&[("a.txt", "a")]);
        fs::create_dir_all(fx.storage_path("checkpoints/0")).unwrap();

        let err = fx.workspace.create_checkpoint(&mut fx.project).unwrap_err();

        assert!(matches!(err, Error::CheckpointExists(_)));
        assert!(fx.project.checkpoints.is_empty());
        assert!(!fx.storage_path("checkpoints/0/a.txt").exists());
    }

    #[test]
    fn test_tracked_listing_failure_aborts() {
        let vcs = FakeVcs::new();
        vcs.fail_on("ls-files");
        let mut fx = Fixture::with_vcs(vcs);

        assert!(fx.workspace.create_checkpoint(&mut fx.project).is_err());
        assert!(fx.project.checkpoints.is_empty());
        assert!(!fx.storage_path("checkpoints").exists());
    }

    #[test]
    fn test_restore_brings_back_files_and_pops() {
        let mut fx = fixture_tracking(&[("a.txt", "original"), ("src/b.rs", "fn b() {}")]);
        fx.workspace.create_checkpoint(&mut fx.project).unwrap();
        fx.write("a.txt", "edited");
        fs::remove_file(fx.tree.path().join("src/b.rs")).unwrap();

        let popped = fx
            .workspace
            .restore_last_checkpoint(&mut fx.project)
            .unwrap()
            .unwrap();

        match popped {
            Popped::Restored { id, files } => {
                assert_eq!(id, 0);
                assert_eq!(files.done.len(), 2);
                assert!(files.is_clean());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(fx.read("a.txt"), "original");
        assert_eq!(fx.read("src/b.rs"), "fn b() {}");
        assert!(!fx.storage_path("checkpoints/0").exists());
        assert!(fx.project.checkpoints.is_empty());
    }

    #[test]
    fn test_restore_pops_only_the_top() {
        let mut fx = fixture_tracking(&[("a.txt", "v0")]);
        fx.workspace.create_checkpoint(&mut fx.project).unwrap();
        fx.write("a.txt", "v1");
        fx.workspace.create_checkpoint(&mut fx.project).unwrap();
        fx.write("a.txt", "v2");

        let popped = fx
            .workspace
            .restore_last_checkpoint(&mut fx.project)
            .unwrap()
            .unwrap();

        assert_eq!(popped.id(), 1);
        assert_eq!(fx.read("a.txt"), "v1");
        assert_eq!(fx.project.checkpoints, vec![0]);
        assert!(fx.storage_path("checkpoints/0/a.txt").is_file());

        let next = fx.workspace.create_checkpoint(&mut fx.project).unwrap();
        assert_eq!(next.id, 1);
    }

    #[test]
    fn test_restore_empty_stack_is_noop() {
        let mut fx = Fixture::new();

        let popped = fx.workspace.restore_last_checkpoint(&mut fx.project).unwrap();

        assert!(popped.is_none());
        assert!(fx.project.checkpoints.is_empty());
        assert!(fx.workspace.restore_checkpoints(&mut fx.project, 3).is_empty());
    }

    #[test]
    fn test_missing_checkpoint_dir_is_dropped() {
        let mut fx = fixture_tracking(&[("a.txt", "a")]);
        fx.workspace.create_checkpoint(&mut fx.project).unwrap();
        fx.workspace.create_checkpoint(&mut fx.project).unwrap();
        fs::remove_dir_all(fx.storage_path("checkpoints/1")).unwrap();

        let popped = fx
            .workspace
            .restore_last_checkpoint(&mut fx.project)
            .unwrap()
            .unwrap();

        assert!(matches!(popped, Popped::Missing { id: 1, .. }));
        assert_eq!(fx.project.checkpoints, vec![0]);
    }

    #[test]
    fn test_restore_many_stops_when_empty() {
        let mut fx = fixture_tracking(&[("a.txt", "v0")]);
        fx.workspace.create_checkpoint(&mut fx.project).unwrap();
        fx.write("a.txt", "v1");
        fx.workspace.create_checkpoint(&mut fx.project).unwrap();
        fx.write("a.txt", "v2");

        let results = fx.workspace.restore_checkpoints(&mut fx.project, 5);

        let ids: Vec<_> = results.iter().map(|r| r.as_ref().unwrap().id()).collect();
        assert_eq!(ids, vec![1, 0]);
        assert_eq!(fx.read("a.txt"), "v0");
        assert!(fx.project.checkpoints.is_empty());
    }

    #[test]
    fn test_list_counts_missing_dir_as_empty() {
        let mut fx = Fixture::new();
        fx.project.checkpoints.push(0);

        let listed: Vec<_> = fx.workspace.list_checkpoints(&fx.project).collect();

        assert_eq!(listed, vec![CheckpointSummary { id: 0, file_count: 0 }]);
    }

    #[test]
    fn test_failed_restore_keeps_checkpoint_and_unrestored_copy() {
        let mut fx = fixture_tracking(&[("a.txt", "precious"), ("b.txt", "b0")]);
        fx.workspace.create_checkpoint(&mut fx.project).unwrap();
        fs::remove_file(fx.tree.path().join("a.txt")).unwrap();
        fs::create_dir(fx.tree.path().join("a.txt")).unwrap();
        fx.write("b.txt", "b1");

        let popped = fx
            .workspace
            .restore_last_checkpoint(&mut fx.project)
            .unwrap()
            .unwrap();

        match popped {
            Popped::Incomplete { id, files } => {
                assert_eq!(id, 0);
                assert_eq!(files.done, vec![fx.tree.path().join("b.txt")]);
                assert_eq!(files.failed.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(fx.read("b.txt"), "b0");
        assert_eq!(fx.project.checkpoints, vec![0]);
        assert_eq!(
            fs::read_to_string(fx.storage_path("checkpoints/0/a.txt")).unwrap(),
            "precious"
        );
        assert!(!fx.storage_path("checkpoints/0/b.txt").exists());
    }

    #[test]
    fn test_restore_many_stops_at_incomplete_checkpoint() {
        let mut fx = fixture_tracking(&[("a.txt", "v0")]);
        fx.workspace.create_checkpoint(&mut fx.project).unwrap();
        fx.workspace.create_checkpoint(&mut fx.project).unwrap();
        fs::remove_file(fx.tree.path().join("a.txt")).unwrap();
        fs::create_dir(fx.tree.path().join("a.txt")).unwrap();

        let results = fx.workspace.restore_checkpoints(&mut fx.project, 2);

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Ok(Popped::Incomplete { id: 1, .. })));
        assert_eq!(fx.project.checkpoints, vec![0, 1]);
    }

    #[test]
    fn test_retry_after_fixing_working_tree_completes_restore() {
        let mut fx = fixture_tracking(&[("a.txt", "precious")]);
        fx.workspace.create_checkpoint(&mut fx.project).unwrap();
        let path = fx.tree.path().join("a.txt");
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fx.workspace.restore_last_checkpoint(&mut fx.project).unwrap();
        fs::remove_dir(&path).unwrap();

        let popped = fx
            .workspace
            .restore_last_checkpoint(&mut fx.project)
            .unwrap()
            .unwrap();

        assert!(matches!(popped, Popped::Restored { id: 0, .. }));
        assert_eq!(fx.read("a.txt"), "precious");
        assert!(fx.project.checkpoints.is_empty());
        assert!(!fx.storage_path("checkpoints/0").exists());
    }
}
