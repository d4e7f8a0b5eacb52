//! Copying working-tree files into and out of a commit's storage.

use crate::checkpoint::Popped;
use crate::error::{Error, Result};
use crate::models::Project;
use crate::vcs::Vcs;
use crate::workspace::{copy_file, prune_empty_dirs, Batch, Workspace};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// How the working copy was reset after staging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revert {
    /// The top checkpoint was restored over the working tree. It is popped
    /// unless some of its files failed to copy back.
    Checkpoint {
        id: u32,
        restored: usize,
        failed: usize,
    },
    /// The VCS discarded the local modification.
    Discarded,
    /// The VCS refused; the working copy still has the staged content.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub source: PathBuf,
    pub stored: PathBuf,
    /// False when the file was already listed and only its copy was refreshed.
    pub newly_listed: bool,
    pub revert: Revert,
}

impl<V: Vcs> Workspace<V> {
    /// Copies `file` into `commit`'s storage and resets the working copy.
    pub fn stage_file(
        &self,
        project: &mut Project,
        commit: &str,
        file: &Path,
    ) -> Result<StagedFile> {
        if !project.has_commit(commit) {
            return Err(Error::CommitNotFound(commit.to_string()));
        }

        let (stored, newly_listed) = self.store_file(project, commit, file)?;
        let revert = self.revert_working_copy(project, file);
        info!("Staged {:?} into {} ({:?})", file, commit, revert);

        Ok(StagedFile {
            source: file.to_path_buf(),
            stored,
            newly_listed,
            revert,
        })
    }

    /// Stages each file independently.
    ///
    /// Every file is copied aside before any working copy is reset, and a
    /// pending checkpoint is restored once for the whole batch.
    pub fn stage_files(
        &self,
        project: &mut Project,
        commit: &str,
        files: &[PathBuf],
    ) -> Result<Batch<StagedFile>> {
        if !project.has_commit(commit) {
            return Err(Error::CommitNotFound(commit.to_string()));
        }

        let stored: Vec<_> = files
            .iter()
            .map(|file| (file, self.store_file(project, commit, file)))
            .collect();

        let mut from_checkpoint: Option<Revert> = None;
        let mut batch = Batch::new();
        for (file, result) in stored {
            let (stored, newly_listed) = match result {
                Ok(stored) => stored,
                Err(e) => {
                    batch.record(file, Err(e));
                    continue;
                }
            };

            let revert = match from_checkpoint.clone() {
                Some(revert) => revert,
                None => {
                    let revert = self.revert_working_copy(project, file);
                    if matches!(revert, Revert::Checkpoint { .. }) {
                        from_checkpoint = Some(revert.clone());
                    }
                    revert
                }
            };
            info!("Staged {:?} into {} ({:?})", file, commit, revert);

            let staged = StagedFile {
                source: file.clone(),
                stored,
                newly_listed,
                revert,
            };
            batch.record(file, Ok(staged));
        }

        Ok(batch)
    }

    /// Deletes the staged copy of `file` and drops it from `commit`.
    ///
    /// Requires both the copy and the list entry; otherwise nothing changes.
    pub fn unstage_file(
        &self,
        project: &mut Project,
        commit: &str,
        file: &Path,
    ) -> Result<PathBuf> {
        let listed = project
            .commit(commit)
            .ok_or_else(|| Error::CommitNotFound(commit.to_string()))?
            .contains(file);

        let stored = self
            .layout()
            .staged_path(project, file)
            .map_err(|_| Error::NotStaged(file.display().to_string()))?;

        if !listed || !stored.is_file() {
            return Err(Error::NotStaged(file.display().to_string()));
        }

        fs::remove_file(&stored)?;
        if let Some(c) = project.commit_mut(commit) {
            c.remove_file(file);
        }

        if let Some(parent) = stored.parent() {
            prune_empty_dirs(parent, &self.layout().project_dir(project));
        }

        info!("Unstaged {:?} from {}", file, commit);
        Ok(stored)
    }

    pub fn unstage_files(
        &self,
        project: &mut Project,
        commit: &str,
        files: &[PathBuf],
    ) -> Result<Batch<PathBuf>> {
        if !project.has_commit(commit) {
            return Err(Error::CommitNotFound(commit.to_string()));
        }

        let mut batch = Batch::new();
        for file in files {
            batch.record(file, self.unstage_file(project, commit, file));
        }
        Ok(batch)
    }

    /// Copies `file` to its storage path and lists it in `commit`.
    /// Returns the stored path and whether the file was newly listed.
    fn store_file(
        &self,
        project: &mut Project,
        commit: &str,
        file: &Path,
    ) -> Result<(PathBuf, bool)> {
        if !file.is_file() {
            return Err(Error::FileNotFound(file.display().to_string()));
        }

        let stored = self.layout().staged_path(project, file)?;
        copy_file(file, &stored)?;

        let newly_listed = project
            .commit_mut(commit)
            .map(|c| c.add_file(file.to_path_buf()))
            .unwrap_or(false);

        Ok((stored, newly_listed))
    }

    /// With pending checkpoints the top one is restored over the working
    /// tree, so work captured there survives. Otherwise the VCS discards
    /// the modification of `file`.
    fn revert_working_copy(&self, project: &mut Project, file: &Path) -> Revert {
        if project.has_pending_checkpoints() {
            match self.restore_last_checkpoint(project) {
                Ok(Some(
                    Popped::Restored { id, files } | Popped::Incomplete { id, files },
                )) => {
                    return Revert::Checkpoint {
                        id,
                        restored: files.done.len(),
                        failed: files.failed.len(),
                    };
                }
                // Nothing to restore from; the VCS is the only way back.
                Ok(Some(Popped::Missing { .. })) | Ok(None) => {}
                Err(e) => {
                    warn!("Failed to restore checkpoint after staging {:?}: {}", file, e);
                    return Revert::Failed(e.to_string());
                }
            }
        }

        match self.vcs().discard(&project.file_path, file) {
            Ok(()) => Revert::Discarded,
            Err(e) => {
                warn!("Could not discard changes to {:?}: {}", file, e);
                Revert::Failed(e.to_string())
            }
        }
    }
}
