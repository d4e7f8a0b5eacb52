//! Turning a staged commit into a real git commit.

use crate::error::{Error, Result};
use crate::models::Project;
use crate::vcs::Vcs;
use crate::workspace::{copy_file, prune_empty_dirs, Workspace};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalized {
    /// Branch the commit was merged into.
    pub branch: String,
    pub files: Vec<PathBuf>,
    /// Whether unrelated local changes were stashed and popped again.
    pub stashed: bool,
}

impl<V: Vcs> Workspace<V> {
    /// Commits the staged copies of `name` on a temporary `gitf-<name>`
    /// branch and merges it into the current branch.
    ///
    /// Other local changes are stashed for the duration. `git_args` go to
    /// `git commit` verbatim; without them a default message is used. Any
    /// git failure stops the sequence and keeps the staged commit so it
    /// can be retried.
    pub fn finalize_commit(
        &self,
        project: &mut Project,
        name: &str,
        git_args: &[String],
    ) -> Result<Finalized> {
        let commit = project
            .commit(name)
            .ok_or_else(|| Error::CommitNotFound(name.to_string()))?;
        if commit.files().is_empty() {
            return Err(Error::EmptyCommit(name.to_string()));
        }

        let mut staged = Vec::with_capacity(commit.files().len());
        for file in commit.files() {
            let stored = self.layout().staged_path(project, file)?;
            if !stored.is_file() {
                return Err(Error::NotStaged(file.display().to_string()));
            }
            staged.push((file.clone(), stored));
        }
        let files: Vec<PathBuf> = staged.iter().map(|(file, _)| file.clone()).collect();

        let root = project.file_path.clone();
        let vcs = self.vcs();
        let temp_branch = format!("gitf-{}", name);

        let branch = vcs.current_branch(&root)?;
        let stashed = vcs.stash_push(&root, &temp_branch)?;

        for (file, stored) in &staged {
            copy_file(stored, file)?;
        }

        vcs.create_branch(&root, &temp_branch)?;
        vcs.add(&root, &files)?;
        if git_args.is_empty() {
            vcs.commit(&root, &["-m".to_string(), format!("gitf: {}", name)])?;
        } else {
            vcs.commit(&root, git_args)?;
        }
        vcs.checkout(&root, &branch)?;
        if stashed {
            vcs.stash_pop(&root)?;
        }
        vcs.merge(&root, &temp_branch)?;
        vcs.delete_branch(&root, &temp_branch)?;

        let project_dir = self.layout().project_dir(project);
        for (_, stored) in &staged {
            if let Err(e) = fs::remove_file(stored) {
                warn!("Failed to remove staged copy {:?}: {}", stored, e);
            }
            if let Some(parent) = stored.parent() {
                prune_empty_dirs(parent, &project_dir);
            }
        }
        project.commits.retain(|c| c.name != name);

        info!("Finalized {} into {} ({} file(s))", name, branch, files.len());
        Ok(Finalized {
            branch,
            files,
            stashed,
        })
    }
}
