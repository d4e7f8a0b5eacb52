use crate::error::{Error, Result};
use crate::models::{validate_commit_name, Commit, Project};
use crate::staging::StagedFile;
use crate::vcs::Vcs;
use crate::workspace::{Batch, Workspace};
use std::path::PathBuf;
use tracing::info;

impl<V: Vcs> Workspace<V> {
    /// Registers a new commit and stages `files` into it.
    ///
    /// A taken name fails before anything is touched. Individual files
    /// that fail to stage are reported and the commit is kept regardless.
    pub fn create_commit(
        &self,
        project: &mut Project,
        name: &str,
        files: &[PathBuf],
    ) -> Result<Batch<StagedFile>> {
        validate_commit_name(name)?;
        if project.has_commit(name) {
            return Err(Error::CommitExists(name.to_string()));
        }

        project.commits.push(Commit::new(name));
        let batch = self.stage_files(project, name, files)?;

        info!(
            "Created commit {} in {} with {} staged file(s)",
            name,
            project.name,
            batch.done.len()
        );
        Ok(batch)
    }

    /// Unstages every file of `name` and removes the commit.
    ///
    /// Files that cannot be unstaged are reported but do not keep the
    /// commit alive. Confirmation is up to the caller.
    pub fn delete_commit(&self, project: &mut Project, name: &str) -> Result<Batch<PathBuf>> {
        let files = project
            .commit(name)
            .ok_or_else(|| Error::CommitNotFound(name.to_string()))?
            .files()
            .to_vec();

        let batch = self.unstage_files(project, name, &files)?;
        project.commits.retain(|c| c.name != name);

        info!("Deleted commit {} from {}", name, project.name);
        Ok(batch)
    }
}
