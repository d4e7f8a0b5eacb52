use crate::error::{Error, Result};
use crate::models::{Database, Project};
use crate::paths::StorageLayout;
use crate::vcs::Vcs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The staging and checkpoint engine.
///
/// Owns the storage layout and the VCS; projects and their commits are
/// passed into each operation.
pub struct Workspace<V> {
    layout: StorageLayout,
    vcs: V,
}

impl<V: Vcs> Workspace<V> {
    pub fn new(layout: StorageLayout, vcs: V) -> Self {
        Self { layout, vcs }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    /// Registers `dir` as a project and creates its storage directory.
    pub fn init_project<'db>(
        &self,
        db: &'db mut Database,
        name: &str,
        dir: PathBuf,
    ) -> Result<&'db mut Project> {
        let project = db.add_project(name, dir)?;
        let storage = self.layout.project_dir(project);
        fs::create_dir_all(&storage)?;

        info!(
            "Initialized project {} at {:?} (storage {:?})",
            project.name, project.file_path, storage
        );
        Ok(project)
    }
}

/// Outcome of a per-file batch. One file failing never stops the others.
#[derive(Debug)]
pub struct Batch<T> {
    pub done: Vec<T>,
    pub failed: Vec<(PathBuf, Error)>,
}

impl<T> Batch<T> {
    pub fn new() -> Self {
        Self {
            done: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn record(&mut self, path: &Path, result: Result<T>) {
        match result {
            Ok(value) => self.done.push(value),
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                self.failed.push((path.to_path_buf(), e));
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies `from` over `to`, creating `to`'s parent directories.
pub(crate) fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    debug!("Copied {:?} -> {:?}", from, to);
    Ok(())
}

/// Removes empty directories from `start` upwards, stopping below `stop`.
pub(crate) fn prune_empty_dirs(start: &Path, stop: &Path) {
    let mut dir = Some(start);
    while let Some(current) = dir {
        if current == stop || !current.starts_with(stop) {
            break;
        }
        // Fails on non-empty directories, which ends the walk.
        if fs::remove_dir(current).is_err() {
            break;
        }
        dir = current.parent();
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::vcs::testing::FakeVcs;
    use tempfile::TempDir;

    /// A project root and a storage root in separate temp directories.
    pub struct Fixture {
        pub tree: TempDir,
        pub storage: TempDir,
        pub workspace: Workspace<FakeVcs>,
        pub project: Project,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self::with_vcs(FakeVcs::new())
        }

        pub fn with_vcs(vcs: FakeVcs) -> Self {
            let tree = TempDir::new().unwrap();
            let storage = TempDir::new().unwrap();
            let workspace = Workspace::new(StorageLayout::new(storage.path()), vcs);
            let project = Project::new("proj", tree.path());
            Self {
                tree,
                storage,
                workspace,
                project,
            }
        }

        /// Writes `contents` to `relative` inside the project tree.
        pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
            let path = self.tree.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, contents).unwrap();
            path
        }

        pub fn read(&self, relative: &str) -> String {
            fs::read_to_string(self.tree.path().join(relative)).unwrap()
        }

        pub fn storage_path(&self, relative: &str) -> PathBuf {
            self.storage.path().join("proj").join(relative)
        }
    }
}
