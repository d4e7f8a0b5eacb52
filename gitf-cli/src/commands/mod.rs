pub mod checkpoint;
pub mod commit;
pub mod create;
pub mod delete;
pub mod init;
pub mod list;
pub mod stage;
pub mod unstage;

use anyhow::{Context as _, Result};
use colored::Colorize;
use gitf_core::{Config, Database, Error, Git, Project, Storage, StorageLayout, Workspace};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Everything a command needs: the loaded database, the engine and the
/// canonical current directory used to look up the project.
pub struct Context {
    pub storage: Storage,
    pub db: Database,
    pub workspace: Workspace<Git>,
    pub cwd: PathBuf,
}

impl Context {
    pub fn load(storage_dir: Option<PathBuf>) -> Result<Self> {
        let config = Config::resolve(storage_dir)?;
        let storage = Storage::new(config.database_path());
        let db = storage
            .load()
            .with_context(|| format!("Failed to load {}", storage.path().display()))?;
        let cwd = fs::canonicalize(std::env::current_dir()?)
            .context("Failed to resolve the current directory")?;
        debug!("Using database {:?} from {:?}", storage.path(), cwd);

        let workspace = Workspace::new(StorageLayout::new(config.storage_root()), Git::new());

        Ok(Self {
            storage,
            db,
            workspace,
            cwd,
        })
    }

    pub fn project(&self) -> Result<&Project> {
        self.db
            .find_project(&self.cwd)
            .ok_or_else(|| self.not_found().into())
    }

    /// Runs `f` against the current project and saves the database, even
    /// when `f` fails part way through a batch.
    pub fn with_project<T>(
        &mut self,
        f: impl FnOnce(&Workspace<Git>, &mut Project) -> gitf_core::Result<T>,
    ) -> Result<T> {
        let not_found = self.not_found();
        let project = self.db.find_project_mut(&self.cwd).ok_or(not_found)?;
        let out = f(&self.workspace, project);
        self.save()?;
        Ok(out?)
    }

    pub fn save(&self) -> Result<()> {
        self.storage
            .save(&self.db)
            .with_context(|| format!("Failed to save {}", self.storage.path().display()))
    }

    fn not_found(&self) -> Error {
        Error::ProjectNotFound(self.cwd.display().to_string())
    }
}

/// Prints the per-file failures of a batch, returning how many there were.
pub fn report_failures(failed: &[(PathBuf, Error)]) -> usize {
    for (path, error) in failed {
        eprintln!("  {} {}: {}", "✗".red(), path.display(), error);
    }
    failed.len()
}
