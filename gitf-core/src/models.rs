use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A named group of files staged for one eventual git commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub name: String,
    files: Vec<PathBuf>,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
}

impl Commit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
            created: Utc::now(),
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn contains(&self, file: &Path) -> bool {
        self.files.iter().any(|f| f == file)
    }

    /// Appends `file` unless it is already listed. Returns whether it was added.
    pub fn add_file(&mut self, file: PathBuf) -> bool {
        if self.contains(&file) {
            return false;
        }
        self.files.push(file);
        true
    }

    /// Removes `file` from the list. Returns whether it was listed.
    pub fn remove_file(&mut self, file: &Path) -> bool {
        match self.files.iter().position(|f| f == file) {
            Some(index) => {
                self.files.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Summary row produced by [`Project::list_commits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary<'a> {
    pub name: &'a str,
    pub file_count: usize,
    pub created: DateTime<Utc>,
}

/// A working directory registered with gitf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub file_path: PathBuf,
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub checkpoints: Vec<u32>,
}

impl Project {
    pub fn new(name: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
            commits: Vec::new(),
            checkpoints: Vec::new(),
        }
    }

    pub fn commit(&self, name: &str) -> Option<&Commit> {
        self.commits.iter().find(|c| c.name == name)
    }

    pub fn commit_mut(&mut self, name: &str) -> Option<&mut Commit> {
        self.commits.iter_mut().find(|c| c.name == name)
    }

    pub fn has_commit(&self, name: &str) -> bool {
        self.commit(name).is_some()
    }

    /// Commits in creation order as `(name, file count)` rows.
    ///
    /// The iterator borrows the project and can be cloned to restart it.
    pub fn list_commits(&self) -> impl Iterator<Item = CommitSummary<'_>> + Clone {
        self.commits.iter().map(|c| CommitSummary {
            name: &c.name,
            file_count: c.files.len(),
            created: c.created,
        })
    }

    /// ID of the most recent checkpoint, if any.
    pub fn top_checkpoint(&self) -> Option<u32> {
        self.checkpoints.last().copied()
    }

    pub fn has_pending_checkpoints(&self) -> bool {
        !self.checkpoints.is_empty()
    }
}

/// Every project gitf knows about. Persisted as a single document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project bound exactly to `dir`.
    pub fn find_project(&self, dir: &Path) -> Option<&Project> {
        self.projects.iter().find(|p| p.file_path == dir)
    }

    pub fn find_project_mut(&mut self, dir: &Path) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.file_path == dir)
    }

    /// Registers a new project rooted at `dir`.
    ///
    /// Fails if `dir` is already bound or `name` is taken. The storage
    /// directory is created by the caller through the storage layout.
    pub fn add_project(&mut self, name: &str, dir: PathBuf) -> Result<&mut Project> {
        validate_project_name(name)?;

        if self.find_project(&dir).is_some() {
            return Err(Error::ProjectExists(dir.display().to_string()));
        }
        if self.projects.iter().any(|p| p.name == name) {
            return Err(Error::ProjectExists(format!("name '{}'", name)));
        }

        self.projects.push(Project::new(name, dir));
        let index = self.projects.len() - 1;
        Ok(&mut self.projects[index])
    }
}

fn validate_project_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(Error::InvalidName(format!("'{}' is not a project name", name)));
    }
    if name.contains(['/', '\\']) {
        return Err(Error::InvalidName(format!(
            "project name '{}' must not contain path separators",
            name
        )));
    }
    Ok(())
}

/// Commit names become git branch names (`gitf-<name>`).
pub(crate) fn validate_commit_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName("commit name is empty".to_string()));
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::InvalidName(format!(
            "commit name '{}' must not contain whitespace",
            name
        )));
    }
    if name.starts_with('-')
        || name.contains("..")
        || name.contains(['~', '^', ':', '?', '*', '[', '\\'])
    {
        return Err(Error::InvalidName(format!(
            "commit name '{}' is not a valid branch name",
            name
        )));
    }
    Ok(())
}
