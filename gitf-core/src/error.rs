use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write database {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No gitf project registered for {0}")]
    ProjectNotFound(String),

    #[error("A project is already registered for {0}")]
    ProjectExists(String),

    #[error("No commit called '{0}'")]
    CommitNotFound(String),

    #[error("Cannot create commit with name '{0}', a commit with that name already exists")]
    CommitExists(String),

    #[error("Commit '{0}' has no staged files")]
    EmptyCommit(String),

    #[error("Cannot stage file {0} because it doesn't exist")]
    FileNotFound(String),

    #[error("Cannot unstage file {0} because it wasn't previously staged")]
    NotStaged(String),

    #[error("{path} is not inside project root {root}")]
    OutsideProject { path: PathBuf, root: PathBuf },

    #[error("Failed to create checkpoint, directory {0} already exists")]
    CheckpointExists(String),

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("git {command} failed: {stderr}")]
    Vcs { command: String, stderr: String },

    #[error("Cannot determine the local data directory")]
    NoDataDir,

    #[error("Invalid name: {0}")]
    InvalidName(String),
}
