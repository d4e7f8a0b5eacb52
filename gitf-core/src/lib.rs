//! # gitf-core
//!
//! Core library for gitf - staged commits and checkpoints on top of git.
//!
//! A project is a git working tree registered in a per-user database. Files
//! staged into a named commit are copied into private storage and the
//! working copy is reverted, so several commits can be prepared side by
//! side and finalized into git one at a time. Checkpoints snapshot the
//! tracked files and are restored in LIFO order.

pub mod binary;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod expand;
pub mod finalize;
pub mod models;
pub mod paths;
pub mod registry;
pub mod staging;
pub mod storage;
pub mod vcs;
pub mod workspace;

pub use binary::is_binary_file;
pub use checkpoint::{CheckpointCreated, CheckpointSummary, Popped};
pub use config::Config;
pub use error::{Error, Result};
pub use expand::expand_file_args;
pub use finalize::Finalized;
pub use models::{Commit, CommitSummary, Database, Project};
pub use paths::StorageLayout;
pub use staging::{Revert, StagedFile};
pub use storage::Storage;
pub use vcs::{Git, Vcs};
pub use workspace::{Batch, Workspace};
