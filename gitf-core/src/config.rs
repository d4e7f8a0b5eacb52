//! Locating gitf's storage root.
//!
//! The storage root holds the database and one directory per project:
//!
//! ```text
//! <storage_root>/
//! ├── db.json
//! └── <project>/
//!     ├── <staged files, by path relative to the project root>
//!     └── checkpoints/
//!         └── <id>/...
//! ```

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding the storage root.
pub const STORAGE_DIR_ENV: &str = "GITF_STORAGE_DIR";

const APP_DIR: &str = "gitf";
const DATABASE_FILE: &str = "db.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    storage_root: PathBuf,
}

impl Config {
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
        }
    }

    /// Uses `override_root` if given, then `GITF_STORAGE_DIR`, then the
    /// platform's local data directory.
    pub fn resolve(override_root: Option<PathBuf>) -> Result<Self> {
        if let Some(root) = override_root {
            return Ok(Self::new(root));
        }

        if let Some(root) = std::env::var_os(STORAGE_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(root));
        }

        dirs::data_local_dir()
            .map(|dir| Self::new(dir.join(APP_DIR)))
            .ok_or(Error::NoDataDir)
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn database_path(&self) -> PathBuf {
        self.storage_root.join(DATABASE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_root_wins() {
        let config = Config::resolve(Some(PathBuf::from("/tmp/gitf-test"))).unwrap();

        assert_eq!(config.storage_root(), Path::new("/tmp/gitf-test"));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/gitf-test/db.json"));
    }
}
