use crate::error::{Error, Result};
use crate::models::Database;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// The database file, read whole and rewritten whole.
pub struct Storage {
    db_path: PathBuf,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Loads the database, or an empty one if nothing has been saved yet.
    pub fn load(&self) -> Result<Database> {
        if !self.db_path.exists() {
            debug!("No database at {:?}, starting empty", self.db_path);
            return Ok(Database::new());
        }

        let data = fs::read_to_string(&self.db_path)?;
        let db = serde_json::from_str(&data)?;
        Ok(db)
    }

    /// Writes the database through a temp file in the same directory and
    /// renames it into place, so a crash never leaves a half-written file.
    pub fn save(&self, db: &Database) -> Result<()> {
        let dir = self.db_path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(db)?;
        let persist_err = |source: std::io::Error| Error::Persist {
            path: self.db_path.clone(),
            source,
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(persist_err)?;
        temp.write_all(json.as_bytes()).map_err(persist_err)?;
        temp.flush().map_err(persist_err)?;
        temp.persist(&self.db_path)
            .map_err(|e| persist_err(e.error))?;

        debug!("Saved database to {:?}", self.db_path);
        Ok(())
    }
}
