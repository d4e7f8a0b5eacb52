//! The external version-control system gitf delegates to.

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Operations gitf needs from the underlying VCS. Every call runs in the
/// project's working-tree root.
pub trait Vcs {
    /// Absolute paths of every file the VCS tracks.
    fn tracked_files(&self, root: &Path) -> Result<Vec<PathBuf>>;

    /// Reverts local modifications of `file` to its last committed state.
    fn discard(&self, root: &Path, file: &Path) -> Result<()>;

    fn current_branch(&self, root: &Path) -> Result<String>;

    /// Stashes local changes under `message`. Returns whether anything was stashed.
    fn stash_push(&self, root: &Path, message: &str) -> Result<bool>;

    fn stash_pop(&self, root: &Path) -> Result<()>;

    fn create_branch(&self, root: &Path, branch: &str) -> Result<()>;

    fn checkout(&self, root: &Path, branch: &str) -> Result<()>;

    fn add(&self, root: &Path, files: &[PathBuf]) -> Result<()>;

    fn commit(&self, root: &Path, args: &[String]) -> Result<()>;

    fn merge(&self, root: &Path, branch: &str) -> Result<()>;

    fn delete_branch(&self, root: &Path, branch: &str) -> Result<()>;
}

/// [`Vcs`] backed by the `git` executable on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct Git;

impl Git {
    pub fn new() -> Self {
        Self
    }

    fn run<I, S>(&self, root: &Path, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        let command = args
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");

        debug!("Running git {} in {:?}", command, root);

        let output = Command::new("git").args(&args).current_dir(root).output()?;

        if !output.status.success() {
            return Err(Error::Vcs {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Vcs for Git {
    fn tracked_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let output = self.run(root, ["ls-files", "-z"])?;
        Ok(output
            .split('\0')
            .filter(|line| !line.is_empty())
            .map(|line| root.join(line))
            .collect())
    }

    fn discard(&self, root: &Path, file: &Path) -> Result<()> {
        self.run(root, [OsStr::new("restore"), OsStr::new("--"), file.as_os_str()])?;
        Ok(())
    }

    fn current_branch(&self, root: &Path) -> Result<String> {
        let output = self.run(root, ["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(output.trim().to_string())
    }

    fn stash_push(&self, root: &Path, message: &str) -> Result<bool> {
        let before = self.run(root, ["stash", "list"])?.lines().count();
        self.run(root, ["stash", "push", "-m", message])?;
        let list = self.run(root, ["stash", "list"])?;
        // A clean tree makes push a no-op, so the list does not grow.
        Ok(list.lines().count() > before && list.lines().any(|l| l.ends_with(message)))
    }

    fn stash_pop(&self, root: &Path) -> Result<()> {
        self.run(root, ["stash", "pop"])?;
        Ok(())
    }

    fn create_branch(&self, root: &Path, branch: &str) -> Result<()> {
        self.run(root, ["checkout", "-b", branch])?;
        Ok(())
    }

    fn checkout(&self, root: &Path, branch: &str) -> Result<()> {
        self.run(root, ["checkout", branch])?;
        Ok(())
    }

    fn add(&self, root: &Path, files: &[PathBuf]) -> Result<()> {
        let mut args = vec![OsStr::new("add"), OsStr::new("--")];
        args.extend(files.iter().map(|f| f.as_os_str()));
        self.run(root, args)?;
        Ok(())
    }

    fn commit(&self, root: &Path, args: &[String]) -> Result<()> {
        let mut full = vec!["commit".to_string()];
        full.extend(args.iter().cloned());
        self.run(root, full)?;
        Ok(())
    }

    fn merge(&self, root: &Path, branch: &str) -> Result<()> {
        self.run(root, ["merge", branch])?;
        Ok(())
    }

    fn delete_branch(&self, root: &Path, branch: &str) -> Result<()> {
        self.run(root, ["branch", "-d", branch])?;
        Ok(())
    }
}
