//! Turning command-line file arguments into absolute paths.

use crate::binary::is_binary_file;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};
use walkdir::WalkDir;

/// Expands file arguments relative to `cwd`.
///
/// * a directory yields every file below it, skipping `.git` and binaries;
/// * an argument containing `*`, `?` or `[` that does not name an existing
///   file is a glob (`**` recurses);
/// * anything else is taken as a single file, whether or not it exists.
///
/// Paths come back absolute, deduplicated, in argument order.
pub fn expand_file_args<S: AsRef<str>>(cwd: &Path, args: &[S]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut push = |path: PathBuf| {
        let path = resolve(&path);
        if seen.insert(path.clone()) {
            files.push(path);
        }
    };

    for arg in args {
        let arg = arg.as_ref();
        if arg.is_empty() {
            continue;
        }

        let path = cwd.join(arg);
        if path.is_dir() {
            walk_dir(&path).for_each(&mut push);
        } else if is_pattern(arg) && !path.exists() {
            glob_files(cwd, arg)?.into_iter().for_each(&mut push);
        } else {
            push(path);
        }
    }

    Ok(files)
}

fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

fn walk_dir(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && !is_binary_file(e.path()))
        .map(|e| e.into_path())
}

fn glob_files(cwd: &Path, arg: &str) -> Result<Vec<PathBuf>> {
    let pattern = if Path::new(arg).is_absolute() {
        arg.to_string()
    } else {
        format!(
            "{}{}{}",
            glob::Pattern::escape(&cwd.to_string_lossy()),
            MAIN_SEPARATOR,
            arg
        )
    };

    let entries = glob::glob(&pattern).map_err(|e| Error::InvalidPattern {
        pattern: arg.to_string(),
        reason: e.msg.to_string(),
    })?;

    Ok(entries
        .filter_map(|e| e.ok())
        .filter(|p| p.is_file() && !is_binary_file(p))
        .collect())
}

/// Canonicalizes the parent directory so paths line up with the
/// canonical project root, leaving the file name (and symlinks) alone.
fn resolve(path: &Path) -> PathBuf {
    let path = normalize(path);
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent)
            .map(|parent| parent.join(name))
            .unwrap_or_else(|_| path.clone()),
        _ => path,
    }
}

/// Lexically removes `.` and resolves `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
