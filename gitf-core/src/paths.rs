use crate::error::{Error, Result};
use crate::models::Project;
use std::path::{Path, PathBuf};

const CHECKPOINTS_DIR: &str = "checkpoints";

/// Maps working-tree files to their copies under the storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_dir(&self, project: &Project) -> PathBuf {
        self.root.join(&project.name)
    }

    pub fn checkpoints_dir(&self, project: &Project) -> PathBuf {
        self.project_dir(project).join(CHECKPOINTS_DIR)
    }

    pub fn checkpoint_dir(&self, project: &Project, id: u32) -> PathBuf {
        self.checkpoints_dir(project).join(id.to_string())
    }

    /// Where a staged copy of `file` lives.
    pub fn staged_path(&self, project: &Project, file: &Path) -> Result<PathBuf> {
        let relative = relative_to_project(project, file)?;
        Ok(self.project_dir(project).join(relative))
    }

    /// Where `file` is copied inside checkpoint `id`.
    pub fn checkpoint_path(&self, project: &Project, id: u32, file: &Path) -> Result<PathBuf> {
        let relative = relative_to_project(project, file)?;
        Ok(self.checkpoint_dir(project, id).join(relative))
    }
}

/// `file` relative to the project root.
///
/// Files outside the root, the root itself and paths that climb out with
/// `..` cannot be stored.
pub fn relative_to_project<'a>(project: &Project, file: &'a Path) -> Result<&'a Path> {
    let outside = || Error::OutsideProject {
        path: file.to_path_buf(),
        root: project.file_path.clone(),
    };

    let relative = file.strip_prefix(&project.file_path).map_err(|_| outside())?;

    let escapes = relative
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_)));
    if relative.as_os_str().is_empty() || escapes {
        return Err(outside());
    }

    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project::new("proj", "/repo")
    }

    #[test]
    fn test_staged_path_preserves_relative_structure() {
        let layout = StorageLayout::new("/data/gitf");

        assert_eq!(
            layout.staged_path(&project(), Path::new("/repo/a.txt")).unwrap(),
            PathBuf::from("/data/gitf/proj/a.txt")
        );
        assert_eq!(
            layout
                .staged_path(&project(), Path::new("/repo/src/lib/mod.rs"))
                .unwrap(),
            PathBuf::from("/data/gitf/proj/src/lib/mod.rs")
        );
    }

    #[test]
    fn test_checkpoint_path() {
        let layout = StorageLayout::new("/data/gitf");

        assert_eq!(
            layout
                .checkpoint_path(&project(), 3, Path::new("/repo/src/main.rs"))
                .unwrap(),
            PathBuf::from("/data/gitf/proj/checkpoints/3/src/main.rs")
        );
    }

    #[test]
    fn test_path_outside_project_is_rejected() {
        let layout = StorageLayout::new("/data/gitf");

        let err = layout
            .staged_path(&project(), Path::new("/elsewhere/a.txt"))
            .unwrap_err();
        assert!(matches!(err, Error::OutsideProject { .. }));

        assert!(layout.staged_path(&project(), Path::new("/repo")).is_err());
        assert!(layout
            .staged_path(&project(), Path::new("/repo/../etc/passwd"))
            .is_err());
    }

    #[test]
    fn test_sibling_with_common_prefix_is_outside() {
        let layout = StorageLayout::new("/data/gitf");

        assert!(layout
            .staged_path(&project(), Path::new("/repo-other/a.txt"))
            .is_err());
    }
}
