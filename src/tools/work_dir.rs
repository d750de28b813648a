//! Per-run scratch directory, removed when dropped

use crate::tools::ensure_directory_exists;
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

pub struct WorkDir {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl WorkDir {
    /// Create a fresh directory under `root` (created if needed).
    pub fn create(root: &Path) -> Result<Self> {
        ensure_directory_exists(root)?;
        let dir = tempfile::Builder::new()
            .prefix("run-")
            .tempdir_in(root)
            .with_context(|| format!("Failed to create work directory in {}", root.display()))?;
        let path = dir.path().to_path_buf();
        info!("Work directory: {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A not-yet-existing file name inside the work directory.
    #[must_use]
    pub fn unique_file(&self, prefix: &str, extension: &str) -> PathBuf {
        self.path
            .join(format!("{prefix}_{}.{extension}", Uuid::new_v4().simple()))
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match dir.close() {
            Ok(()) => info!("Temporary directory cleared: {}", self.path.display()),
            Err(e) => warn!("Failed to clear {}: {e}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_work_dir_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let work = WorkDir::create(root.path()).unwrap();
            fs::write(work.path().join("partial.mp3"), b"data").unwrap();
            fs::create_dir(work.path().join("nested")).unwrap();
            work.path().to_path_buf()
        };
        assert!(!path.exists());
        assert!(root.path().exists());
    }

    #[test]
    fn test_work_dirs_are_fresh() {
        let root = tempfile::tempdir().unwrap();
        let a = WorkDir::create(root.path()).unwrap();
        let b = WorkDir::create(root.path()).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_unique_file_names() {
        let root = tempfile::tempdir().unwrap();
        let work = WorkDir::create(root.path()).unwrap();
        let first = work.unique_file("frame", "jpg");
        let second = work.unique_file("frame", "jpg");
        assert_ne!(first, second);
        assert!(first.starts_with(work.path()));
        assert_eq!(first.extension().and_then(|e| e.to_str()), Some("jpg"));
    }
}
