use crate::error::AppResult;
use crate::tools::{is_mp3, mp3_file_name};
use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// MP3 files directly inside `dir`, sorted by name.
pub fn list_mp3_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() && is_mp3(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed(PathBuf),
    Unchanged,
    TargetExists(PathBuf),
}

/// Rename `file` within its directory. `.mp3` is appended when missing and
/// an existing different file is never replaced.
pub fn rename_in_place(file: &Path, new_name: &str) -> AppResult<RenameOutcome> {
    let Some(name) = mp3_file_name(new_name) else {
        return Ok(RenameOutcome::Unchanged);
    };
    let target = file.parent().unwrap_or_else(|| Path::new("")).join(name);

    if target == file {
        return Ok(RenameOutcome::Unchanged);
    }
    if target.exists() {
        return Ok(RenameOutcome::TargetExists(target));
    }

    fs::rename(file, &target)?;
    info!("Renamed {} to {}", file.display(), target.display());
    Ok(RenameOutcome::Renamed(target))
}
