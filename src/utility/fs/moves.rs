// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::error::{FsError, ReleaseResult};

/// Moves a file, replacing `dst` if it exists.
///
/// Falls back to copy + remove when a rename is not possible (e.g. across volumes).
///
/// # Errors
///
/// Returns `FsError::NotFound` if `src` does not exist, or `FsError::IoError`
/// if both the rename and the copy fail.
pub async fn move_file(src: &Path, dst: &Path) -> ReleaseResult<()> {
    if !fs::try_exists(src).await.unwrap_or(false) {
        return Err(FsError::NotFound(src.display().to_string()).into());
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!(
                src = %src.display(),
                dst = %dst.display(),
                error = %rename_err,
                "rename failed, copying instead"
            );
            fs::copy(src, dst).await.map_err(|e| FsError::io(dst, e))?;
            fs::remove_file(src).await.map_err(|e| FsError::io(src, e))?;
            Ok(())
        }
    }
}

/// Lists regular files directly inside `dir` whose extension matches `ext`
/// (case-insensitive), sorted by path.
///
/// # Errors
///
/// Returns `FsError::IoError` if the directory cannot be read.
pub async fn files_with_extension(dir: &Path, ext: &str) -> ReleaseResult<Vec<std::path::PathBuf>> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| FsError::io(dir, e))?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(|e| FsError::io(dir, e))? {
        let path = entry.path();
        let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
        let matches = path
            .extension()
            .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext));
        if is_file && matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
