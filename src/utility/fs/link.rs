// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Directory links between the repository and the staging area.
//!
//! ```text
//! create_dir_link(src, dst)
//!   Windows: mklink /J dst src  --(fails)-->  symlink_dir(src, dst)
//!   other:   symlink(src, dst)
//!
//! remove_entry(path)
//!   link --> unlink (target untouched)
//!   dir  --> remove_dir_all
//!   file --> remove_file
//! ```

use std::path::Path;
use tokio::fs;

use crate::error::{FsError, ReleaseResult};

/// How a directory link was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// NTFS directory junction.
    Junction,
    /// Directory symbolic link.
    Symlink,
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Junction => f.write_str("junction"),
            Self::Symlink => f.write_str("symlink"),
        }
    }
}

/// Returns true if `path` itself is a symlink or junction (not followed).
#[must_use]
pub fn is_link(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
}

/// Creates a directory link at `dst` pointing to `src`.
///
/// # Errors
///
/// Returns `FsError::LinkFailed` if no link method succeeds.
pub async fn create_dir_link(src: &Path, dst: &Path) -> ReleaseResult<LinkKind> {
    #[cfg(windows)]
    {
        use crate::core::process::builder::ProcessBuilder;

        let junction = ProcessBuilder::new("cmd")
            .args(["/c", "mklink", "/J"])
            .arg(dst)
            .arg(src)
            .name("mklink")
            .quiet()
            .run()
            .await;
        match junction {
            Ok(_) => return Ok(LinkKind::Junction),
            Err(e) => {
                tracing::debug!(dst = %dst.display(), error = %e, "junction failed, trying symlink");
            }
        }

        std::os::windows::fs::symlink_dir(src, dst).map_err(|e| link_failed(src, dst, &e))?;
        Ok(LinkKind::Symlink)
    }

    #[cfg(not(windows))]
    {
        fs::symlink(src, dst)
            .await
            .map_err(|e| link_failed(src, dst, &e))?;
        Ok(LinkKind::Symlink)
    }
}

fn link_failed(src: &Path, dst: &Path, error: &std::io::Error) -> FsError {
    FsError::LinkFailed {
        src: src.display().to_string(),
        dst: dst.display().to_string(),
        message: error.to_string(),
    }
}

/// Removes a link without touching its target.
///
/// # Errors
///
/// Returns `FsError::IoError` if the link cannot be removed.
pub async fn remove_link(path: &Path) -> ReleaseResult<()> {
    // Directory links are directories to the Windows API.
    #[cfg(windows)]
    let removed = fs::remove_dir(path).await;
    #[cfg(not(windows))]
    let removed = fs::remove_file(path).await;

    removed.map_err(|e| FsError::io(path, e))?;
    Ok(())
}

/// Removes a staging entry of any kind. Links are unlinked, never followed.
///
/// # Errors
///
/// Returns `FsError::IoError` if the entry cannot be inspected or removed.
pub async fn remove_entry(path: &Path) -> ReleaseResult<()> {
    let meta = fs::symlink_metadata(path)
        .await
        .map_err(|e| FsError::io(path, e))?;

    if meta.file_type().is_symlink() {
        remove_link(path).await
    } else if meta.is_dir() {
        fs::remove_dir_all(path)
            .await
            .map_err(|e| FsError::io(path, e))?;
        Ok(())
    } else {
        fs::remove_file(path)
            .await
            .map_err(|e| FsError::io(path, e))?;
        Ok(())
    }
}
