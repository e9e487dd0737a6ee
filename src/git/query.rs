// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git query operations using gix backend.
//!
//! ```text
//! query.rs --> GixBackend --> .git/ (no subprocess)
//! ```

use crate::error::ReleaseResult;
use std::path::{Path, PathBuf};

use super::backend::{GitQuery, GixBackend};

/// Get the root of the work tree containing `path`.
///
/// # Errors
///
/// Returns a `GitError` if no repository with a work tree is found.
pub fn work_tree(path: &Path) -> ReleaseResult<PathBuf> {
    GixBackend::work_tree(path)
}

/// Get current branch name (None if HEAD is detached).
///
/// # Errors
///
/// Returns a `GitError` if repository discovery or head resolution fails.
pub fn current_branch(path: &Path) -> ReleaseResult<Option<String>> {
    GixBackend::current_branch(path)
}

/// Get the abbreviated HEAD commit id.
///
/// # Errors
///
/// Returns a `GitError` if discovery fails or the repository has no commits.
pub fn head_id(path: &Path) -> ReleaseResult<String> {
    GixBackend::head_id(path)
}

/// Describes the checked-out revision as `branch@id`, `detached@id` or `unknown`.
#[must_use]
pub fn describe_head(path: &Path) -> String {
    let Ok(id) = head_id(path) else {
        return "unknown".to_string();
    };
    match current_branch(path) {
        Ok(Some(branch)) => format!("{branch}@{id}"),
        _ => format!("detached@{id}"),
    }
}
