// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Commit-history queries using the shell backend.
//!
//! ```text
//! history.rs --> ShellBackend --> git log --after <date> --name-only --no-merges
//! ```

use chrono::NaiveDate;
use std::path::Path;

use crate::error::ReleaseResult;

use super::backend::{ChangeFilter, GitHistory, ShellBackend};

/// Formats a cutoff date the way `git log --after` expects it.
#[must_use]
pub fn format_since(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Paths touched by non-merge commits after `since`, limited to `dirs`.
///
/// # Errors
///
/// Returns a `GitError` if `git log` fails.
pub fn changed_paths(repo: &Path, since: NaiveDate, dirs: &[&str]) -> ReleaseResult<Vec<String>> {
    ShellBackend::changed_paths(repo, &format_since(since), dirs, ChangeFilter::All)
}

/// Paths deleted by non-merge commits after `since`, limited to `dirs`.
///
/// # Errors
///
/// Returns a `GitError` if `git log` fails.
pub fn deleted_paths(repo: &Path, since: NaiveDate, dirs: &[&str]) -> ReleaseResult<Vec<String>> {
    ShellBackend::changed_paths(repo, &format_since(since), dirs, ChangeFilter::Deleted)
}
