// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Change detection from version-control history.
//!
//! ```text
//! git log --after <since> --name-only --no-merges -- <categories>
//!        |
//!        v
//! "addons core/foo/config.cpp"
//!   category = "addons core"  folder = "foo"
//!        |
//!        v
//! exclude (case-insensitive glob) --> BTreeSet<ChangedFolder>
//!
//! track_deletions:
//!   git log ... --diff-filter=D  --> source dir gone? --> deleted
//! ```

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use super::tools::ToolContext;
use crate::config::types::CategoryConfig;
use crate::error::Result;
use crate::git::history::{changed_paths, deleted_paths};
use crate::git::query::work_tree;

/// An addon folder touched inside the lookback window.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ChangedFolder {
    /// Top-level repository directory (e.g. `addons core`).
    pub category: String,
    /// Addon folder name inside the category.
    pub folder: String,
}

impl ChangedFolder {
    #[must_use]
    pub fn new(category: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            folder: folder.into(),
        }
    }

    /// Source directory of this folder in the repository.
    #[must_use]
    pub fn source_dir(&self, repo: &Path) -> PathBuf {
        repo.join(&self.category).join(&self.folder)
    }

    /// File name of the packed artifact.
    #[must_use]
    pub fn pbo_name(&self) -> String {
        format!("{}.pbo", self.folder)
    }
}

impl std::fmt::Display for ChangedFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.category, self.folder)
    }
}

/// Result of a change scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    /// Start of the lookback window.
    pub since: NaiveDate,
    /// Folders changed within the window, sorted by category then folder.
    pub changed: BTreeSet<ChangedFolder>,
    /// Folders deleted within the window (only with deletion tracking).
    pub deleted: BTreeSet<ChangedFolder>,
}

impl ChangeSet {
    #[must_use]
    pub const fn empty(since: NaiveDate) -> Self {
        Self {
            since,
            changed: BTreeSet::new(),
            deleted: BTreeSet::new(),
        }
    }

    /// True when nothing changed (deletions alone do not make a release).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changed.len()
    }

    /// Changed folders grouped by the mod directory of their category.
    ///
    /// Folders whose category is not configured are grouped under their
    /// category name.
    #[must_use]
    pub fn by_mod_dir<'a>(
        folders: &'a BTreeSet<ChangedFolder>,
        categories: &'a [CategoryConfig],
    ) -> BTreeMap<&'a str, Vec<&'a str>> {
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for changed in folders {
            let mod_dir = categories
                .iter()
                .find(|c| c.name == changed.category)
                .map_or(changed.category.as_str(), |c| c.mod_dir.as_str());
            groups.entry(mod_dir).or_default().push(&changed.folder);
        }
        groups
    }
}

/// Start of the lookback window: `today` minus `days`.
#[must_use]
pub fn cutoff_date(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Maps repository-relative paths to changed folders.
///
/// A path counts when its first segment is a configured category and it has
/// at least `category/folder/file` depth. Backslashes are treated as
/// separators. Excluded folders are dropped.
#[must_use]
pub fn parse_changed_paths<I, S>(paths: I, categories: &[CategoryConfig]) -> BTreeSet<ChangedFolder>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut folders = BTreeSet::new();

    for path in paths {
        let path = path.as_ref().trim().replace('\\', "/");
        let mut parts = path.split('/');
        let (Some(category), Some(folder), Some(_)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        if folder.is_empty() {
            continue;
        }
        let Some(config) = categories.iter().find(|c| c.name == category) else {
            continue;
        };
        if config.excludes(folder) {
            debug!(category, folder, "excluded");
            continue;
        }
        folders.insert(ChangedFolder::new(category, folder));
    }

    folders
}

/// Scans the repository history for addon folders changed since `since`.
///
/// A `repo` outside a git work tree and git failures are logged and
/// produce an empty set.
#[must_use]
pub fn find_changed_folders(
    repo: &Path,
    since: NaiveDate,
    categories: &[CategoryConfig],
    track_deletions: bool,
) -> ChangeSet {
    let dirs: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    let mut set = ChangeSet::empty(since);

    if let Err(e) = work_tree(repo) {
        error!(repo = %repo.display(), error = %e, "repository is not a git work tree");
        return set;
    }

    let paths = match changed_paths(repo, since, &dirs) {
        Ok(paths) => paths,
        Err(e) => {
            error!(repo = %repo.display(), error = %e, "failed to read git history");
            return set;
        }
    };
    set.changed = parse_changed_paths(&paths, categories);

    if track_deletions {
        match deleted_paths(repo, since, &dirs) {
            Ok(paths) => {
                for candidate in parse_changed_paths(&paths, categories) {
                    if !candidate.source_dir(repo).exists() {
                        set.changed.remove(&candidate);
                        set.deleted.insert(candidate);
                    }
                }
            }
            Err(e) => warn!(error = %e, "failed to read deleted paths"),
        }
    }

    info!(
        since = %since,
        changed = set.changed.len(),
        deleted = set.deleted.len(),
        "change scan complete"
    );
    set
}

/// Scans the configured repository over the configured lookback window.
///
/// # Errors
///
/// Returns a `ConfigError::MissingKey` if `paths.repo` is not set.
pub fn scan(ctx: &ToolContext, today: NaiveDate) -> Result<ChangeSet> {
    let config = ctx.config();
    let repo = config.paths.repo()?;
    let since = cutoff_date(today, config.scan.days);
    debug!(repo = %repo.display(), %since, days = config.scan.days, "scanning history");
    Ok(find_changed_folders(
        repo,
        since,
        &config.scan.categories,
        config.scan.track_deletions,
    ))
}

#[cfg(test)]
mod tests;
