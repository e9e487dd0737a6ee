// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Staging area: the build tool's `addons` directory, filled with links.
//!
//! ```text
//! clean_staging(staging, protected)
//!   for entry in staging/*:
//!     protected?  --> keep
//!     link        --> unlink
//!     dir / file  --> remove
//!
//! link_changed(changes, repo, staging, protected)
//!   for (category, folder) in changes:
//!     duplicate name / protected       --> skip
//!     repo/<category>/<folder> missing --> error
//!     staging/<folder> exists          --> "already linked" (dir) / error (file)
//!     else                             --> junction / symlink
//! ```

use std::collections::BTreeSet;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, info, warn};

use super::changes::ChangedFolder;
use super::tools::ToolContext;
use super::{StepReport, ensure_not_cancelled};
use crate::error::Result;
use crate::utility::fs::link::{create_dir_link, is_link, remove_entry};

fn is_protected(protected: &[String], name: &str) -> bool {
    protected.iter().any(|p| p.eq_ignore_ascii_case(name))
}

/// Removes every staging entry except protected folders.
///
/// A missing staging directory is not an error. Each failed removal is
/// logged and counted; the loop continues.
pub async fn clean_staging(staging: &Path, protected: &[String], dry_run: bool) -> StepReport {
    let mut report = StepReport::default();

    let mut entries = match fs::read_dir(staging).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %staging.display(), "staging directory does not exist, nothing to clean");
            return report;
        }
        Err(e) => {
            error!(path = %staging.display(), error = %e, "failed to read staging directory");
            report.record_failed();
            return report;
        }
    };

    let mut paths = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => paths.push(entry.path()),
            Ok(None) => break,
            Err(e) => {
                error!(path = %staging.display(), error = %e, "failed to read staging entry");
                report.record_failed();
                break;
            }
        }
    }
    paths.sort();

    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if is_protected(protected, &name) {
            debug!(folder = %name, "protected, kept");
            report.record_skipped();
            continue;
        }

        if dry_run {
            info!(path = %path.display(), "[DRY-RUN] would remove");
            report.record_done();
            continue;
        }

        match remove_entry(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "removed");
                report.record_done();
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to remove staging entry");
                report.record_failed();
            }
        }
    }

    info!(removed = report.done(), kept = report.skipped(), "staging cleaned");
    report
}

/// Links every changed folder from the repository into the staging directory.
///
/// Folder names are linked once; a second category with the same folder
/// name is skipped with a warning.
pub async fn link_changed(
    changes: &BTreeSet<ChangedFolder>,
    repo: &Path,
    staging: &Path,
    protected: &[String],
    dry_run: bool,
) -> StepReport {
    let mut report = StepReport::default();

    if !dry_run && let Err(e) = fs::create_dir_all(staging).await {
        error!(path = %staging.display(), error = %e, "failed to create staging directory");
        report.record_failed();
        return report;
    }

    let mut seen = BTreeSet::new();
    for changed in changes {
        let folder = changed.folder.as_str();

        if !seen.insert(folder.to_lowercase()) {
            warn!(folder, category = %changed.category, "folder name already staged from another category, skipped");
            report.record_skipped();
            continue;
        }

        if is_protected(protected, folder) {
            info!(folder, "protected, not linked");
            report.record_skipped();
            continue;
        }

        let src = changed.source_dir(repo);
        if !src.is_dir() {
            error!(folder, path = %src.display(), "source folder not found");
            report.record_failed();
            continue;
        }

        let dst = staging.join(folder);
        if let Ok(meta) = std::fs::symlink_metadata(&dst) {
            if meta.is_dir() || is_link(&dst) {
                info!(folder, "already linked");
                report.record_skipped();
            } else {
                error!(folder, path = %dst.display(), "staging path exists and is not a directory");
                report.record_failed();
            }
            continue;
        }

        if dry_run {
            info!(folder, src = %src.display(), dst = %dst.display(), "[DRY-RUN] would link");
            report.record_done();
            continue;
        }

        match create_dir_link(&src, &dst).await {
            Ok(kind) => {
                info!(folder, category = %changed.category, %kind, "linked");
                report.record_done();
            }
            Err(e) => {
                error!(folder, error = %e, "failed to link folder");
                report.record_failed();
            }
        }
    }

    report
}

/// Cleans the staging directory (when `stage.clean` is set) and links the
/// changed folders into it.
///
/// # Errors
///
/// Returns a `ConfigError::MissingKey` if `paths.repo` or `paths.staging` is not set.
pub async fn run(ctx: &ToolContext, changes: &BTreeSet<ChangedFolder>) -> Result<StepReport> {
    let config = ctx.config();
    let repo = config.paths.repo()?;
    let staging = config.paths.staging()?;
    let protected = &config.stage.protected;

    let mut report = StepReport::default();
    if config.stage.clean {
        report.merge(clean_staging(staging, protected, ctx.is_dry_run()).await);
    }
    ensure_not_cancelled(ctx)?;
    report.merge(link_changed(changes, repo, staging, protected, ctx.is_dry_run()).await);
    Ok(report)
}

#[cfg(test)]
mod tests;
