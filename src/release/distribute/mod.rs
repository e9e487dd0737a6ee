// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Distribution of packed addons into a dated update folder.
//!
//! ```text
//! output/
//!   mkk_radio.pbo  ------------------+
//!   stale.pbo      --> deleted       |
//!   update_2026-03-07/               v
//!     @sg_mods/addons/mkk_radio.pbo
//!     @sg_core/addons/
//!     changelog.txt
//! ```

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

use super::StepReport;
use super::changes::{ChangeSet, ChangedFolder};
use super::tools::ToolContext;
use crate::config::types::CategoryConfig;
use crate::error::{FsError, ReleaseError, Result};
use crate::git::query::describe_head;
use crate::utility::fs::moves::{files_with_extension, move_file};

/// Name of the changelog written into the update folder.
pub const CHANGELOG_FILE: &str = "changelog.txt";

/// Name of the update folder for `date`.
#[must_use]
pub fn update_dir_name(date: NaiveDate) -> String {
    format!("update_{}", date.format("%Y-%m-%d"))
}

/// Target directory of a category inside the update folder.
#[must_use]
pub fn addons_dir(update_dir: &Path, category: &CategoryConfig) -> PathBuf {
    update_dir.join(&category.mod_dir).join("addons")
}

/// Renders the release changelog.
#[must_use]
pub fn format_changelog(
    changes: &ChangeSet,
    categories: &[CategoryConfig],
    today: NaiveDate,
    days: u32,
    head: &str,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Release {}", today.format("%Y-%m-%d"));
    let _ = writeln!(out, "Window: {days} days (since {})", changes.since.format("%Y-%m-%d"));
    let _ = writeln!(out, "Source: {head}");

    write_groups(&mut out, "Changed", &changes.changed, categories);
    if !changes.deleted.is_empty() {
        write_groups(&mut out, "Deleted", &changes.deleted, categories);
    }
    out
}

fn write_groups(
    out: &mut String,
    title: &str,
    folders: &BTreeSet<ChangedFolder>,
    categories: &[CategoryConfig],
) {
    let _ = writeln!(out, "\n{title} ({}):", folders.len());
    for (mod_dir, names) in ChangeSet::by_mod_dir(folders, categories) {
        let _ = writeln!(out, "  {mod_dir}");
        for name in names {
            let _ = writeln!(out, "    {name}");
        }
    }
}

/// Moves the changed folders' artifacts from `output` into
/// `output/update_<today>/<mod dir>/addons/` and deletes every other `.pbo`
/// left in `output`.
pub async fn distribute(
    changes: &ChangeSet,
    categories: &[CategoryConfig],
    output: &Path,
    today: NaiveDate,
    dry_run: bool,
) -> StepReport {
    let mut report = StepReport::default();
    let update_dir = output.join(update_dir_name(today));

    for category in categories {
        let dir = addons_dir(&update_dir, category);
        if dry_run {
            debug!(path = %dir.display(), "[DRY-RUN] would create directory");
        } else if let Err(e) = fs::create_dir_all(&dir).await {
            error!(path = %dir.display(), error = %e, "failed to create release directory");
            report.record_failed();
        }
    }

    for changed in &changes.changed {
        let Some(category) = categories.iter().find(|c| c.name == changed.category) else {
            warn!(folder = %changed.folder, category = %changed.category, "unknown category, skipped");
            report.record_skipped();
            continue;
        };
        let src = output.join(changed.pbo_name());
        let dst = addons_dir(&update_dir, category).join(changed.pbo_name());

        if dry_run {
            info!(src = %src.display(), dst = %dst.display(), "[DRY-RUN] would move");
            report.record_done();
            continue;
        }

        match move_file(&src, &dst).await {
            Ok(()) => {
                info!(folder = %changed.folder, mod_dir = %category.mod_dir, "distributed");
                report.record_done();
            }
            Err(ReleaseError::Fs(e)) if matches!(*e, FsError::NotFound(_)) => {
                warn!(folder = %changed.folder, path = %src.display(), "pbo not found");
                report.record_skipped();
            }
            Err(e) => {
                error!(folder = %changed.folder, error = %e, "failed to move pbo");
                report.record_failed();
            }
        }
    }

    report.merge(remove_leftovers(output, dry_run).await);
    report
}

async fn remove_leftovers(output: &Path, dry_run: bool) -> StepReport {
    let mut report = StepReport::default();
    if !output.is_dir() {
        debug!(path = %output.display(), "output directory does not exist");
        return report;
    }

    let leftovers = match files_with_extension(output, "pbo").await {
        Ok(files) => files,
        Err(e) => {
            error!(path = %output.display(), error = %e, "failed to list leftover pbo files");
            report.record_failed();
            return report;
        }
    };

    for path in leftovers {
        if dry_run {
            info!(path = %path.display(), "[DRY-RUN] would delete");
            continue;
        }
        match fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "deleted leftover pbo"),
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to delete leftover pbo");
                report.record_failed();
            }
        }
    }
    report
}

async fn write_changelog(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, content).await
}

/// Distributes the artifacts and writes the changelog.
///
/// # Errors
///
/// Returns a `ConfigError::MissingKey` if `paths.output` is not set.
pub async fn run(ctx: &ToolContext, changes: &ChangeSet, today: NaiveDate) -> Result<StepReport> {
    let config = ctx.config();
    let output = config.paths.output()?;
    let categories = &config.scan.categories;

    let mut report = distribute(changes, categories, output, today, ctx.is_dry_run()).await;

    let head = config
        .paths
        .repo()
        .map_or_else(|_| "unknown".to_string(), describe_head);
    let changelog = format_changelog(changes, categories, today, config.scan.days, &head);
    let path = output.join(update_dir_name(today)).join(CHANGELOG_FILE);

    if ctx.is_dry_run() {
        info!(path = %path.display(), "[DRY-RUN] would write changelog");
    } else if let Err(e) = write_changelog(&path, &changelog).await {
        error!(path = %path.display(), error = %e, "failed to write changelog");
        report.record_failed();
    } else {
        info!(path = %path.display(), "changelog written");
    }

    Ok(report)
}
