// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Obfuscation of marked addons.
//!
//! ```text
//! find_obfuscation_folders(staging, marker)
//!   staging/<folder>/config.cpp =~ marker  --> selected
//!
//! obfuscate_folders(folders)
//!   obf script <staging/folder>  --> staging/<folder>.pbo
//!   move staging/<folder>.pbo    --> output/<folder>.pbo (replaces HEMTT's)
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, error, info, warn};

use super::StepReport;
use super::tools::obfuscator::ObfuscatorTool;
use super::tools::{Tool, ToolContext};
use crate::error::{FsError, ReleaseError, Result};
use crate::utility::fs::moves::move_file;

fn bar_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        })
        .clone()
}

/// Returns the staging folders whose `config.cpp` matches `marker`, sorted.
///
/// Unreadable `config.cpp` files are logged and skipped. The file is decoded
/// lossily, so legacy code pages do not prevent a match.
#[must_use]
pub fn find_obfuscation_folders(staging: &Path, marker: &Regex) -> Vec<String> {
    let entries = match std::fs::read_dir(staging) {
        Ok(entries) => entries,
        Err(e) => {
            error!(path = %staging.display(), error = %e, "failed to read staging directory");
            return Vec::new();
        }
    };

    let mut folders = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let config = path.join("config.cpp");
        if !config.is_file() {
            continue;
        }
        match std::fs::read(&config) {
            Ok(bytes) => {
                if marker.is_match(&String::from_utf8_lossy(&bytes)) {
                    folders.push(entry.file_name().to_string_lossy().into_owned());
                }
            }
            Err(e) => error!(path = %config.display(), error = %e, "failed to read config.cpp"),
        }
    }

    folders.sort();
    debug!(count = folders.len(), "folders marked for obfuscation");
    folders
}

/// Paths used by [`obfuscate_folders`].
#[derive(Debug, Clone)]
pub struct ObfuscationPaths {
    /// Packer script.
    pub script: PathBuf,
    /// Directory holding the folders to pack.
    pub staging: PathBuf,
    /// Directory the packed `.pbo` is moved into.
    pub output: PathBuf,
    /// Working directory of the script.
    pub root: PathBuf,
}

/// Obfuscates each folder and moves the result into the output directory.
///
/// Stops early (remaining folders are not counted) when the run is cancelled.
pub async fn obfuscate_folders(
    ctx: &ToolContext,
    folders: &[String],
    paths: &ObfuscationPaths,
) -> StepReport {
    let mut report = StepReport::default();

    let show_progress = ctx.config().obfuscation.progress && !ctx.is_dry_run();
    let bar = if show_progress {
        let bar = ProgressBar::new(folders.len() as u64);
        bar.set_style(bar_style());
        bar
    } else {
        ProgressBar::hidden()
    };

    for folder in folders {
        if ctx.is_cancelled() {
            warn!("obfuscation interrupted");
            break;
        }
        bar.set_message(folder.clone());

        let folder_path = paths.staging.join(folder);
        if !folder_path.is_dir() {
            warn!(folder = %folder, path = %folder_path.display(), "folder not found, skipped");
            report.record_skipped();
            bar.inc(1);
            continue;
        }

        let tool = ObfuscatorTool::new(&paths.script, &folder_path).cwd(&paths.root);
        let pbo = tool.output_pbo();
        let target = paths.output.join(format!("{folder}.pbo"));

        if ctx.is_dry_run() {
            info!(folder = %folder, "[DRY-RUN] would obfuscate");
            info!(src = %pbo.display(), dst = %target.display(), "[DRY-RUN] would move");
            report.record_done();
            continue;
        }

        match tool.run(ctx).await {
            Ok(()) => match move_file(&pbo, &target).await {
                Ok(()) => {
                    bar.suspend(|| info!(folder = %folder, "obfuscated"));
                    report.record_done();
                }
                Err(ReleaseError::Fs(e)) if matches!(*e, FsError::NotFound(_)) => {
                    bar.suspend(|| warn!(folder = %folder, path = %pbo.display(), "obfuscated pbo not found"));
                    report.record_skipped();
                }
                Err(e) => {
                    bar.suspend(|| error!(folder = %folder, error = %e, "failed to move obfuscated pbo"));
                    report.record_failed();
                }
            },
            Err(e) => {
                bar.suspend(|| error!(folder = %folder, error = %e, "obfuscation failed"));
                report.record_failed();
            }
        }
        bar.inc(1);
    }

    bar.finish_and_clear();
    report
}

/// Selects marked folders in staging and obfuscates them.
///
/// # Errors
///
/// Returns a `ConfigError` if a required path is not set or the marker is invalid.
pub async fn run(ctx: &ToolContext) -> Result<StepReport> {
    let config = ctx.config();
    let paths = ObfuscationPaths {
        script: config.paths.obfuscator()?.to_path_buf(),
        staging: config.paths.staging()?.to_path_buf(),
        output: config.paths.output()?.to_path_buf(),
        root: config.paths.root()?.to_path_buf(),
    };
    let marker = config.marker_regex()?;

    let folders = find_obfuscation_folders(&paths.staging, &marker);
    if folders.is_empty() {
        info!("no folders marked for obfuscation");
        return Ok(StepReport::default());
    }
    info!(count = folders.len(), "obfuscating marked folders");

    Ok(obfuscate_folders(ctx, &folders, &paths).await)
}

#[cfg(test)]
mod tests;
