// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Single-step commands. Each re-runs one pipeline step on its own.

use chrono::NaiveDate;
use tracing::{Instrument, warn};

use crate::config::Config;
use crate::error::Result;
use crate::logging::Step;
use crate::release::changes::{self, ChangeSet};
use crate::release::{build, distribute, obfuscate, stage};

use super::{finish_step, tool_context};

/// Renders a change set for the `changes` command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_changes(changes: &ChangeSet, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(changes)?);
    }

    let mut lines: Vec<String> = changes.changed.iter().map(ToString::to_string).collect();
    lines.extend(changes.deleted.iter().map(|d| format!("{d} (deleted)")));
    Ok(lines.join("\n"))
}

/// Prints the folders changed within the lookback window.
///
/// # Errors
///
/// Returns an error if `paths.repo` is not configured.
pub fn run_changes_command(config: Config, json: bool, today: NaiveDate) -> Result<()> {
    let ctx = tool_context(config);
    let set = {
        let _span = Step::Changes.span().entered();
        changes::scan(&ctx, today)?
    };
    if set.is_empty() && set.deleted.is_empty() && !json {
        warn!(since = %set.since, "no changes found");
        return Ok(());
    }
    println!("{}", format_changes(&set, json)?);
    Ok(())
}

fn scan_or_warn(ctx: &crate::release::tools::ToolContext, today: NaiveDate) -> Result<Option<ChangeSet>> {
    let set = {
        let _span = Step::Changes.span().entered();
        changes::scan(ctx, today)?
    };
    if set.is_empty() {
        warn!(since = %set.since, "no changes found");
        return Ok(None);
    }
    Ok(Some(set))
}

/// Cleans staging and links the changed folders.
///
/// # Errors
///
/// Returns an error if a required path is missing or any item failed.
pub async fn run_stage_command(config: Config, today: NaiveDate) -> Result<()> {
    let ctx = tool_context(config);
    let Some(set) = scan_or_warn(&ctx, today)? else {
        return Ok(());
    };
    let report = stage::run(&ctx, &set.changed)
        .instrument(Step::Stage.span())
        .await?;
    finish_step(Step::Stage.as_str(), report)
}

/// Runs the packaging tool.
///
/// # Errors
///
/// Returns an error if a required path is missing or the tool failed.
pub async fn run_build_command(config: Config) -> Result<()> {
    let ctx = tool_context(config);
    let report = build::run(&ctx).instrument(Step::Build.span()).await?;
    finish_step(Step::Build.as_str(), report)
}

/// Obfuscates the marked staging folders.
///
/// # Errors
///
/// Returns an error if a required path is missing or any folder failed.
pub async fn run_obfuscate_command(config: Config) -> Result<()> {
    let ctx = tool_context(config);
    let report = obfuscate::run(&ctx).instrument(Step::Obfuscate.span()).await?;
    finish_step(Step::Obfuscate.as_str(), report)
}

/// Moves the changed folders' artifacts into the update folder.
///
/// # Errors
///
/// Returns an error if a required path is missing or any move failed.
pub async fn run_distribute_command(config: Config, today: NaiveDate) -> Result<()> {
    let ctx = tool_context(config);
    let Some(set) = scan_or_warn(&ctx, today)? else {
        return Ok(());
    };
    let report = distribute::run(&ctx, &set, today)
        .instrument(Step::Distribute.span())
        .await?;
    finish_step(Step::Distribute.as_str(), report)
}
