// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Full release pipeline command.

use chrono::NaiveDate;

use crate::cli::release::ReleaseArgs;
use crate::config::Config;
use crate::error::Result;
use crate::release::run_pipeline;

use super::tool_context;

/// Runs the release pipeline.
///
/// # Errors
///
/// Returns an error if the configuration is incomplete, the run was
/// interrupted, or any step recorded a failure.
pub async fn run_release_command(args: &ReleaseArgs, config: Config, today: NaiveDate) -> Result<()> {
    let control = args.step_control(config.stage.link);
    let ctx = tool_context(config);

    let report = run_pipeline(&ctx, control, today).await?;
    if report.is_success() {
        Ok(())
    } else {
        let failed: usize = report.steps().iter().map(|(_, r)| r.failed()).sum();
        anyhow::bail!("release finished with {failed} failed item(s)")
    }
}
