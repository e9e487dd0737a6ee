// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Packaging step: runs HEMTT in the release root.

use tracing::{error, info};

use super::StepReport;
use super::tools::hemtt::HemttTool;
use super::tools::{Tool, ToolContext};
use crate::error::{ProcessError, Result};

/// Runs the packaging tool once.
///
/// A missing executable or a failing run is logged and counted as failed.
///
/// # Errors
///
/// Returns a `ConfigError::MissingKey` if `paths.root` or `paths.hemtt` is not set.
pub async fn run(ctx: &ToolContext) -> Result<StepReport> {
    let config = ctx.config();
    let tool = HemttTool::new(config.paths.hemtt()?, config.paths.root()?)
        .args(config.tools.hemtt_args.iter().cloned());

    let mut report = StepReport::default();
    match tool.run(ctx).await {
        Ok(()) => {
            info!(tool = tool.name(), "packaging finished");
            report.record_done();
        }
        Err(e) => {
            if let Some(ProcessError::ExecutableNotFound { name }) = e.downcast_ref::<ProcessError>() {
                error!(path = %name, "hemtt not found");
            } else {
                error!(error = %e, "hemtt failed");
            }
            report.record_failed();
        }
    }
    Ok(report)
}
