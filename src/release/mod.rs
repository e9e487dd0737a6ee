// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Release pipeline.
//!
//! # Architecture
//!
//! ```text
//! run_pipeline(ctx, control, today)
//!      |
//!      v
//!   changes ----(empty)----> warn "no changes", stop
//!      |
//!      v
//!   stage       clean_staging + link_changed      (control.link)
//!      |
//!      v
//!   build       hemtt release                     (control.build)
//!      |
//!      v
//!   obfuscate   marked folders --> obf script     (control.obfuscate && enabled)
//!      |
//!      v
//!   distribute  update_<date>/<mod>/addons + changelog
//! ```
//!
//! # Error model
//!
//! Item-level failures (a missing folder, a failed move, a failing tool) are
//! logged and counted in a [`StepReport`]; the pipeline moves on. Only
//! configuration errors and Ctrl+C stop it early.

pub mod build;
pub mod changes;
pub mod distribute;
pub mod obfuscate;
pub mod stage;
pub mod tools;

use chrono::NaiveDate;
use tracing::{Instrument, info, warn};

use crate::error::{Result, bail_out};
use crate::logging::Step;
use changes::ChangeSet;
use tools::ToolContext;

/// Per-step item counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    done: usize,
    skipped: usize,
    failed: usize,
}

impl StepReport {
    pub const fn record_done(&mut self) {
        self.done += 1;
    }

    pub const fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub const fn record_failed(&mut self) {
        self.failed += 1;
    }

    /// Adds the counts of `other` to this report.
    pub const fn merge(&mut self, other: Self) {
        self.done += other.done;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    #[must_use]
    pub const fn done(&self) -> usize {
        self.done
    }

    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failed
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.done + self.skipped + self.failed
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl std::fmt::Display for StepReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} done, {} skipped, {} failed",
            self.done, self.skipped, self.failed
        )
    }
}

/// Controls which pipeline steps run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepControl {
    link: bool,
    build: bool,
    obfuscate: bool,
    distribute: bool,
}

impl Default for StepControl {
    fn default() -> Self {
        Self::new()
    }
}

impl StepControl {
    /// All steps enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            link: true,
            build: true,
            obfuscate: true,
            distribute: true,
        }
    }

    #[must_use]
    pub const fn with_link(mut self, enable: bool) -> Self {
        self.link = enable;
        self
    }

    #[must_use]
    pub const fn with_build(mut self, enable: bool) -> Self {
        self.build = enable;
        self
    }

    #[must_use]
    pub const fn with_obfuscate(mut self, enable: bool) -> Self {
        self.obfuscate = enable;
        self
    }

    #[must_use]
    pub const fn with_distribute(mut self, enable: bool) -> Self {
        self.distribute = enable;
        self
    }

    #[must_use]
    pub const fn link(&self) -> bool {
        self.link
    }

    #[must_use]
    pub const fn build(&self) -> bool {
        self.build
    }

    #[must_use]
    pub const fn obfuscate(&self) -> bool {
        self.obfuscate
    }

    #[must_use]
    pub const fn distribute(&self) -> bool {
        self.distribute
    }
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone)]
pub struct ReleaseReport {
    changes: ChangeSet,
    steps: Vec<(Step, StepReport)>,
}

impl ReleaseReport {
    #[must_use]
    pub const fn new(changes: ChangeSet) -> Self {
        Self {
            changes,
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, step: Step, report: StepReport) {
        self.steps.push((step, report));
    }

    #[must_use]
    pub const fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    #[must_use]
    pub fn steps(&self) -> &[(Step, StepReport)] {
        &self.steps
    }

    /// Report of a step, if it ran.
    #[must_use]
    pub fn step(&self, step: Step) -> Option<StepReport> {
        self.steps
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, report)| *report)
    }

    /// True when no step recorded a failure.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.steps.iter().all(|(_, report)| report.is_success())
    }

    /// Logs one summary line per step.
    pub fn log_summary(&self) {
        for (step, report) in &self.steps {
            if report.is_success() {
                info!(step = %step, "{report}");
            } else {
                warn!(step = %step, "{report}");
            }
        }
    }
}

fn ensure_not_cancelled(ctx: &ToolContext) -> Result<()> {
    if ctx.is_cancelled() {
        return Err(bail_out("release interrupted").into());
    }
    Ok(())
}

/// Runs the whole release pipeline.
///
/// # Errors
///
/// Returns an error if a required path is not configured, the obfuscation
/// marker is invalid, or the run was interrupted.
pub async fn run_pipeline(
    ctx: &ToolContext,
    control: StepControl,
    today: NaiveDate,
) -> Result<ReleaseReport> {
    let changes = {
        let _span = Step::Changes.span().entered();
        changes::scan(ctx, today)?
    };
    let mut report = ReleaseReport::new(changes);

    if report.changes.is_empty() {
        warn!("no changes found, nothing to release");
        return Ok(report);
    }
    info!(folders = report.changes.len(), "changed folders found");

    if control.link() {
        ensure_not_cancelled(ctx)?;
        let step = stage::run(ctx, &report.changes.changed)
            .instrument(Step::Stage.span())
            .await?;
        report.push(Step::Stage, step);
    }

    if control.build() {
        ensure_not_cancelled(ctx)?;
        let step = build::run(ctx).instrument(Step::Build.span()).await?;
        report.push(Step::Build, step);
    }

    if control.obfuscate() && ctx.config().obfuscation.enabled {
        ensure_not_cancelled(ctx)?;
        let step = obfuscate::run(ctx).instrument(Step::Obfuscate.span()).await?;
        report.push(Step::Obfuscate, step);
    }

    if control.distribute() {
        ensure_not_cancelled(ctx)?;
        let step = distribute::run(ctx, &report.changes, today)
            .instrument(Step::Distribute.span())
            .await?;
        report.push(Step::Distribute, step);
    }

    ensure_not_cancelled(ctx)?;
    report.log_summary();
    info!("release ready");
    Ok(report)
}

#[cfg(test)]
mod tests;
