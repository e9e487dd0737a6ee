// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Step and pipeline command arguments.
//!
//! ```text
//! ScanArgs (changes, stage, distribute, release):
//!   --days N, --track-deletions
//! release:
//!   --no-link --no-build --no-obfuscate --no-distribute --no-progress
//! ```

use clap::Args;

use crate::release::StepControl;

/// Change-scan options shared by the commands that detect changes.
#[derive(Debug, Clone, Default, Args)]
pub struct ScanArgs {
    /// Lookback window in days (overrides scan.days).
    #[arg(long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Also report folders deleted within the window.
    #[arg(long = "track-deletions")]
    pub track_deletions: bool,
}

impl ScanArgs {
    /// Converts the flags to configuration overrides.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let mut overrides = Vec::new();
        if let Some(days) = self.days {
            overrides.push(format!("scan/days={days}"));
        }
        if self.track_deletions {
            overrides.push("scan/track_deletions=true".to_string());
        }
        overrides
    }
}

/// Arguments for the `changes` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ChangesArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Prints the change set as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `stage` command.
#[derive(Debug, Clone, Default, Args)]
pub struct StageArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Keeps existing staging entries instead of removing them first.
    #[arg(long = "no-clean")]
    pub no_clean: bool,
}

impl StageArgs {
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let mut overrides = self.scan.to_config_overrides();
        if self.no_clean {
            overrides.push("stage/clean=false".to_string());
        }
        overrides
    }
}

/// Arguments for the `obfuscate` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ObfuscateArgs {
    /// Hides the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

impl ObfuscateArgs {
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        if self.no_progress {
            vec!["obfuscation/progress=false".to_string()]
        } else {
            Vec::new()
        }
    }
}

/// Arguments for the `distribute` command.
#[derive(Debug, Clone, Default, Args)]
pub struct DistributeArgs {
    #[command(flatten)]
    pub scan: ScanArgs,
}

/// Arguments for the `release` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ReleaseArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Skips linking the changed folders into staging.
    #[arg(long = "no-link", visible_alias = "nc")]
    pub no_link: bool,

    /// Skips the packaging tool.
    #[arg(long = "no-build")]
    pub no_build: bool,

    /// Skips obfuscation.
    #[arg(long = "no-obfuscate")]
    pub no_obfuscate: bool,

    /// Skips moving the packed addons into the update folder.
    #[arg(long = "no-distribute")]
    pub no_distribute: bool,

    /// Hides the obfuscation progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

impl ReleaseArgs {
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let mut overrides = self.scan.to_config_overrides();
        if self.no_progress {
            overrides.push("obfuscation/progress=false".to_string());
        }
        overrides
    }

    /// Steps to run. `stage.link = false` in the configuration also disables linking.
    #[must_use]
    pub const fn step_control(&self, link_enabled: bool) -> StepControl {
        StepControl::new()
            .with_link(link_enabled && !self.no_link)
            .with_build(!self.no_build)
            .with_obfuscate(!self.no_obfuscate)
            .with_distribute(!self.no_distribute)
    }
}
