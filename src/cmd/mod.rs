// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> load_config(global, overrides) --> cmd::run_* handlers
//!   config: options, inis
//!   steps:  changes, stage, build, obfuscate, distribute
//!   release: full pipeline
//! ```

pub mod config;
pub mod release;
pub mod steps;


use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::cli::global::GlobalOptions;
use crate::config::loader::ConfigLoader;
use crate::config::{Config, DEFAULT_CONFIG_FILE, ENV_PREFIX};
use crate::error::Result;
use crate::release::StepReport;
use crate::release::tools::ToolContext;

/// Builds the layered configuration loader for the given global options.
///
/// `extra` holds command-specific `section/key=value` overrides; they are
/// applied after the global ones.
///
/// # Errors
///
/// Returns an error if an override is not of the form `section/key=value`.
pub fn build_config_loader(global: &GlobalOptions, extra: &[String]) -> Result<ConfigLoader> {
    let mut loader = ConfigLoader::new();
    if !global.no_default_inis {
        loader = loader.add_toml_file_optional(DEFAULT_CONFIG_FILE);
    }
    for ini_path in &global.inis {
        loader = loader.add_toml_file(ini_path);
    }
    loader = loader.with_env_prefix(ENV_PREFIX);

    for option in global.to_config_overrides().iter().chain(extra) {
        loader = loader.set_option(option)?;
    }
    Ok(loader)
}

/// Loads the effective configuration.
///
/// # Errors
///
/// Returns an error if a configuration file is missing or invalid, an
/// override is malformed, or validation fails.
pub fn load_config(global: &GlobalOptions, extra: &[String]) -> Result<Config> {
    build_config_loader(global, extra)?.build()
}

/// Creates the tool context and cancels it on Ctrl+C.
#[must_use]
pub fn tool_context(config: Config) -> ToolContext {
    let dry_run = config.global.dry;
    let cancel_token = CancellationToken::new();

    let token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, interrupting...");
            token.cancel();
        }
    });

    ToolContext::new(Arc::new(config), cancel_token, dry_run)
}

/// Turns a step report into the command result.
///
/// # Errors
///
/// Returns an error if any item of the step failed.
pub fn finish_step(name: &str, report: StepReport) -> Result<()> {
    if report.is_success() {
        tracing::info!(step = name, "{report}");
        Ok(())
    } else {
        anyhow::bail!("{name}: {report}")
    }
}
