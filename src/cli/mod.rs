// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for pbo-release using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! pbo-release [global options] <command>
//! version | options | inis
//! changes [--days N] [--track-deletions] [--json]
//! stage [--no-clean]
//! build
//! obfuscate [--no-progress]
//! distribute
//! release [--no-link] [--no-build] [--no-obfuscate] [--no-distribute]
//! ```

pub mod global;
pub mod release;


use crate::cli::global::GlobalOptions;
use crate::cli::release::{
    ChangesArgs, DistributeArgs, ObfuscateArgs, ReleaseArgs, StageArgs,
};
use clap::{Parser, Subcommand};

/// Arma 3 addon release automation
///
/// Finds the addon folders changed in git, packs them with HEMTT and sorts
/// the packed addons into a dated update folder.
#[derive(Debug, Parser)]
#[command(
    name = "pbo-release",
    author,
    version,
    about = "Arma 3 addon release automation",
    long_about = "pbo-release Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Finds the addon folders changed in git within the lookback\n\
                  window, links them into the HEMTT project, runs `hemtt release`,\n\
                  obfuscates marked addons and sorts the packed addons into\n\
                  `update_<date>/<mod>/addons`. Run `pbo-release release` for the\n\
                  whole pipeline or a single step command to re-run one step.",
    after_help = "CONFIGURATION:\n\n\
                  pbo-release reads `release.toml` from the current directory\n\
                  unless --no-default-inis is given. Additional files can be given\n\
                  with --ini, later files override earlier ones. RELEASE_SECTION__KEY\n\
                  environment variables and --set section/key=value override the\n\
                  files; dedicated flags such as --root override everything."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    Version,

    /// Lists all options and their effective values.
    Options,

    /// Lists the configuration files that were loaded.
    Inis,

    /// Lists the addon folders changed within the lookback window.
    Changes(ChangesArgs),

    /// Cleans the staging directory and links the changed folders into it.
    Stage(StageArgs),

    /// Runs the packaging tool in the release root.
    Build,

    /// Obfuscates the staged folders marked in their config.cpp.
    Obfuscate(ObfuscateArgs),

    /// Moves the packed changed addons into the dated update folder.
    Distribute(DistributeArgs),

    /// Runs the whole release pipeline.
    Release(ReleaseArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
