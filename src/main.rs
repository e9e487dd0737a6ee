// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Changes | Stage | Build | Obfuscate | Distribute | Release
//! ```

use std::process::ExitCode;

use pbo_release::cli::global::GlobalOptions;
use pbo_release::cli::{self, Command};
use pbo_release::cmd::config::{run_inis_command, run_options_command};
use pbo_release::cmd::release::run_release_command;
use pbo_release::cmd::steps::{
    run_build_command, run_changes_command, run_distribute_command, run_obfuscate_command,
    run_stage_command,
};
use pbo_release::cmd::{build_config_loader, load_config};
use pbo_release::config::Config;
use pbo_release::logging::{LogConfig, LogGuard, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();
    dispatch_command(&cli).await
}

fn build_log_config(config: &Config) -> LogConfig {
    let log_file = config.global.log_file.as_os_str();
    LogConfig::builder()
        .with_console_level(config.global.output_log_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file((!log_file.is_empty()).then(|| config.global.log_file.display().to_string()))
        .build()
}

fn start_logging(config: &Config) -> Option<LogGuard> {
    match init_logging(&build_log_config(config)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            None
        }
    }
}

fn extra_overrides(command: &Command) -> Vec<String> {
    match command {
        Command::Changes(args) => args.scan.to_config_overrides(),
        Command::Stage(args) => args.to_config_overrides(),
        Command::Obfuscate(args) => args.to_config_overrides(),
        Command::Distribute(args) => args.scan.to_config_overrides(),
        Command::Release(args) => args.to_config_overrides(),
        Command::Version | Command::Options | Command::Inis | Command::Build => Vec::new(),
    }
}

async fn dispatch_command(cli: &cli::Cli) -> ExitCode {
    let Some(command) = &cli.command else {
        eprintln!("No command specified. Use --help for usage information.");
        return ExitCode::FAILURE;
    };

    let result = match command {
        Command::Version => {
            handle_version_command();
            Ok(())
        }
        Command::Inis => build_config_loader(&cli.global, &[]).map(|loader| {
            run_inis_command(&loader.format_loaded_files());
        }),
        _ => run_with_config(command, &cli.global).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_with_config(command: &Command, global: &GlobalOptions) -> pbo_release::error::Result<()> {
    let config = load_config(global, &extra_overrides(command))?;

    if matches!(command, Command::Options) {
        run_options_command(&config);
        return Ok(());
    }

    let _log_guard = start_logging(&config);
    let today = chrono::Local::now().date_naive();

    match command {
        Command::Changes(args) => run_changes_command(config, args.json, today),
        Command::Stage(_) => run_stage_command(config, today).await,
        Command::Build => run_build_command(config).await,
        Command::Obfuscate(_) => run_obfuscate_command(config).await,
        Command::Distribute(_) => run_distribute_command(config, today).await,
        Command::Release(args) => run_release_command(args, config, today).await,
        Command::Version | Command::Options | Command::Inis => Ok(()),
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}
