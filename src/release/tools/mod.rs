// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! External tools driven by the pipeline.
//!
//! ```text
//! step --> ToolContext --> ProcessBuilder --> hemtt.exe / obf.bat
//! ToolContext: cancel token --> run_with_cancellation
//! ```
//!
//! All tools support graceful cancellation via `CancellationToken`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Result;

pub mod hemtt;
pub mod obfuscator;

use futures_util::future::BoxFuture;

/// Context shared by the pipeline steps and the tools they run.
///
/// Contains references to configuration, cancellation tokens, and execution flags.
#[derive(Clone)]
pub struct ToolContext {
    /// Cancelled on Ctrl+C; running tools are interrupted and remaining items skipped.
    cancel_token: CancellationToken,

    /// When true, tools log what they would do without making changes.
    dry_run: bool,

    config: Arc<Config>,
}

impl ToolContext {
    #[must_use]
    pub const fn new(config: Arc<Config>, cancel_token: CancellationToken, dry_run: bool) -> Self {
        Self {
            cancel_token,
            dry_run,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Arc<Config> {
        &self.config
    }

    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Checks if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// An external program invoked by a pipeline step.
///
/// Implementations run their process with `ProcessBuilder::run_with_cancellation()`
/// and only log the command line when `ctx.is_dry_run()` is set.
pub trait Tool: Send + Sync {
    /// Returns the name of this tool (e.g., "hemtt", "obfuscator").
    fn name(&self) -> &str;

    /// Executes the tool's operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool could not be started, failed, or was interrupted.
    fn run<'a>(&'a self, ctx: &'a ToolContext) -> BoxFuture<'a, Result<()>>;
}

#[cfg(test)]
pub(crate) mod test_utils;
