// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! HEMTT packaging tool.
//!
//! ```text
//! root/addons/* --> hemtt release (cwd = root) --> root/.hemttout/release/addons/*.pbo
//!
//! binary: paths.hemtt if it is a file, else `hemtt` on PATH
//! output: forwarded to the log at INFO
//! ```

use std::path::{Path, PathBuf};

use crate::error::{ProcessError, Result};
use tracing::{Level, debug, info};

use super::{BoxFuture, Tool, ToolContext};
use crate::core::process::builder::{ProcessBuilder, StreamFlags};

/// Runs `hemtt <args>` inside the release root.
#[derive(Debug, Clone)]
pub struct HemttTool {
    binary: PathBuf,
    root: PathBuf,
    args: Vec<String>,
}

impl HemttTool {
    #[must_use]
    pub fn new(binary: impl AsRef<Path>, root: impl AsRef<Path>) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
            root: root.as_ref().to_path_buf(),
            args: vec!["release".to_string()],
        }
    }

    #[must_use]
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// The configured binary, or the same tool name looked up on PATH.
    fn resolve_binary(&self) -> Option<PathBuf> {
        if self.binary.is_file() {
            return Some(self.binary.clone());
        }
        let name = self.binary.file_stem()?.to_str()?;
        let found = ProcessBuilder::find(name)?;
        debug!(configured = %self.binary.display(), found = %found.display(), "hemtt found on PATH");
        Some(found)
    }

    fn builder(&self, binary: &Path, ctx: &ToolContext) -> Result<ProcessBuilder> {
        let tools = &ctx.config().tools;
        Ok(ProcessBuilder::new(binary)
            .args(&self.args)
            .cwd(&self.root)
            .name("hemtt")
            .encoding(tools.encoding()?)
            .maybe_timeout(tools.timeout())
            .forward_level(Level::INFO)
            .stderr_flags(StreamFlags::FORWARD_TO_LOG | StreamFlags::KEEP_IN_STRING))
    }
}

impl Tool for HemttTool {
    fn name(&self) -> &'static str {
        "hemtt"
    }

    fn run<'a>(&'a self, ctx: &'a ToolContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if ctx.is_dry_run() {
                let builder = self.builder(&self.binary, ctx)?;
                info!(cmd = %builder.command_line(), cwd = %self.root.display(), "[DRY-RUN] would run hemtt");
                return Ok(());
            }

            let Some(binary) = self.resolve_binary() else {
                return Err(ProcessError::ExecutableNotFound {
                    name: self.binary.display().to_string(),
                }
                .into());
            };

            let output = self
                .builder(&binary, ctx)?
                .run_with_cancellation(ctx.cancel_token().clone())
                .await?;

            if output.is_interrupted() {
                anyhow::bail!("hemtt was interrupted");
            }

            info!(args = %self.args.join(" "), "hemtt finished");
            Ok(())
        })
    }
}
