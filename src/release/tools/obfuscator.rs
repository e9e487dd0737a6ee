// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Obfuscating packer script.
//!
//! ```text
//! staging/<folder> --> cmd /c obf.bat <staging/folder> --> staging/<folder>.pbo
//! ```
//!
//! The script's output is discarded; only its exit status is checked.

use std::path::{Path, PathBuf};

use crate::error::{ProcessError, Result};
use tracing::debug;

use super::{BoxFuture, Tool, ToolContext};
use crate::core::process::builder::ProcessBuilder;

/// Runs the obfuscation script for one staged addon folder.
#[derive(Debug, Clone)]
pub struct ObfuscatorTool {
    script: PathBuf,
    folder: PathBuf,
    cwd: Option<PathBuf>,
}

impl ObfuscatorTool {
    #[must_use]
    pub fn new(script: impl AsRef<Path>, folder: impl AsRef<Path>) -> Self {
        Self {
            script: script.as_ref().to_path_buf(),
            folder: folder.as_ref().to_path_buf(),
            cwd: None,
        }
    }

    #[must_use]
    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Path of the `.pbo` the script produces next to the folder.
    #[must_use]
    pub fn output_pbo(&self) -> PathBuf {
        let mut pbo = self.folder.clone().into_os_string();
        pbo.push(".pbo");
        PathBuf::from(pbo)
    }

    fn builder(&self, ctx: &ToolContext) -> ProcessBuilder {
        let builder = ProcessBuilder::script(&self.script)
            .arg(&self.folder)
            .name("obfuscator")
            .maybe_timeout(ctx.config().tools.timeout())
            .quiet();
        match &self.cwd {
            Some(dir) => builder.cwd(dir),
            None => builder,
        }
    }
}

impl Tool for ObfuscatorTool {
    fn name(&self) -> &'static str {
        "obfuscator"
    }

    fn run<'a>(&'a self, ctx: &'a ToolContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let builder = self.builder(ctx);

            if ctx.is_dry_run() {
                debug!(cmd = %builder.command_line(), "[DRY-RUN] would run obfuscator");
                return Ok(());
            }

            if !self.script.is_file() {
                return Err(ProcessError::ExecutableNotFound {
                    name: self.script.display().to_string(),
                }
                .into());
            }

            let output = builder
                .run_with_cancellation(ctx.cancel_token().clone())
                .await?;

            if output.is_interrupted() {
                anyhow::bail!("obfuscator was interrupted");
            }
            Ok(())
        })
    }
}
