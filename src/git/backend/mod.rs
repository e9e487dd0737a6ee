// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! GitQuery (read)     --> GixBackend (pure Rust gix)
//! GitHistory (log)    --> ShellBackend (git CLI)
//! ```

use crate::error::{GitError, GixError, ReleaseResult};
use std::path::{Path, PathBuf};

/// Length of abbreviated commit ids.
pub const SHORT_ID_LEN: usize = 7;

// --- Query Trait (Read-only operations) ---

/// Read-only repository queries.
pub trait GitQuery {
    /// Get the root of the work tree containing `path`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if no repository is found or it has no work tree.
    fn work_tree(path: &Path) -> ReleaseResult<PathBuf>;

    /// Get current branch name (None if HEAD is detached).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or head resolution fails.
    fn current_branch(path: &Path) -> ReleaseResult<Option<String>>;

    /// Get the abbreviated id of the HEAD commit.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if discovery fails or HEAD does not point to a commit.
    fn head_id(path: &Path) -> ReleaseResult<String>;
}

// --- History Trait (log queries) ---

/// Which kind of file changes a history query reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFilter {
    /// Every changed path.
    All,
    /// Only deleted paths.
    Deleted,
}

/// Commit-history queries.
pub trait GitHistory {
    /// List paths touched by non-merge commits after `since` (`YYYY-MM-DD`),
    /// restricted to the given top-level directories.
    ///
    /// Paths are relative to the work tree root, with `/` separators. The
    /// result may contain duplicates.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the log query fails.
    fn changed_paths(
        repo_path: &Path,
        since: &str,
        pathspecs: &[&str],
        filter: ChangeFilter,
    ) -> ReleaseResult<Vec<String>>;
}

// --- GixBackend Implementation (Pure Rust) ---

/// Pure Rust git backend using gix.
///
/// Read-only, no subprocess.
pub struct GixBackend;

fn discover(path: &Path) -> ReleaseResult<gix::Repository> {
    Ok(gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?)
}

impl GitQuery for GixBackend {
    fn work_tree(path: &Path) -> ReleaseResult<PathBuf> {
        let repo = discover(path)?;
        let workdir = repo.workdir().ok_or_else(|| GitError::RepoNotFound {
            path: path.display().to_string(),
        })?;
        Ok(workdir.to_path_buf())
    }

    fn current_branch(path: &Path) -> ReleaseResult<Option<String>> {
        let repo = discover(path)?;
        let head = repo
            .head_name()
            .map_err(|e| GitError::Gix(GixError::Head(e)))?;
        Ok(head.map(|name| name.shorten().to_string()))
    }

    fn head_id(path: &Path) -> ReleaseResult<String> {
        let repo = discover(path)?;
        let id = repo
            .head_id()
            .map_err(|e| GitError::Gix(GixError::HeadId(Box::new(e))))?;
        Ok(id.detach().to_hex_with_len(SHORT_ID_LEN).to_string())
    }
}

// --- ShellBackend Implementation (Git CLI) ---

/// Shell-based git backend using git CLI.
///
/// Used for history queries, which gix does not cover with pathspec-limited
/// `--name-only` output.
pub struct ShellBackend;

impl ShellBackend {
    /// Execute a git command. Sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0`.
    pub(crate) fn git_command(args: &[&str], cwd: &Path) -> ReleaseResult<String> {
        use std::process::Command;

        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| std::io::Error::new(e.kind(), format!("failed to execute git: {e}")))?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl GitHistory for ShellBackend {
    fn changed_paths(
        repo_path: &Path,
        since: &str,
        pathspecs: &[&str],
        filter: ChangeFilter,
    ) -> ReleaseResult<Vec<String>> {
        let mut args = vec![
            "-c",
            "core.quotePath=false",
            "log",
            "--after",
            since,
            "--name-only",
            "--no-merges",
            "--pretty=format:",
        ];
        if filter == ChangeFilter::Deleted {
            args.push("--diff-filter=D");
        }
        if !pathspecs.is_empty() {
            args.push("--");
            args.extend(pathspecs);
        }

        let output = Self::git_command(&args, repo_path)?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect())
    }
}
