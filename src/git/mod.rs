// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!        Public API
//!     query.rs   history.rs
//!         \         /
//!          v       v
//!      ,------------------,
//!      | backend (traits) |
//!      '--+----------+----'
//!         |          |
//!         v          v
//!     GitQuery   GitHistory
//!   (gix, read)  (CLI, log)
//!         |          |
//!         v          v
//!    GixBackend  ShellBackend
//!    .work_tree  .changed_paths
//!    .branch     (--name-only,
//!    .head_id     --diff-filter=D)
//! ```
//!
//! **`GixBackend`**: pure Rust, no subprocess, read-only.
//! **`ShellBackend`**: git CLI for history queries.

pub mod backend;
pub mod history;
pub mod query;
