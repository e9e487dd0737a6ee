// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities for staging links and artifact moves.
//!
//! ```text
//! link:  create_dir_link()   junction (Windows) / symlink
//!        remove_entry()      unlink, never follow
//! moves: move_file()         rename, fallback copy + remove
//!        files_with_extension()
//! ```

pub mod link;
pub mod moves;
