// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Utility modules.
//!
//! ```text
//! fs
//!   link:  create_dir_link(), remove_entry(), is_link()
//!   moves: move_file(), files_with_extension()
//! ```

pub mod fs;
