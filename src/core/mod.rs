// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core process management.
//!
//! ```text
//!          core
//!           |
//!        process
//!           |
//!   Builder Output Flags
//!   CTRL_BREAK (Windows only)
//! ```

pub mod process;
