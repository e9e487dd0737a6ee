// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Windows-specific process utilities.
//!
//! ```text
//! send_ctrl_break(pid) --> CTRL_BREAK_EVENT (process group)
//! cancellation: ctrl_break -> 500ms -> kill -> wait
//! ```

use crate::error::Result;

/// Sends CTRL+BREAK to a process group on Windows.
///
/// # Errors
///
/// Returns an error if `GenerateConsoleCtrlEvent` fails.
pub(super) fn send_ctrl_break(pid: u32) -> Result<()> {
    use windows::Win32::System::Console::CTRL_BREAK_EVENT;
    use windows::Win32::System::Console::GenerateConsoleCtrlEvent;

    // SAFETY: the child was spawned with CREATE_NEW_PROCESS_GROUP, so its pid is a group id.
    unsafe {
        GenerateConsoleCtrlEvent(CTRL_BREAK_EVENT, pid).map_err(|e: windows::core::Error| {
            anyhow::anyhow!("failed to send CTRL_BREAK: {}", e.message())
        })?;
    }
    Ok(())
}
