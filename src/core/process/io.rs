// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! I/O streaming and output capture for processes.
//!
//! ```text
//! run_child(token)
//!   stdout/stderr reader tasks
//!   mpsc channels buffer lines
//!   wait | cancel | timeout
//!   --> (ProcessOutput { stdout, stderr, exit_code, interrupted }, timed_out)
//!
//! read_stream()
//!   read_until('\n') --> encoding_rs decode --> trim CR/LF
//! ```

use std::borrow::Cow;

use anyhow::Context;
use encoding_rs::Encoding;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{Level, debug, error, info, trace, warn};

use super::builder::{ProcessBuilder, ProcessFlags, ProcessOutput, StreamFlags};
use crate::error::Result;

struct StreamReaderConfig {
    encoding: &'static Encoding,
    flags: StreamFlags,
    level: Level,
    process_name: String,
    stream_name: &'static str,
}

fn spawn_reader<R>(
    stream: Option<R>,
    config: StreamReaderConfig,
    tx: mpsc::UnboundedSender<String>,
) -> Option<JoinHandle<()>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    if !config
        .flags
        .intersects(StreamFlags::FORWARD_TO_LOG | StreamFlags::KEEP_IN_STRING)
    {
        return None;
    }
    stream.map(|stream| {
        tokio::spawn(
            async move {
                read_stream(stream, &config, &tx).await;
            }
            .with_current_subscriber(),
        )
    })
}

fn collect_output(rx: &mut mpsc::UnboundedReceiver<String>, flags: StreamFlags) -> String {
    if !flags.contains(StreamFlags::KEEP_IN_STRING) {
        return String::new();
    }
    let mut output = String::new();
    while let Ok(line) = rx.try_recv() {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&line);
    }
    output
}

async fn await_readers(handles: [Option<JoinHandle<()>>; 2]) {
    for handle in handles.into_iter().flatten() {
        let _ = handle.await;
    }
}

/// Terminates a child process (Windows: `CTRL_BREAK` first, then kill).
async fn terminate_process(child: &mut Child, graceful: bool) {
    #[cfg(windows)]
    if graceful && let Some(pid) = child.id() {
        if let Err(e) = super::windows::send_ctrl_break(pid) {
            debug!(pid = pid, error = %e, "CTRL_BREAK failed, will force kill");
        } else {
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        }
    }
    #[cfg(not(windows))]
    let _ = graceful;

    if let Err(e) = child.kill().await {
        debug!(error = %e, "kill failed, process may have exited already");
    }
}

impl ProcessBuilder {
    /// Runs the child process, streaming its output until it exits, the token
    /// is cancelled or the timeout elapses.
    ///
    /// The returned flag is true if the timeout elapsed.
    pub(super) async fn run_child(
        &self,
        name: &str,
        child: &mut Child,
        token: CancellationToken,
    ) -> Result<(ProcessOutput, bool)> {
        let (stdout_tx, mut stdout_rx) = mpsc::unbounded_channel::<String>();
        let (stderr_tx, mut stderr_rx) = mpsc::unbounded_channel::<String>();

        let readers = [
            spawn_reader(
                child.stdout.take(),
                StreamReaderConfig {
                    encoding: self.output_encoding(),
                    flags: self.stdout_config(),
                    level: self.forwarded_level(),
                    process_name: name.to_string(),
                    stream_name: "stdout",
                },
                stdout_tx,
            ),
            spawn_reader(
                child.stderr.take(),
                StreamReaderConfig {
                    encoding: self.output_encoding(),
                    flags: self.stderr_config(),
                    level: self.forwarded_level(),
                    process_name: name.to_string(),
                    stream_name: "stderr",
                },
                stderr_tx,
            ),
        ];

        let graceful = !self
            .process_flags()
            .contains(ProcessFlags::TERMINATE_ON_INTERRUPT);
        let timeout = self.timeout_duration();
        let deadline = async {
            match timeout {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending().await,
            }
        };

        let (exit_status, interrupted, timed_out) = tokio::select! {
            status = child.wait() => (status?, false, false),
            () = token.cancelled() => {
                warn!(process = %name, "cancellation requested, terminating process");
                terminate_process(child, graceful).await;
                let status = child.wait().await
                    .with_context(|| format!("failed waiting for process {name} to exit"))?;
                (status, true, false)
            }
            () = deadline => {
                warn!(process = %name, timeout = ?timeout, "process timed out");
                terminate_process(child, false).await;
                let status = child.wait().await
                    .with_context(|| format!("failed waiting for process {name} to exit"))?;
                (status, false, true)
            }
        };

        await_readers(readers).await;

        let output = ProcessOutput::new(
            exit_status.code().unwrap_or(-1),
            collect_output(&mut stdout_rx, self.stdout_config()),
            collect_output(&mut stderr_rx, self.stderr_config()),
            interrupted,
        );
        Ok((output, timed_out))
    }
}

/// Decodes one raw output line and strips the line terminator.
pub(super) fn decode_line(encoding: &'static Encoding, raw: &[u8]) -> String {
    let (text, _) = encoding.decode_without_bom_handling(raw);
    match text {
        Cow::Borrowed(s) => s.trim_end_matches(['\r', '\n']).to_string(),
        Cow::Owned(mut s) => {
            let len = s.trim_end_matches(['\r', '\n']).len();
            s.truncate(len);
            s
        }
    }
}

fn forward_line(config: &StreamReaderConfig, line: &str) {
    let process = config.process_name.as_str();
    let stream = config.stream_name;
    match config.level {
        Level::ERROR => error!(process = %process, stream, line = %line, "output"),
        Level::WARN => warn!(process = %process, stream, line = %line, "output"),
        Level::INFO => info!(process = %process, stream, line = %line, "output"),
        Level::DEBUG => debug!(process = %process, stream, line = %line, "output"),
        _ => trace!(process = %process, stream, line = %line, "output"),
    }
}

async fn read_stream<R>(reader: R, config: &StreamReaderConfig, tx: &mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut raw = Vec::new();

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw).await {
            Ok(0) => break,
            Ok(_) => {
                let line = decode_line(config.encoding, &raw);
                if config.flags.contains(StreamFlags::FORWARD_TO_LOG) {
                    forward_line(config, &line);
                }
                if config.flags.contains(StreamFlags::KEEP_IN_STRING) {
                    let _ = tx.send(line);
                }
            }
            Err(e) => {
                warn!(
                    process = %config.process_name,
                    stream = config.stream_name,
                    error = %e,
                    "error reading stream"
                );
                break;
            }
        }
    }
}
