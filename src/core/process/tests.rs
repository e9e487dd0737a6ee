// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::builder::{ProcessBuilder, ProcessFlags};
use super::io::decode_line;
use crate::error::ProcessError;

#[cfg(windows)]
fn shell(command: &str) -> ProcessBuilder {
    ProcessBuilder::new("cmd").arg("/c").arg(command)
}

#[cfg(not(windows))]
fn shell(command: &str) -> ProcessBuilder {
    ProcessBuilder::new("/bin/sh").arg("-c").arg(command)
}

#[tokio::test]
async fn test_process_echo() {
    let output = shell("echo hello")
        .capture_output()
        .run()
        .await
        .expect("echo should succeed");

    assert!(output.success());
    insta::assert_snapshot!(output.stdout().trim(), @"hello");
}

#[tokio::test]
async fn test_process_exit_code_allowed() {
    let output = shell("exit 42")
        .flag(ProcessFlags::ALLOW_FAILURE)
        .run()
        .await
        .expect("process should complete");

    assert_eq!(output.exit_code(), 42);
    assert!(!output.success());
}

#[tokio::test]
async fn test_process_exit_code_fails() {
    let err = shell("exit 3").name("checker").run().await.unwrap_err();
    let process_err = err.downcast_ref::<ProcessError>().expect("process error");
    assert!(matches!(
        process_err,
        ProcessError::NonZeroExit { command, code: 3 } if command == "checker"
    ));
}

#[tokio::test]
async fn test_process_success_codes() {
    let output = shell("exit 1")
        .success_codes([0, 1])
        .run()
        .await
        .expect("exit code 1 is accepted");
    assert_eq!(output.exit_code(), 1);
}

#[tokio::test]
async fn test_process_env() {
    #[cfg(windows)]
    let command = "echo %RELEASE_MARKER%";
    #[cfg(not(windows))]
    let command = "echo $RELEASE_MARKER";

    let output = shell(command)
        .env("RELEASE_MARKER", "marker_value")
        .capture_stdout()
        .run()
        .await
        .expect("process should succeed");

    insta::assert_snapshot!(output.stdout().trim(), @"marker_value");
}

#[tokio::test]
async fn test_process_missing_executable() {
    let err = ProcessBuilder::new("definitely_missing_tool_12345")
        .run()
        .await
        .unwrap_err();
    let process_err = err.downcast_ref::<ProcessError>().expect("process error");
    assert!(matches!(process_err, ProcessError::ExecutableNotFound { .. }));
}

#[tokio::test]
async fn test_process_cancelled_before_spawn() {
    let token = tokio_util::sync::CancellationToken::new();
    token.cancel();
    let output = shell("echo never")
        .run_with_cancellation(token)
        .await
        .expect("cancelled run is not an error");
    assert!(output.is_interrupted());
}

#[cfg(unix)]
#[tokio::test]
async fn test_process_cancelled_while_running() {
    let token = tokio_util::sync::CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let output = shell("sleep 30")
        .quiet()
        .run_with_cancellation(token)
        .await
        .expect("interrupted run is not an error");
    assert!(output.is_interrupted());
}

#[cfg(unix)]
#[tokio::test]
async fn test_process_timeout() {
    let err = shell("sleep 30")
        .name("sleeper")
        .quiet()
        .timeout(std::time::Duration::from_millis(100))
        .run()
        .await
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"process 'sleeper' timed out after 0 seconds");
}

#[test]
fn test_command_line_quotes_spaces() {
    let builder = ProcessBuilder::new("git")
        .arg("log")
        .arg("--after")
        .arg("addons core/foo");
    insta::assert_snapshot!(builder.command_line(), @r#"git log --after "addons core/foo""#);
}

#[test]
fn test_decode_line() {
    assert_eq!(
        decode_line(encoding_rs::UTF_8, b"addons/foo/config.cpp\r\n"),
        "addons/foo/config.cpp"
    );
    // "Привет" in CP866
    let cp866 = [0x8F, 0xE0, 0xA8, 0xA2, 0xA5, 0xE2, b'\n'];
    assert_eq!(decode_line(encoding_rs::IBM866, &cp866), "Привет");
}

#[test]
fn test_executable_lookup_not_found() {
    let program = "nonexistent_program_12345";

    assert!(ProcessBuilder::find(program).is_none());
}

#[cfg(unix)]
#[test]
fn test_executable_lookup_found() {
    let found = ProcessBuilder::find("sh").expect("sh is on PATH");
    assert!(found.is_absolute());
    assert_eq!(ProcessBuilder::find("sh"), Some(found));
}

#[cfg(unix)]
#[tokio::test]
async fn test_process_forward_level() {
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    shell("echo hidden").run().await.expect("echo succeeds");
    shell("echo shown")
        .forward_level(tracing::Level::INFO)
        .run()
        .await
        .expect("echo succeeds");

    let logs = String::from_utf8(buffer.0.lock().expect("lock").clone()).expect("utf-8");
    assert!(logs.contains("line=shown"), "{logs}");
    assert!(!logs.contains("hidden"), "{logs}");
}
