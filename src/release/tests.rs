// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{StepControl, StepReport, run_pipeline};
use crate::config::Config;
use crate::logging::Step;
use crate::release::tools::ToolContext;
use chrono::NaiveDate;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn context(repo: &Path, root: &Path, dry_run: bool) -> ToolContext {
    let mut config = Config::default();
    config.paths.repo = Some(repo.to_path_buf());
    config.paths.root = Some(root.to_path_buf());
    config.paths.resolve().expect("resolve");
    config.obfuscation.progress = false;
    ToolContext::new(Arc::new(config), CancellationToken::new(), dry_run)
}

fn git(path: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn repo_with_addons(path: &Path, files: &[&str]) {
    std::fs::create_dir_all(path).expect("mkdir");
    git(path, &["init", "--quiet", "--initial-branch=main"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test"]);
    git(path, &["config", "commit.gpgsign", "false"]);
    for file in files {
        let full = path.join(file);
        std::fs::create_dir_all(full.parent().expect("parent")).expect("mkdir");
        std::fs::write(&full, "class CfgPatches {};").expect("write");
    }
    git(path, &["add", "--all"]);
    git(path, &["commit", "--quiet", "-m", "addons"]);
}

#[test]
fn test_step_report_counts() {
    let mut report = StepReport::default();
    report.record_done();
    report.record_done();
    report.record_skipped();
    assert!(report.is_success());

    let mut other = StepReport::default();
    other.record_failed();
    report.merge(other);

    assert_eq!(report.total(), 4);
    assert!(!report.is_success());
    insta::assert_snapshot!(report.to_string(), @"2 done, 1 skipped, 1 failed");
}

#[test]
fn test_step_control() {
    let control = StepControl::new().with_build(false).with_obfuscate(false);
    assert!(control.link());
    assert!(!control.build());
    assert!(!control.obfuscate());
    assert!(control.distribute());
    assert_eq!(StepControl::default(), StepControl::new());
}

#[tokio::test]
async fn test_pipeline_stops_without_changes() {
    let temp = tempfile::tempdir().expect("temp dir");
    let ctx = context(&temp.path().join("not_a_repo"), &temp.path().join("release"), false);

    let report = run_pipeline(&ctx, StepControl::new(), today()).await.expect("run");
    assert!(report.changes().is_empty());
    assert!(report.steps().is_empty());
    assert!(report.is_success());
    assert!(!temp.path().join("release/addons").exists());
}

#[tokio::test]
async fn test_pipeline_interrupted() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = temp.path().join("repo");
    repo_with_addons(&repo, &["addons/mkk_radio/config.cpp"]);
    let ctx = context(&repo, &temp.path().join("release"), true);
    ctx.cancel_token().cancel();

    let err = run_pipeline(&ctx, StepControl::new(), today()).await.unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"fatal error: release interrupted");
}

#[tokio::test]
async fn test_pipeline_dry_run_touches_nothing() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = temp.path().join("repo");
    let root = temp.path().join("release");
    repo_with_addons(&repo, &["addons/mkk_radio/config.cpp"]);
    std::fs::create_dir_all(root.join("addons/old")).unwrap();
    let ctx = context(&repo, &root, true);

    let report = run_pipeline(&ctx, StepControl::new(), today()).await.expect("run");
    assert_eq!(report.changes().len(), 1);
    assert_eq!(
        report.steps().iter().map(|(s, _)| *s).collect::<Vec<_>>(),
        [Step::Stage, Step::Build, Step::Obfuscate, Step::Distribute]
    );
    assert!(root.join("addons/old").is_dir());
    assert!(!root.join("addons/mkk_radio").exists());
    assert!(!root.join(".hemttout").exists());
}

#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).expect("chmod");
}

#[cfg(unix)]
#[tokio::test]
async fn test_pipeline_end_to_end() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = temp.path().join("repo");
    let root = temp.path().join("release");
    repo_with_addons(
        &repo,
        &[
            "addons/mkk_radio/config.cpp",
            "addons/cTab/config.cpp",
            "server/mkk_srv/config.cpp",
        ],
    );
    std::fs::create_dir_all(root.join("addons/mkk_sys")).unwrap();
    write_script(
        &root.join("tools/hemtt.exe"),
        r#"mkdir -p .hemttout/release/addons
for dir in addons/*/; do
  name=$(basename "$dir")
  echo packed > ".hemttout/release/addons/$name.pbo"
done"#,
    );
    let ctx = context(&repo, &root, false);

    let report = run_pipeline(&ctx, StepControl::new(), today()).await.expect("run");
    assert!(report.is_success(), "{:?}", report.steps());
    assert_eq!(report.step(Step::Stage).map(|r| r.done()), Some(2));
    assert_eq!(report.step(Step::Obfuscate).map(|r| r.total()), Some(0));

    let update = root
        .join(".hemttout/release/addons")
        .join(format!("update_{}", today().format("%Y-%m-%d")));
    assert!(update.join("@sg_mods/addons/mkk_radio.pbo").is_file());
    assert!(update.join("@sg_server/addons/mkk_srv.pbo").is_file());
    assert!(!update.join("@sg_mods/addons/cTab.pbo").exists());
    assert!(update.join("changelog.txt").is_file());
    // protected folder packed by hemtt but not part of the release
    assert!(!root.join(".hemttout/release/addons/mkk_sys.pbo").exists());
    assert!(root.join("addons/mkk_sys").is_dir());
}
