// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{ObfuscationPaths, find_obfuscation_folders, obfuscate_folders, run};
use crate::config::Config;
use crate::release::tools::ToolContext;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn marker() -> Regex {
    Config::default().marker_regex().expect("default marker")
}

fn staged(staging: &Path, folder: &str, config: &str) {
    let dir = staging.join(folder);
    std::fs::create_dir_all(&dir).expect("mkdir");
    std::fs::write(dir.join("config.cpp"), config).expect("write");
}

fn context(root: &Path, dry_run: bool) -> ToolContext {
    let mut config = Config::default();
    config.paths.root = Some(root.to_path_buf());
    config.paths.resolve().expect("resolve");
    config.obfuscation.progress = false;
    ToolContext::new(Arc::new(config), CancellationToken::new(), dry_run)
}

#[test]
fn test_find_obfuscation_folders() {
    let temp = tempfile::tempdir().expect("temp dir");
    let staging = temp.path();
    staged(staging, "b_marked", "class CfgPatches {};\nmkk_shield = 1;\n");
    staged(staging, "a_marked", "mkk_shield=1;");
    staged(staging, "off", "mkk_shield = 0;");
    staged(staging, "ten", "mkk_shield = 10;");
    staged(staging, "plain", "class CfgPatches {};");
    std::fs::create_dir(staging.join("no_config")).unwrap();
    std::fs::write(staging.join("loose.pbo"), "pbo").unwrap();

    assert_eq!(
        find_obfuscation_folders(staging, &marker()),
        ["a_marked", "b_marked"]
    );
}

#[test]
fn test_find_obfuscation_folders_legacy_encoding() {
    let temp = tempfile::tempdir().expect("temp dir");
    let dir = temp.path().join("cyrillic");
    std::fs::create_dir(&dir).unwrap();
    // CP1251 comment bytes followed by the marker
    std::fs::write(dir.join("config.cpp"), b"// \xcf\xf0\xe8\xe2\xe5\xf2\nmkk_shield = 1;").unwrap();

    assert_eq!(find_obfuscation_folders(temp.path(), &marker()), ["cyrillic"]);
}

#[test]
fn test_find_obfuscation_folders_missing_staging() {
    let temp = tempfile::tempdir().expect("temp dir");
    assert!(find_obfuscation_folders(&temp.path().join("missing"), &marker()).is_empty());
}

#[tokio::test]
async fn test_obfuscate_dry_run_touches_nothing() {
    let temp = tempfile::tempdir().expect("temp dir");
    let ctx = context(temp.path(), true);
    let staging = ctx.config().paths.staging().unwrap().to_path_buf();
    staged(&staging, "mkk_radio", "mkk_shield = 1;");

    let report = run(&ctx).await.expect("run");
    assert_eq!(report.done(), 1);
    assert!(!ctx.config().paths.output().unwrap().exists());
}

#[tokio::test]
async fn test_obfuscate_missing_folder_is_skipped() {
    let temp = tempfile::tempdir().expect("temp dir");
    let ctx = context(temp.path(), false);
    let paths = ObfuscationPaths {
        script: temp.path().join("obf.bat"),
        staging: temp.path().join("addons"),
        output: temp.path().join("out"),
        root: temp.path().to_path_buf(),
    };

    let report = obfuscate_folders(&ctx, &["ghost".to_string()], &paths).await;
    assert_eq!((report.done(), report.skipped(), report.failed()), (0, 1, 0));
}

#[tokio::test]
async fn test_obfuscate_cancelled_stops() {
    let temp = tempfile::tempdir().expect("temp dir");
    let ctx = context(temp.path(), false);
    ctx.cancel_token().cancel();
    let paths = ObfuscationPaths {
        script: temp.path().join("obf.bat"),
        staging: temp.path().to_path_buf(),
        output: temp.path().join("out"),
        root: temp.path().to_path_buf(),
    };

    let report = obfuscate_folders(&ctx, &["a".to_string(), "b".to_string()], &paths).await;
    assert_eq!(report.total(), 0);
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
async fn test_obfuscate_replaces_hemtt_artifact() {
    let temp = tempfile::tempdir().expect("temp dir");
    let ctx = context(temp.path(), false);
    let config = ctx.config();
    let staging = config.paths.staging().unwrap().to_path_buf();
    let output = config.paths.output().unwrap().to_path_buf();

    // packs only folders whose name starts with "mkk", leaves others without a pbo
    write_script(
        config.paths.obfuscator().unwrap(),
        r#"case "$(basename "$1")" in mkk*) echo obfuscated > "$1.pbo";; esac"#,
    );
    staged(&staging, "mkk_radio", "mkk_shield = 1;");
    staged(&staging, "other", "mkk_shield = 1;");
    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join("mkk_radio.pbo"), "hemtt").unwrap();

    let report = run(&ctx).await.expect("run");
    assert_eq!((report.done(), report.skipped(), report.failed()), (1, 1, 0));
    assert_eq!(
        std::fs::read_to_string(output.join("mkk_radio.pbo")).unwrap(),
        "obfuscated\n"
    );
    assert!(!staging.join("mkk_radio.pbo").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_obfuscate_failing_script_is_counted() {
    let temp = tempfile::tempdir().expect("temp dir");
    let ctx = context(temp.path(), false);
    let config = ctx.config();
    let staging = config.paths.staging().unwrap().to_path_buf();

    write_script(config.paths.obfuscator().unwrap(), "exit 1");
    staged(&staging, "mkk_radio", "mkk_shield = 1;");

    let report = run(&ctx).await.expect("run");
    assert_eq!(report.failed(), 1);
}
