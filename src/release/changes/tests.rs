// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{ChangeSet, ChangedFolder, cutoff_date, find_changed_folders, parse_changed_paths};
use crate::config::types::{CategoryConfig, ScanConfig};
use chrono::NaiveDate;
use std::path::Path;
use std::process::Command;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn categories() -> Vec<CategoryConfig> {
    ScanConfig::default().categories
}

fn names(set: &std::collections::BTreeSet<ChangedFolder>) -> Vec<String> {
    set.iter().map(ToString::to_string).collect()
}

#[test]
fn test_cutoff_date() {
    assert_eq!(cutoff_date(date(2026, 3, 31), 31), date(2026, 2, 28));
    assert_eq!(cutoff_date(date(2026, 1, 10), 0), date(2026, 1, 10));
    assert_eq!(cutoff_date(NaiveDate::MIN, 5), NaiveDate::MIN);
}

#[test]
fn test_parse_changed_paths() {
    let paths = [
        "addons/mkk_radio/config.cpp",
        "addons/mkk_radio/functions/fn_init.sqf",
        "addons core/mkk_core/config.cpp",
        "server/mkk_srv/config.cpp",
        "addons/readme.md",
        "docs/addons/guide.md",
        "tools/hemtt.exe",
    ];
    let set = parse_changed_paths(paths, &categories());
    assert_eq!(
        names(&set),
        [
            "addons/mkk_radio",
            "addons core/mkk_core",
            "server/mkk_srv",
        ]
    );
}

#[test]
fn test_parse_changed_paths_backslashes() {
    let set = parse_changed_paths(["addons islands\\altis_fix\\config.cpp"], &categories());
    assert_eq!(names(&set), ["addons islands/altis_fix"]);
}

#[test]
fn test_exclusion_is_case_insensitive() {
    let paths = [
        "addons/cTab/config.cpp",
        "addons/CTAB/data/icon.paa",
        "addons core/ctab/config.cpp",
        "addons islands/cTab/config.cpp",
    ];
    let set = parse_changed_paths(paths, &categories());
    // only `addons islands` has no exclusion
    assert_eq!(names(&set), ["addons islands/cTab"]);
}

#[test]
fn test_exclusion_globs() {
    let categories = [CategoryConfig::new("addons", "@mods").with_exclude(&["test_*"])];
    let set = parse_changed_paths(
        ["addons/Test_Units/config.cpp", "addons/units/config.cpp"],
        &categories,
    );
    assert_eq!(names(&set), ["addons/units"]);
}

#[test]
fn test_by_mod_dir() {
    let set = parse_changed_paths(
        [
            "addons/b/config.cpp",
            "addons/a/config.cpp",
            "server/s/config.cpp",
        ],
        &categories(),
    );
    let cats = categories();
    let groups = ChangeSet::by_mod_dir(&set, &cats);
    insta::assert_debug_snapshot!(groups, @r#"
    {
        "@sg_mods": [
            "a",
            "b",
        ],
        "@sg_server": [
            "s",
        ],
    }
    "#);
}

#[test]
fn test_changed_folder_paths() {
    let folder = ChangedFolder::new("addons core", "mkk_core");
    assert_eq!(
        folder.source_dir(Path::new("/repo")),
        Path::new("/repo/addons core/mkk_core")
    );
    assert_eq!(folder.pbo_name(), "mkk_core.pbo");
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

fn commit(path: &Path, files: &[&str], message: &str) {
    for file in files {
        let full = path.join(file);
        std::fs::create_dir_all(full.parent().expect("parent")).expect("mkdir");
        std::fs::write(&full, message).expect("write");
    }
    git(path, &["add", "--all"]);
    git(path, &["commit", "--quiet", "-m", message]);
}

fn commit_at(path: &Path, file: &str, timestamp: &str) {
    let full = path.join(file);
    std::fs::create_dir_all(full.parent().expect("parent")).expect("mkdir");
    std::fs::write(&full, timestamp).expect("write");
    git(path, &["add", "--all"]);
    let output = Command::new("git")
        .args(["commit", "--quiet", "-m", file])
        .env("GIT_AUTHOR_DATE", timestamp)
        .env("GIT_COMMITTER_DATE", timestamp)
        .current_dir(path)
        .output()
        .expect("failed to run git");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

fn init_repo(path: &Path) {
    git(path, &["init", "--quiet", "--initial-branch=main"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test"]);
    git(path, &["config", "commit.gpgsign", "false"]);
}

#[test]
fn test_find_changed_folders_is_deterministic() {
    let temp = tempfile::tempdir().expect("temp dir");
    init_repo(temp.path());
    commit(temp.path(), &["addons/b/config.cpp", "addons/a/config.cpp"], "one");
    commit(temp.path(), &["addons/a/data.sqf", "server/s/config.cpp"], "two");

    let since = date(2000, 1, 1);
    let first = find_changed_folders(temp.path(), since, &categories(), false);
    let second = find_changed_folders(temp.path(), since, &categories(), false);
    assert_eq!(first, second);
    assert_eq!(names(&first.changed), ["addons/a", "addons/b", "server/s"]);
    assert!(first.deleted.is_empty());
}

#[test]
fn test_find_changed_folders_tracks_deletions() {
    let temp = tempfile::tempdir().expect("temp dir");
    init_repo(temp.path());
    commit(temp.path(), &["addons/gone/config.cpp", "addons/kept/config.cpp"], "add");
    git(temp.path(), &["rm", "--quiet", "-r", "addons/gone"]);
    git(temp.path(), &["commit", "--quiet", "-m", "remove"]);

    let since = date(2000, 1, 1);
    let untracked = find_changed_folders(temp.path(), since, &categories(), false);
    assert_eq!(names(&untracked.changed), ["addons/gone", "addons/kept"]);

    let tracked = find_changed_folders(temp.path(), since, &categories(), true);
    assert_eq!(names(&tracked.changed), ["addons/kept"]);
    assert_eq!(names(&tracked.deleted), ["addons/gone"]);
}

#[test]
fn test_find_changed_folders_outside_repo_is_empty() {
    let temp = tempfile::tempdir().expect("temp dir");
    let set = find_changed_folders(temp.path(), date(2000, 1, 1), &categories(), true);
    assert!(set.is_empty());
    assert_eq!(set.len(), 0);
}

#[test]
fn test_find_changed_folders_respects_window() {
    let temp = tempfile::tempdir().expect("temp dir");
    init_repo(temp.path());
    commit_at(temp.path(), "addons/old/config.cpp", "2025-12-01T12:00:00");
    commit_at(temp.path(), "addons/recent/config.cpp", "2026-02-20T12:00:00");

    let since = cutoff_date(date(2026, 3, 1), 31);
    assert_eq!(since, date(2026, 1, 29));
    let set = find_changed_folders(temp.path(), since, &categories(), false);
    assert_eq!(names(&set.changed), ["addons/recent"]);

    let wide = cutoff_date(date(2026, 3, 1), 365);
    let set = find_changed_folders(temp.path(), wide, &categories(), false);
    assert_eq!(names(&set.changed), ["addons/old", "addons/recent"]);
}

#[test]
fn test_find_changed_folders_skips_merge_commits() {
    let temp = tempfile::tempdir().expect("temp dir");
    init_repo(temp.path());
    commit(temp.path(), &["addons/base/config.cpp"], "base");
    git(temp.path(), &["checkout", "--quiet", "-b", "feature"]);
    commit(temp.path(), &["addons/feature/config.cpp"], "feature");
    git(temp.path(), &["checkout", "--quiet", "main"]);
    commit(temp.path(), &["server/srv/config.cpp"], "server");

    // a file added only by the merge commit itself
    git(temp.path(), &["merge", "--quiet", "--no-ff", "--no-commit", "feature"]);
    let merged = temp.path().join("addons/merge_only/config.cpp");
    std::fs::create_dir_all(merged.parent().expect("parent")).expect("mkdir");
    std::fs::write(&merged, "merge").expect("write");
    git(temp.path(), &["add", "--all"]);
    git(temp.path(), &["commit", "--quiet", "--no-edit"]);

    let set = find_changed_folders(temp.path(), date(2000, 1, 1), &categories(), false);
    assert_eq!(
        names(&set.changed),
        ["addons/base", "addons/feature", "server/srv"]
    );
}
