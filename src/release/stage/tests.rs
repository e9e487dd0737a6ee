// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{clean_staging, link_changed};
use crate::release::changes::ChangedFolder;
use crate::utility::fs::link::{create_dir_link, is_link};
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;

fn protected() -> Vec<String> {
    vec!["mkk_sys".to_string(), "cTab".to_string()]
}

fn addon(repo: &Path, category: &str, folder: &str) {
    let dir = repo.join(category).join(folder);
    std::fs::create_dir_all(&dir).expect("mkdir");
    std::fs::write(dir.join("config.cpp"), "class CfgPatches {};").expect("write");
}

fn changes(items: &[(&str, &str)]) -> BTreeSet<ChangedFolder> {
    items
        .iter()
        .map(|(category, folder)| ChangedFolder::new(*category, *folder))
        .collect()
}

struct Layout {
    _temp: TempDir,
    repo: std::path::PathBuf,
    staging: std::path::PathBuf,
}

fn layout() -> Layout {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = temp.path().join("repo");
    let staging = temp.path().join("release/addons");
    std::fs::create_dir_all(&repo).expect("mkdir repo");
    Layout {
        _temp: temp,
        repo,
        staging,
    }
}

#[tokio::test]
async fn test_clean_staging_keeps_protected() {
    let l = layout();
    std::fs::create_dir_all(l.staging.join("MKK_SYS/data")).unwrap();
    std::fs::create_dir_all(l.staging.join("old_addon")).unwrap();
    std::fs::write(l.staging.join("stray.pbo"), "pbo").unwrap();
    addon(&l.repo, "addons", "linked");
    create_dir_link(&l.repo.join("addons/linked"), &l.staging.join("linked"))
        .await
        .unwrap();

    let report = clean_staging(&l.staging, &protected(), false).await;

    assert_eq!((report.done(), report.skipped(), report.failed()), (3, 1, 0));
    assert!(l.staging.join("MKK_SYS/data").is_dir());
    assert!(!l.staging.join("old_addon").exists());
    assert!(!l.staging.join("stray.pbo").exists());
    assert!(!l.staging.join("linked").exists());
    assert!(
        l.repo.join("addons/linked/config.cpp").exists(),
        "unlinking must not delete the source"
    );
}

#[tokio::test]
async fn test_clean_staging_missing_dir() {
    let l = layout();
    let report = clean_staging(&l.staging, &protected(), false).await;
    assert!(report.is_success());
    assert_eq!(report.total(), 0);
}

#[tokio::test]
async fn test_clean_staging_dry_run_touches_nothing() {
    let l = layout();
    std::fs::create_dir_all(l.staging.join("old_addon")).unwrap();

    let report = clean_staging(&l.staging, &protected(), true).await;
    assert_eq!(report.done(), 1);
    assert!(l.staging.join("old_addon").is_dir());
}

#[tokio::test]
async fn test_link_changed() {
    let l = layout();
    addon(&l.repo, "addons", "mkk_radio");
    addon(&l.repo, "addons core", "mkk_core");

    let report = link_changed(
        &changes(&[("addons", "mkk_radio"), ("addons core", "mkk_core")]),
        &l.repo,
        &l.staging,
        &protected(),
        false,
    )
    .await;

    assert_eq!(report.done(), 2);
    assert!(is_link(&l.staging.join("mkk_radio")));
    assert!(l.staging.join("mkk_core/config.cpp").exists());
}

#[tokio::test]
async fn test_link_changed_never_replaces_protected() {
    let l = layout();
    addon(&l.repo, "addons", "mkk_sys");
    std::fs::create_dir_all(l.staging.join("mkk_sys")).unwrap();
    std::fs::write(l.staging.join("mkk_sys/marker"), "local").unwrap();

    let report = link_changed(
        &changes(&[("addons", "mkk_sys")]),
        &l.repo,
        &l.staging,
        &protected(),
        false,
    )
    .await;

    assert_eq!(report.skipped(), 1);
    assert!(!is_link(&l.staging.join("mkk_sys")));
    assert_eq!(
        std::fs::read_to_string(l.staging.join("mkk_sys/marker")).unwrap(),
        "local"
    );
}

#[tokio::test]
async fn test_link_changed_dedupes_and_reports_problems() {
    let l = layout();
    addon(&l.repo, "addons", "shared");
    addon(&l.repo, "server", "shared");
    addon(&l.repo, "addons", "existing");
    addon(&l.repo, "addons", "blocked");
    std::fs::create_dir_all(&l.staging).unwrap();
    std::fs::create_dir(l.staging.join("existing")).unwrap();
    std::fs::write(l.staging.join("blocked"), "file").unwrap();

    let report = link_changed(
        &changes(&[
            ("addons", "shared"),
            ("server", "shared"),
            ("addons", "existing"),
            ("addons", "blocked"),
            ("addons", "missing"),
        ]),
        &l.repo,
        &l.staging,
        &protected(),
        false,
    )
    .await;

    // done: addons/shared; skipped: server/shared, existing; failed: blocked, missing
    assert_eq!((report.done(), report.skipped(), report.failed()), (1, 2, 2));
    assert!(!report.is_success());
    let target = std::fs::read_link(l.staging.join("shared")).unwrap();
    assert_eq!(target, l.repo.join("addons/shared"));
}

#[tokio::test]
async fn test_link_changed_dry_run() {
    let l = layout();
    addon(&l.repo, "addons", "mkk_radio");

    let report = link_changed(
        &changes(&[("addons", "mkk_radio")]),
        &l.repo,
        &l.staging,
        &protected(),
        true,
    )
    .await;

    assert_eq!(report.done(), 1);
    assert!(!l.staging.exists());
}
