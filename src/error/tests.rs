// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{ConfigError, FsError, ReleaseError, ReleaseResult};

#[test]
fn test_config_error_display() {
    let err = ConfigError::MissingKey {
        section: "paths".to_string(),
        key: "repo".to_string(),
    };
    insta::assert_snapshot!(err.to_string(), @"missing required config key 'repo' in section '[paths]'");
}

#[test]
fn test_link_error_display() {
    let err: ReleaseError = FsError::LinkFailed {
        src: "repo/addons/foo".to_string(),
        dst: "staging/foo".to_string(),
        message: "access denied".to_string(),
    }
    .into();
    insta::assert_snapshot!(
        err.to_string(),
        @"filesystem error: failed to link repo/addons/foo -> staging/foo: access denied"
    );
}

#[test]
fn test_release_error_size() {
    // Box<str> variants (Bailed, Other) are 16 bytes (fat pointer: ptr + len)
    // With discriminant + alignment = 24 bytes
    let size = std::mem::size_of::<ReleaseError>();
    assert!(size <= 24, "ReleaseError is {size} bytes, expected <= 24");
}

#[test]
fn test_release_result_size() {
    let size = std::mem::size_of::<ReleaseResult<()>>();
    assert!(size <= 24, "ReleaseResult<()> is {size} bytes, expected <= 24");
}
