// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Path configuration.
//!
//! ```text
//! repo/                      (addon sources, git work tree)
//!   addons/<folder>/...
//!   addons core/<folder>/...
//! root/                      (HEMTT project)
//!   addons/                  (staging: links to changed folders)
//!   tools/hemtt.exe
//!   tools/obf.bat
//!   .hemttout/release/addons (output: packed .pbo files)
//! ```
//!
//! Every path except `repo` is resolved from `root` if not set.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Repository and release-root paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Git work tree containing the addon categories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<PathBuf>,
    /// Release root: the HEMTT project directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Staging directory the changed folders are linked into (default: root/addons).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging: Option<PathBuf>,
    /// HEMTT executable (default: root/tools/hemtt.exe).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hemtt: Option<PathBuf>,
    /// Obfuscation script (default: root/tools/obf.bat).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfuscator: Option<PathBuf>,
    /// Directory the packaging tool writes `.pbo` files to
    /// (default: root/.hemttout/release/addons).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

fn missing(key: &str) -> anyhow::Error {
    ConfigError::MissingKey {
        section: "paths".to_string(),
        key: key.to_string(),
    }
    .into()
}

impl PathsConfig {
    /// Resolve all relative paths against root and fill in defaults.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if the `root` path is not set.
    pub fn resolve(&mut self) -> Result<()> {
        let root = self.root.clone().ok_or_else(|| missing("root"))?;

        let resolve = |path: &mut Option<PathBuf>, default: &str| match path {
            Some(p) if p.is_relative() => {
                *path = Some(root.join(p.clone()));
            }
            None => {
                *path = Some(root.join(default));
            }
            _ => {}
        };

        resolve(&mut self.staging, "addons");
        resolve(&mut self.hemtt, "tools/hemtt.exe");
        resolve(&mut self.obfuscator, "tools/obf.bat");
        resolve(&mut self.output, ".hemttout/release/addons");

        Ok(())
    }

    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if `paths.repo` is not set.
    pub fn repo(&self) -> Result<&Path> {
        self.repo.as_deref().ok_or_else(|| missing("repo"))
    }

    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if `paths.root` is not set.
    pub fn root(&self) -> Result<&Path> {
        self.root.as_deref().ok_or_else(|| missing("root"))
    }

    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if neither `paths.staging` nor `paths.root` is set.
    pub fn staging(&self) -> Result<&Path> {
        self.staging.as_deref().ok_or_else(|| missing("staging"))
    }

    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if neither `paths.hemtt` nor `paths.root` is set.
    pub fn hemtt(&self) -> Result<&Path> {
        self.hemtt.as_deref().ok_or_else(|| missing("hemtt"))
    }

    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if neither `paths.obfuscator` nor `paths.root` is set.
    pub fn obfuscator(&self) -> Result<&Path> {
        self.obfuscator.as_deref().ok_or_else(|| missing("obfuscator"))
    }

    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if neither `paths.output` nor `paths.root` is set.
    pub fn output(&self) -> Result<&Path> {
        self.output.as_deref().ok_or_else(|| missing("output"))
    }
}
