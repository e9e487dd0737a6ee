// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for pbo-release.
//!
//! ```text
//! Config: GlobalConfig, PathsConfig, ScanConfig, StageConfig,
//!         ObfuscationConfig, ToolsConfig
//! ScanConfig.categories: [{ name, mod_dir, exclude }]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use wax::Program as _;

use crate::error::ConfigError;
use crate::logging::LogLevel;

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log every filesystem change and process launch instead of performing it.
    pub dry: bool,
    /// Log level for stdout output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file.
    pub log_file: PathBuf,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            dry: false,
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::INFO,
            log_file: PathBuf::from("release.log"),
        }
    }
}

/// A top-level repository directory holding addon folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    /// Directory name in the repository (e.g. `addons core`).
    pub name: String,
    /// Mod directory the packed addons are released into (e.g. `@sg_core`).
    pub mod_dir: String,
    /// Folder name patterns (case-insensitive globs) never picked up from this category.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl CategoryConfig {
    #[must_use]
    pub fn new(name: &str, mod_dir: &str) -> Self {
        Self {
            name: name.to_string(),
            mod_dir: mod_dir.to_string(),
            exclude: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_exclude(mut self, patterns: &[&str]) -> Self {
        self.exclude = patterns.iter().map(ToString::to_string).collect();
        self
    }

    /// Returns true if `folder` matches one of the exclude patterns (case-insensitive).
    #[must_use]
    pub fn excludes(&self, folder: &str) -> bool {
        let folder = folder.to_lowercase();
        self.exclude.iter().any(|pattern| {
            let pattern = pattern.to_lowercase();
            wax::Glob::new(&pattern).is_ok_and(|glob| glob.is_match(folder.as_str()))
        })
    }
}

/// Change detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Lookback window in days.
    pub days: u32,
    /// Also report addon folders deleted within the window.
    pub track_deletions: bool,
    /// Categories scanned for changed folders.
    pub categories: Vec<CategoryConfig>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            days: 31,
            track_deletions: false,
            categories: vec![
                CategoryConfig::new("addons", "@sg_mods").with_exclude(&["cTab"]),
                CategoryConfig::new("addons core", "@sg_core").with_exclude(&["cTab"]),
                CategoryConfig::new("addons islands", "@sg_islands"),
                CategoryConfig::new("server", "@sg_server"),
            ],
        }
    }
}

impl ScanConfig {
    /// Checks the categories for duplicates, empty names and malformed exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::InvalidValue` for an empty or duplicated category name,
    /// a name containing a path separator, or an exclude pattern that is not a valid glob.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            section: "scan".to_string(),
            key: "categories".to_string(),
            message,
        };

        for (i, category) in self.categories.iter().enumerate() {
            if category.name.trim().is_empty() || category.mod_dir.trim().is_empty() {
                return Err(invalid(format!("category #{} has an empty name or mod_dir", i + 1)));
            }
            if category.name.contains(['/', '\\']) {
                return Err(invalid(format!(
                    "category '{}' must be a single directory name",
                    category.name
                )));
            }
            if self.categories[..i].iter().any(|c| c.name == category.name) {
                return Err(invalid(format!("duplicate category '{}'", category.name)));
            }
            for pattern in &category.exclude {
                if let Err(e) = wax::Glob::new(&pattern.to_lowercase()) {
                    return Err(invalid(format!(
                        "invalid exclude pattern '{pattern}' in category '{}': {e}",
                        category.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Staging-area settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StageConfig {
    /// Link changed folders into the staging directory.
    pub link: bool,
    /// Remove stale entries from the staging directory before linking.
    pub clean: bool,
    /// Staging folders that are never removed or replaced (case-insensitive).
    pub protected: Vec<String>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            link: true,
            clean: true,
            protected: vec![
                "mkk_sys".to_string(),
                "cTab".to_string(),
                "mkk_grad_trenches_main".to_string(),
            ],
        }
    }
}

/// Obfuscation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObfuscationConfig {
    /// Run the obfuscation step.
    pub enabled: bool,
    /// Regex matched against each staged `config.cpp` to select addons for obfuscation.
    pub marker: String,
    /// Show a progress bar while the obfuscator runs.
    pub progress: bool,
}

impl Default for ObfuscationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            marker: r"mkk_shield\s*=\s*1\b".to_string(),
            progress: true,
        }
    }
}

/// External tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Arguments passed to the packaging tool.
    pub hemtt_args: Vec<String>,
    /// Encoding label used to decode child process output (e.g. `utf-8`, `cp866`).
    pub output_encoding: String,
    /// Kill a tool that runs longer than this many seconds (0 = no limit).
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            hemtt_args: vec!["release".to_string()],
            output_encoding: "utf-8".to_string(),
            timeout_secs: 0,
        }
    }
}

impl ToolsConfig {
    /// Resolves `output_encoding` to an `encoding_rs` encoding.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::InvalidValue` if the label is unknown.
    pub fn encoding(&self) -> std::result::Result<&'static encoding_rs::Encoding, ConfigError> {
        encoding_rs::Encoding::for_label(self.output_encoding.trim().as_bytes()).ok_or_else(|| {
            ConfigError::InvalidValue {
                section: "tools".to_string(),
                key: "output_encoding".to_string(),
                message: format!("unknown encoding '{}'", self.output_encoding),
            }
        })
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<std::time::Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(std::time::Duration::from_secs(self.timeout_secs))
        }
    }
}
