// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for pbo-release.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. release.toml (cwd)
//! 3. --ini
//! 4. RELEASE_* env vars
//! 5. --set section/key=value
//! 6. dedicated CLI flags (--dry, --days, ...)
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! RELEASE_GLOBAL__DRY=true        → global.dry = true
//! RELEASE_PATHS__ROOT=D:/release  → paths.root = "D:/release"
//! RELEASE_SCAN__DAYS=7            → scan.days = 7
//! ```
//!
//! # Categories
//!
//! ```toml
//! [[scan.categories]]
//! name = "addons"
//! mod_dir = "@sg_mods"
//! exclude = ["cTab"]
//! ```

pub mod loader;
pub mod paths;
pub mod types;


use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use paths::PathsConfig;
use types::{GlobalConfig, ObfuscationConfig, ScanConfig, StageConfig, ToolsConfig};

/// Name of the configuration file picked up from the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "release.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "RELEASE";

/// Top-level configuration sections.
pub const SECTIONS: &[&str] = &["global", "paths", "scan", "stage", "obfuscation", "tools"];

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Repository and release-root paths.
    pub paths: PathsConfig,
    /// Change detection.
    pub scan: ScanConfig,
    /// Staging-area handling.
    pub stage: StageConfig,
    /// Obfuscation step.
    pub obfuscation: ObfuscationConfig,
    /// External tools.
    pub tools: ToolsConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pbo_release::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("release.toml")
    ///     .with_env_prefix("RELEASE")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Resolve all paths and validate configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the categories are inconsistent, the obfuscation
    /// marker is not a valid regex, or the output encoding is unknown.
    pub fn resolve_and_validate(&mut self) -> Result<()> {
        if self.paths.root.is_some() {
            self.paths.resolve()?;
        }
        self.scan.validate()?;
        self.marker_regex()?;
        self.tools.encoding()?;
        Ok(())
    }

    /// Compiles the obfuscation marker.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::InvalidValue` if `obfuscation.marker` is not a valid regex.
    pub fn marker_regex(&self) -> std::result::Result<Regex, ConfigError> {
        Regex::new(&self.obfuscation.marker).map_err(|e| ConfigError::InvalidValue {
            section: "obfuscation".to_string(),
            key: "marker".to_string(),
            message: e.to_string(),
        })
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_paths_options(&mut options);
        self.format_scan_options(&mut options);
        self.format_stage_options(&mut options);
        self.format_obfuscation_options(&mut options);
        self.format_tools_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("global.dry".into(), self.global.dry.to_string());
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global.log_file.display().to_string(),
        );
    }

    fn format_paths_options(&self, options: &mut BTreeMap<String, String>) {
        let fmt = |p: &Option<PathBuf>| {
            p.as_ref()
                .map_or_else(String::new, |p| p.display().to_string())
        };

        options.insert("paths.repo".into(), fmt(&self.paths.repo));
        options.insert("paths.root".into(), fmt(&self.paths.root));
        options.insert("paths.staging".into(), fmt(&self.paths.staging));
        options.insert("paths.hemtt".into(), fmt(&self.paths.hemtt));
        options.insert("paths.obfuscator".into(), fmt(&self.paths.obfuscator));
        options.insert("paths.output".into(), fmt(&self.paths.output));
    }

    fn format_scan_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("scan.days".into(), self.scan.days.to_string());
        options.insert(
            "scan.track_deletions".into(),
            self.scan.track_deletions.to_string(),
        );
        for category in &self.scan.categories {
            let mut value = category.mod_dir.clone();
            if !category.exclude.is_empty() {
                value.push_str(&format!(" (exclude: {})", category.exclude.join(", ")));
            }
            options.insert(format!("scan.categories.{}", category.name), value);
        }
    }

    fn format_stage_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("stage.link".into(), self.stage.link.to_string());
        options.insert("stage.clean".into(), self.stage.clean.to_string());
        options.insert("stage.protected".into(), self.stage.protected.join(", "));
    }

    fn format_obfuscation_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "obfuscation.enabled".into(),
            self.obfuscation.enabled.to_string(),
        );
        options.insert(
            "obfuscation.marker".into(),
            self.obfuscation.marker.clone(),
        );
        options.insert(
            "obfuscation.progress".into(),
            self.obfuscation.progress.to_string(),
        );
    }

    fn format_tools_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("tools.hemtt_args".into(), self.tools.hemtt_args.join(" "));
        options.insert(
            "tools.output_encoding".into(),
            self.tools.output_encoding.clone(),
        );
        options.insert(
            "tools.timeout_secs".into(),
            self.tools.timeout_secs.to_string(),
        );
    }
}
