// pbo-release: Arma 3 addon release automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration loading from multiple sources.
//!
//! ```text
//! ConfigLoader::new()
//!   .add_toml_file(req)
//!   .add_toml_file_optional(opt)
//!   .add_toml_str()
//!   .with_env_prefix("RELEASE")   RELEASE_SCAN__DAYS=7
//!   .set("scan.days", 7)
//!   .set_option("scan/days=7")
//!        |
//!        v
//!    build() --> Config
//! ```

use std::path::PathBuf;

use super::{Config, SECTIONS};
use crate::error::{ConfigError, Result};

/// Builder for loading configuration from multiple sources.
#[derive(Debug)]
pub struct ConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: Option<String>,
    files: Vec<(String, PathBuf)>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: config::Config::builder(),
            env_prefix: None,
            files: Vec::new(),
        }
    }

    /// Adds a TOML configuration file to the loader.
    ///
    /// The file will be read when `build()` is called. If the file doesn't exist
    /// or contains invalid TOML, `build()` will return an error.
    #[must_use]
    pub fn add_toml_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        use config::{File, FileFormat};
        let p = path.as_ref();
        self.builder = self
            .builder
            .add_source(File::from(p).format(FileFormat::Toml).required(true));
        self.files.push(("file".to_string(), p.to_path_buf()));
        self
    }

    #[must_use]
    pub fn add_toml_file_optional<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        use config::{File, FileFormat};
        let p = path.as_ref();
        self.builder = self
            .builder
            .add_source(File::from(p).format(FileFormat::Toml).required(false));
        if p.exists() {
            self.files.push(("optional".to_string(), p.to_path_buf()));
        }
        self
    }

    #[must_use]
    pub fn add_toml_str(mut self, content: &str) -> Self {
        use config::{File, FileFormat};
        self.builder = self
            .builder
            .add_source(File::from_str(content, FileFormat::Toml));
        self.files
            .push(("string".to_string(), PathBuf::from("<string>")));
        self
    }

    /// Reads `<PREFIX>_<SECTION>__<KEY>` environment variables.
    ///
    /// Variables whose section is not a configuration section (for example
    /// `RELEASE_VERSION` set by a CI job) are ignored.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Sets a configuration override.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or if the value cannot be converted
    /// to a configuration value.
    pub fn set<T: Into<config::Value>>(mut self, key: &str, value: T) -> Result<Self> {
        self.builder = self
            .builder
            .set_override(key, value)
            .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;
        Ok(self)
    }

    /// Applies a `section/key=value` override as given on the command line.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ParseError` if the option is not of the form
    /// `section/key=value`.
    pub fn set_option(self, option: &str) -> Result<Self> {
        let (key, value) = parse_option(option)?;
        self.set(&key, value)
    }

    /// Builds the configuration from all added sources.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required configuration files are missing.
    /// - Configuration files have invalid TOML syntax.
    /// - Environment variables cannot be parsed.
    /// - The merged configuration cannot be deserialized into the `Config` struct.
    /// - The resulting configuration fails validation.
    pub fn build(self) -> Result<Config> {
        let builder = match &self.env_prefix {
            Some(prefix) => self.builder.add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(section_vars(
                        prefix,
                        std::env::vars_os().filter_map(|(key, value)| {
                            Some((key.into_string().ok()?, value.into_string().ok()?))
                        }),
                    ))),
            ),
            None => self.builder,
        };
        let cfg = builder.build()?;
        let mut config: Config = cfg.try_deserialize()?;
        config.resolve_and_validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn loaded_files(&self) -> Vec<(String, PathBuf)> {
        self.files.clone()
    }

    #[must_use]
    pub fn format_loaded_files(&self) -> Vec<String> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, (source, path))| format!("{}. [{}] {}", i + 1, source, path.display()))
            .collect()
    }
}

/// Keeps the `<PREFIX>_<SECTION>__<KEY>` variables whose section exists.
pub(crate) fn section_vars(
    prefix: &str,
    vars: impl IntoIterator<Item = (String, String)>,
) -> config::Map<String, String> {
    let head = format!("{}_", prefix.to_ascii_lowercase());
    vars.into_iter()
        .filter(|(key, _)| {
            let key = key.to_ascii_lowercase();
            key.strip_prefix(&head)
                .and_then(|rest| rest.split_once("__"))
                .is_some_and(|(section, _)| SECTIONS.contains(&section))
        })
        .collect()
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits `section/key=value` into a dotted key and its value.
pub(super) fn parse_option(option: &str) -> std::result::Result<(String, String), ConfigError> {
    let invalid = || ConfigError::ParseError {
        path: "--set".to_string(),
        message: format!("expected 'section/key=value', got '{option}'"),
    };

    let (key, value) = option.split_once('=').ok_or_else(invalid)?;
    let (section, name) = key.trim().split_once('/').ok_or_else(invalid)?;
    if section.is_empty() || name.is_empty() {
        return Err(invalid());
    }
    Ok((format!("{section}.{name}"), value.trim().to_string()))
}
