// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for depsync.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. depsync.toml (cwd)
//! 3. --ini files
//! 4. DEPSYNC_* env vars
//! 5. --set section/key=value and CLI flags
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! DEPSYNC_RECONCILE_REMOTE=origin        → reconcile.remote = "origin"
//! DEPSYNC_GLOBAL_INTERACTIVE=never       → global.interactive = "never"
//! ```
//!
//! # Package-Specific Overrides
//!
//! ```toml
//! [reconcile]
//! discard_changes = false
//!
//! [overrides."acme/*"]
//! discard_changes = "stash" # stash for every acme package
//! ```

pub mod loader;
pub mod merge;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wax::Program as _;

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use merge::PolicyOverride;
use types::{GlobalConfig, PackageConfig, ReconcileConfig};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Default reconciliation settings.
    pub reconcile: ReconcileConfig,
    /// Managed working copies, keyed by package name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub packages: BTreeMap<String, PackageConfig>,
    /// Per-package policy overrides, keyed by name or glob.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, PolicyOverride>,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use depsync::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file("depsync.toml")
    ///     .with_env_prefix("DEPSYNC")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
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

    /// Effective reconcile settings for a package.
    ///
    /// Resolution order:
    /// 1. Exact match on package name (e.g., `[overrides."acme/lib"]`)
    /// 2. Glob pattern match (e.g., `[overrides."acme/*"]`)
    /// 3. Default `[reconcile]` config
    #[must_use]
    pub fn package_policy(&self, package: &str) -> ReconcileConfig {
        if let Some(config) = self.overrides.get(package) {
            return merge::merge_reconcile_config(&self.reconcile, config);
        }

        for (pattern, config) in &self.overrides {
            if let Ok(glob) = wax::Glob::new(pattern)
                && glob.is_match(package)
            {
                return merge::merge_reconcile_config(&self.reconcile, config);
            }
        }

        self.reconcile.clone()
    }

    /// Select configured packages by name; an empty selection means all.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownPackage`] for a name with no `[packages]` entry.
    pub fn select_packages(&self, names: &[String]) -> Result<Vec<(String, PackageConfig)>> {
        if names.is_empty() {
            return Ok(self
                .packages
                .iter()
                .map(|(name, package)| (name.clone(), package.clone()))
                .collect());
        }

        names
            .iter()
            .map(|name| {
                self.packages
                    .get(name)
                    .map(|package| (name.clone(), package.clone()))
                    .ok_or_else(|| ConfigError::UnknownPackage(name.clone()).into())
            })
            .collect()
    }

    /// Validate values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty remote name, zero jobs or a package
    /// without path or reference.
    pub fn validate(&self) -> Result<()> {
        if self.reconcile.remote.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                section: "reconcile".to_string(),
                key: "remote".to_string(),
                message: "remote name must not be empty".to_string(),
            }
            .into());
        }
        if self.reconcile.jobs == 0 {
            return Err(ConfigError::InvalidValue {
                section: "reconcile".to_string(),
                key: "jobs".to_string(),
                message: "jobs must be at least 1".to_string(),
            }
            .into());
        }
        for (name, package) in &self.packages {
            if package.path.as_os_str().is_empty() {
                return Err(ConfigError::MissingKey {
                    section: format!("packages.{name}"),
                    key: "path".to_string(),
                }
                .into());
            }
            if package.reference.trim().is_empty() {
                return Err(ConfigError::MissingKey {
                    section: format!("packages.{name}"),
                    key: "reference".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_reconcile_options(&mut options);
        self.format_package_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            u8::from(self.global.output_log_level).to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            u8::from(self.global.file_log_level).to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global.log_file.display().to_string(),
        );
        options.insert(
            "global.interactive".into(),
            self.global.interactive.to_string(),
        );
    }

    fn format_reconcile_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "reconcile.discard_changes".into(),
            self.reconcile.discard_changes.to_string(),
        );
        options.insert("reconcile.remote".into(), self.reconcile.remote.clone());
        options.insert("reconcile.jobs".into(), self.reconcile.jobs.to_string());
    }

    fn format_package_options(&self, options: &mut BTreeMap<String, String>) {
        for (name, package) in &self.packages {
            options.insert(
                format!("packages.{name}.path"),
                package.path.display().to_string(),
            );
            options.insert(
                format!("packages.{name}.reference"),
                package.reference.clone(),
            );
            if !package.version.is_empty() {
                options.insert(format!("packages.{name}.version"), package.version.clone());
            }
            if let Some(url) = &package.url {
                options.insert(format!("packages.{name}.url"), url.clone());
            }
            options.insert(
                format!("packages.{name}.discard_changes"),
                self.package_policy(name).discard_changes.to_string(),
            );
        }
    }
}
