// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for depsync.
//!
//! # Config Structure
//!
//! ```text
//! Config: GlobalConfig, ReconcileConfig, packages, overrides
//! packages:  name → PackageConfig { path, reference, version, url }
//! overrides: name or glob → PolicyOverride
//! ```
//!
//! # Discard Policy
//!
//! ```text
//! discard_changes = false    → caller default (fail on local changes)
//! discard_changes = true     → clean + reset --hard
//! discard_changes = "stash"  → stash, reapply after update
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::logging::LogLevel;

/// What the non-interactive reconciler does with local modifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscardPolicy {
    /// Defer to the caller's default: refuse to touch modified working copies.
    #[default]
    Never,
    /// Throw local modifications away.
    Always,
    /// Stash local modifications and pop them after the update.
    Stash,
}

impl DiscardPolicy {
    /// Whether unpushed commits may be silently dropped under this policy.
    #[must_use]
    pub const fn discards_silently(self) -> bool {
        matches!(self, Self::Always)
    }
}

impl std::fmt::Display for DiscardPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Never => write!(f, "false"),
            Self::Always => write!(f, "true"),
            Self::Stash => write!(f, "stash"),
        }
    }
}

impl std::str::FromStr for DiscardPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "false" | "0" | "no" | "" => Ok(Self::Never),
            "true" | "1" | "yes" => Ok(Self::Always),
            "stash" => Ok(Self::Stash),
            _ => Err(ConfigError::InvalidValue {
                section: "reconcile".to_string(),
                key: "discard_changes".to_string(),
                message: format!("expected true, false or \"stash\", got '{s}'"),
            }),
        }
    }
}

impl Serialize for DiscardPolicy {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Never => serializer.serialize_bool(false),
            Self::Always => serializer.serialize_bool(true),
            Self::Stash => serializer.serialize_str("stash"),
        }
    }
}

impl<'de> Deserialize<'de> for DiscardPolicy {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Word(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Ok(Self::Always),
            Raw::Flag(false) => Ok(Self::Never),
            Raw::Word(word) => word.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// When to ask the user instead of applying the configured policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractiveMode {
    /// Prompt only when stdin is a terminal.
    #[default]
    Auto,
    /// Always prompt.
    Always,
    /// Never prompt; apply `discard_changes`.
    Never,
}

impl std::fmt::Display for InteractiveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Always => write!(f, "always"),
            Self::Never => write!(f, "never"),
        }
    }
}

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Log level for console output (0-5).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-5).
    pub file_log_level: LogLevel,
    /// Path to log file.
    pub log_file: PathBuf,
    /// Prompt behaviour.
    pub interactive: InteractiveMode,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::Info,
            file_log_level: LogLevel::Trace,
            log_file: PathBuf::from("depsync.log"),
            interactive: InteractiveMode::Auto,
        }
    }
}

/// Reconciliation settings, the base that per-package overrides merge onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Non-interactive handling of local modifications.
    pub discard_changes: DiscardPolicy,
    /// Remote the resolver fetches resolved references into.
    pub remote: String,
    /// Working copies processed at once in non-interactive runs.
    pub jobs: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            discard_changes: DiscardPolicy::Never,
            remote: "composer".to_string(),
            jobs: 4,
        }
    }
}

/// One managed working copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
    /// Checkout directory.
    pub path: PathBuf,
    /// Resolved target reference (commit hash, branch or tag).
    pub reference: String,
    /// Pretty version string the reference was resolved from.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Source URL to point the sync remote at before fetching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PackageConfig {
    /// Pretty version, falling back to the raw reference.
    #[must_use]
    pub fn pretty_version(&self) -> &str {
        if self.version.is_empty() {
            &self.reference
        } else {
            &self.version
        }
    }
}
