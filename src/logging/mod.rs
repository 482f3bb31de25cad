// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Logging setup.
//!
//! ```text
//!             registry
//!            |        |
//!            v        v
//!   stderr console    log file (optional, appended)
//!   depsync=<level>   non_blocking writer
//!   others <= warn    package spans closed with durations
//! ```
//!
//! Console output goes to stderr so `status --json` keeps stdout clean.
//! Other crates (gix, tokio) never log above `warn` on either layer.

use anyhow::Context;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{ConfigError, Result};

/// Verbosity, configured as an integer 0-5.
///
/// `Info` shows destructive actions and checkouts, `Debug` adds every git
/// command line, `Trace` adds exit codes and raw tool output.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum LogLevel {
    Silent = 0,
    Error = 1,
    Warn = 2,
    #[default]
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Highest accepted integer value.
    pub const MAX: u8 = 5;

    const fn directive(self) -> &'static str {
        match self {
            Self::Silent => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// `EnvFilter` directive: this crate at the level, everything else
    /// capped at `warn`.
    #[must_use]
    pub fn filter_directive(self) -> String {
        if self == Self::Silent {
            return Self::Silent.directive().to_string();
        }
        format!(
            "{},depsync={}",
            self.min(Self::Warn).directive(),
            self.directive()
        )
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::new(self.filter_directive())
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = ConfigError;

    fn try_from(value: u8) -> std::result::Result<Self, <Self as TryFrom<u8>>::Error> {
        Ok(match value {
            0 => Self::Silent,
            1 => Self::Error,
            2 => Self::Warn,
            3 => Self::Info,
            4 => Self::Debug,
            5 => Self::Trace,
            _ => {
                return Err(ConfigError::InvalidValue {
                    section: "global".to_string(),
                    key: "log_level".to_string(),
                    message: format!("log level must be 0-{}, got {value}", Self::MAX),
                });
            }
        })
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self {
        level as Self
    }
}

/// What `init_logging` sets up.
#[derive(Debug, Clone, Builder)]
pub struct LogConfig {
    #[builder(default)]
    console_level: LogLevel,
    #[builder(default = LogLevel::Trace)]
    file_level: LogLevel,
    /// No file layer when unset.
    #[builder(into)]
    log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LogConfig {
    #[must_use]
    pub const fn console_level(&self) -> LogLevel {
        self.console_level
    }

    #[must_use]
    pub const fn file_level(&self) -> LogLevel {
        self.file_level
    }

    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

/// Flushes the log file when dropped. Keep it alive until exit.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> Result<LogGuard> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .with_filter(config.console_level.filter());

    let (file_layer, file_guard) = match config.log_file() {
        Some(path) if config.file_level != LogLevel::Silent => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(config.file_level.filter());
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install the log subscriber")?;

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Enter a span that tags every event with the package being processed.
///
/// The file layer records span close events, so each package's work shows
/// up with its total duration.
#[must_use]
pub fn package_span(package: &str, path: &Path) -> tracing::span::EnteredSpan {
    tracing::info_span!("package", name = %package, path = %path.display()).entered()
}
