// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   status, update, checkout, remove, config
//!
//! sync_context(config): locate git --> probe version --> SyncContext
//! ```

pub mod batch;
pub mod checkout;
pub mod config;
pub mod remove;
pub mod status;
pub mod update;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::git::backend::{ShellBackend, SyncAdapter};
use crate::git::version::GitVersion;
use crate::reconcile::{Console, SyncContext, TerminalConsole, resolve_interactive};

/// Build the shared context for one run.
///
/// The git version is probed here, once, and travels with the context.
///
/// # Errors
///
/// Returns an error if git is not on `PATH` or its version banner cannot
/// be read.
pub fn sync_context(config: &Config) -> Result<Arc<SyncContext>> {
    let backend = ShellBackend::locate()?;
    debug!(git = %backend.program().display(), "using git");
    let adapter: Arc<dyn SyncAdapter> = Arc::new(backend);
    let console: Arc<dyn Console> = Arc::new(TerminalConsole);
    Ok(Arc::new(build_context(adapter, console, config)?))
}

/// Probe the tool version and assemble the context from its parts.
///
/// # Errors
///
/// Returns an error if the version probe fails.
pub fn build_context(
    adapter: Arc<dyn SyncAdapter>,
    console: Arc<dyn Console>,
    config: &Config,
) -> Result<SyncContext> {
    let version = GitVersion::probe(adapter.as_ref())?;
    if !version.supports_include_untracked() {
        warn!(%version, "git is older than 1.7.7, stashes will leave untracked files behind");
    }
    let interactive = resolve_interactive(config.global.interactive, console.as_ref());
    debug!(%version, interactive, "sync context ready");

    Ok(SyncContext::builder()
        .adapter(adapter)
        .console(console)
        .version(version)
        .interactive(interactive)
        .build())
}
