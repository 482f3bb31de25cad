// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Status command: local and unpushed changes per package.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use serde::Serialize;

use crate::cli::sync::StatusArgs;
use crate::cmd::batch::run_batch;
use crate::config::Config;
use crate::config::types::PackageConfig;
use crate::error::{Result, SyncResult};
use crate::git::query;
use crate::reconcile::{ChangeDetector, SyncContext, open_working_copy};

bitflags! {
    /// Kinds of change found in a working copy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeKinds: u8 {
        /// Modified tracked files.
        const LOCAL = 0x01;

        /// Commits no remote is known to have.
        const UNPUSHED = 0x02;
    }
}

impl fmt::Display for ChangeKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "clean");
        }
        let mut kinds = Vec::new();
        if self.contains(Self::LOCAL) {
            kinds.push("local changes");
        }
        if self.contains(Self::UNPUSHED) {
            kinds.push("unpushed changes");
        }
        write!(f, "{}", kinds.join(", "))
    }
}

/// One line of the status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageStatus {
    pub package: String,
    pub path: String,
    /// Checked-out branch, `None` on a detached HEAD.
    pub branch: Option<String>,
    pub local: Option<String>,
    pub unpushed: Option<String>,
}

impl PackageStatus {
    #[must_use]
    pub const fn kinds(&self) -> ChangeKinds {
        let mut kinds = ChangeKinds::empty();
        if self.local.is_some() {
            kinds = kinds.union(ChangeKinds::LOCAL);
        }
        if self.unpushed.is_some() {
            kinds = kinds.union(ChangeKinds::UNPUSHED);
        }
        kinds
    }

    /// Text rendering: a summary line, then the changes indented.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let on = self.branch.as_deref().unwrap_or("detached HEAD");
        let mut lines = vec![format!(
            "{} ({}) on {on}: {}",
            self.package,
            self.path,
            self.kinds()
        )];
        for changes in [&self.local, &self.unpushed].into_iter().flatten() {
            lines.extend(changes.lines().map(|line| format!("    {line}")));
        }
        lines
    }
}

/// Inspect one working copy.
///
/// Files, the index and local branches are left alone. Looking for
/// unpushed commits may run `git fetch --all`, which updates the
/// remote-tracking refs.
///
/// # Errors
///
/// Returns an error if the path is not a git working copy or a status
/// query fails.
pub fn inspect(ctx: &SyncContext, package: &str, config: &PackageConfig) -> SyncResult<PackageStatus> {
    let path = open_working_copy(&config.path)?;
    let detector = ChangeDetector::new(ctx.adapter());
    let local = detector.local_changes(&path)?;
    let unpushed = detector.unpushed_changes(&path)?;
    let branch = query::current_branch(&path)?;

    Ok(PackageStatus {
        package: package.to_string(),
        path: path.to_string(),
        branch,
        local: local.map(|c| c.text().to_string()),
        unpushed: unpushed.map(|c| c.text().to_string()),
    })
}

/// Main handler for the status command.
///
/// # Errors
///
/// Returns an error for an unknown package name, a failed inspection, or
/// when JSON serialization fails.
pub async fn run_status_command(
    args: &StatusArgs,
    config: &Config,
    ctx: Arc<SyncContext>,
) -> Result<()> {
    let packages = config.select_packages(&args.packages)?;
    if packages.is_empty() {
        tracing::warn!("No packages configured");
        return Ok(());
    }

    let report = run_batch(ctx, config.reconcile.jobs, packages, inspect).await;

    let mut statuses = Vec::new();
    let mut failed = 0;
    for (package, result) in report.results {
        match result {
            Ok(status) => statuses.push(status),
            Err(e) => {
                failed += 1;
                eprintln!("{package}: {e}");
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else {
        for status in &statuses {
            for line in status.render() {
                println!("{line}");
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} package(s) could not be inspected");
    }
    Ok(())
}
