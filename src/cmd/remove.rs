// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remove command implementation.

use std::sync::Arc;

use crate::cli::sync::RemoveArgs;
use crate::cmd::batch::run_batch;
use crate::config::Config;
use crate::error::Result;
use crate::reconcile::{DestructiveAction, SyncContext, UpdateTransaction};

use super::update::finish;

fn describe(name: &str, existed: bool, action: Option<DestructiveAction>) -> String {
    match (existed, action) {
        (false, _) => format!("{name} was already removed"),
        (true, Some(DestructiveAction::Discarded)) => {
            format!("Removed {name}, local changes discarded")
        }
        (true, _) => format!("Removed {name}"),
    }
}

/// Main handler for the remove command.
///
/// # Errors
///
/// Returns the user abort if one happened, otherwise an error naming how
/// many packages failed.
pub async fn run_remove_command(
    args: &RemoveArgs,
    config: &Config,
    ctx: Arc<SyncContext>,
) -> Result<()> {
    let packages = config.select_packages(&args.packages)?;
    if packages.is_empty() {
        tracing::warn!("No packages configured");
        return Ok(());
    }

    let config = Arc::new(config.clone());
    let jobs = config.reconcile.jobs;
    let report = run_batch(ctx, jobs, packages, move |ctx, name, package| {
        let policy = config.package_policy(name);
        let existed = package.path.exists();
        let action = UpdateTransaction::new(ctx, &policy).remove(&package.path)?;
        Ok(describe(name, existed, action))
    })
    .await;

    finish(report, "removed")
}
