// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Update command implementation.

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::cli::sync::UpdateArgs;
use crate::cmd::batch::{BatchReport, run_batch};
use crate::config::Config;
use crate::config::types::PackageConfig;
use crate::error::Result;
use crate::reconcile::{
    DestructiveAction, SyncContext, UpdateOutcome, UpdateRequest, UpdateTransaction,
};

/// Build the transaction input for a configured package.
#[must_use]
pub fn request_for(name: &str, package: &PackageConfig) -> UpdateRequest {
    UpdateRequest::builder()
        .package(name)
        .path(&package.path)
        .reference(&package.reference)
        .maybe_pretty_version((!package.version.is_empty()).then(|| package.version.clone()))
        .maybe_url(package.url.clone())
        .build()
}

/// One result line for a finished update.
#[must_use]
pub fn describe(name: &str, package: &PackageConfig, outcome: &UpdateOutcome) -> String {
    let mut line = format!("Updated {name} to {}", package.pretty_version());
    if let Some(branch) = &outcome.branch {
        line.push_str(&format!(" (using branch {branch})"));
    }
    match outcome.action {
        Some(DestructiveAction::Discarded) => line.push_str(", local changes discarded"),
        Some(DestructiveAction::Stashed) => line.push_str(", local changes reapplied"),
        None => {}
    }
    line
}

/// Main handler for the update command.
///
/// # Errors
///
/// Returns the user abort if one happened, otherwise an error naming how
/// many packages failed.
pub async fn run_update_command(
    args: &UpdateArgs,
    config: &Config,
    ctx: Arc<SyncContext>,
) -> Result<()> {
    let packages = config.select_packages(&args.packages)?;
    if packages.is_empty() {
        tracing::warn!("No packages configured");
        return Ok(());
    }

    let jobs = args.jobs.map_or(config.reconcile.jobs, NonZeroUsize::get);
    let config = Arc::new(config.clone());

    let report = run_batch(ctx, jobs, packages, move |ctx, name, package| {
        let policy = config.package_policy(name);
        let outcome = UpdateTransaction::new(ctx, &policy).run(&request_for(name, package))?;
        Ok(describe(name, package, &outcome))
    })
    .await;

    finish(report, "updated")
}

/// Print a batch of result lines and turn failures into the command error.
pub(crate) fn finish(mut report: BatchReport<String>, verb: &str) -> Result<()> {
    let abort = report.take_abort();
    let total = report.results.len() + report.skipped.len() + usize::from(abort.is_some());
    let failed = report.failures();

    for (package, result) in &report.results {
        match result {
            Ok(line) => println!("{line}"),
            Err(e) => {
                eprintln!("{package}: {e}");
                if let Some(hint) = e.remediation_hint() {
                    eprintln!("{package}: hint: {hint}");
                }
            }
        }
    }
    for package in &report.skipped {
        eprintln!("{package}: skipped");
    }

    if let Some(abort) = abort {
        return Err(abort.into());
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {total} package(s) could not be {verb}");
    }
    if !report.skipped.is_empty() {
        anyhow::bail!("interrupted, {} package(s) not {verb}", report.skipped.len());
    }
    Ok(())
}
