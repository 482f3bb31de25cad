// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Checkout command: one update transaction on an arbitrary path.

use std::sync::Arc;

use crate::cli::sync::CheckoutArgs;
use crate::config::Config;
use crate::config::types::PackageConfig;
use crate::error::Result;
use crate::logging::package_span;
use crate::reconcile::{SyncContext, UpdateRequest, UpdateTransaction};

use super::update::describe;

/// Package name for an unconfigured path: its final component.
#[must_use]
pub fn package_name(args: &CheckoutArgs) -> String {
    args.package.clone().unwrap_or_else(|| {
        args.path.file_name().map_or_else(
            || args.path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    })
}

/// Main handler for the checkout command.
///
/// # Errors
///
/// Returns any reconciliation, fetch or checkout error of the transaction.
pub async fn run_checkout_command(
    args: &CheckoutArgs,
    config: &Config,
    ctx: Arc<SyncContext>,
) -> Result<()> {
    let package = package_name(args);
    let policy = config.package_policy(&package);
    let request = UpdateRequest::builder()
        .package(package.as_str())
        .path(&args.path)
        .reference(&args.reference)
        .maybe_pretty_version(args.pretty_version.clone())
        .maybe_url(args.url.clone())
        .build();
    let shown = PackageConfig {
        path: args.path.clone(),
        reference: args.reference.clone(),
        version: args.pretty_version.clone().unwrap_or_default(),
        url: args.url.clone(),
    };

    let line = tokio::task::spawn_blocking(move || {
        let _span = package_span(&package, &shown.path);
        UpdateTransaction::new(&ctx, &policy)
            .run(&request)
            .map(|outcome| describe(&package, &shown, &outcome))
    })
    .await??;

    println!("{line}");
    Ok(())
}
