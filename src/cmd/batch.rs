// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Runs one blocking job per package on the tokio blocking pool.
//!
//! ```text
//! packages --> acquire permit (jobs, or 1 when interactive)
//!                  |             ^
//!                  v             | released when the job returns
//!            spawn_blocking(job) -+
//!
//! Ctrl-C or a user abort: no new package starts,
//! jobs already running finish.
//! ```
//!
//! Interactive batches keep the default Ctrl-C behaviour: a prompt blocks
//! on stdin and could not notice a cancelled token.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::types::PackageConfig;
use crate::error::{SyncError, SyncResult, bail_out};
use crate::logging::package_span;
use crate::reconcile::SyncContext;

/// Results of a batch, in package order.
#[derive(Debug)]
pub struct BatchReport<T> {
    /// Packages that ran, with their outcome.
    pub results: Vec<(String, SyncResult<T>)>,
    /// Packages never started because the batch was stopped.
    pub skipped: Vec<String>,
}

impl<T> BatchReport<T> {
    /// Number of failed packages.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_err()).count()
    }

    /// Take the first user abort out of the results, if any.
    pub fn take_abort(&mut self) -> Option<SyncError> {
        let index = self
            .results
            .iter()
            .position(|(_, r)| matches!(r, Err(e) if e.is_user_abort()))?;
        let (_, result) = self.results.remove(index);
        result.err()
    }
}

/// Run `job` for every package.
///
/// Interactive contexts run one package at a time so prompts never
/// interleave. A user abort in any job stops the batch like Ctrl-C does
/// in a non-interactive one.
pub async fn run_batch<T, F>(
    ctx: Arc<SyncContext>,
    jobs: usize,
    packages: Vec<(String, PackageConfig)>,
    job: F,
) -> BatchReport<T>
where
    T: Send + 'static,
    F: Fn(&SyncContext, &str, &PackageConfig) -> SyncResult<T> + Send + Sync + 'static,
{
    let cancel_token = CancellationToken::new();
    let watcher = watch_ctrl_c(ctx.interactive(), &cancel_token);

    let report = run_with_token(ctx, jobs, packages, job, &cancel_token).await;
    if let Some(watcher) = watcher {
        watcher.abort();
    }
    report
}

/// Turn Ctrl-C into a cancelled token, unless prompts may be waiting on
/// stdin.
fn watch_ctrl_c(interactive: bool, cancel_token: &CancellationToken) -> Option<JoinHandle<()>> {
    if interactive {
        return None;
    }
    let cancel_token = cancel_token.clone();
    Some(tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, no further packages will be started");
            cancel_token.cancel();
        }
    }))
}

async fn run_with_token<T, F>(
    ctx: Arc<SyncContext>,
    jobs: usize,
    packages: Vec<(String, PackageConfig)>,
    job: F,
    cancel_token: &CancellationToken,
) -> BatchReport<T>
where
    T: Send + 'static,
    F: Fn(&SyncContext, &str, &PackageConfig) -> SyncResult<T> + Send + Sync + 'static,
{
    let limit = if ctx.interactive() { 1 } else { jobs.max(1) };
    debug!(limit, packages = packages.len(), "starting batch");

    let semaphore = Arc::new(Semaphore::new(limit));
    let job = Arc::new(job);
    let names: Vec<String> = packages.iter().map(|(name, _)| name.clone()).collect();
    let mut slots: Vec<Option<SyncResult<T>>> = names.iter().map(|_| None).collect();
    let mut ids = HashMap::new();
    let mut set = JoinSet::new();
    let mut started = 0;

    for (index, (name, package)) in packages.into_iter().enumerate() {
        let permit = tokio::select! {
            biased;
            () = cancel_token.cancelled() => break,
            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };
        if cancel_token.is_cancelled() {
            break;
        }

        let ctx = Arc::clone(&ctx);
        let job = Arc::clone(&job);
        let cancel_token = cancel_token.clone();
        let handle = set.spawn_blocking(move || {
            let _span = package_span(&name, &package.path);
            let result = job(&ctx, &name, &package);
            if matches!(&result, Err(e) if e.is_user_abort()) {
                cancel_token.cancel();
            }
            drop(permit);
            (index, result)
        });
        ids.insert(handle.id(), index);
        started = index + 1;
    }

    while let Some(joined) = set.join_next_with_id().await {
        match joined {
            Ok((_, (index, result))) => slots[index] = Some(result),
            Err(e) => {
                if let Some(&index) = ids.get(&e.id()) {
                    slots[index] = Some(Err(bail_out(format!("package job panicked: {e}"))));
                }
            }
        }
    }

    let skipped = names[started..].to_vec();
    if !skipped.is_empty() {
        warn!(skipped = skipped.len(), "batch stopped before all packages ran");
    }

    let results = names
        .into_iter()
        .zip(slots)
        .take(started)
        .filter_map(|(name, slot)| slot.map(|result| (name, result)))
        .collect();

    BatchReport { results, skipped }
}
