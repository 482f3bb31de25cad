// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! One update (or removal) of one working copy.
//!
//! ```text
//! normalize path --> claim session
//!       |
//!  clean_changes(update)          may discard or stash
//!       |
//!  remote set-url (if url)
//!       |
//!  rev-parse --verify ref^{commit} --fail--> fetch remote + tags
//!       |
//!  update_to_commit --fail--> error (stash stays in place)
//!       |
//!  reapply (stash pop)
//! ```
//!
//! Once a discard or stash has run, the sequence always continues to a
//! checkout or a fatal error.

use crate::config::types::ReconcileConfig;
use crate::error::{GitError, SyncResult};
use crate::git::query;
use crate::reconcile::SyncContext;
use crate::reconcile::checkout::{CheckoutExecutor, CheckoutTarget};
use crate::reconcile::reconciler::{ChangeReconciler, Operation};
use crate::reconcile::session::{DestructiveAction, WorkingCopyPath};
use bon::Builder;
use std::path::PathBuf;
use tracing::{info, warn};

/// A resolved target for one package.
#[derive(Debug, Clone, Builder)]
pub struct UpdateRequest {
    #[builder(into)]
    package: String,
    #[builder(into)]
    path: PathBuf,
    #[builder(into)]
    reference: String,
    /// Defaults to the reference.
    #[builder(into)]
    pretty_version: Option<String>,
    #[builder(into)]
    url: Option<String>,
}

impl UpdateRequest {
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    #[must_use]
    pub fn pretty_version(&self) -> &str {
        self.pretty_version.as_deref().unwrap_or(&self.reference)
    }
}

/// What an update did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub path: WorkingCopyPath,
    /// Discard or stash performed before checkout.
    pub action: Option<DestructiveAction>,
    /// Branch used when it differs from the one named by the version.
    pub branch: Option<String>,
}

/// Runs update and removal sequences under one policy.
pub struct UpdateTransaction<'a> {
    ctx: &'a SyncContext,
    policy: &'a ReconcileConfig,
}

impl<'a> UpdateTransaction<'a> {
    #[must_use]
    pub const fn new(ctx: &'a SyncContext, policy: &'a ReconcileConfig) -> Self {
        Self { ctx, policy }
    }

    /// Bring the working copy to the requested reference.
    ///
    /// # Errors
    ///
    /// Returns any reconciliation, fetch or checkout error. Changes stashed
    /// before a failed checkout are left in the stash.
    pub fn run(&self, request: &UpdateRequest) -> SyncResult<UpdateOutcome> {
        let path = open_working_copy(&request.path)?;
        let mut session = self.ctx.registry().claim(path)?;
        let adapter = self.ctx.adapter();

        ChangeReconciler::new(self.ctx, self.policy.discard_changes)
            .clean_changes(&mut session, Operation::Update)?;

        let remote = self.policy.remote.as_str();
        if let Some(url) = &request.url {
            adapter
                .set_remote_url(session.path(), remote, url)?
                .into_checked()?;
        }

        if !adapter
            .verify_commit(session.path(), &request.reference)?
            .success()
        {
            info!(path = %session.path(), remote, "reference not present locally, fetching");
            adapter.fetch_remote(session.path(), remote)?.into_checked()?;
        }

        let target = CheckoutTarget {
            package: &request.package,
            reference: &request.reference,
            pretty_version: request.pretty_version(),
        };
        let branch = match CheckoutExecutor::new(self.ctx, remote).update_to_commit(&session, target)
        {
            Ok(branch) => branch,
            Err(e) => {
                if session.action() == Some(DestructiveAction::Stashed) {
                    warn!(
                        path = %session.path(),
                        "checkout failed, local changes remain in the stash (git stash pop)"
                    );
                }
                return Err(e);
            }
        };

        let outcome = UpdateOutcome {
            path: session.path().clone(),
            action: session.action(),
            branch,
        };
        session.reapply(adapter)?;
        Ok(outcome)
    }

    /// Reconcile for uninstall, then delete the working copy.
    ///
    /// A path that no longer exists is already removed.
    ///
    /// # Errors
    ///
    /// Returns any reconciliation error, or an I/O error from deletion.
    pub fn remove(&self, raw_path: &std::path::Path) -> SyncResult<Option<DestructiveAction>> {
        if !raw_path.exists() {
            info!(path = %raw_path.display(), "already removed");
            return Ok(None);
        }

        let path = open_working_copy(raw_path)?;
        let mut session = self.ctx.registry().claim(path)?;
        ChangeReconciler::new(self.ctx, self.policy.discard_changes)
            .clean_changes(&mut session, Operation::Uninstall)?;

        info!(path = %session.path(), "removing working copy");
        std::fs::remove_dir_all(session.path())?;
        Ok(session.action())
    }
}

/// Normalize once and make sure the path is the root of its own repository.
///
/// A plain directory inside an enclosing project's work tree is rejected;
/// git commands run there would act on the enclosing project.
///
/// # Errors
///
/// Returns an I/O error when the path cannot be canonicalized and
/// [`GitError::NotARepository`] when it is not the root of a git working
/// copy.
pub fn open_working_copy(raw: &std::path::Path) -> SyncResult<WorkingCopyPath> {
    let path = WorkingCopyPath::normalize(raw)?;
    if !query::is_working_copy_root(&path) {
        return Err(GitError::NotARepository {
            path: path.to_string(),
        }
        .into());
    }
    Ok(path)
}
