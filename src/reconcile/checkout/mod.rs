// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Moving a working copy to a resolved reference.
//!
//! # Strategies (first success wins)
//!
//! ```text
//! 1. reference is a branch and <remote>/<reference> exists
//!      checkout -B <branch> <remote>/<reference>
//!      reset --hard <remote>/<reference>
//!
//! 2. reference is a hash
//!      (<branch> := v<branch> if only <remote>/v<branch> exists)
//!      checkout <branch>  ||  checkout -B <branch> <remote>/<branch>
//!      reset --hard <reference>
//!
//! 3. checkout <reference>
//!    reset --hard <reference>
//! ```
//!
//! `<branch>` is the pretty version without dev decoration. Every checkout
//! is forced when the session already discarded or stashed.

use crate::error::{ReconcileError, SyncError, SyncResult};
use crate::git::backend::CommandOutput;
use crate::git::refs::RemoteRefTable;
use crate::reconcile::SyncContext;
use crate::reconcile::reference::{Reference, is_dev_version, strip_dev_decoration};
use crate::reconcile::session::ReconcileSession;
use tracing::{debug, info, warn};

/// What to check out.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutTarget<'a> {
    /// Package name, used in the remediation hint.
    pub package: &'a str,
    /// Resolved reference (commit hash, branch or tag).
    pub reference: &'a str,
    /// Version string the reference was resolved from.
    pub pretty_version: &'a str,
}

/// Runs the checkout strategies against one working copy.
pub struct CheckoutExecutor<'a> {
    ctx: &'a SyncContext,
    remote: &'a str,
}

impl<'a> CheckoutExecutor<'a> {
    #[must_use]
    pub const fn new(ctx: &'a SyncContext, remote: &'a str) -> Self {
        Self { ctx, remote }
    }

    /// Check out `target`, trying each strategy in order.
    ///
    /// Returns the branch name actually used when it differs from the one
    /// derived from the pretty version (the `v` prefix correction),
    /// otherwise `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::HistoryRewritten`] when every strategy
    /// failed and git named the reference, else
    /// [`ReconcileError::CheckoutFailed`].
    pub fn update_to_commit(
        &self,
        session: &ReconcileSession,
        target: CheckoutTarget<'_>,
    ) -> SyncResult<Option<String>> {
        let path = session.path();
        let adapter = self.ctx.adapter();
        let force = session.force_checkout();
        let mut branch = strip_dev_decoration(target.pretty_version).to_string();

        let listing = adapter.list_refs(path, false, false)?;
        let refs = listing
            .success()
            .then(|| RemoteRefTable::parse(listing.stdout()));
        let reference = refs.as_ref().map_or_else(
            || Reference::classify(target.reference),
            |refs| Reference::classify_with_refs(target.reference, refs),
        );
        if let Reference::Tag(tag) = &reference {
            info!(path = %path, tag = %tag, "reference is a tag, skipping remote branch lookup");
        }

        let mut last = CommandOutput::default();

        // 1. exact remote branch
        if matches!(reference, Reference::Branch(_))
            && refs
                .as_ref()
                .is_some_and(|r| r.has_remote_branch(self.remote, target.reference))
        {
            let source = format!("{}/{}", self.remote, target.reference);
            debug!(path = %path, branch = %branch, source = %source, "checkout from remote branch");
            if succeeded(&mut last, adapter.create_branch_from(path, &branch, &source, force)?)
                && succeeded(&mut last, adapter.reset_hard(path, &source)?)
            {
                info!(path = %path, branch = %branch, "checked out");
                return Ok(None);
            }
        }

        // 2. commit hash on a named branch
        if reference.is_commit_hash() {
            let mut corrected = None;
            if let Some(refs) = &refs
                && !refs.has_remote_branch(self.remote, &branch)
                && refs.has_remote_branch(self.remote, &format!("v{branch}"))
            {
                branch = format!("v{branch}");
                corrected = Some(branch.clone());
            }

            debug!(path = %path, branch = %branch, "checkout commit on branch");
            let source = format!("{}/{branch}", self.remote);
            let on_branch = succeeded(&mut last, adapter.checkout(path, &branch, force)?)
                || succeeded(
                    &mut last,
                    adapter.create_branch_from(path, &branch, &source, force)?,
                );
            if on_branch && succeeded(&mut last, adapter.reset_hard(path, target.reference)?) {
                info!(path = %path, branch = %branch, reference = target.reference, "checked out");
                return Ok(corrected);
            }
        }

        // 3. raw reference
        debug!(path = %path, reference = target.reference, "checkout reference");
        if succeeded(&mut last, adapter.checkout(path, target.reference, force)?)
            && succeeded(&mut last, adapter.reset_hard(path, target.reference)?)
        {
            info!(path = %path, reference = target.reference, "checked out");
            return Ok(None);
        }

        Err(self.failure(target, &last))
    }

    fn failure(&self, target: CheckoutTarget<'_>, output: &CommandOutput) -> SyncError {
        if !output.stderr().contains(target.reference) {
            return ReconcileError::CheckoutFailed {
                command: output.command().to_string(),
                output: output.stderr().to_string(),
            }
            .into();
        }

        let line = format!("    {} is gone (history was rewritten?)", target.reference);
        warn!(reference = target.reference, "reference is gone (history was rewritten?)");
        self.ctx.console().write_error(&line);

        let cause = if is_dev_version(target.pretty_version) {
            "the commit was removed from the branch"
        } else {
            "the tag was recreated"
        };
        ReconcileError::HistoryRewritten {
            reference: target.reference.to_string(),
            command: output.command().to_string(),
            output: output.stderr().to_string(),
            hint: format!(
                "It looks like the commit hash is not available in the repository, maybe {cause}? \
                 Run \"depsync update {}\" to resolve this.",
                target.package
            ),
        }
        .into()
    }
}

/// Remember a failed step for the final diagnostic.
fn succeeded(last: &mut CommandOutput, output: CommandOutput) -> bool {
    if output.success() {
        return true;
    }
    *last = output;
    false
}
