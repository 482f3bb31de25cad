// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Change reconciliation before a destructive checkout.
//!
//! ```text
//!  unpushed changes? --yes--> interactive or policy != true --> UnpushedChanges
//!         |
//!  local changes? --no--> Ok
//!         |
//!    interactive?
//!     |        |
//!    no       yes --> Prompt: y discard / s stash / n Aborted
//!     |
//!  policy: true  --> discard (clean -df + reset --hard)
//!          stash --> stash (update only)
//!          else  --> UncommittedChanges
//! ```

pub mod prompt;

use crate::config::types::DiscardPolicy;
use crate::error::{ReconcileError, SyncResult};
use crate::reconcile::SyncContext;
use crate::reconcile::detect::ChangeDetector;
use crate::reconcile::session::{DestructiveAction, ReconcileSession};
use std::fmt;
use tracing::{debug, info, warn};

use prompt::{Choice, Prompt};

/// What the pending destructive operation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Update,
    Uninstall,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::Uninstall => write!(f, "uninstall"),
        }
    }
}

/// Decides what happens to local modifications, and does it.
pub struct ChangeReconciler<'a> {
    ctx: &'a SyncContext,
    policy: DiscardPolicy,
}

impl<'a> ChangeReconciler<'a> {
    #[must_use]
    pub const fn new(ctx: &'a SyncContext, policy: DiscardPolicy) -> Self {
        Self { ctx, policy }
    }

    /// Make the working copy safe to overwrite, or fail.
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::UnpushedChanges`] when unpushed work could be lost
    /// - [`ReconcileError::UncommittedChanges`] when no policy applies
    /// - [`ReconcileError::Aborted`] when the user answers "n"
    /// - discard/stash failures with raw output
    pub fn clean_changes(
        &self,
        session: &mut ReconcileSession,
        operation: Operation,
    ) -> SyncResult<()> {
        let detector = ChangeDetector::new(self.ctx.adapter());
        let path = session.path().clone();

        if let Some(unpushed) = detector.unpushed_changes(&path)?
            && (self.ctx.interactive() || !self.policy.discards_silently())
        {
            return Err(ReconcileError::UnpushedChanges {
                path: path.to_string(),
                changes: unpushed.to_string(),
            }
            .into());
        }

        let Some(changes) = detector.local_changes(&path)? else {
            debug!(path = %path, "no local changes");
            return Ok(());
        };

        if !self.ctx.interactive() {
            return match (self.policy, operation) {
                (DiscardPolicy::Always, _) => self.discard(session),
                (DiscardPolicy::Stash, Operation::Update) => self.stash(session),
                _ => Err(ReconcileError::UncommittedChanges {
                    path: path.to_string(),
                }
                .into()),
            };
        }

        let prompt = Prompt::new(
            self.ctx.console(),
            operation,
            &path.to_string(),
            changes.text(),
        );
        match prompt.run(|| detector.working_tree_diff(&path))? {
            Choice::Discard => self.discard(session),
            Choice::Stash => self.stash(session),
            Choice::Abort => Err(ReconcileError::Aborted {
                operation: operation.to_string(),
            }
            .into()),
        }
    }

    fn discard(&self, session: &mut ReconcileSession) -> SyncResult<()> {
        session.ensure_untouched()?;
        info!(path = %session.path(), "discarding local changes");

        let output = self.ctx.adapter().clean_and_reset(session.path())?;
        if !output.success() {
            return Err(ReconcileError::DiscardFailed {
                path: session.path().to_string(),
                output: output.stderr().to_string(),
            }
            .into());
        }
        session.record(DestructiveAction::Discarded)
    }

    fn stash(&self, session: &mut ReconcileSession) -> SyncResult<()> {
        session.ensure_untouched()?;
        info!(path = %session.path(), "stashing local changes");

        let include_untracked = self.ctx.version().supports_include_untracked();
        if !include_untracked {
            warn!(
                version = %self.ctx.version(),
                "git is too old to stash untracked files, stashing tracked changes only"
            );
        }

        let output = self
            .ctx
            .adapter()
            .stash(session.path(), include_untracked)?;
        if !output.success() {
            return Err(ReconcileError::StashFailed {
                path: session.path().to_string(),
                output: output.stderr().to_string(),
            }
            .into());
        }
        session.record(DestructiveAction::Stashed)
    }
}
