// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Working-copy reconciliation engine.
//!
//! ```text
//!                  UpdateTransaction
//!                         |
//!   +----------+----------+-----------+-------------+
//!   v          v                      v             v
//! session   ChangeReconciler    CheckoutExecutor  reapply
//! (claim)        |                    |          (stash pop)
//!                v                    v
//!          ChangeDetector         Reference
//!          local / unpushed       classify
//!                |                    |
//!                +---------+----------+
//!                          v
//!              SyncAdapter (git CLI, only I/O)
//! ```
//!
//! Every stage for one working copy runs sequentially on the calling
//! thread. Separate working copies may run in parallel; the
//! [`SessionRegistry`] keeps each path to one sequence at a time.

pub mod checkout;
pub mod detect;
pub mod reconciler;
pub mod reference;
pub mod session;
pub mod transaction;

#[cfg(test)]
pub(crate) mod test_utils;

use crate::git::backend::SyncAdapter;
use crate::git::version::GitVersion;
use bon::Builder;
use std::sync::Arc;

pub use checkout::{CheckoutExecutor, CheckoutTarget};
pub use detect::{ChangeDetector, ChangeSet};
pub use reconciler::prompt::{Console, TerminalConsole, resolve_interactive};
pub use reconciler::{ChangeReconciler, Operation};
pub use reference::Reference;
pub use session::{DestructiveAction, ReconcileSession, SessionRegistry, WorkingCopyPath};
pub use transaction::{UpdateOutcome, UpdateRequest, UpdateTransaction, open_working_copy};

/// Collaborators shared by every reconciliation in one run.
///
/// Built once at startup; the tool version is probed before this exists.
#[derive(Builder)]
pub struct SyncContext {
    adapter: Arc<dyn SyncAdapter>,
    console: Arc<dyn Console>,
    version: GitVersion,
    interactive: bool,
    #[builder(default)]
    registry: SessionRegistry,
}

impl SyncContext {
    #[must_use]
    pub fn adapter(&self) -> &dyn SyncAdapter {
        self.adapter.as_ref()
    }

    #[must_use]
    pub fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    #[must_use]
    pub const fn version(&self) -> GitVersion {
        self.version
    }

    /// Whether reconciliation prompts instead of applying the policy.
    #[must_use]
    pub const fn interactive(&self) -> bool {
        self.interactive
    }

    #[must_use]
    pub const fn registry(&self) -> &SessionRegistry {
        &self.registry
    }
}
