// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reconciliation sessions.
//!
//! ```text
//! SessionRegistry (Arc<Mutex<BTreeSet<PathBuf>>>)
//!        |
//!        | claim(path)  --> PathBusy if already claimed
//!        v
//! ReconcileSession { path, action: None }
//!        |
//!        | record(Discarded | Stashed)   at most once
//!        v
//! CheckoutExecutor reads force_checkout()
//!        |
//!        v
//! reapply(self)  --> stash pop if Stashed; claim released on drop
//! ```

use crate::error::{ReconcileError, SyncResult};
use crate::git::backend::SyncAdapter;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// A working-copy directory, normalized exactly once.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkingCopyPath(PathBuf);

impl WorkingCopyPath {
    /// Resolve symlinks and relative components.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory does not exist.
    pub fn normalize(raw: &Path) -> SyncResult<Self> {
        let canonical = std::fs::canonicalize(raw)?;
        Ok(Self(strip_verbatim_prefix(canonical)))
    }

    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl Deref for WorkingCopyPath {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for WorkingCopyPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for WorkingCopyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// `canonicalize` on Windows yields `\\?\C:\...`, which git does not accept.
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_prefix(r"\\?\")) {
        Some(stripped) if !stripped.starts_with("UNC\\") => PathBuf::from(stripped),
        _ => path,
    }
}

/// The one destructive step the reconciler took for a working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructiveAction {
    Discarded,
    Stashed,
}

impl fmt::Display for DestructiveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discarded => write!(f, "discarded"),
            Self::Stashed => write!(f, "stashed"),
        }
    }
}

/// Paths currently owned by a session.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    claimed: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the one reconciliation sequence allowed for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::PathBusy`] if another session holds the path.
    pub fn claim(&self, path: WorkingCopyPath) -> SyncResult<ReconcileSession> {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        if !claimed.insert(path.as_path().to_path_buf()) {
            return Err(ReconcileError::PathBusy {
                path: path.to_string(),
            }
            .into());
        }
        Ok(ReconcileSession {
            path,
            action: None,
            registry: Arc::clone(&self.claimed),
        })
    }

    /// Whether `path` is currently claimed.
    #[must_use]
    pub fn is_claimed(&self, path: &Path) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }
}

/// State of one update or uninstall cycle for one working copy.
#[derive(Debug)]
pub struct ReconcileSession {
    path: WorkingCopyPath,
    action: Option<DestructiveAction>,
    registry: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl ReconcileSession {
    #[must_use]
    pub const fn path(&self) -> &WorkingCopyPath {
        &self.path
    }

    #[must_use]
    pub const fn action(&self) -> Option<DestructiveAction> {
        self.action
    }

    /// Checkouts ignore local safety checks once the reconciler has
    /// authorized discarding or stashing.
    #[must_use]
    pub const fn force_checkout(&self) -> bool {
        self.action.is_some()
    }

    /// Fails if a discard or stash already happened in this cycle.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::DestructiveActionRepeated`].
    pub fn ensure_untouched(&self) -> SyncResult<()> {
        if self.action.is_some() {
            return Err(ReconcileError::DestructiveActionRepeated {
                path: self.path.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Remember the destructive step taken.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::DestructiveActionRepeated`] on a second call.
    pub fn record(&mut self, action: DestructiveAction) -> SyncResult<()> {
        self.ensure_untouched()?;
        self.action = Some(action);
        Ok(())
    }

    /// Pop the stash taken in this cycle, then end the session.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::StashPopFailed`] with the tool's raw output
    /// (usually conflicts); nothing is resolved automatically.
    pub fn reapply(self, adapter: &dyn SyncAdapter) -> SyncResult<()> {
        if self.action != Some(DestructiveAction::Stashed) {
            return Ok(());
        }

        info!(path = %self.path, "re-applying stashed changes");
        let output = adapter.stash_pop(&self.path)?;
        if !output.success() {
            return Err(ReconcileError::StashPopFailed {
                path: self.path.to_string(),
                output: output.combined_output(),
            }
            .into());
        }
        Ok(())
    }
}

impl Drop for ReconcileSession {
    fn drop(&mut self) {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(self.path.as_path());
    }
}
