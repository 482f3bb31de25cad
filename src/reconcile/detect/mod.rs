// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Change detection.
//!
//! # Unpushed changes
//!
//! ```text
//!   show-ref --head -d ---> RemoteRefTable
//!          |
//!   HEAD hash? ---no---> absent
//!          |
//!   local branches at HEAD? ---none---> absent
//!          |
//!   <remote>/<candidate> for a candidate?
//!      |                      |
//!     yes                     no
//!      |                      |
//!   diff --name-status       "Branch X could not be found ..."
//!   remote...branch            (fallback)
//!   keep shortest              |
//!      |                 first pass? --> fetch --all, run once more
//!      v                      |
//!   changes or absent    second pass without branch context keeps
//!                        the first-pass message
//! ```
//!
//! Picking the shortest diff among several remotes is a heuristic: two
//! remotes that diverged in unrelated ways can hide real unpushed work.

use crate::error::{GitError, SyncResult};
use crate::git::backend::{CommandOutput, DiffRange, SyncAdapter};
use crate::git::refs::RemoteRefTable;
use crate::reconcile::session::WorkingCopyPath;
use std::fmt;
use tracing::{debug, warn};

/// A non-empty, trimmed change listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    text: String,
}

impl ChangeSet {
    /// `None` when `text` is blank.
    #[must_use]
    pub fn from_output(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| Self {
            text: trimmed.to_string(),
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Size in bytes; used to rank candidate diffs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// One entry per changed file.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines().map(str::trim).filter(|l| !l.is_empty())
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Result of one unpushed-changes pass.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PassOutcome {
    /// HEAD unknown or not on any local branch.
    NoBranchContext,
    /// No remote carries the branch.
    BranchNotOnRemote { branch: String },
    /// Shortest diff against the remotes that carry the branch.
    Compared(Option<ChangeSet>),
}

/// Reads working-copy state through the adapter. Never modifies anything
/// except remote-tracking refs (one `fetch --all` at most).
pub struct ChangeDetector<'a> {
    adapter: &'a dyn SyncAdapter,
}

impl<'a> ChangeDetector<'a> {
    #[must_use]
    pub fn new(adapter: &'a dyn SyncAdapter) -> Self {
        Self { adapter }
    }

    /// Modified tracked files, as the trimmed porcelain status.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::CommandFailed`] if status fails.
    pub fn local_changes(&self, path: &WorkingCopyPath) -> SyncResult<Option<ChangeSet>> {
        let output = self.adapter.status(path, true)?.into_checked()?;
        Ok(ChangeSet::from_output(output.stdout()))
    }

    /// Commits on the current branch that no remote is known to have.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::CommandFailed`] if listing refs or diffing fails.
    pub fn unpushed_changes(&self, path: &WorkingCopyPath) -> SyncResult<Option<ChangeSet>> {
        let first = self.unpushed_pass(path)?;
        let PassOutcome::BranchNotOnRemote { branch } = first else {
            return Ok(outcome_changes(first));
        };

        debug!(path = %path, branch = %branch, "branch not on any remote, fetching once");
        let fetch = self.adapter.fetch_all(path)?;
        if !fetch.success() {
            warn!(
                path = %path,
                stderr = %fetch.stderr().trim(),
                "fetch failed, using refs already known"
            );
        }

        match self.unpushed_pass(path)? {
            PassOutcome::NoBranchContext => Ok(not_on_remote(&branch)),
            second => Ok(outcome_changes(second)),
        }
    }

    fn unpushed_pass(&self, path: &WorkingCopyPath) -> SyncResult<PassOutcome> {
        let refs = self.list_refs(path)?;

        let Some(head) = refs.head() else {
            debug!(path = %path, "HEAD not found in ref listing");
            return Ok(PassOutcome::NoBranchContext);
        };

        let candidates = refs.local_branches_at(head);
        let Some(first_candidate) = candidates.first() else {
            debug!(path = %path, head, "HEAD is not on a local branch");
            return Ok(PassOutcome::NoBranchContext);
        };

        let confirmed = candidates.iter().find_map(|candidate| {
            let remotes = refs.remote_branches_named(candidate);
            (!remotes.is_empty()).then_some((*candidate, remotes))
        });

        let Some((branch, remotes)) = confirmed else {
            return Ok(PassOutcome::BranchNotOnRemote {
                branch: (*first_candidate).to_string(),
            });
        };

        let mut shortest: Option<String> = None;
        for remote in remotes {
            let output = self
                .adapter
                .diff(
                    path,
                    DiffRange::Symmetric {
                        from: remote,
                        to: branch,
                    },
                    true,
                )?
                .into_checked()?;
            let diff = output.stdout().trim();
            if shortest.as_ref().is_none_or(|best| diff.len() < best.len()) {
                shortest = Some(diff.to_string());
            }
        }

        Ok(PassOutcome::Compared(
            shortest.and_then(|text| ChangeSet::from_output(&text)),
        ))
    }

    /// An empty repository makes `show-ref` exit 1 without output.
    fn list_refs(&self, path: &WorkingCopyPath) -> SyncResult<RemoteRefTable> {
        let output = self.adapter.list_refs(path, true, true)?;
        if output.success() || is_silent_failure(&output) {
            return Ok(RemoteRefTable::parse(output.stdout()));
        }
        Err(GitError::CommandFailed {
            command: output.command().to_string(),
            output: output.stderr().to_string(),
        }
        .into())
    }

    /// Full working-tree diff against HEAD, for the prompt's "d" choice.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::CommandFailed`] if diff fails.
    pub fn working_tree_diff(&self, path: &WorkingCopyPath) -> SyncResult<String> {
        let output = self
            .adapter
            .diff(path, DiffRange::WorkingTree { base: "HEAD" }, false)?
            .into_checked()?;
        Ok(output.stdout().trim_end().to_string())
    }
}

fn is_silent_failure(output: &CommandOutput) -> bool {
    output.exit_code() == 1 && output.stdout().trim().is_empty() && output.stderr().trim().is_empty()
}

fn outcome_changes(outcome: PassOutcome) -> Option<ChangeSet> {
    match outcome {
        PassOutcome::NoBranchContext => None,
        PassOutcome::BranchNotOnRemote { branch } => not_on_remote(&branch),
        PassOutcome::Compared(changes) => changes,
    }
}

fn not_on_remote(branch: &str) -> Option<ChangeSet> {
    ChangeSet::from_output(&format!(
        "Branch {branch} could not be found on any remote and appears to be unpushed"
    ))
}

#[cfg(test)]
mod tests;
