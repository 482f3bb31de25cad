// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git query operations using gix backend.
//!
//! ```text
//! query.rs --> GixBackend --> .git/ (no subprocess)
//! ```

use crate::error::SyncResult;
use std::path::Path;

use super::backend::{GitQuery, GixBackend};

/// Whether `path` is itself the top of a git work tree.
#[must_use]
pub fn is_working_copy_root(path: &Path) -> bool {
    GixBackend::is_working_copy_root(path)
}

/// Get current branch name (None if HEAD is detached).
///
/// # Errors
///
/// Returns a `GitError` if repository discovery or head resolution fails.
pub fn current_branch(path: &Path) -> SyncResult<Option<String>> {
    GixBackend::current_branch(path)
}
