// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-package reconciliation overrides.
//!
//! ```text
//! ReconcileConfig + PolicyOverride --> field-by-field merge
//! ```
//!
//! Only explicitly set fields (`Some`) in override replace base values.

use serde::{Deserialize, Serialize};

use super::types::{DiscardPolicy, ReconcileConfig};

/// Reconcile settings with optional fields for field-level merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyOverride {
    /// Non-interactive handling of local modifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discard_changes: Option<DiscardPolicy>,
    /// Remote the resolver fetches into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

/// Merge a package override over the base reconcile settings.
pub(super) fn merge_reconcile_config(
    base: &ReconcileConfig,
    override_config: &PolicyOverride,
) -> ReconcileConfig {
    ReconcileConfig {
        discard_changes: override_config
            .discard_changes
            .unwrap_or(base.discard_changes),
        remote: override_config
            .remote
            .clone()
            .unwrap_or_else(|| base.remote.clone()),
        jobs: base.jobs,
    }
}
