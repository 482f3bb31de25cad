// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!          reconcile engine
//!                 |
//!   refs.rs  version.rs  query.rs
//!        \      |       /
//!         v     v      v
//!      ,------------------,
//!      | backend (traits) |
//!      '--+----------+----'
//!         |          |
//!         v          v
//!    GitQuery    SyncAdapter
//!   (gix, read)  (CLI, text + exit code)
//!         |          |
//!         v          v
//!    GixBackend  ShellBackend
//!    .is_root    .status/.list_refs/.diff
//!    .branch     .stash/.clean_and_reset
//!                .checkout/.reset_hard
//! ```
//!
//! **`GixBackend`**: pure Rust, no subprocess, read-only.
//! **`ShellBackend`**: git CLI; the engine's only I/O boundary.

pub mod backend;
pub mod query;
pub mod refs;
pub mod version;
