// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |        status / update / checkout / remove
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |  TOML, per-package policy |
//!              '-------------+-------------'
//!                            v
//!                        reconcile
//!        detect --> reconciler (prompt) --> checkout
//!                 session / registry / transaction
//!                            |
//!                            v
//!                           git
//!              SyncAdapter (CLI) + gix queries
//!              ref table parser, version probe
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging            |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod reconcile;
