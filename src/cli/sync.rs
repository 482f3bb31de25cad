// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Working-copy command arguments.
//!
//! ```text
//! status   [PACKAGE...] [--json]
//! update   [PACKAGE...] [-j N]
//! checkout PATH REFERENCE [--version V] [--url URL] [--package NAME]
//! remove   [PACKAGE...]
//! ```
//!
//! An empty package list selects every configured package.

use clap::Args;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, Args)]
pub struct StatusArgs {
    /// Print a JSON array instead of text.
    #[arg(long)]
    pub json: bool,

    /// Packages to inspect.
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,
}

/// Arguments for the `update` command.
#[derive(Debug, Clone, Default, Args)]
pub struct UpdateArgs {
    /// Working copies processed at once (non-interactive runs only).
    /// Overrides reconcile.jobs.
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<NonZeroUsize>,

    /// Packages to update.
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,
}

/// Arguments for the `checkout` command.
#[derive(Debug, Clone, Args)]
pub struct CheckoutArgs {
    /// Working copy directory.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Commit hash, branch or tag to check out.
    #[arg(value_name = "REFERENCE")]
    pub reference: String,

    /// Pretty version the reference was resolved from, e.g. 'dev-main'.
    #[arg(long = "version", value_name = "VERSION")]
    pub pretty_version: Option<String>,

    /// Point the sync remote at this URL before fetching.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Package name used for policy overrides and messages.
    /// Defaults to the directory name.
    #[arg(long, value_name = "NAME")]
    pub package: Option<String>,
}

/// Arguments for the `remove` command.
#[derive(Debug, Clone, Default, Args)]
pub struct RemoveArgs {
    /// Packages to remove.
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,
}
