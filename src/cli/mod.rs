// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for depsync using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! depsync [global options] <command>
//! version
//! options
//! inis
//! status [packages...]
//! update [packages...]
//! checkout PATH REFERENCE
//! remove [packages...]
//! ```

pub mod global;
pub mod sync;


use crate::cli::global::GlobalOptions;
use crate::cli::sync::{CheckoutArgs, RemoveArgs, StatusArgs, UpdateArgs};
use clap::{Parser, Subcommand};

/// Dependency Working-Copy Sync
///
/// Keeps VCS-backed dependency checkouts on their resolved references.
#[derive(Debug, Parser)]
#[command(
    name = "depsync",
    author,
    version,
    about = "Dependency working-copy sync",
    long_about = "depsync Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Moves git working copies of dependencies to their resolved\n\
                  references without losing local work. Local modifications are\n\
                  discarded, stashed or kept according to reconcile.discard_changes,\n\
                  or by asking when run from a terminal.",
    after_help = "CONFIG FILES:\n\n\
                  depsync loads `depsync.toml` from the current directory when it\n\
                  exists. Additional files can be given with --ini and are loaded\n\
                  after it. DEPSYNC_SECTION_KEY environment variables and --set\n\
                  override both. Use --no-default-inis to skip depsync.toml.\n\n\
                  INTERRUPTING:\n\n\
                  Without prompts, Ctrl-C lets running packages finish and starts\n\
                  no new ones. When prompts are enabled, Ctrl-C exits right away,\n\
                  including at a prompt."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their values from the config files.
    Options,

    /// Lists the config files used by depsync.
    Inis,

    /// Reports local and unpushed changes per package.
    Status(StatusArgs),

    /// Reconciles and checks out every selected package.
    Update(UpdateArgs),

    /// Runs one update on an arbitrary working copy.
    Checkout(CheckoutArgs),

    /// Reconciles for uninstall, then deletes the working copies.
    Remove(RemoveArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
