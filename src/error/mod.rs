// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!                 SyncError (~24 bytes)
//!                        |
//!   +--------+-------+---+------+--------+-------+
//!   v        v       v          v        v       v
//! Bail      Git   Reconcile   Config     Io    Other
//!           Box     Box        Box      Box   Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Git        CommandFailed, SpawnFailed, NotARepository, Gix
//!   Reconcile  UnpushedChanges, UncommittedChanges, Aborted,
//!              DiscardFailed, StashFailed, StashPopFailed,
//!              CheckoutFailed, HistoryRewritten, PathBusy
//!   Config     ParseError, MissingKey, InvalidValue, UnknownPackage
//! ```
//!
//! Raw tool output is carried verbatim; nothing above the process boundary
//! rewrites what git printed.

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`SyncError`].
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Top-level engine error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Fatal error that should terminate the application.
    #[error("fatal error: {0}")]
    Bailed(Box<str>),

    /// Version-control tool failure.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Working-copy reconciliation or checkout failure.
    #[error("{0}")]
    Reconcile(#[from] Box<ReconcileError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

impl SyncError {
    /// True when the user explicitly aborted at the interactive prompt.
    ///
    /// Callers use this to print a single line instead of a cause chain.
    #[must_use]
    pub fn is_user_abort(&self) -> bool {
        matches!(self, Self::Reconcile(e) if matches!(**e, ReconcileError::Aborted { .. }))
    }

    /// True for the rewritten-history diagnostic of a failed checkout.
    #[must_use]
    pub fn is_history_rewritten(&self) -> bool {
        matches!(self, Self::Reconcile(e) if matches!(**e, ReconcileError::HistoryRewritten { .. }))
    }

    /// What the user should run next, shown apart from the git output.
    #[must_use]
    pub fn remediation_hint(&self) -> Option<&str> {
        match self {
            Self::Reconcile(e) => match &**e {
                ReconcileError::HistoryRewritten { hint, .. } => Some(hint),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Create a fatal [`SyncError::Bailed`].
pub fn bail_out(message: impl Into<String>) -> SyncError {
    SyncError::Bailed(message.into().into_boxed_str())
}

/// True when `err` (or anything in its chain) is a user abort.
#[must_use]
pub fn is_user_abort(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<SyncError>())
        .any(SyncError::is_user_abort)
}

/// Remediation hint of a rewritten-history failure anywhere in `err`'s chain.
#[must_use]
pub fn history_rewritten_hint(err: &anyhow::Error) -> Option<&str> {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<SyncError>())
        .find(|e| e.is_history_rewritten())
        .and_then(SyncError::remediation_hint)
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for SyncError {
                fn from(err: $error) -> Self {
                    SyncError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GitError => Git,
    ReconcileError => Reconcile,
    ConfigError => Config,
    std::io::Error => Io,
}

// --- Gix Errors ---

/// Wrapper for gix-specific errors.
#[derive(Debug, Error)]
pub enum GixError {
    /// Failed to discover repository from path.
    #[error("failed to discover repository: {0}")]
    Discover(#[from] Box<gix::discover::Error>),

    /// Failed to get HEAD reference.
    #[error("failed to get head reference: {0}")]
    Head(#[from] gix::reference::find::existing::Error),
}

// --- Git Errors ---

/// Errors raised at the process boundary.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git executable could not be located.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// The process could not be spawned at all.
    #[error("failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Git command exited unsuccessfully. `output` is the raw captured text.
    #[error("failed to execute {command}\n\n{output}")]
    CommandFailed { command: String, output: String },

    /// Path is not a git working copy.
    #[error("not a git working copy: {path}")]
    NotARepository { path: String },

    /// `git --version` printed something we could not read.
    #[error("unrecognized git version output: {output}")]
    UnparsableVersion { output: String },

    /// Error from gix library.
    #[error("gix error: {0}")]
    Gix(#[from] GixError),
}

// --- Reconcile Errors ---

/// Working-copy reconciliation and checkout errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Commits on the current branch are not reachable from any remote.
    #[error("source directory {path} has unpushed changes on the current branch:\n{changes}")]
    UnpushedChanges { path: String, changes: String },

    /// Local modifications exist and no policy allows touching them.
    #[error("source directory {path} has uncommitted changes")]
    UncommittedChanges { path: String },

    /// User chose to abort at the prompt.
    #[error("{operation} aborted")]
    Aborted { operation: String },

    /// `clean` + `reset --hard` failed.
    #[error("could not reset changes in {path}\n\n{output}")]
    DiscardFailed { path: String, output: String },

    /// `stash` failed.
    #[error("could not stash changes in {path}\n\n{output}")]
    StashFailed { path: String, output: String },

    /// `stash pop` failed, usually on conflicts.
    #[error("failed to apply your changes in {path}\n\n{output}")]
    StashPopFailed { path: String, output: String },

    /// Every checkout strategy failed.
    #[error("failed to execute {command}\n\n{output}")]
    CheckoutFailed { command: String, output: String },

    /// Every checkout strategy failed and the tool named the target
    /// reference, meaning it is no longer in the repository.
    #[error("failed to execute {command}\n\n{output}")]
    HistoryRewritten {
        reference: String,
        command: String,
        output: String,
        hint: String,
    },

    /// Another sequence already owns this working copy.
    #[error("working copy {path} is already being reconciled")]
    PathBusy { path: String },

    /// A second discard/stash was requested in the same cycle.
    #[error("working copy {path} was already discarded or stashed in this cycle")]
    DestructiveActionRepeated { path: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// A package named on the command line is not configured.
    #[error("package '{0}' is not configured")]
    UnknownPackage(String),
}
