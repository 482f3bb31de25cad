// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tool version probe.
//!
//! Computed once at startup and carried in the sync context; never a lazy
//! global.

use crate::error::{GitError, SyncError, SyncResult};
use regex::Regex;
use std::fmt;

use super::backend::SyncAdapter;

const VERSION_PATTERN: &str = r"(\d+)\.(\d+)(?:\.(\d+))?";

/// `major.minor.patch` of the git executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GitVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GitVersion {
    /// First version whose `stash` understands `--include-untracked`.
    pub const INCLUDE_UNTRACKED: Self = Self::new(1, 7, 7);

    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a banner such as `git version 2.43.0.windows.1`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::UnparsableVersion`] when no `X.Y[.Z]` is found.
    pub fn parse(banner: &str) -> SyncResult<Self> {
        let unparsable = || GitError::UnparsableVersion {
            output: banner.trim().to_string(),
        };
        let regex = Regex::new(VERSION_PATTERN)
            .map_err(|e| SyncError::Other(e.to_string().into_boxed_str()))?;
        let captures = regex.captures(banner).ok_or_else(unparsable)?;
        let number = |index: usize| -> SyncResult<u32> {
            captures
                .get(index)
                .map_or(Ok(0), |m| m.as_str().parse().map_err(|_| unparsable().into()))
        };
        Ok(Self::new(number(1)?, number(2)?, number(3)?))
    }

    /// Run `git --version` once.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be spawned, exits non-zero or prints an
    /// unrecognized banner.
    pub fn probe(adapter: &dyn SyncAdapter) -> SyncResult<Self> {
        let output = adapter.version()?.into_checked()?;
        Self::parse(output.stdout())
    }

    /// Whether `stash --include-untracked` is available.
    #[must_use]
    pub fn supports_include_untracked(self) -> bool {
        self >= Self::INCLUDE_UNTRACKED
    }
}

impl fmt::Display for GitVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
