// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reference classification.
//!
//! ```text
//! "0123...cdef" (40 hex)   --> CommitHash   hash shape always wins
//! "dev-feature-x"          --> Branch("feature-x")
//! "2.0.x-dev"              --> Branch("2.0")
//! "v1.2.0"                 --> Branch("v1.2.0"), or Tag with a ref table
//! ```
//!
//! A 40-hex branch name is indistinguishable from a commit hash; the hash
//! reading is taken.

use crate::git::refs::RemoteRefTable;
use std::fmt;

/// Target of a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    CommitHash(String),
    Branch(String),
    Tag(String),
}

impl Reference {
    /// Classify a version string. Pure and total.
    #[must_use]
    pub fn classify(version: &str) -> Self {
        let version = version.trim();
        if is_commit_hash(version) {
            Self::CommitHash(version.to_string())
        } else {
            Self::Branch(strip_dev_decoration(version).to_string())
        }
    }

    /// Like [`Reference::classify`], but a name that is a tag and not a
    /// remote branch is reported as a tag.
    #[must_use]
    pub fn classify_with_refs(version: &str, refs: &RemoteRefTable) -> Self {
        match Self::classify(version) {
            Self::Branch(name)
                if refs.has_tag(&name) && refs.remote_branches_named(&name).is_empty() =>
            {
                Self::Tag(name)
            }
            other => other,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::CommitHash(s) | Self::Branch(s) | Self::Tag(s) => s,
        }
    }

    #[must_use]
    pub const fn is_commit_hash(&self) -> bool {
        matches!(self, Self::CommitHash(_))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommitHash(hash) => write!(f, "commit {hash}"),
            Self::Branch(name) => write!(f, "branch {name}"),
            Self::Tag(name) => write!(f, "tag {name}"),
        }
    }
}

/// Exactly 40 hexadecimal digits.
#[must_use]
pub fn is_commit_hash(candidate: &str) -> bool {
    candidate.len() == 40 && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Whether a pretty version names a development branch rather than a release.
#[must_use]
pub fn is_dev_version(pretty_version: &str) -> bool {
    strip_dev_decoration(pretty_version) != pretty_version
}

/// Strip a leading `dev-` and a trailing `-dev` / `.x-dev` (case-insensitive).
///
/// A name that would strip to nothing is returned unchanged.
#[must_use]
pub fn strip_dev_decoration(version: &str) -> &str {
    let mut name = version;
    if starts_with_ignore_case(name, "dev-") {
        name = &name[4..];
    }
    for suffix in [".x-dev", "-dev"] {
        if ends_with_ignore_case(name, suffix) {
            name = &name[..name.len() - suffix.len()];
            break;
        }
    }
    if name.is_empty() { version } else { name }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn ends_with_ignore_case(s: &str, suffix: &str) -> bool {
    s.len()
        .checked_sub(suffix.len())
        .and_then(|start| s.get(start..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}
