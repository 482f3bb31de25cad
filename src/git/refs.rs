// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parsed ref listing.
//!
//! ```text
//! show-ref --head -d
//!   3f2a... HEAD                      --> Head
//!   3f2a... refs/heads/main           --> LocalBranch   "main"
//!   3f2a... refs/remotes/origin/main  --> RemoteBranch  "origin/main"
//!   9c1b... refs/tags/v1.0            --> Tag           "v1.0"
//!   3f2a... refs/tags/v1.0^{}         --> (peels "v1.0" to 3f2a...)
//! ```
//!
//! A table is built from one listing and thrown away; it is never cached,
//! so it always reflects the repository as of the call (e.g. after a fetch).

/// What a ref name points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Head,
    LocalBranch,
    RemoteBranch,
    Tag,
    Other,
}

/// One line of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    /// Commit hash (peeled for annotated tags when the listing dereferenced them).
    pub hash: String,
    /// Short name: `main`, `origin/main`, `v1.0`, `HEAD`.
    pub name: String,
    pub kind: RefKind,
}

/// Ref name to commit mapping, in listing order.
#[derive(Debug, Clone, Default)]
pub struct RemoteRefTable {
    entries: Vec<RefEntry>,
}

impl RemoteRefTable {
    /// Parse `<hash> <refname>` lines. Malformed lines are skipped.
    #[must_use]
    pub fn parse(listing: &str) -> Self {
        let mut entries: Vec<RefEntry> = Vec::new();

        for line in listing.lines() {
            let Some((hash, full_name)) = line.trim().split_once(' ') else {
                continue;
            };
            if !is_hex_hash(hash) {
                continue;
            }

            if let Some(tag) = full_name.strip_suffix("^{}") {
                let peeled = tag.strip_prefix("refs/tags/").unwrap_or(tag);
                if let Some(entry) = entries
                    .iter_mut()
                    .find(|e| e.kind == RefKind::Tag && e.name == peeled)
                {
                    entry.hash = hash.to_string();
                }
                continue;
            }

            let (kind, name) = classify_ref_name(full_name);
            entries.push(RefEntry {
                hash: hash.to_string(),
                name: name.to_string(),
                kind,
            });
        }

        Self { entries }
    }

    /// All parsed entries.
    #[must_use]
    pub fn entries(&self) -> &[RefEntry] {
        &self.entries
    }

    /// Commit HEAD points at, if HEAD was listed.
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.kind == RefKind::Head)
            .map(|e| e.hash.as_str())
    }

    /// Local branches pointing at `hash`, in listing order.
    #[must_use]
    pub fn local_branches_at(&self, hash: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.kind == RefKind::LocalBranch && e.hash == hash)
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Remote-tracking refs named `<remote>/<branch>` for any single-segment
    /// remote, e.g. `origin/feature/x` for `feature/x`.
    #[must_use]
    pub fn remote_branches_named(&self, branch: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.kind == RefKind::RemoteBranch)
            .filter(|e| {
                e.name
                    .split_once('/')
                    .is_some_and(|(_, rest)| rest == branch)
            })
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Whether `<remote>/<branch>` is listed.
    #[must_use]
    pub fn has_remote_branch(&self, remote: &str, branch: &str) -> bool {
        self.entries.iter().any(|e| {
            e.kind == RefKind::RemoteBranch
                && e.name
                    .strip_prefix(remote)
                    .and_then(|rest| rest.strip_prefix('/'))
                    == Some(branch)
        })
    }

    /// Whether a tag with this short name is listed.
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.kind == RefKind::Tag && e.name == name)
    }
}

fn classify_ref_name(full_name: &str) -> (RefKind, &str) {
    if full_name == "HEAD" {
        return (RefKind::Head, full_name);
    }
    [
        ("refs/heads/", RefKind::LocalBranch),
        ("refs/remotes/", RefKind::RemoteBranch),
        ("refs/tags/", RefKind::Tag),
    ]
    .into_iter()
    .find_map(|(prefix, kind)| full_name.strip_prefix(prefix).map(|name| (kind, name)))
    .unwrap_or((RefKind::Other, full_name))
}

/// 40 (SHA-1) or 64 (SHA-256) hex digits.
fn is_hex_hash(candidate: &str) -> bool {
    matches!(candidate.len(), 40 | 64) && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}
