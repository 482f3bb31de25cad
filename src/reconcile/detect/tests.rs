// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{ChangeDetector, ChangeSet};
use crate::git::backend::CommandOutput;
use crate::reconcile::session::WorkingCopyPath;
use crate::reconcile::test_utils::{H1, H2, H3, ScriptedAdapter, fail, ok};

const STATUS: &str = "status --porcelain --untracked-files=no";
const SHOW_REF: &str = "show-ref --head -d";

fn working_copy() -> (tempfile::TempDir, WorkingCopyPath) {
    let temp = tempfile::tempdir().unwrap();
    let path = WorkingCopyPath::normalize(temp.path()).unwrap();
    (temp, path)
}

#[test]
fn test_change_set_from_output() {
    assert_eq!(ChangeSet::from_output("  \n\t"), None);
    let changes = ChangeSet::from_output("\n M a.txt\n M b.txt\n\n").unwrap();
    assert_eq!(changes.text(), "M a.txt\n M b.txt");
    assert_eq!(changes.lines().collect::<Vec<_>>(), vec!["M a.txt", "M b.txt"]);
    assert_eq!(changes.len(), 16);
}

#[test]
fn test_local_changes_absent_when_clean() {
    let (_temp, path) = working_copy();
    let adapter = ScriptedAdapter::new().on(STATUS, ok("\n"));
    let detector = ChangeDetector::new(&adapter);
    assert_eq!(detector.local_changes(&path).unwrap(), None);
}

#[test]
fn test_local_changes_equal_trimmed_status() {
    let (_temp, path) = working_copy();
    let adapter = ScriptedAdapter::new().on(STATUS, ok(" M README\n M src/lib.rs\n"));
    let detector = ChangeDetector::new(&adapter);
    let changes = detector.local_changes(&path).unwrap().unwrap();
    assert_eq!(changes.text(), "M README\n M src/lib.rs");
}

#[test]
fn test_local_changes_status_failure_is_surfaced() {
    let (_temp, path) = working_copy();
    let adapter = ScriptedAdapter::new().on(STATUS, fail("fatal: not a git repository"));
    let err = ChangeDetector::new(&adapter).local_changes(&path).unwrap_err();
    assert!(err.to_string().contains("fatal: not a git repository"));
}

#[test]
fn test_unpushed_absent_when_branch_matches_remote() {
    let (_temp, path) = working_copy();
    let adapter = ScriptedAdapter::new()
        .on(
            SHOW_REF,
            ok(&format!(
                "{H1} HEAD\n{H1} refs/heads/main\n{H1} refs/remotes/composer/main\n"
            )),
        )
        .on("diff --name-status composer/main...main --", ok(""));

    let detector = ChangeDetector::new(&adapter);
    assert_eq!(detector.unpushed_changes(&path).unwrap(), None);
    assert_eq!(adapter.count("fetch --all"), 0);
}

#[test]
fn test_unpushed_keeps_shortest_diff() {
    let (_temp, path) = working_copy();
    let adapter = ScriptedAdapter::new()
        .on(
            SHOW_REF,
            ok(&format!(
                "{H2} HEAD\n{H2} refs/heads/feature\n\
                 {H1} refs/remotes/origin/feature\n{H3} refs/remotes/mirror/feature\n"
            )),
        )
        .on(
            "diff --name-status origin/feature...feature --",
            ok("M a.txt\nM b.txt\nA c.txt\n"),
        )
        .on("diff --name-status mirror/feature...feature --", ok("A c.txt\n"));

    let changes = ChangeDetector::new(&adapter)
        .unpushed_changes(&path)
        .unwrap()
        .unwrap();
    assert_eq!(changes.text(), "A c.txt");
}

#[test]
fn test_unpushed_uses_first_candidate_with_remote() {
    let (_temp, path) = working_copy();
    let adapter = ScriptedAdapter::new()
        .on(
            SHOW_REF,
            ok(&format!(
                "{H1} HEAD\n{H1} refs/heads/local-only\n{H1} refs/heads/main\n\
                 {H1} refs/remotes/composer/main\n"
            )),
        )
        .on("diff --name-status composer/main...main --", ok(""));

    assert_eq!(
        ChangeDetector::new(&adapter).unpushed_changes(&path).unwrap(),
        None
    );
    assert_eq!(adapter.count("fetch --all"), 0);
}

#[test]
fn test_unpushed_absent_without_head_or_branch() {
    let (_temp, path) = working_copy();

    let detached = ScriptedAdapter::new().on(
        SHOW_REF,
        ok(&format!("{H2} HEAD\n{H1} refs/heads/main\n")),
    );
    assert_eq!(
        ChangeDetector::new(&detached).unpushed_changes(&path).unwrap(),
        None
    );

    let empty_repo = ScriptedAdapter::new().on(SHOW_REF, CommandOutput::new("", 1, "", ""));
    assert_eq!(
        ChangeDetector::new(&empty_repo)
            .unpushed_changes(&path)
            .unwrap(),
        None
    );
    assert_eq!(detached.count("fetch --all") + empty_repo.count("fetch --all"), 0);
}

#[test]
fn test_unpushed_fetch_then_found_on_remote() {
    let (_temp, path) = working_copy();
    let adapter = ScriptedAdapter::new()
        .on(SHOW_REF, ok(&format!("{H3} HEAD\n{H3} refs/heads/feature\n")))
        .on(
            SHOW_REF,
            ok(&format!(
                "{H3} HEAD\n{H3} refs/heads/feature\n{H3} refs/remotes/origin/feature\n"
            )),
        )
        .on("diff --name-status origin/feature...feature --", ok(""));

    let changes = ChangeDetector::new(&adapter).unpushed_changes(&path).unwrap();
    assert_eq!(changes, None);
    assert_eq!(adapter.count("fetch --all"), 1);
    assert_eq!(adapter.count(SHOW_REF), 2);
}

#[test]
fn test_unpushed_still_missing_after_fetch() {
    let (_temp, path) = working_copy();
    let adapter = ScriptedAdapter::new()
        .on(SHOW_REF, ok(&format!("{H3} HEAD\n{H3} refs/heads/feature\n")))
        .on("fetch --all", fail("fatal: unable to access remote"));

    let changes = ChangeDetector::new(&adapter)
        .unpushed_changes(&path)
        .unwrap()
        .unwrap();
    insta::assert_snapshot!(changes.text(), @"Branch feature could not be found on any remote and appears to be unpushed");
    // bounded: one fetch, two listings
    assert_eq!(adapter.count("fetch --all"), 1);
    assert_eq!(adapter.count(SHOW_REF), 2);
}

#[test]
fn test_unpushed_second_pass_without_context_keeps_first_message() {
    let (_temp, path) = working_copy();
    let adapter = ScriptedAdapter::new()
        .on(SHOW_REF, ok(&format!("{H3} HEAD\n{H3} refs/heads/feature\n")))
        .on(SHOW_REF, ok(&format!("{H3} HEAD\n")));

    let changes = ChangeDetector::new(&adapter)
        .unpushed_changes(&path)
        .unwrap()
        .unwrap();
    assert!(changes.text().starts_with("Branch feature could not be found"));
}

#[test]
fn test_unpushed_ref_listing_failure_is_surfaced() {
    let (_temp, path) = working_copy();
    let adapter = ScriptedAdapter::new().on(SHOW_REF, fail("fatal: bad object"));
    let err = ChangeDetector::new(&adapter)
        .unpushed_changes(&path)
        .unwrap_err();
    assert!(err.to_string().contains("fatal: bad object"));
}

#[test]
fn test_working_tree_diff() {
    let (_temp, path) = working_copy();
    let adapter = ScriptedAdapter::new().on("diff HEAD --", ok("diff --git a/x b/x\n+line\n"));
    let diff = ChangeDetector::new(&adapter).working_tree_diff(&path).unwrap();
    assert_eq!(diff, "diff --git a/x b/x\n+line");
}
