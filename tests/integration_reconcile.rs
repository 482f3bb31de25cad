// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the reconciliation engine.
//!
//! Every test clones a real upstream repository into a working copy whose
//! sync remote is called `composer`, then drives an update through the git
//! CLI.

use depsync::cmd::status::{ChangeKinds, inspect};
use depsync::config::types::{DiscardPolicy, PackageConfig, ReconcileConfig};
use depsync::error::{ReconcileError, SyncError};
use depsync::git::backend::{ShellBackend, SyncAdapter};
use depsync::git::query::current_branch;
use depsync::git::version::GitVersion;
use depsync::reconcile::{
    ChangeDetector, Console, DestructiveAction, SyncContext, UpdateRequest, UpdateTransaction,
    WorkingCopyPath,
};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Helper to run git commands in a directory
fn run_git(args: &[&str], cwd: &Path) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@test.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@test.com")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn commit_file(dir: &Path, file: &str, content: &str, message: &str) -> String {
    fs::write(dir.join(file), content).unwrap();
    run_git(&["add", file], dir);
    run_git(&["commit", "-q", "-m", message], dir);
    run_git(&["rev-parse", "HEAD"], dir)
}

/// Upstream with two commits on `main` and a clone of it.
///
/// ```text
/// A: README.md = "one", lib.txt = "lib"
/// B: README.md = "two"
/// ```
struct Fixture {
    _root: TempDir,
    upstream: PathBuf,
    work: PathBuf,
    first: String,
    second: String,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().expect("failed to create temp dir");
        let upstream = root.path().join("upstream");
        let work = root.path().join("work");
        fs::create_dir(&upstream).unwrap();

        run_git(&["init", "-q", "-b", "main"], &upstream);
        fs::write(upstream.join("lib.txt"), "lib\n").unwrap();
        run_git(&["add", "lib.txt"], &upstream);
        let first = commit_file(&upstream, "README.md", "one\n", "first");
        let second = commit_file(&upstream, "README.md", "two\n", "second");

        run_git(
            &[
                "clone",
                "-q",
                "-o",
                "composer",
                upstream.to_str().unwrap(),
                work.to_str().unwrap(),
            ],
            root.path(),
        );

        Self {
            _root: root,
            upstream,
            work,
            first,
            second,
        }
    }

    fn head(&self) -> String {
        run_git(&["rev-parse", "HEAD"], &self.work)
    }

    fn read(&self, file: &str) -> String {
        fs::read_to_string(self.work.join(file)).unwrap()
    }

    fn request(&self, reference: &str, pretty_version: &str) -> UpdateRequest {
        UpdateRequest::builder()
            .package("acme/lib")
            .path(&self.work)
            .reference(reference)
            .pretty_version(pretty_version)
            .build()
    }
}

/// Console that replays answers and records what it was shown.
struct RecordingConsole {
    interactive: bool,
    answers: Mutex<VecDeque<String>>,
    lines: Mutex<Vec<String>>,
}

impl RecordingConsole {
    fn new(interactive: bool, answers: &[&str]) -> Self {
        Self {
            interactive,
            answers: Mutex::new(answers.iter().map(ToString::to_string).collect()),
            lines: Mutex::new(Vec::new()),
        }
    }

    fn output(&self) -> String {
        self.lines.lock().unwrap().join("\n")
    }
}

impl Console for RecordingConsole {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn write_error(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }

    fn ask(&self, question: &str) -> Option<String> {
        self.lines.lock().unwrap().push(question.to_string());
        self.answers.lock().unwrap().pop_front()
    }
}

fn context(console: Arc<RecordingConsole>) -> SyncContext {
    let adapter = ShellBackend::locate().expect("git not found");
    let version = GitVersion::probe(&adapter).expect("git version");
    let interactive = console.is_interactive();
    SyncContext::builder()
        .adapter(Arc::new(adapter) as Arc<dyn SyncAdapter>)
        .console(console)
        .version(version)
        .interactive(interactive)
        .build()
}

fn quiet() -> SyncContext {
    context(Arc::new(RecordingConsole::new(false, &[])))
}

fn policy(discard_changes: DiscardPolicy) -> ReconcileConfig {
    ReconcileConfig {
        discard_changes,
        ..ReconcileConfig::default()
    }
}

fn reconcile_error(err: &SyncError) -> &ReconcileError {
    match err {
        SyncError::Reconcile(e) => e,
        other => panic!("expected reconcile error, got {other:?}"),
    }
}

// =============================================================================
// Change detection
// =============================================================================

#[test]
fn detect_local_changes() {
    let fx = Fixture::new();
    let ctx = quiet();
    let path = WorkingCopyPath::normalize(&fx.work).unwrap();
    let detector = ChangeDetector::new(ctx.adapter());

    assert!(detector.local_changes(&path).unwrap().is_none());

    fs::write(fx.work.join("README.md"), "edited\n").unwrap();
    fs::write(fx.work.join("untracked.txt"), "x\n").unwrap();
    let changes = detector.local_changes(&path).unwrap().unwrap();
    assert_eq!(changes.text(), "M README.md");
}

#[test]
fn detect_unpushed_commit() {
    let fx = Fixture::new();
    let ctx = quiet();
    let path = WorkingCopyPath::normalize(&fx.work).unwrap();
    let detector = ChangeDetector::new(ctx.adapter());

    assert!(detector.unpushed_changes(&path).unwrap().is_none());

    commit_file(&fx.work, "local.txt", "mine\n", "local work");
    let changes = detector.unpushed_changes(&path).unwrap().unwrap();
    assert_eq!(changes.text(), "A\tlocal.txt");
}

#[test]
fn detect_branch_missing_on_remote() {
    let fx = Fixture::new();
    let ctx = quiet();
    let path = WorkingCopyPath::normalize(&fx.work).unwrap();
    run_git(&["checkout", "-q", "-b", "topic"], &fx.work);
    commit_file(&fx.work, "topic.txt", "topic\n", "topic work");

    let changes = ChangeDetector::new(ctx.adapter())
        .unpushed_changes(&path)
        .unwrap()
        .unwrap();
    assert!(changes.text().contains("Branch topic could not be found on any remote"));
}

#[test]
fn status_reports_branch_and_changes() {
    let fx = Fixture::new();
    let ctx = quiet();
    let package = PackageConfig {
        path: fx.work.clone(),
        reference: fx.second.clone(),
        ..PackageConfig::default()
    };

    let clean = inspect(&ctx, "acme/lib", &package).unwrap();
    assert_eq!(clean.branch.as_deref(), Some("main"));
    assert_eq!(clean.kinds(), ChangeKinds::empty());

    fs::write(fx.work.join("README.md"), "edited\n").unwrap();
    run_git(&["checkout", "-q", "--detach"], &fx.work);
    let dirty = inspect(&ctx, "acme/lib", &package).unwrap();
    assert_eq!(dirty.branch, None);
    assert_eq!(dirty.local.as_deref(), Some("M README.md"));
    assert_eq!(fx.read("README.md"), "edited\n");
}

// =============================================================================
// Update transaction
// =============================================================================

#[test]
fn update_moves_clean_working_copy_to_commit() {
    let fx = Fixture::new();
    let ctx = quiet();
    let policy = policy(DiscardPolicy::Never);
    let request = fx.request(&fx.first, "dev-main");

    let outcome = UpdateTransaction::new(&ctx, &policy).run(&request).unwrap();
    assert_eq!(outcome.action, None);
    assert_eq!(outcome.branch, None);
    assert_eq!(fx.head(), fx.first);
    assert_eq!(current_branch(&fx.work).unwrap().as_deref(), Some("main"));

    // a second run leaves the working copy where it is
    UpdateTransaction::new(&ctx, &policy).run(&request).unwrap();
    assert_eq!(fx.head(), fx.first);
}

#[test]
fn update_refuses_uncommitted_changes_without_policy() {
    let fx = Fixture::new();
    let ctx = quiet();
    fs::write(fx.work.join("README.md"), "edited\n").unwrap();

    let err = UpdateTransaction::new(&ctx, &policy(DiscardPolicy::Never))
        .run(&fx.request(&fx.first, "dev-main"))
        .unwrap_err();
    assert!(matches!(
        reconcile_error(&err),
        ReconcileError::UncommittedChanges { .. }
    ));
    assert_eq!(fx.read("README.md"), "edited\n");
    assert_eq!(fx.head(), fx.second);
}

#[test]
fn update_discards_local_changes() {
    let fx = Fixture::new();
    let ctx = quiet();
    fs::write(fx.work.join("README.md"), "edited\n").unwrap();

    let outcome = UpdateTransaction::new(&ctx, &policy(DiscardPolicy::Always))
        .run(&fx.request(&fx.first, "dev-main"))
        .unwrap();
    assert_eq!(outcome.action, Some(DestructiveAction::Discarded));
    assert_eq!(fx.head(), fx.first);
    assert_eq!(fx.read("README.md"), "one\n");
}

#[test]
fn update_stashes_and_reapplies() {
    let fx = Fixture::new();
    let ctx = quiet();
    fs::write(fx.work.join("lib.txt"), "lib\nlocal\n").unwrap();

    let outcome = UpdateTransaction::new(&ctx, &policy(DiscardPolicy::Stash))
        .run(&fx.request(&fx.first, "dev-main"))
        .unwrap();
    assert_eq!(outcome.action, Some(DestructiveAction::Stashed));
    assert_eq!(fx.head(), fx.first);
    assert_eq!(fx.read("lib.txt"), "lib\nlocal\n");
    assert_eq!(run_git(&["stash", "list"], &fx.work), "");
}

#[test]
fn update_reports_conflicting_stash_pop() {
    let fx = Fixture::new();
    let ctx = quiet();
    fs::write(fx.work.join("README.md"), "local\n").unwrap();

    let err = UpdateTransaction::new(&ctx, &policy(DiscardPolicy::Stash))
        .run(&fx.request(&fx.first, "dev-main"))
        .unwrap_err();
    let ReconcileError::StashPopFailed { output, .. } = reconcile_error(&err) else {
        panic!("expected stash pop failure, got {err:?}");
    };
    assert!(output.contains("README.md"));
    assert_eq!(fx.head(), fx.first);
}

#[test]
fn update_refuses_unpushed_commits() {
    let fx = Fixture::new();
    let ctx = quiet();
    let local = commit_file(&fx.work, "local.txt", "mine\n", "local work");

    let err = UpdateTransaction::new(&ctx, &policy(DiscardPolicy::Stash))
        .run(&fx.request(&fx.first, "dev-main"))
        .unwrap_err();
    assert!(matches!(
        reconcile_error(&err),
        ReconcileError::UnpushedChanges { .. }
    ));
    assert_eq!(fx.head(), local);
}

#[test]
fn update_fetches_new_upstream_commit() {
    let fx = Fixture::new();
    let ctx = quiet();
    let third = commit_file(&fx.upstream, "README.md", "three\n", "third");

    UpdateTransaction::new(&ctx, &policy(DiscardPolicy::Never))
        .run(&fx.request(&third, "dev-main"))
        .unwrap();
    assert_eq!(fx.head(), third);
    assert_eq!(fx.read("README.md"), "three\n");
}

#[test]
fn update_checks_out_remote_branch() {
    let fx = Fixture::new();
    let ctx = quiet();
    run_git(&["checkout", "-q", "-b", "feature"], &fx.upstream);
    let tip = commit_file(&fx.upstream, "feature.txt", "new\n", "feature");

    let outcome = UpdateTransaction::new(&ctx, &policy(DiscardPolicy::Never))
        .run(&fx.request("feature", "dev-feature"))
        .unwrap();
    assert_eq!(outcome.branch, None);
    assert_eq!(fx.head(), tip);
    assert_eq!(current_branch(&fx.work).unwrap().as_deref(), Some("feature"));
}

#[test]
fn update_corrects_missing_v_prefix() {
    let fx = Fixture::new();
    let ctx = quiet();
    run_git(&["checkout", "-q", "-b", "v2.x"], &fx.upstream);
    let tip = commit_file(&fx.upstream, "v2.txt", "2\n", "v2");

    let outcome = UpdateTransaction::new(&ctx, &policy(DiscardPolicy::Never))
        .run(&fx.request(&tip, "2.x-dev"))
        .unwrap();
    assert_eq!(outcome.branch.as_deref(), Some("v2.x"));
    assert_eq!(fx.head(), tip);
    assert_eq!(current_branch(&fx.work).unwrap().as_deref(), Some("v2.x"));
}

#[test]
fn update_detects_rewritten_history() {
    let fx = Fixture::new();
    let console = Arc::new(RecordingConsole::new(false, &[]));
    let ctx = context(Arc::clone(&console));
    let gone = "0123456789abcdef0123456789abcdef01234567";

    let err = UpdateTransaction::new(&ctx, &policy(DiscardPolicy::Never))
        .run(&fx.request(gone, "dev-main"))
        .unwrap_err();
    assert!(err.is_history_rewritten());
    assert!(
        err.remediation_hint()
            .is_some_and(|hint| hint.contains("maybe the commit was removed from the branch"))
    );
    assert!(console.output().contains("is gone (history was rewritten?)"));
}

#[test]
fn update_interactive_stash_choice() {
    let fx = Fixture::new();
    let console = Arc::new(RecordingConsole::new(true, &["v", "s"]));
    let ctx = context(Arc::clone(&console));
    fs::write(fx.work.join("lib.txt"), "lib\nlocal\n").unwrap();

    let outcome = UpdateTransaction::new(&ctx, &policy(DiscardPolicy::Never))
        .run(&fx.request(&fx.first, "dev-main"))
        .unwrap();
    assert_eq!(outcome.action, Some(DestructiveAction::Stashed));
    assert_eq!(fx.read("lib.txt"), "lib\nlocal\n");
    assert!(console.output().contains("has modified files:"));
}

#[test]
fn update_interactive_abort() {
    let fx = Fixture::new();
    let console = Arc::new(RecordingConsole::new(true, &["n"]));
    let ctx = context(console);
    fs::write(fx.work.join("lib.txt"), "lib\nlocal\n").unwrap();

    let err = UpdateTransaction::new(&ctx, &policy(DiscardPolicy::Always))
        .run(&fx.request(&fx.first, "dev-main"))
        .unwrap_err();
    assert!(err.is_user_abort());
    assert_eq!(fx.head(), fx.second);
    assert_eq!(fx.read("lib.txt"), "lib\nlocal\n");
}

// =============================================================================
// Removal
// =============================================================================

#[test]
fn remove_discards_and_deletes() {
    let fx = Fixture::new();
    let ctx = quiet();
    fs::write(fx.work.join("README.md"), "edited\n").unwrap();

    let action = UpdateTransaction::new(&ctx, &policy(DiscardPolicy::Always))
        .remove(&fx.work)
        .unwrap();
    assert_eq!(action, Some(DestructiveAction::Discarded));
    assert!(!fx.work.exists());
}

#[test]
fn remove_keeps_modified_copy_without_policy() {
    let fx = Fixture::new();
    let ctx = quiet();
    fs::write(fx.work.join("README.md"), "edited\n").unwrap();

    let err = UpdateTransaction::new(&ctx, &policy(DiscardPolicy::Stash))
        .remove(&fx.work)
        .unwrap_err();
    assert!(matches!(
        reconcile_error(&err),
        ReconcileError::UncommittedChanges { .. }
    ));
    assert!(fx.work.exists());
}

#[test]
fn plain_directory_inside_project_leaves_project_untouched() {
    let fx = Fixture::new();
    let ctx = quiet();
    let nested = fx.work.join("vendor").join("lib");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("lib.txt"), "dist\n").unwrap();
    fs::write(fx.work.join("README.md"), "work in progress\n").unwrap();
    let transaction_policy = policy(DiscardPolicy::Always);
    let transaction = UpdateTransaction::new(&ctx, &transaction_policy);

    assert!(transaction.remove(&nested).is_err());
    let nested_request = UpdateRequest::builder()
        .package("acme/lib")
        .path(&nested)
        .reference(fx.first.as_str())
        .pretty_version("dev-main")
        .build();
    assert!(transaction.run(&nested_request).is_err());

    assert_eq!(fx.read("README.md"), "work in progress\n");
    assert!(nested.join("lib.txt").exists());
    assert_eq!(fx.head(), fx.second);
}
