// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! GitQuery (read)      --> GixBackend   (pure Rust gix)
//! SyncAdapter (text)   --> ShellBackend (git CLI, exit code + output)
//! ```
//!
//! The engine only ever talks to [`SyncAdapter`]; it parses the text the
//! tool prints and decides from exit codes. A non-zero exit is a value, not
//! an error: only a failure to spawn the process is reported as `Err`.

use crate::error::{GitError, GixError, SyncResult};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

// --- Command output ---

/// Captured result of one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    command: String,
    exit_code: i32,
    stdout: String,
    stderr: String,
}

impl CommandOutput {
    /// Creates a new `CommandOutput`.
    #[must_use]
    pub fn new(
        command: impl Into<String>,
        exit_code: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// The command line that produced this output (for diagnostics).
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns the process exit code (0 = success).
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Returns captured stdout.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Returns captured stderr.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Returns true if the process exited successfully (code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout followed by stderr, for commands that report failures on both
    /// streams (e.g. `stash pop` conflicts).
    #[must_use]
    pub fn combined_output(&self) -> String {
        [self.stdout.trim_end(), self.stderr.trim_end()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Turn a failed invocation into [`GitError::CommandFailed`] carrying
    /// stderr verbatim.
    ///
    /// # Errors
    ///
    /// Returns `CommandFailed` when the exit code is non-zero.
    pub fn into_checked(self) -> SyncResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(GitError::CommandFailed {
                command: self.command,
                output: self.stderr,
            }
            .into())
        }
    }
}

/// Which two trees a diff compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffRange<'a> {
    /// Working tree against `base` (`git diff base`).
    WorkingTree { base: &'a str },
    /// Changes on `to` since it diverged from `from` (`git diff from...to`).
    Symmetric { from: &'a str, to: &'a str },
}

// --- Query Trait (Read-only operations) ---

/// Read-only git query operations.
pub trait GitQuery {
    /// Check that `path` is the root of a git work tree.
    ///
    /// A directory nested inside some other repository's work tree is not
    /// a working copy of its own.
    fn is_working_copy_root(path: &Path) -> bool;

    /// Get current branch name (None if HEAD is detached).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or head resolution fails.
    fn current_branch(path: &Path) -> SyncResult<Option<String>>;
}

// --- Sync Adapter Trait (raw text primitives) ---

/// Primitives the reconciliation engine needs from a version-control tool.
///
/// Every method runs in the working copy at `path` and returns the tool's
/// exit code and captured output.
pub trait SyncAdapter: Send + Sync {
    /// Porcelain status, optionally restricted to tracked files.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn status(&self, path: &Path, tracked_only: bool) -> SyncResult<CommandOutput>;

    /// One line per ref: `<hash> <refname>`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn list_refs(
        &self,
        path: &Path,
        include_head: bool,
        dereference_tags: bool,
    ) -> SyncResult<CommandOutput>;

    /// Diff text for `range`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn diff(
        &self,
        path: &Path,
        range: DiffRange<'_>,
        name_status_only: bool,
    ) -> SyncResult<CommandOutput>;

    /// Fetch every configured remote.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn fetch_all(&self, path: &Path) -> SyncResult<CommandOutput>;

    /// Fetch branches and tags from one remote.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn fetch_remote(&self, path: &Path, remote: &str) -> SyncResult<CommandOutput>;

    /// Stash local modifications.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn stash(&self, path: &Path, include_untracked: bool) -> SyncResult<CommandOutput>;

    /// Re-apply and drop the most recent stash.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn stash_pop(&self, path: &Path) -> SyncResult<CommandOutput>;

    /// Remove untracked files and reset tracked ones to HEAD.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn clean_and_reset(&self, path: &Path) -> SyncResult<CommandOutput>;

    /// Check out `reference`, treating it strictly as a revision.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn checkout(&self, path: &Path, reference: &str, force: bool) -> SyncResult<CommandOutput>;

    /// Create or reset branch `name` at `source` and check it out.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn create_branch_from(
        &self,
        path: &Path,
        name: &str,
        source: &str,
        force: bool,
    ) -> SyncResult<CommandOutput>;

    /// Move HEAD, index and working tree to `reference`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn reset_hard(&self, path: &Path, reference: &str) -> SyncResult<CommandOutput>;

    /// Point `remote` at `url`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn set_remote_url(&self, path: &Path, remote: &str, url: &str) -> SyncResult<CommandOutput>;

    /// Succeeds when `reference` names a commit present in the object store.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn verify_commit(&self, path: &Path, reference: &str) -> SyncResult<CommandOutput>;

    /// The tool's own version banner.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if the process cannot be spawned.
    fn version(&self) -> SyncResult<CommandOutput>;
}

// --- GixBackend Implementation (Pure Rust) ---

/// Pure Rust git backend using gix.
///
/// Provides read-only operations without spawning subprocesses.
pub struct GixBackend;

impl GitQuery for GixBackend {
    fn is_working_copy_root(path: &Path) -> bool {
        let Ok(repo) = gix::discover(path) else {
            return false;
        };
        let (Some(workdir), Ok(root)) = (repo.workdir(), path.canonicalize()) else {
            return false;
        };
        workdir
            .canonicalize()
            .is_ok_and(|workdir| workdir == root)
    }

    fn current_branch(path: &Path) -> SyncResult<Option<String>> {
        let repo =
            gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;
        let head = repo
            .head_name()
            .map_err(|e| GitError::Gix(GixError::Head(e)))?;
        Ok(head.map(|name| name.shorten().to_string()))
    }
}

// --- ShellBackend Implementation (Git CLI) ---

/// Shell-based backend driving the git CLI.
///
/// Always sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0` so a
/// credential prompt can never block an update.
#[derive(Debug, Clone)]
pub struct ShellBackend {
    program: PathBuf,
}

impl ShellBackend {
    /// Use the given git executable.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve `git` from `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::ExecutableNotFound`] if no git executable is found.
    pub fn locate() -> SyncResult<Self> {
        which::which("git").map(Self::new).map_err(|_| {
            GitError::ExecutableNotFound {
                name: "git".to_string(),
            }
            .into()
        })
    }

    /// Path of the git executable in use.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run one git command in `cwd` and capture everything it prints.
    fn run(&self, cwd: &Path, args: &[&str]) -> SyncResult<CommandOutput> {
        use std::process::Command;

        let command_line = format!("git {}", args.join(" "));
        debug!(cwd = %cwd.display(), cmd = %command_line, "exec");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|source| GitError::SpawnFailed {
                command: command_line.clone(),
                source,
            })?;

        let result = CommandOutput::new(
            command_line,
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        trace!(
            cmd = %result.command(),
            exit_code = result.exit_code(),
            stderr = %result.stderr().trim(),
            "completed"
        );
        Ok(result)
    }

    /// Run `first`, then `second` only if `first` succeeded.
    fn run_both(&self, cwd: &Path, first: &[&str], second: &[&str]) -> SyncResult<CommandOutput> {
        let output = self.run(cwd, first)?;
        if !output.success() {
            return Ok(output);
        }
        self.run(cwd, second)
    }
}

impl SyncAdapter for ShellBackend {
    fn status(&self, path: &Path, tracked_only: bool) -> SyncResult<CommandOutput> {
        let mut args = vec!["status", "--porcelain"];
        if tracked_only {
            args.push("--untracked-files=no");
        }
        self.run(path, &args)
    }

    fn list_refs(
        &self,
        path: &Path,
        include_head: bool,
        dereference_tags: bool,
    ) -> SyncResult<CommandOutput> {
        let mut args = vec!["show-ref"];
        if include_head {
            args.push("--head");
        }
        if dereference_tags {
            args.push("-d");
        }
        self.run(path, &args)
    }

    fn diff(
        &self,
        path: &Path,
        range: DiffRange<'_>,
        name_status_only: bool,
    ) -> SyncResult<CommandOutput> {
        let spec = match range {
            DiffRange::WorkingTree { base } => base.to_string(),
            DiffRange::Symmetric { from, to } => format!("{from}...{to}"),
        };
        let mut args = vec!["diff"];
        if name_status_only {
            args.push("--name-status");
        }
        args.push(&spec);
        args.push("--");
        self.run(path, &args)
    }

    fn fetch_all(&self, path: &Path) -> SyncResult<CommandOutput> {
        self.run(path, &["fetch", "--all"])
    }

    fn fetch_remote(&self, path: &Path, remote: &str) -> SyncResult<CommandOutput> {
        self.run_both(
            path,
            &["fetch", remote],
            &["fetch", "--tags", remote],
        )
    }

    fn stash(&self, path: &Path, include_untracked: bool) -> SyncResult<CommandOutput> {
        if include_untracked {
            self.run(path, &["stash", "--include-untracked"])
        } else {
            self.run(path, &["stash"])
        }
    }

    fn stash_pop(&self, path: &Path) -> SyncResult<CommandOutput> {
        self.run(path, &["stash", "pop"])
    }

    fn clean_and_reset(&self, path: &Path) -> SyncResult<CommandOutput> {
        self.run_both(path, &["clean", "-df"], &["reset", "--hard"])
    }

    fn checkout(&self, path: &Path, reference: &str, force: bool) -> SyncResult<CommandOutput> {
        let mut args = vec!["-c", "advice.detachedHead=false", "checkout"];
        if force {
            args.push("-f");
        }
        // "--" keeps a same-named file from being checked out instead
        args.extend([reference, "--"]);
        self.run(path, &args)
    }

    fn create_branch_from(
        &self,
        path: &Path,
        name: &str,
        source: &str,
        force: bool,
    ) -> SyncResult<CommandOutput> {
        let mut args = vec!["-c", "advice.detachedHead=false", "checkout"];
        if force {
            args.push("-f");
        }
        args.extend(["-B", name, source, "--"]);
        self.run(path, &args)
    }

    fn reset_hard(&self, path: &Path, reference: &str) -> SyncResult<CommandOutput> {
        self.run(path, &["reset", "--hard", reference, "--"])
    }

    fn set_remote_url(&self, path: &Path, remote: &str, url: &str) -> SyncResult<CommandOutput> {
        self.run(path, &["remote", "set-url", remote, "--", url])
    }

    fn verify_commit(&self, path: &Path, reference: &str) -> SyncResult<CommandOutput> {
        let spec = format!("{reference}^{{commit}}");
        self.run(path, &["rev-parse", "--quiet", "--verify", &spec])
    }

    fn version(&self) -> SyncResult<CommandOutput> {
        self.run(Path::new("."), &["--version"])
    }
}
