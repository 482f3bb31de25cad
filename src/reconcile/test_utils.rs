// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared test utilities for the reconcile engine.
//!
//! `ScriptedAdapter` answers adapter calls from a table keyed by the git
//! command line it would have run; `ScriptedConsole` replays prompt answers
//! and captures everything written.

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use super::{Console, SyncContext};
use super::session::{ReconcileSession, SessionRegistry, WorkingCopyPath};
use crate::error::SyncResult;
use crate::git::backend::{CommandOutput, DiffRange, SyncAdapter};
use crate::git::version::GitVersion;

pub(crate) const H1: &str = "1111111111111111111111111111111111111111";
pub(crate) const H2: &str = "2222222222222222222222222222222222222222";
pub(crate) const H3: &str = "3333333333333333333333333333333333333333";

pub(crate) fn ok(stdout: &str) -> CommandOutput {
    CommandOutput::new("", 0, stdout, "")
}

pub(crate) fn fail(stderr: &str) -> CommandOutput {
    CommandOutput::new("", 1, "", stderr)
}

/// In-memory adapter. Unscripted commands succeed with empty output.
#[derive(Default)]
pub(crate) struct ScriptedAdapter {
    responses: Mutex<HashMap<String, VecDeque<CommandOutput>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedAdapter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `command`. The last queued response repeats.
    pub(crate) fn on(self, command: &str, output: CommandOutput) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(output);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, command: &str) -> usize {
        self.calls().iter().filter(|c| *c == command).count()
    }

    fn call(&self, command: String) -> SyncResult<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());
        let mut responses = self.responses.lock().unwrap();
        let output = match responses.get_mut(&command) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => CommandOutput::default(),
        };
        let exit_code = output.exit_code();
        Ok(CommandOutput::new(
            format!("git {command}"),
            exit_code,
            output.stdout(),
            output.stderr(),
        ))
    }
}

impl SyncAdapter for ScriptedAdapter {
    fn status(&self, _path: &Path, tracked_only: bool) -> SyncResult<CommandOutput> {
        self.call(if tracked_only {
            "status --porcelain --untracked-files=no".to_string()
        } else {
            "status --porcelain".to_string()
        })
    }

    fn list_refs(&self, _path: &Path, include_head: bool, deref: bool) -> SyncResult<CommandOutput> {
        let mut command = "show-ref".to_string();
        if include_head {
            command.push_str(" --head");
        }
        if deref {
            command.push_str(" -d");
        }
        self.call(command)
    }

    fn diff(&self, _path: &Path, range: DiffRange<'_>, name_status: bool) -> SyncResult<CommandOutput> {
        let spec = match range {
            DiffRange::WorkingTree { base } => base.to_string(),
            DiffRange::Symmetric { from, to } => format!("{from}...{to}"),
        };
        let flag = if name_status { " --name-status" } else { "" };
        self.call(format!("diff{flag} {spec} --"))
    }

    fn fetch_all(&self, _path: &Path) -> SyncResult<CommandOutput> {
        self.call("fetch --all".to_string())
    }

    fn fetch_remote(&self, _path: &Path, remote: &str) -> SyncResult<CommandOutput> {
        self.call(format!("fetch {remote}"))
    }

    fn stash(&self, _path: &Path, include_untracked: bool) -> SyncResult<CommandOutput> {
        self.call(if include_untracked {
            "stash --include-untracked".to_string()
        } else {
            "stash".to_string()
        })
    }

    fn stash_pop(&self, _path: &Path) -> SyncResult<CommandOutput> {
        self.call("stash pop".to_string())
    }

    fn clean_and_reset(&self, _path: &Path) -> SyncResult<CommandOutput> {
        self.call("clean -df && reset --hard".to_string())
    }

    fn checkout(&self, _path: &Path, reference: &str, force: bool) -> SyncResult<CommandOutput> {
        let flag = if force { "-f " } else { "" };
        self.call(format!("checkout {flag}{reference} --"))
    }

    fn create_branch_from(
        &self,
        _path: &Path,
        name: &str,
        source: &str,
        force: bool,
    ) -> SyncResult<CommandOutput> {
        let flag = if force { "-f " } else { "" };
        self.call(format!("checkout {flag}-B {name} {source} --"))
    }

    fn reset_hard(&self, _path: &Path, reference: &str) -> SyncResult<CommandOutput> {
        self.call(format!("reset --hard {reference} --"))
    }

    fn set_remote_url(&self, _path: &Path, remote: &str, url: &str) -> SyncResult<CommandOutput> {
        self.call(format!("remote set-url {remote} -- {url}"))
    }

    fn verify_commit(&self, _path: &Path, reference: &str) -> SyncResult<CommandOutput> {
        self.call(format!("rev-parse --quiet --verify {reference}^{{commit}}"))
    }

    fn version(&self) -> SyncResult<CommandOutput> {
        self.call("--version".to_string())
    }
}

/// Console replaying canned answers; `None` once they run out (EOF).
pub(crate) struct ScriptedConsole {
    interactive: bool,
    answers: Mutex<VecDeque<String>>,
    written: Mutex<Vec<String>>,
}

impl ScriptedConsole {
    pub(crate) fn new(interactive: bool, answers: &[&str]) -> Self {
        Self {
            interactive,
            answers: Mutex::new(answers.iter().map(ToString::to_string).collect()),
            written: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn output(&self) -> String {
        self.written.lock().unwrap().join("\n")
    }
}

impl Console for ScriptedConsole {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn write_error(&self, line: &str) {
        self.written.lock().unwrap().push(line.to_string());
    }

    fn ask(&self, question: &str) -> Option<String> {
        self.written.lock().unwrap().push(question.to_string());
        self.answers.lock().unwrap().pop_front()
    }
}

/// Context over a scripted adapter and console.
pub(crate) fn context(
    adapter: Arc<ScriptedAdapter>,
    console: Arc<ScriptedConsole>,
) -> SyncContext {
    let interactive = console.is_interactive();
    SyncContext::builder()
        .adapter(adapter)
        .console(console)
        .version(GitVersion::new(2, 43, 0))
        .interactive(interactive)
        .build()
}

/// A session over a real (empty) directory.
pub(crate) fn session(registry: &SessionRegistry, dir: &tempfile::TempDir) -> ReconcileSession {
    let path = WorkingCopyPath::normalize(dir.path()).unwrap();
    registry.claim(path).unwrap()
}

// --- Log capture ---

#[derive(Clone)]
struct BufferWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| std::io::Error::other("buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
struct BufferMakeWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for BufferMakeWriter {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter {
            buffer: self.buffer.clone(),
        }
    }
}

/// Runs `f` while capturing tracing output at `INFO` and above.
pub(crate) fn with_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(BufferMakeWriter {
            buffer: buffer.clone(),
        })
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_target(false)
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.lock().unwrap()).to_string();
    (value, logs)
}
