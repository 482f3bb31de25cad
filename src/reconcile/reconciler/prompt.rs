// depsync: Dependency Working-Copy Sync
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Interactive "Discard changes?" prompt.
//!
//! ```text
//!             Preview
//!                |
//!                v
//!   +-------> AwaitChoice <-------+---------+
//!   |            |                |         |
//!   |   ?/other  | v            d |         |
//!   |      v     +-----> ShowFiles   ShowDiff
//!   +---- Help   |
//!                | y / s (update) / n / EOF
//!                v
//!             Done(Choice)
//! ```
//!
//! The loop blocks the calling thread until a terminal choice is made.

use crate::config::types::InteractiveMode;
use crate::error::SyncResult;
use std::io::{BufRead, IsTerminal, Write};

use super::Operation;

/// Files shown before the prompt.
pub const PREVIEW_LIMIT: usize = 10;

/// User-facing terminal.
pub trait Console: Send + Sync {
    /// Whether a human can answer prompts.
    fn is_interactive(&self) -> bool;

    /// Write one line to the diagnostic stream.
    fn write_error(&self, line: &str);

    /// Show `question` and read one line; `None` on end of input.
    fn ask(&self, question: &str) -> Option<String>;
}

/// Console on stdin/stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal()
    }

    fn write_error(&self, line: &str) {
        eprintln!("{line}");
    }

    fn ask(&self, question: &str) -> Option<String> {
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "{question}");
        let _ = stderr.flush();

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(answer),
        }
    }
}

/// Whether to prompt, given the configured mode and the console.
#[must_use]
pub fn resolve_interactive(mode: InteractiveMode, console: &dyn Console) -> bool {
    match mode {
        InteractiveMode::Auto => console.is_interactive(),
        InteractiveMode::Always => true,
        InteractiveMode::Never => false,
    }
}

/// Terminal outcome of the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Discard,
    Stash,
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PromptState {
    Preview,
    AwaitChoice,
    Help,
    ShowFiles,
    ShowDiff,
    Done(Choice),
}

/// Next state for an answer read in `AwaitChoice`.
pub(super) fn transition(answer: Option<&str>, operation: Operation) -> PromptState {
    let Some(answer) = answer else {
        return PromptState::Done(Choice::Abort);
    };
    match answer.trim() {
        "y" => PromptState::Done(Choice::Discard),
        "s" if operation == Operation::Update => PromptState::Done(Choice::Stash),
        "n" => PromptState::Done(Choice::Abort),
        "v" => PromptState::ShowFiles,
        "d" => PromptState::ShowDiff,
        _ => PromptState::Help,
    }
}

pub(super) fn question(operation: Operation) -> String {
    let stash = if operation == Operation::Update { "s," } else { "" };
    format!("    Discard changes [y,n,v,d,{stash}?]? ")
}

pub(super) fn help_lines(operation: Operation) -> Vec<String> {
    let mut lines = vec![
        format!("    y - discard changes and apply the {operation}"),
        format!("    n - abort the {operation} and let you manually clean things up"),
        "    v - view modified files".to_string(),
        "    d - view local modifications (diff)".to_string(),
    ];
    if operation == Operation::Update {
        lines.push("    s - stash changes and try to reapply them after the update".to_string());
    }
    lines.push("    ? - print help".to_string());
    lines
}

/// The prompt for one working copy.
pub(super) struct Prompt<'a> {
    console: &'a dyn Console,
    operation: Operation,
    header: String,
    files: Vec<String>,
}

impl<'a> Prompt<'a> {
    pub(super) fn new(
        console: &'a dyn Console,
        operation: Operation,
        path: &str,
        changes: &str,
    ) -> Self {
        Self {
            console,
            operation,
            header: format!("    {path} has modified files:"),
            files: changes
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| format!("    {l}"))
                .collect(),
        }
    }

    /// Run until a terminal choice. `show_diff` is called for each "d".
    pub(super) fn run(
        &self,
        mut show_diff: impl FnMut() -> SyncResult<String>,
    ) -> SyncResult<Choice> {
        let mut state = PromptState::Preview;
        loop {
            state = match state {
                PromptState::Preview => {
                    self.preview();
                    PromptState::AwaitChoice
                }
                PromptState::AwaitChoice => {
                    let answer = self.console.ask(&question(self.operation));
                    transition(answer.as_deref(), self.operation)
                }
                PromptState::Help => {
                    self.write_all(&help_lines(self.operation));
                    PromptState::AwaitChoice
                }
                PromptState::ShowFiles => {
                    self.write_all(&self.files);
                    PromptState::AwaitChoice
                }
                PromptState::ShowDiff => {
                    self.console.write_error(&show_diff()?);
                    PromptState::AwaitChoice
                }
                PromptState::Done(choice) => return Ok(choice),
            };
        }
    }

    fn preview(&self) {
        self.console.write_error(&self.header);
        let shown = self.files.len().min(PREVIEW_LIMIT);
        self.write_all(&self.files[..shown]);
        if self.files.len() > PREVIEW_LIMIT {
            self.console.write_error(&format!(
                "    {} more files modified, choose \"v\" to view the full list",
                self.files.len() - PREVIEW_LIMIT
            ));
        }
    }

    fn write_all(&self, lines: &[String]) {
        for line in lines {
            self.console.write_error(line);
        }
    }
}
