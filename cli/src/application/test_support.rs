//! Shared test doubles for application services.
//!
//! Spies record what they were asked to do; fakes answer from a closure so
//! each test scripts only the calls it cares about.

#![allow(clippy::expect_used)]

use std::cell::{Cell, RefCell};
use std::time::Duration;

use crate::application::ports::{ControlPlane, OcOutput, ProgressReporter, RemoteShell, Sleeper};
use crate::domain::error::CommandError;

/// Drive a future to completion on a fresh current-thread runtime.
pub fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(fut)
}

pub fn exit_error(program: &str, stderr: &str) -> CommandError {
    CommandError::Exit {
        program: program.to_string(),
        code: Some(1),
        stderr: stderr.to_string(),
    }
}

pub fn transport_error(msg: &str) -> CommandError {
    CommandError::Transport(anyhow::anyhow!(msg.to_string()))
}

// ── Sleeper ───────────────────────────────────────────────────────────────────

/// Records requested sleeps without waiting.
#[derive(Default)]
pub struct SpySleeper {
    slept: RefCell<Vec<Duration>>,
}

impl SpySleeper {
    pub fn count(&self) -> usize {
        self.slept.borrow().len()
    }

    pub fn slept(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl Sleeper for SpySleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}

// ── Reporter ──────────────────────────────────────────────────────────────────

/// Collects every reported line, tagged by level.
#[derive(Default)]
pub struct RecordingReporter {
    lines: RefCell<Vec<(&'static str, String)>>,
}

impl RecordingReporter {
    fn lines_at(&self, level: &str) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn steps(&self) -> Vec<String> {
        self.lines_at("step")
    }

    pub fn successes(&self) -> Vec<String> {
        self.lines_at("success")
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lines_at("warn")
    }

    pub fn debug_lines(&self) -> Vec<String> {
        self.lines_at("debug")
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.lines.borrow_mut().push(("step", message.to_string()));
    }
    fn success(&self, message: &str) {
        self.lines.borrow_mut().push(("success", message.to_string()));
    }
    fn warn(&self, message: &str) {
        self.lines.borrow_mut().push(("warn", message.to_string()));
    }
    fn debug(&self, message: &str) {
        self.lines.borrow_mut().push(("debug", message.to_string()));
    }
}

// ── Remote shell ──────────────────────────────────────────────────────────────

type ShellResponder = Box<dyn Fn(&str, usize) -> Result<String, CommandError>>;

/// A file write captured by [`FakeShell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: String,
    pub content: String,
    pub mode: u32,
}

/// `RemoteShell` answering from a closure `(command, nth call) -> result`.
pub struct FakeShell {
    responder: ShellResponder,
    commands: RefCell<Vec<String>>,
    writes: RefCell<Vec<WrittenFile>>,
    fail_writes: Cell<bool>,
}

impl FakeShell {
    pub fn new(responder: impl Fn(&str, usize) -> Result<String, CommandError> + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            commands: RefCell::new(Vec::new()),
            writes: RefCell::new(Vec::new()),
            fail_writes: Cell::new(false),
        }
    }

    /// Every command succeeds with empty output.
    pub fn ok() -> Self {
        Self::new(|_, _| Ok(String::new()))
    }

    pub fn failing_writes(self) -> Self {
        self.fail_writes.set(true);
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    pub fn writes(&self) -> Vec<WrittenFile> {
        self.writes.borrow().clone()
    }
}

impl RemoteShell for FakeShell {
    async fn run(&self, command: &str) -> Result<String, CommandError> {
        let nth = self.commands.borrow().len();
        self.commands.borrow_mut().push(command.to_string());
        (self.responder)(command, nth)
    }

    async fn write_file_as_root(
        &self,
        path: &str,
        content: &str,
        mode: u32,
    ) -> Result<(), CommandError> {
        if self.fail_writes.get() {
            return Err(exit_error("ssh", "Permission denied"));
        }
        self.writes.borrow_mut().push(WrittenFile {
            path: path.to_string(),
            content: content.to_string(),
            mode,
        });
        Ok(())
    }
}

// ── Control plane ─────────────────────────────────────────────────────────────

type OcResponder = Box<dyn Fn(&[String], usize) -> Result<OcOutput, CommandError>>;

/// `ControlPlane` answering from a closure `(args, nth call) -> result`.
pub struct FakeControlPlane {
    responder: OcResponder,
    calls: RefCell<Vec<Vec<String>>>,
    private_calls: Cell<usize>,
}

impl FakeControlPlane {
    pub fn new(
        responder: impl Fn(&[String], usize) -> Result<OcOutput, CommandError> + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: RefCell::new(Vec::new()),
            private_calls: Cell::new(0),
        }
    }

    /// Every command succeeds with empty output.
    pub fn ok() -> Self {
        Self::new(|_, _| Ok(OcOutput::default()))
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    /// Number of calls whose first two args are `verb kind`.
    pub fn count(&self, verb: &str, kind: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.first().map(String::as_str) == Some(verb))
            .filter(|c| c.get(1).map(String::as_str) == Some(kind))
            .count()
    }

    pub fn private_calls(&self) -> usize {
        self.private_calls.get()
    }
}

impl ControlPlane for FakeControlPlane {
    async fn run(&self, args: &[String]) -> Result<OcOutput, CommandError> {
        let nth = self.calls.borrow().len();
        self.calls.borrow_mut().push(args.to_vec());
        (self.responder)(args, nth)
    }

    async fn run_private(&self, args: &[String]) -> Result<OcOutput, CommandError> {
        self.private_calls.set(self.private_calls.get() + 1);
        self.run(args).await
    }
}
