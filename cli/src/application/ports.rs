//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::time::Duration;

use anyhow::Result;

use crate::domain::{BringupConfig, CommandError};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Captured output of a successful control-plane command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcOutput {
    pub stdout: String,
    pub stderr: String,
}

impl OcOutput {
    #[must_use]
    pub fn stdout(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }
}

// ── Remote Command Ports ──────────────────────────────────────────────────────

/// Command execution on the cluster node over a remote shell session.
///
/// Failures are never retried here. Callers decide whether a failure is
/// retriable.
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    /// Run `command` through the remote shell and return its trimmed stdout.
    ///
    /// # Errors
    ///
    /// `CommandError::Transport` if the session could not be used,
    /// `CommandError::Exit` if the command exited non-zero.
    async fn run(&self, command: &str) -> Result<String, CommandError>;

    /// Overwrite `path` with `content` as root and set its permission bits.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or the chmod fails. A dropped session
    /// may leave a partial file, so callers must not assume retry safety.
    async fn write_file_as_root(
        &self,
        path: &str,
        content: &str,
        mode: u32,
    ) -> Result<(), CommandError>;
}

/// Administrative commands against the cluster control plane (`oc ...`).
#[allow(async_fn_in_trait)]
pub trait ControlPlane {
    /// Run `oc` with `args`.
    ///
    /// # Errors
    ///
    /// Same contract as [`RemoteShell::run`]; `CommandError::Exit` carries stderr.
    async fn run(&self, args: &[String]) -> Result<OcOutput, CommandError>;

    /// Like [`ControlPlane::run`] for arguments carrying secrets.
    ///
    /// Implementations must not log `args`.
    ///
    /// # Errors
    ///
    /// Same as [`ControlPlane::run`].
    async fn run_private(&self, args: &[String]) -> Result<OcOutput, CommandError> {
        self.run(args).await
    }
}

// ── Timing Port ───────────────────────────────────────────────────────────────

/// Suspends the caller between retry attempts.
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit a diagnostic message, hidden unless verbose output is on.
    fn debug(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts loading the bring-up configuration.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration exists but cannot be read or parsed.
    fn load(&self) -> Result<BringupConfig>;
}
