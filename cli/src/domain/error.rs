//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::cert::CertExpiryState;

// ── Probe errors ──────────────────────────────────────────────────────────────

/// Outcome of a single failed probe attempt.
///
/// The retry engine only looks at the tag: `Retriable` keeps the loop going
/// while attempts remain, `Fatal` stops it at once. Which tag a failure gets
/// is decided by the probe, never by the engine.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{0:#}")]
    Retriable(anyhow::Error),

    #[error("{0:#}")]
    Fatal(anyhow::Error),
}

impl ProbeError {
    /// Tag `err` as worth another attempt.
    pub fn retriable(err: impl Into<anyhow::Error>) -> Self {
        Self::Retriable(err.into())
    }

    /// Tag `err` as terminal.
    pub fn fatal(err: impl Into<anyhow::Error>) -> Self {
        Self::Fatal(err.into())
    }

    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Retriable(_))
    }

    /// Drop the tag and return the underlying failure.
    #[must_use]
    pub fn into_inner(self) -> anyhow::Error {
        match self {
            Self::Retriable(e) | Self::Fatal(e) => e,
        }
    }
}

/// Untagged failures are fatal, so `?` inside a probe aborts the loop.
impl From<anyhow::Error> for ProbeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Fatal(err)
    }
}

impl From<CommandError> for ProbeError {
    fn from(err: CommandError) -> Self {
        Self::Fatal(err.into())
    }
}

// ── Remote command errors ─────────────────────────────────────────────────────

/// Failure of a command run on the remote host or against the control plane.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not be delivered or its result could not be read.
    #[error("transport failure: {0:#}")]
    Transport(anyhow::Error),

    /// The command ran and exited unsuccessfully.
    #[error("{program} exited with {}: {stderr}", display_code(.code))]
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl CommandError {
    /// Captured stderr for exit failures, empty for transport failures.
    #[must_use]
    pub fn stderr(&self) -> &str {
        match self {
            Self::Exit { stderr, .. } => stderr,
            Self::Transport(_) => "",
        }
    }

    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| format!("code {c}"))
}

// ── Certificate errors ────────────────────────────────────────────────────────

/// Why a certificate check did not report `NotExpired`.
#[derive(Debug, Error)]
pub enum CertCheckError {
    /// `valid_until` is already rendered in RFC 822 form.
    #[error("certs have expired, they were valid till: {valid_until}")]
    Expired { valid_until: String },

    #[error("cannot determine cert expiry: {0:#}")]
    Unknown(anyhow::Error),
}

impl CertCheckError {
    /// The lifecycle state this failure corresponds to.
    #[must_use]
    pub fn state(&self) -> CertExpiryState {
        match self {
            Self::Expired { .. } => CertExpiryState::Expired,
            Self::Unknown(_) => CertExpiryState::Unknown,
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ssh.host must not be empty")]
    MissingSshHost,

    #[error("ssh.port must be between 1 and 65535")]
    InvalidSshPort,

    #[error("Invalid value for {key}: {value}\n\n{hint}")]
    InvalidValue {
        key: String,
        value: String,
        hint: String,
    },
}
