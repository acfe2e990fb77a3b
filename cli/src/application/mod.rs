//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain`, never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod ports;
pub mod retry;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use ports::{ConfigStore, ControlPlane, OcOutput, ProgressReporter, RemoteShell, Sleeper};
pub use retry::{Retrier, RetryPolicy, retry_after};
