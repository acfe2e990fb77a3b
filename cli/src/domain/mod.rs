//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod cert;
pub mod cluster;
pub mod config;
pub mod disk;
pub mod error;
pub mod proxy;

pub use cert::CertExpiryState;
pub use config::BringupConfig;
pub use disk::DiskUsage;
pub use error::{CertCheckError, CommandError, ConfigError, ProbeError};
pub use proxy::ProxyConfig;
