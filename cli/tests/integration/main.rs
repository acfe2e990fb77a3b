//! Integration tests for the crcup CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior. None of
//! them reach a cluster: they cover argument parsing, config loading, and
//! the offline commands.

mod architecture;
mod cli_tests;
