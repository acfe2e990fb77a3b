//! Application context: unified state passed to every command handler.
//!
//! `AppContext` is built once in `Cli::run()` from the global flags and the
//! loaded config. It owns the production `ssh` and `oc` clients, so command
//! handlers only pick the service to call.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::BringupConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::oc::OcCli;
use crate::infra::sleeper::TokioSleeper;
use crate::infra::ssh::SshRunner;
use crate::output::{OutputContext, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Config file override. `~/.crcup/config.yaml` when `None`.
    pub config: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Loaded and validated configuration.
    pub config: BringupConfig,
    /// Commands on the cluster node.
    pub ssh: SshRunner<TokioCommandRunner>,
    /// Commands against the control plane.
    pub oc: OcCli<TokioCommandRunner>,
    /// Timer used between retry attempts.
    pub sleeper: TokioSleeper,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be located, read, parsed,
    /// or validated.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let path = match &flags.config {
            Some(path) => path.clone(),
            None => YamlConfigStore::default_path()?,
        };
        let config = YamlConfigStore::new(path).load()?;
        Ok(Self::with_config(flags, config))
    }

    /// Construct an `AppContext` around an already loaded config.
    #[must_use]
    pub fn with_config(flags: &AppFlags, config: BringupConfig) -> Self {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        // JSON mode keeps stdout for the result object.
        let quiet = flags.output.quiet || flags.output.json;

        let ssh_timeout = Duration::from_secs(config.ssh.command_timeout_secs);
        let oc_timeout = Duration::from_secs(config.oc.command_timeout_secs);

        Self {
            output: OutputContext::new(flags.output.no_color, quiet),
            mode,
            ssh: SshRunner::new(TokioCommandRunner::new(ssh_timeout), config.ssh.clone()),
            oc: OcCli::new(TokioCommandRunner::new(oc_timeout), config.oc.clone()),
            sleeper: TokioSleeper,
            config,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }
}
