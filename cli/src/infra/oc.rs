//! `ControlPlane` over the local `oc` binary.

use std::process::Output;

use crate::application::ports::{ControlPlane, OcOutput};
use crate::domain::config::OcConfig;
use crate::domain::error::CommandError;
use crate::infra::command_runner::CommandRunner;

/// Production `ControlPlane`. Prepends `--kubeconfig` and `--context` when set.
pub struct OcCli<R> {
    runner: R,
    config: OcConfig,
}

impl<R: CommandRunner> OcCli<R> {
    /// `config.kubeconfig` must already be expanded.
    #[must_use]
    pub fn new(runner: R, config: OcConfig) -> Self {
        Self { runner, config }
    }

    fn full_args(&self, args: &[String]) -> Vec<String> {
        let mut full = Vec::with_capacity(args.len() + 4);
        if let Some(kubeconfig) = &self.config.kubeconfig {
            full.push(format!("--kubeconfig={kubeconfig}"));
        }
        if let Some(context) = &self.config.context {
            full.push(format!("--context={context}"));
        }
        full.extend_from_slice(args);
        full
    }

    async fn exec(&self, args: &[String]) -> Result<OcOutput, CommandError> {
        let output = self
            .runner
            .run(&self.config.binary, &self.full_args(args))
            .await
            .map_err(CommandError::Transport)?;
        self.check_exit(output)
    }

    fn check_exit(&self, output: Output) -> Result<OcOutput, CommandError> {
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if output.status.success() {
            Ok(OcOutput { stdout, stderr })
        } else {
            Err(CommandError::Exit {
                program: self.config.binary.clone(),
                code: output.status.code(),
                stderr,
            })
        }
    }
}

impl<R: CommandRunner> ControlPlane for OcCli<R> {
    async fn run(&self, args: &[String]) -> Result<OcOutput, CommandError> {
        tracing::debug!(args = %args.join(" "), "oc");
        self.exec(args).await
    }

    async fn run_private(&self, args: &[String]) -> Result<OcOutput, CommandError> {
        tracing::debug!(
            verb = args.first().map_or("", String::as_str),
            "oc (arguments hidden)"
        );
        self.exec(args).await
    }
}
