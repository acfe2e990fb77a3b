//! `RemoteShell` over the system `ssh` client.
//!
//! Each call is a fresh non-interactive `ssh` invocation. `ssh` exits with
//! 255 when the connection itself fails; that is reported as a transport
//! failure, every other non-zero exit as a command failure.

use std::process::Output;

use crate::application::ports::RemoteShell;
use crate::domain::config::SshConfig;
use crate::domain::error::CommandError;
use crate::infra::command_runner::CommandRunner;

const SSH_CONNECTION_FAILURE: i32 = 255;

/// Production `RemoteShell` for the cluster node.
pub struct SshRunner<R> {
    runner: R,
    config: SshConfig,
}

impl<R: CommandRunner> SshRunner<R> {
    /// `config.identity_file` must already be expanded.
    #[must_use]
    pub fn new(runner: R, config: SshConfig) -> Self {
        Self { runner, config }
    }

    fn args(&self, command: &str) -> Vec<String> {
        let mut args: Vec<String> = [
            "-o",
            "BatchMode=yes",
            "-o",
            "StrictHostKeyChecking=no",
            "-o",
            "UserKnownHostsFile=/dev/null",
            "-o",
            "LogLevel=ERROR",
            "-o",
            "ConnectTimeout=10",
            "-p",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        args.push(self.config.port.to_string());
        if let Some(key) = &self.config.identity_file {
            args.push("-i".to_string());
            args.push(key.clone());
        }
        args.push(format!("{}@{}", self.config.user, self.config.host));
        args.push("--".to_string());
        args.push(command.to_string());
        args
    }
}

impl<R: CommandRunner> RemoteShell for SshRunner<R> {
    async fn run(&self, command: &str) -> Result<String, CommandError> {
        tracing::debug!(host = %self.config.host, %command, "ssh");
        let output = self
            .runner
            .run("ssh", &self.args(command))
            .await
            .map_err(CommandError::Transport)?;
        into_stdout(output)
    }

    async fn write_file_as_root(
        &self,
        path: &str,
        content: &str,
        mode: u32,
    ) -> Result<(), CommandError> {
        tracing::debug!(host = %self.config.host, %path, mode = %format!("{mode:o}"), "ssh write");
        let quoted = sh_quote(path);
        let command = format!("sudo tee {quoted} >/dev/null && sudo chmod {mode:o} {quoted}");
        let output = self
            .runner
            .run_with_stdin("ssh", &self.args(&command), content.as_bytes())
            .await
            .map_err(CommandError::Transport)?;
        into_stdout(output).map(drop)
    }
}

fn into_stdout(output: Output) -> Result<String, CommandError> {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    match output.status.code() {
        _ if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        }
        Some(SSH_CONNECTION_FAILURE) => Err(CommandError::Transport(anyhow::anyhow!(
            "ssh connection failed: {stderr}"
        ))),
        code => Err(CommandError::Exit {
            program: "ssh".to_string(),
            code,
            stderr,
        }),
    }
}

/// Single-quote `s` for a POSIX shell.
fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
