//! Local process execution with a hard timeout.
//!
//! `TokioCommandRunner` is the production implementation. `ssh` and `oc`
//! invocations both go through it, so a hung remote never blocks a probe
//! beyond its timeout.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Child;

/// Spawns local programs and collects their output.
///
/// A non-zero exit is not an error at this level; callers inspect
/// `Output::status`. Spawn failures and timeouts are.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run `program` with `args` using the runner's default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or times out.
    async fn run(&self, program: &str, args: &[String]) -> Result<Output>;

    /// Run `program` with `input` piped to its stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or times out.
    async fn run_with_stdin(&self, program: &str, args: &[String], input: &[u8])
    -> Result<Output>;
}

/// Production `CommandRunner` built on `tokio::process`.
///
/// The child is killed explicitly when the timeout fires; dropping the
/// future alone does not stop it on every platform.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<Output> {
        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        collect(child, program, self.timeout).await
    }

    async fn run_with_stdin(
        &self,
        program: &str,
        args: &[String],
        input: &[u8],
    ) -> Result<Output> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let stdin_handle = child.stdin.take();
        let input_owned = input.to_vec();
        let stdin_task = tokio::spawn(async move {
            if let Some(mut stdin) = stdin_handle
                && let Err(e) = stdin.write_all(&input_owned).await
            {
                tracing::debug!(error = %e, "stdin write failed");
            }
        });

        let output = collect(child, program, self.timeout).await;
        let _ = stdin_task.await;
        output
    }
}

async fn collect(mut child: Child, program: &str, timeout: Duration) -> Result<Output> {
    let mut stdout_handle = child.stdout.take();
    let mut stderr_handle = child.stderr.take();

    tokio::select! {
        result = async {
            let (status, stdout, stderr) = tokio::join!(
                child.wait(),
                read_stream(stdout_handle.as_mut(), program, "stdout"),
                read_stream(stderr_handle.as_mut(), program, "stderr"),
            );
            Ok(Output {
                status: status.with_context(|| format!("waiting for {program}"))?,
                stdout,
                stderr,
            })
        } => result,
        () = tokio::time::sleep(timeout) => {
            if let Err(e) = child.kill().await {
                tracing::debug!(program, error = %e, "kill after timeout failed");
            }
            anyhow::bail!("{program} timed out after {}s", timeout.as_secs_f32())
        }
    }
}

/// Drains a child pipe. A read error keeps what was read so far and is logged.
async fn read_stream(
    handle: Option<&mut (impl AsyncRead + Unpin)>,
    program: &str,
    stream: &str,
) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(h) = handle
        && let Err(e) = h.read_to_end(&mut buf).await
    {
        tracing::debug!(program, stream, error = %e, read = buf.len(), "output truncated");
    }
    buf
}
