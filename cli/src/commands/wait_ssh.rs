//! `crcup wait-ssh`: wait until the node accepts SSH.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::retry::{Retrier, RetryPolicy};
use crate::application::services::readiness::wait_for_ssh;

/// Arguments for the wait-ssh command.
#[derive(Args)]
pub struct WaitSshArgs {
    /// Maximum number of attempts
    #[arg(long, default_value_t = 60)]
    pub attempts: u32,

    /// Seconds between attempts
    #[arg(long, default_value_t = 1)]
    pub delay_secs: u64,
}

/// Run the command.
///
/// # Errors
///
/// Returns an error if `--attempts` is zero or the node never answers.
pub async fn run(app: &AppContext, args: &WaitSshArgs) -> Result<ExitCode> {
    let policy = RetryPolicy::new(args.attempts, Duration::from_secs(args.delay_secs))?;
    let reporter = app.reporter();
    let retrier = Retrier::new(&app.sleeper, &reporter);

    app.output.header(&format!(
        "Waiting for {}@{}",
        app.config.ssh.user, app.config.ssh.host
    ));
    wait_for_ssh(&app.ssh, &retrier, policy).await?;

    if app.is_json() {
        println!(r#"{{"reachable":true}}"#);
    } else {
        app.output.success("node reachable over SSH");
    }
    Ok(ExitCode::SUCCESS)
}
