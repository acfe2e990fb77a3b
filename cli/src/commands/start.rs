//! `crcup start`: full bring-up.

use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::retry::Retrier;
use crate::application::services::bringup::{BringupPlan, BringupReport, run_bringup};
use crate::output::json;

/// Run the command.
///
/// # Errors
///
/// Returns an error if the pull secret file cannot be read or any bring-up
/// stage fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let pull_secret = match &app.config.pull_secret_file {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("cannot read pull secret {path}"))?,
        ),
        None => None,
    };
    let plan = BringupPlan::from_config(&app.config, pull_secret);

    let reporter = app.reporter();
    let retrier = Retrier::new(&app.sleeper, &reporter);
    let report = run_bringup(&app.ssh, &app.oc, &retrier, &plan).await?;

    if app.is_json() {
        json::print(&report)?;
    } else {
        print_summary(app, &report);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_summary(app: &AppContext, report: &BringupReport) {
    let out = &app.output;
    out.header("Bring-up complete");
    out.kv("stages:", &report.completed.len().to_string());
    if let Some(id) = &report.cluster_id {
        out.kv("cluster ID:", id);
    }
    if let Some(state) = report.cert_state {
        out.kv("certificates:", &state.to_string());
    }
}
