//! `crcup proxy-check`: does the operator deployment carry the proxy env?

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::readiness::check_proxy_settings_for_operator;

/// Run the command. Exits non-zero when the settings are missing.
///
/// # Errors
///
/// Returns an error if the deployment environment cannot be listed.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let check = &app.config.operator_check;
    let reporter = app.reporter();
    let configured = check_proxy_settings_for_operator(
        &app.oc,
        &reporter,
        &app.config.proxy,
        &check.deployment,
        &check.namespace,
    )
    .await?;

    if app.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "deployment": check.deployment,
                "namespace": check.namespace,
                "configured": configured,
            })
        );
    } else if configured {
        app.output.success(&format!("{} has the proxy settings", check.deployment));
    } else {
        app.output.warn(&format!(
            "{}/{} does not carry the proxy settings",
            check.namespace, check.deployment
        ));
    }

    Ok(if configured {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
