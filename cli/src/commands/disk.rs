//! `crcup disk`: root partition usage on the node.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::readiness::root_partition_usage;
use crate::output::json;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Run the command.
///
/// # Errors
///
/// Returns an error if the usage cannot be read.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let usage = root_partition_usage(&app.ssh).await?;

    if app.is_json() {
        json::print(&usage)?;
    } else {
        let out = &app.output;
        out.header(&format!("Disk usage of {}", usage.mountpoint));
        out.kv("size:", &format_gib(usage.total_bytes));
        out.kv(
            "used:",
            &format!("{} ({:.1}%)", format_gib(usage.used_bytes), usage.used_percent()),
        );
        out.kv("available:", &format_gib(usage.available_bytes()));
    }
    Ok(ExitCode::SUCCESS)
}

#[allow(clippy::cast_precision_loss)]
fn format_gib(bytes: u64) -> String {
    format!("{:.1} GiB", bytes as f64 / GIB)
}
