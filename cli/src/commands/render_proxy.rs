//! `crcup render-proxy`: print what the proxy stage would write. Offline.

use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::app::AppContext;
use crate::domain::proxy::{CRIO_DROP_IN, KUBELET_DROP_IN, ProxyConfig};
use crate::output::json;

/// Both renderings of one proxy config.
#[derive(Debug, Serialize)]
pub struct RenderedProxy {
    pub drop_in_paths: [&'static str; 2],
    pub drop_in: String,
    pub cluster_patch: serde_json::Value,
}

/// # Errors
///
/// Returns an error if no proxy is configured.
pub fn render(proxy: &ProxyConfig) -> Result<RenderedProxy> {
    if !proxy.is_enabled() {
        anyhow::bail!("no proxy configured: set proxy.http_proxy or proxy.https_proxy");
    }
    Ok(RenderedProxy {
        drop_in_paths: [CRIO_DROP_IN, KUBELET_DROP_IN],
        drop_in: proxy.systemd_drop_in(),
        cluster_patch: serde_json::from_str(&proxy.cluster_patch())
            .context("rendered proxy patch is not JSON")?,
    })
}

/// Run the command.
///
/// # Errors
///
/// Returns an error if no proxy is configured.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    let rendered = render(&app.config.proxy)?;

    if app.is_json() {
        json::print(&rendered)?;
    } else {
        for path in rendered.drop_in_paths {
            println!("# {path}");
        }
        print!("{}", rendered.drop_in);
        println!();
        println!("# oc patch proxy cluster --type merge -p");
        println!("{}", rendered.cluster_patch);
    }
    Ok(ExitCode::SUCCESS)
}
