//! Cluster mutations performed during bring-up.
//!
//! Every control-plane mutation is gated on its resource type being served.
//! Mutations themselves run once; their failures are returned with the
//! command's stderr.
//!
//! Imports only from `crate::domain` and `crate::application`.

use anyhow::{Context, Result};

use crate::application::ports::{ControlPlane, ProgressReporter, RemoteShell, Sleeper};
use crate::application::retry::{Retrier, RetryPolicy};
use crate::application::services::readiness::wait_for_resource;
use crate::domain::cluster::{self, NODE_PULL_SECRET_MODE, NODE_PULL_SECRET_PATH};
use crate::domain::proxy::{CRIO_DROP_IN, DROP_IN_MODE, KUBELET_DROP_IN, ProxyConfig};

/// Write the pull secret to the node, then patch `openshift-config/pull-secret`.
///
/// The patch carries the secret, so it goes through `run_private`.
///
/// # Errors
///
/// Returns an error if the node write fails, secrets never become
/// available, or the patch is rejected.
pub async fn add_pull_secret<S: Sleeper, R: ProgressReporter>(
    ssh: &impl RemoteShell,
    oc: &impl ControlPlane,
    retrier: &Retrier<'_, S, R>,
    gate: RetryPolicy,
    pull_secret: &str,
) -> Result<()> {
    ssh.write_file_as_root(NODE_PULL_SECRET_PATH, pull_secret, NODE_PULL_SECRET_MODE)
        .await
        .with_context(|| format!("failed to write pull secret to {NODE_PULL_SECRET_PATH}"))?;

    wait_for_resource(oc, retrier, gate, "secret").await?;
    oc.run_private(&cluster::pull_secret_patch_args(pull_secret))
        .await
        .context("failed to add pull secret")?;
    Ok(())
}

/// Patch a freshly generated cluster ID into `clusterversion/version`.
///
/// Returns the new ID.
///
/// # Errors
///
/// Returns an error if clusterversion never becomes available or the patch
/// is rejected.
pub async fn update_cluster_id<S: Sleeper, R: ProgressReporter>(
    oc: &impl ControlPlane,
    retrier: &Retrier<'_, S, R>,
    gate: RetryPolicy,
) -> Result<String> {
    let cluster_id = uuid::Uuid::new_v4().to_string();
    wait_for_resource(oc, retrier, gate, "clusterversion").await?;
    oc.run(&cluster::cluster_id_patch_args(&cluster_id))
        .await
        .context("failed to update cluster ID")?;
    Ok(cluster_id)
}

/// Patch the cluster-wide proxy spec.
///
/// # Errors
///
/// Returns an error if proxy never becomes available or the patch is rejected.
pub async fn add_proxy_config_to_cluster<S: Sleeper, R: ProgressReporter>(
    oc: &impl ControlPlane,
    retrier: &Retrier<'_, S, R>,
    gate: RetryPolicy,
    proxy: &ProxyConfig,
) -> Result<()> {
    wait_for_resource(oc, retrier, gate, "proxy").await?;
    oc.run(&cluster::proxy_patch_args(&proxy.cluster_patch()))
        .await
        .context("failed to add proxy details")?;
    Ok(())
}

/// Write the proxy drop-in for crio and kubelet on the node.
///
/// The proxy operator does not reach node services, so this runs alongside
/// [`add_proxy_config_to_cluster`]. Both services need a restart to pick it up.
///
/// # Errors
///
/// Returns an error if either file cannot be written.
pub async fn add_proxy_to_kubelet_and_crio(
    ssh: &impl RemoteShell,
    proxy: &ProxyConfig,
) -> Result<()> {
    let drop_in = proxy.systemd_drop_in();
    for path in [CRIO_DROP_IN, KUBELET_DROP_IN] {
        ssh.write_file_as_root(path, &drop_in, DROP_IN_MODE)
            .await
            .with_context(|| format!("failed to write proxy drop-in {path}"))?;
    }
    Ok(())
}
