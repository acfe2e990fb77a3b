//! Readiness checks against the node and the control plane.
//!
//! Each polling check is one probe handed to the retry engine; the probe
//! decides which failures are worth another attempt. One-shot checks run
//! their command once.
//!
//! Imports only from `crate::domain` and `crate::application`.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};

use crate::application::ports::{ControlPlane, ProgressReporter, RemoteShell, Sleeper};
use crate::application::retry::{Retrier, RetryPolicy};
use crate::domain::cert::{self, CertExpiryState, KUBELET_CLIENT_CERT, REMOTE_NOW_COMMAND};
use crate::domain::cluster;
use crate::domain::disk::{self, DiskUsage, ROOT_PARTITION_USAGE_COMMAND};
use crate::domain::error::{CertCheckError, ProbeError};
use crate::domain::proxy::{ProxyConfig, env_listing_mentions_proxy};

/// Wait until the node accepts SSH commands.
///
/// Every failure counts as "still booting".
///
/// # Errors
///
/// Returns the last SSH failure once `policy` is used up.
pub async fn wait_for_ssh<S: Sleeper, R: ProgressReporter>(
    ssh: &impl RemoteShell,
    retrier: &Retrier<'_, S, R>,
    policy: RetryPolicy,
) -> Result<()> {
    retrier
        .run(policy, "wait for SSH", move || async move {
            ssh.run("exit 0")
                .await
                .map(drop)
                .map_err(ProbeError::retriable)
        })
        .await
        .context("node did not become reachable over SSH")
}

/// Wait until `kind` can be listed through the control plane.
///
/// Mutating a resource type that is not served yet fails every time, so
/// every patch and delete is gated on this.
///
/// # Errors
///
/// Returns the last query failure once `policy` is used up.
pub async fn wait_for_resource<S: Sleeper, R: ProgressReporter>(
    oc: &impl ControlPlane,
    retrier: &Retrier<'_, S, R>,
    policy: RetryPolicy,
    kind: &str,
) -> Result<()> {
    let args = cluster::resource_probe_args(kind);
    let args = &args;
    retrier
        .run(policy, &format!("wait for resource {kind}"), move || async move {
            oc.run(args).await.map(drop).map_err(ProbeError::retriable)
        })
        .await
        .with_context(|| format!("resource {kind} is not available"))
}

/// Wait for the API server to publish `requestheader-client-ca-file`.
///
/// An empty value means "not populated yet" and is retried. A failing query
/// is fatal.
///
/// # Errors
///
/// Returns an error if configmaps never become available, the query fails,
/// or the field is still empty once `policy` is used up.
pub async fn wait_for_request_header_client_ca<S: Sleeper, R: ProgressReporter>(
    oc: &impl ControlPlane,
    retrier: &Retrier<'_, S, R>,
    gate: RetryPolicy,
    policy: RetryPolicy,
) -> Result<()> {
    wait_for_resource(oc, retrier, gate, "configmaps").await?;

    let args = cluster::request_header_client_ca_args();
    let args = &args;
    let reporter = retrier.reporter();
    retrier
        .run(policy, "wait for request header client CA", move || async move {
            let out = oc
                .run(args)
                .await
                .context("failed to get request header client ca file")?;
            if out.stdout.trim().is_empty() {
                return Err(ProbeError::retriable(anyhow::anyhow!(
                    "missing .data.requestheader-client-ca-file"
                )));
            }
            reporter.debug(&format!(
                "found .data.requestheader-client-ca-file: {}",
                out.stdout.trim()
            ));
            Ok::<(), ProbeError>(())
        })
        .await
}

/// Delete every pod in `namespace` so its controllers recreate them.
///
/// Delete failures are retried; the namespace may not accept the request yet.
///
/// # Errors
///
/// Returns an error if pods never become available or every delete fails.
pub async fn delete_pods<S: Sleeper, R: ProgressReporter>(
    oc: &impl ControlPlane,
    retrier: &Retrier<'_, S, R>,
    gate: RetryPolicy,
    policy: RetryPolicy,
    namespace: &str,
) -> Result<()> {
    wait_for_resource(oc, retrier, gate, "pod").await?;

    let args = cluster::delete_all_pods_args(namespace);
    let args = &args;
    retrier
        .run(policy, &format!("delete pods in {namespace}"), move || async move {
            oc.run(args).await.map(drop).map_err(ProbeError::retriable)
        })
        .await
        .with_context(|| format!("failed to delete pods in {namespace}"))
}

/// Read the kubelet client certificate end date and the node's clock.
///
/// # Errors
///
/// Returns `CertCheckError::Unknown` if either command fails or prints an
/// unparsable timestamp.
pub async fn remote_cert_dates(
    ssh: &impl RemoteShell,
) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>), CertCheckError> {
    let unknown = |e| CertCheckError::Unknown(anyhow::Error::new(e));
    let expiry = ssh
        .run(&cert::expiry_date_command(KUBELET_CLIENT_CERT))
        .await
        .map_err(unknown)?;
    let now = ssh.run(REMOTE_NOW_COMMAND).await.map_err(unknown)?;
    Ok((
        cert::parse_remote_timestamp(&expiry)?,
        cert::parse_remote_timestamp(&now)?,
    ))
}

/// One-shot certificate expiry check, using the node's clock.
///
/// # Errors
///
/// `CertCheckError::Expired` if the certificate is past due,
/// `CertCheckError::Unknown` if expiry could not be determined.
pub async fn check_certs_validity(
    ssh: &impl RemoteShell,
) -> Result<CertExpiryState, CertCheckError> {
    let (expiry, now) = remote_cert_dates(ssh).await?;
    cert::evaluate_expiry(expiry, now)
}

/// Size, usage and mountpoint of the node's root partition.
///
/// # Errors
///
/// Returns an error if `df` fails or prints something unexpected.
pub async fn root_partition_usage(ssh: &impl RemoteShell) -> Result<DiskUsage> {
    let out = ssh
        .run(ROOT_PARTITION_USAGE_COMMAND)
        .await
        .context("failed to read root partition usage")?;
    disk::parse_df_line(&out)
}

/// Whether `deployment` already carries the proxy in its environment.
///
/// Returns `true` without querying when no proxy is configured. Matching is
/// a plain substring search (see [`env_listing_mentions_proxy`]).
///
/// # Errors
///
/// Returns an error if the environment listing cannot be fetched.
pub async fn check_proxy_settings_for_operator(
    oc: &impl ControlPlane,
    reporter: &impl ProgressReporter,
    proxy: &ProxyConfig,
    deployment: &str,
    namespace: &str,
) -> Result<bool> {
    if !proxy.is_enabled() {
        reporter.debug("no proxy in use");
        return Ok(true);
    }
    let out = oc
        .run(&cluster::deployment_env_args(deployment, namespace))
        .await
        .with_context(|| format!("failed to list env of deployment {namespace}/{deployment}"))?;
    Ok(env_listing_mentions_proxy(&out.stdout, proxy))
}
