//! Bring-up orchestrator.
//!
//! Runs the bring-up stages strictly in order. The first failing stage aborts
//! the run; nothing is rolled back. Every stage is idempotent, so re-running
//! after a failure is the recovery path.
//!
//! Imports only from `crate::domain` and `crate::application`.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::{ControlPlane, ProgressReporter, RemoteShell, Sleeper};
use crate::application::retry::{Retrier, RetryPolicy};
use crate::application::services::cluster::{
    add_proxy_config_to_cluster, add_proxy_to_kubelet_and_crio, add_pull_secret,
    update_cluster_id,
};
use crate::application::services::readiness::{
    check_certs_validity, check_proxy_settings_for_operator, delete_pods,
    wait_for_request_header_client_ca, wait_for_ssh,
};
use crate::domain::cert::CertExpiryState;
use crate::domain::cluster::OPENSHIFT_APISERVER_NS;
use crate::domain::config::{BringupConfig, OperatorCheck};
use crate::domain::error::CertCheckError;
use crate::domain::proxy::ProxyConfig;

// ── Plan ─────────────────────────────────────────────────────────────────────

/// Retry budgets used by the polling stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BringupPolicies {
    pub ssh: RetryPolicy,
    pub resource: RetryPolicy,
    pub field: RetryPolicy,
    pub pod_deletion: RetryPolicy,
}

impl Default for BringupPolicies {
    fn default() -> Self {
        Self {
            ssh: RetryPolicy::SSH,
            resource: RetryPolicy::RESOURCE_EXISTENCE,
            field: RetryPolicy::FIELD_POPULATION,
            pod_deletion: RetryPolicy::POD_DELETION,
        }
    }
}

/// Everything a bring-up run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct BringupPlan {
    /// Pull secret JSON. The stage is skipped when `None`.
    pub pull_secret: Option<String>,
    pub proxy: ProxyConfig,
    pub operator_check: OperatorCheck,
    pub check_certs: bool,
    pub fail_on_expired_certs: bool,
    pub policies: BringupPolicies,
}

impl BringupPlan {
    /// Plan with default retry budgets. The pull secret is read by the caller.
    #[must_use]
    pub fn from_config(config: &BringupConfig, pull_secret: Option<String>) -> Self {
        Self {
            pull_secret,
            proxy: config.proxy.clone(),
            operator_check: config.operator_check.clone(),
            check_certs: config.check_certs,
            fail_on_expired_certs: config.fail_on_expired_certs,
            policies: BringupPolicies::default(),
        }
    }
}

// ── Report ───────────────────────────────────────────────────────────────────

/// Bring-up stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    WaitForSsh,
    CheckCerts,
    PullSecret,
    ClusterId,
    Proxy,
    RequestHeaderClientCa,
    ApiserverPods,
    OperatorProxyCheck,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::WaitForSsh => "wait for SSH",
            Self::CheckCerts => "check certificates",
            Self::PullSecret => "add pull secret",
            Self::ClusterId => "update cluster ID",
            Self::Proxy => "configure proxy",
            Self::RequestHeaderClientCa => "wait for request header client CA",
            Self::ApiserverPods => "restart openshift-apiserver pods",
            Self::OperatorProxyCheck => "check operator proxy settings",
        };
        f.write_str(name)
    }
}

/// What a successful run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BringupReport {
    /// Stages that ran, in order. Skipped stages are absent.
    pub completed: Vec<Stage>,
    pub cert_state: Option<CertExpiryState>,
    pub cluster_id: Option<String>,
    /// `None` only if the run stopped before the check.
    pub operator_proxy_configured: Option<bool>,
}

// ── Orchestrator ─────────────────────────────────────────────────────────────

/// Run every bring-up stage in order.
///
/// # Errors
///
/// Returns the first failing stage's error, with the stage name as context.
pub async fn run_bringup<S: Sleeper, R: ProgressReporter>(
    ssh: &impl RemoteShell,
    oc: &impl ControlPlane,
    retrier: &Retrier<'_, S, R>,
    plan: &BringupPlan,
) -> Result<BringupReport> {
    let reporter = retrier.reporter();
    let policies = plan.policies;
    let mut report = BringupReport::default();

    let stage = Stage::WaitForSsh;
    reporter.step("waiting for the node to accept SSH...");
    wait_for_ssh(ssh, retrier, policies.ssh)
        .await
        .with_context(|| stage_failed(stage))?;
    reporter.success("node reachable over SSH");
    report.completed.push(stage);

    if plan.check_certs {
        let stage = Stage::CheckCerts;
        reporter.step("checking kubelet certificate expiry...");
        let state = match check_certs_validity(ssh).await {
            Ok(state) => {
                reporter.success("certificates are valid");
                state
            }
            Err(err @ CertCheckError::Expired { .. }) if plan.fail_on_expired_certs => {
                return Err(anyhow::Error::new(err)).with_context(|| stage_failed(stage));
            }
            Err(err) => {
                reporter.warn(&err.to_string());
                err.state()
            }
        };
        report.cert_state = Some(state);
        report.completed.push(stage);
    }

    if let Some(secret) = plan.pull_secret.as_deref() {
        let stage = Stage::PullSecret;
        reporter.step("adding pull secret to the cluster...");
        add_pull_secret(ssh, oc, retrier, policies.resource, secret)
            .await
            .with_context(|| stage_failed(stage))?;
        reporter.success("pull secret added");
        report.completed.push(stage);
    } else {
        reporter.warn("no pull secret configured, skipping");
    }

    let stage = Stage::ClusterId;
    reporter.step("updating cluster ID...");
    let cluster_id = update_cluster_id(oc, retrier, policies.resource)
        .await
        .with_context(|| stage_failed(stage))?;
    reporter.success(&format!("cluster ID set to {cluster_id}"));
    report.cluster_id = Some(cluster_id);
    report.completed.push(stage);

    if plan.proxy.is_enabled() {
        let stage = Stage::Proxy;
        reporter.step("adding proxy configuration to the cluster...");
        add_proxy_config_to_cluster(oc, retrier, policies.resource, &plan.proxy)
            .await
            .with_context(|| stage_failed(stage))?;
        add_proxy_to_kubelet_and_crio(ssh, &plan.proxy)
            .await
            .with_context(|| stage_failed(stage))?;
        reporter.success("proxy configured for cluster, kubelet and crio");
        report.completed.push(stage);
    } else {
        reporter.debug("no proxy configured, skipping proxy stage");
    }

    let stage = Stage::RequestHeaderClientCa;
    reporter.step("waiting for the API server client CA...");
    wait_for_request_header_client_ca(oc, retrier, policies.resource, policies.field)
        .await
        .with_context(|| stage_failed(stage))?;
    reporter.success("request header client CA published");
    report.completed.push(stage);

    let stage = Stage::ApiserverPods;
    reporter.step(&format!("deleting pods in {OPENSHIFT_APISERVER_NS}..."));
    delete_pods(
        oc,
        retrier,
        policies.resource,
        policies.pod_deletion,
        OPENSHIFT_APISERVER_NS,
    )
    .await
    .with_context(|| stage_failed(stage))?;
    reporter.success(&format!("pods in {OPENSHIFT_APISERVER_NS} deleted"));
    report.completed.push(stage);

    let stage = Stage::OperatorProxyCheck;
    let check = &plan.operator_check;
    let configured = check_proxy_settings_for_operator(
        oc,
        reporter,
        &plan.proxy,
        &check.deployment,
        &check.namespace,
    )
    .await
    .with_context(|| stage_failed(stage))?;
    if configured {
        reporter.success(&format!("{} has the proxy settings", check.deployment));
    } else {
        reporter.warn(&format!(
            "{}/{} does not carry the proxy settings yet",
            check.namespace, check.deployment
        ));
    }
    report.operator_proxy_configured = Some(configured);
    report.completed.push(stage);

    Ok(report)
}

fn stage_failed(stage: Stage) -> String {
    format!("bring-up stage '{stage}' failed")
}
