//! Control-plane argument lists and merge patches for each bring-up stage.
//!
//! Pure functions only. Patches are JSON merge-patch bodies passed as a
//! single `-p` argument, with no shell quoting.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Where the pull secret is written on the node for the kubelet.
pub const NODE_PULL_SECRET_PATH: &str = "/var/lib/kubelet/config.json";
pub const NODE_PULL_SECRET_MODE: u32 = 0o600;

pub const OPENSHIFT_CONFIG_NS: &str = "openshift-config";
pub const OPENSHIFT_APISERVER_NS: &str = "openshift-apiserver";
pub const KUBE_SYSTEM_NS: &str = "kube-system";

/// `oc patch secret pull-secret` with the base64-encoded secret.
#[must_use]
pub fn pull_secret_patch_args(pull_secret: &str) -> Vec<String> {
    let encoded = STANDARD.encode(pull_secret.as_bytes());
    let patch = serde_json::json!({ "data": { ".dockerconfigjson": encoded } }).to_string();
    owned(&[
        "patch",
        "secret",
        "pull-secret",
        "-p",
        &patch,
        "-n",
        OPENSHIFT_CONFIG_NS,
        "--type",
        "merge",
    ])
}

/// `oc patch clusterversion version` setting `spec.clusterID`.
#[must_use]
pub fn cluster_id_patch_args(cluster_id: &str) -> Vec<String> {
    let patch = serde_json::json!({ "spec": { "clusterID": cluster_id } }).to_string();
    owned(&[
        "patch",
        "clusterversion",
        "version",
        "-p",
        &patch,
        "--type",
        "merge",
    ])
}

/// `oc patch proxy cluster` with a rendered proxy spec.
#[must_use]
pub fn proxy_patch_args(patch: &str) -> Vec<String> {
    owned(&[
        "patch",
        "proxy",
        "cluster",
        "-p",
        patch,
        "-n",
        OPENSHIFT_CONFIG_NS,
        "--type",
        "merge",
    ])
}

/// `oc get <kind>`, used to gate mutations on the resource type being served.
#[must_use]
pub fn resource_probe_args(kind: &str) -> Vec<String> {
    owned(&["get", kind])
}

/// Query for the request-header client CA published by the API server.
#[must_use]
pub fn request_header_client_ca_args() -> Vec<String> {
    owned(&[
        "get",
        "configmaps/extension-apiserver-authentication",
        "-ojsonpath={.data.requestheader-client-ca-file}",
        "-n",
        KUBE_SYSTEM_NS,
    ])
}

#[must_use]
pub fn delete_all_pods_args(namespace: &str) -> Vec<String> {
    owned(&["delete", "pod", "--all", "-n", namespace])
}

/// `oc set env deployment <name> --list`.
#[must_use]
pub fn deployment_env_args(deployment: &str, namespace: &str) -> Vec<String> {
    owned(&["set", "env", "deployment", deployment, "--list", "-n", namespace])
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| (*s).to_string()).collect()
}
