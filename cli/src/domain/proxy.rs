//! Proxy configuration and its two renderings.
//!
//! The same `ProxyConfig` feeds the cluster-wide `proxy/cluster` merge patch
//! and the host-level systemd drop-in for crio and kubelet. The control plane
//! cannot push proxy settings down to node services, so both are written.

use serde::{Deserialize, Serialize};

/// No-proxy entries always placed first in the host-level drop-in.
pub const CLUSTER_NO_PROXY_DEFAULTS: &[&str] =
    &[".cluster.local", ".svc", "10.128.0.0/14", "172.30.0.0/16"];

/// Drop-in paths, one per node service.
pub const CRIO_DROP_IN: &str = "/etc/systemd/system/crio.service.d/10-default-env.conf";
pub const KUBELET_DROP_IN: &str = "/etc/systemd/system/kubelet.service.d/10-default-env.conf";
pub const DROP_IN_MODE: u32 = 0o644;

/// Proxy settings applied to the cluster and to node services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub http_proxy: String,
    pub https_proxy: String,
    pub no_proxy: Vec<String>,
}

impl ProxyConfig {
    #[must_use]
    pub fn new(http_proxy: &str, https_proxy: &str, no_proxy: &[&str]) -> Self {
        Self {
            http_proxy: http_proxy.to_string(),
            https_proxy: https_proxy.to_string(),
            no_proxy: no_proxy.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// A proxy is in use when either URL is set.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.http_proxy.trim().is_empty() || !self.https_proxy.trim().is_empty()
    }

    /// User-supplied no-proxy entries, comma separated, blanks dropped.
    #[must_use]
    pub fn no_proxy_string(&self) -> String {
        join_unique(self.user_entries())
    }

    /// Cluster defaults followed by user entries not already present.
    #[must_use]
    pub fn host_no_proxy_string(&self) -> String {
        join_unique(
            CLUSTER_NO_PROXY_DEFAULTS
                .iter()
                .copied()
                .chain(self.user_entries()),
        )
    }

    /// JSON merge patch for `proxy/cluster`.
    #[must_use]
    pub fn cluster_patch(&self) -> String {
        serde_json::json!({
            "spec": {
                "httpProxy": self.http_proxy,
                "httpsProxy": self.https_proxy,
                "noProxy": self.no_proxy_string(),
            }
        })
        .to_string()
    }

    /// systemd `[Service]` drop-in exporting the proxy to a node service.
    #[must_use]
    pub fn systemd_drop_in(&self) -> String {
        format!(
            "[Service]\n\
             Environment=HTTP_PROXY={}\n\
             Environment=HTTPS_PROXY={}\n\
             Environment=NO_PROXY={}\n",
            self.http_proxy,
            self.https_proxy,
            self.host_no_proxy_string()
        )
    }

    fn user_entries(&self) -> impl Iterator<Item = &str> {
        self.no_proxy.iter().map(|s| s.trim()).filter(|s| !s.is_empty())
    }
}

fn join_unique<'a>(entries: impl Iterator<Item = &'a str>) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for entry in entries {
        if !seen.contains(&entry) {
            seen.push(entry);
        }
    }
    seen.join(",")
}

/// Best-effort check that a deployment env listing mentions the proxy.
///
/// Plain substring match on either URL, so a URL that is a prefix of another
/// one also matches. An unset URL is the empty string, which every listing
/// contains: with only one of the two URLs configured the answer is always
/// `true`, even for a listing without any proxy variable.
#[must_use]
pub fn env_listing_mentions_proxy(listing: &str, proxy: &ProxyConfig) -> bool {
    listing.contains(&proxy.https_proxy) || listing.contains(&proxy.http_proxy)
}
