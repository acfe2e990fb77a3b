//! Domain types and validators for crcup configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::proxy::ProxyConfig;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.crcup/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BringupConfig {
    /// How to reach the cluster node.
    pub ssh: SshConfig,
    /// How to reach the control plane.
    pub oc: OcConfig,
    /// File holding the pull secret JSON. Skipped when unset.
    pub pull_secret_file: Option<String>,
    /// Proxy applied to the cluster and node services when enabled.
    pub proxy: ProxyConfig,
    /// Deployment inspected by the final proxy check.
    pub operator_check: OperatorCheck,
    /// Run the one-shot certificate check during bring-up.
    pub check_certs: bool,
    /// Abort bring-up when certificates have expired.
    pub fail_on_expired_certs: bool,
}

impl Default for BringupConfig {
    fn default() -> Self {
        Self {
            ssh: SshConfig::default(),
            oc: OcConfig::default(),
            pull_secret_file: None,
            proxy: ProxyConfig::default(),
            operator_check: OperatorCheck::default(),
            check_certs: true,
            fail_on_expired_certs: false,
        }
    }
}

/// SSH connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Private key passed to `ssh -i`.
    pub identity_file: Option<String>,
    /// Seconds before a single `ssh` invocation is killed.
    pub command_timeout_secs: u64,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            host: "192.168.130.11".to_string(),
            port: 22,
            user: "core".to_string(),
            identity_file: None,
            command_timeout_secs: 30,
        }
    }
}

/// `oc` client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcConfig {
    pub binary: String,
    pub kubeconfig: Option<String>,
    pub context: Option<String>,
    /// Seconds before a single `oc` invocation is killed.
    pub command_timeout_secs: u64,
}

impl Default for OcConfig {
    fn default() -> Self {
        Self {
            binary: "oc".to_string(),
            kubeconfig: None,
            context: None,
            command_timeout_secs: 60,
        }
    }
}

/// Deployment whose environment is checked for the proxy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorCheck {
    pub deployment: String,
    pub namespace: String,
}

impl Default for OperatorCheck {
    fn default() -> Self {
        Self {
            deployment: "cluster-monitoring-operator".to_string(),
            namespace: "openshift-monitoring".to_string(),
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

impl BringupConfig {
    /// Reject settings that would make every remote call fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the SSH host is empty, the port is zero, or a
    /// command timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.ssh.host.trim().is_empty() {
            return Err(ConfigError::MissingSshHost.into());
        }
        if self.ssh.port == 0 {
            return Err(ConfigError::InvalidSshPort.into());
        }
        for (key, secs) in [
            ("ssh.command_timeout_secs", self.ssh.command_timeout_secs),
            ("oc.command_timeout_secs", self.oc.command_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: secs.to_string(),
                    hint: "Timeouts must be at least one second.".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Expand a leading `~/` against `home`.
#[must_use]
pub fn expand_home(path: &str, home: Option<&std::path::Path>) -> String {
    match (path.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().into_owned(),
        _ => path.to_string(),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let cfg = BringupConfig::default();
        assert_eq!(cfg.ssh.port, 22);
        assert_eq!(cfg.ssh.user, "core");
        assert_eq!(cfg.oc.binary, "oc");
        assert!(!cfg.proxy.is_enabled());
        assert!(cfg.check_certs);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_config_deserialize_empty_yaml_uses_defaults() {
        let cfg: BringupConfig = serde_yaml::from_str("{}").expect("empty yaml");
        assert_eq!(cfg.ssh.host, "192.168.130.11");
        assert!(cfg.check_certs);
        assert!(!cfg.fail_on_expired_certs);
        assert_eq!(cfg.operator_check.namespace, "openshift-monitoring");
    }

    #[test]
    fn test_config_deserialize_full_yaml() {
        let yaml = "\
ssh:
  host: 10.0.0.5
  port: 2222
  identity_file: ~/.crc/id_ecdsa
oc:
  kubeconfig: /tmp/kubeconfig
pull_secret_file: /tmp/ps.json
proxy:
  http_proxy: http://p:3128
  no_proxy: [example.com]
check_certs: false
";
        let cfg: BringupConfig = serde_yaml::from_str(yaml).expect("valid yaml");
        assert_eq!(cfg.ssh.host, "10.0.0.5");
        assert_eq!(cfg.ssh.port, 2222);
        assert_eq!(cfg.ssh.user, "core");
        assert_eq!(cfg.oc.kubeconfig.as_deref(), Some("/tmp/kubeconfig"));
        assert_eq!(cfg.pull_secret_file.as_deref(), Some("/tmp/ps.json"));
        assert!(cfg.proxy.is_enabled());
        assert_eq!(cfg.proxy.no_proxy, vec!["example.com"]);
        assert!(!cfg.check_certs);
    }

    #[test]
    fn test_validate_rejects_empty_host() {
        let mut cfg = BringupConfig::default();
        cfg.ssh.host = "  ".to_string();
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("ssh.host"), "got: {msg}");
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut cfg = BringupConfig::default();
        cfg.ssh.port = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut cfg = BringupConfig::default();
        cfg.oc.command_timeout_secs = 0;
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("oc.command_timeout_secs"), "got: {msg}");
    }

    #[test]
    fn test_expand_home() {
        let home = std::path::Path::new("/home/me");
        assert_eq!(expand_home("~/.crc/key", Some(home)), "/home/me/.crc/key");
        assert_eq!(expand_home("/abs/key", Some(home)), "/abs/key");
        assert_eq!(expand_home("~/.crc/key", None), "~/.crc/key");
    }
}
