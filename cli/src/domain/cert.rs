//! Certificate expiry evaluation.
//!
//! Pure functions only. The remote host supplies both the certificate end
//! date and the current time, so comparisons use the server's clock.

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::Serialize;

use crate::domain::error::CertCheckError;

/// Kubelet client certificate checked for expiry.
pub const KUBELET_CLIENT_CERT: &str = "/var/lib/kubelet/pki/kubelet-client-current.pem";

/// Human-readable RFC 822 layout used in error messages.
const RFC822: &str = "%d %b %y %H:%M %Z";

/// Result of a one-shot certificate check.
///
/// `Unknown` is only produced when expiry could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CertExpiryState {
    Unknown,
    NotExpired,
    Expired,
}

impl std::fmt::Display for CertExpiryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::NotExpired => "not expired",
            Self::Expired => "expired",
        })
    }
}

/// Parse a timestamp printed by `date --iso-8601=seconds` on the remote host.
///
/// # Errors
///
/// Returns `CertCheckError::Unknown` if `raw` is not valid RFC 3339.
pub fn parse_remote_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, CertCheckError> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map_err(|e| CertCheckError::Unknown(anyhow::anyhow!("invalid timestamp {raw:?}: {e}")))
}

/// Compare a certificate end date with the current time.
///
/// # Errors
///
/// Returns `CertCheckError::Expired` if `now` is strictly after `expiry`.
pub fn evaluate_expiry(
    expiry: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
) -> Result<CertExpiryState, CertCheckError> {
    if now > expiry {
        return Err(CertCheckError::Expired {
            valid_until: format_rfc822(expiry),
        });
    }
    Ok(CertExpiryState::NotExpired)
}

/// Parse both remote timestamps and evaluate them.
///
/// # Errors
///
/// Returns `Unknown` on parse failure and `Expired` when past due.
pub fn evaluate_remote_output(
    expiry_raw: &str,
    now_raw: &str,
) -> Result<CertExpiryState, CertCheckError> {
    let expiry = parse_remote_timestamp(expiry_raw)?;
    let now = parse_remote_timestamp(now_raw)?;
    evaluate_expiry(expiry, now)
}

/// `true` when the certificate expires within `days` of `now`.
///
/// The base check is binary. Callers that want an early warning use this.
#[must_use]
pub fn expires_within(
    expiry: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
    days: i64,
) -> bool {
    expiry - now <= TimeDelta::days(days)
}

#[must_use]
pub fn format_rfc822(ts: DateTime<FixedOffset>) -> String {
    ts.format(RFC822).to_string()
}

/// Remote command printing the certificate end date as RFC 3339.
#[must_use]
pub fn expiry_date_command(cert_path: &str) -> String {
    format!(
        r#"date --date="$(sudo openssl x509 -in {cert_path} -noout -enddate | cut -d= -f 2)" --iso-8601=seconds"#
    )
}

/// Remote command printing the host's current time as RFC 3339.
pub const REMOTE_NOW_COMMAND: &str = "date --iso-8601=seconds";
