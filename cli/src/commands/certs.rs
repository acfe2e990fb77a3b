//! `crcup certs`: one-shot kubelet certificate expiry check.

use std::process::ExitCode;

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::app::AppContext;
use crate::application::services::readiness::remote_cert_dates;
use crate::domain::cert::{self, CertExpiryState};
use crate::domain::error::CertCheckError;
use crate::output::json;

/// Warn this many days ahead of expiry.
pub const EXPIRY_WARNING_DAYS: i64 = 7;

/// Machine-readable result of the check.
#[derive(Debug, Serialize)]
pub struct CertReport {
    pub state: CertExpiryState,
    /// RFC 3339, absent when the state is unknown.
    pub valid_until: Option<String>,
    pub expires_soon: bool,
    pub message: String,
}

/// Build the report from the remote dates (or the failure to read them).
#[must_use]
pub fn build_report(
    dates: Result<(DateTime<FixedOffset>, DateTime<FixedOffset>), CertCheckError>,
) -> CertReport {
    let (expiry, now) = match dates {
        Ok(dates) => dates,
        Err(err) => {
            return CertReport {
                state: err.state(),
                valid_until: None,
                expires_soon: false,
                message: err.to_string(),
            };
        }
    };
    let valid_until = Some(expiry.to_rfc3339());
    match cert::evaluate_expiry(expiry, now) {
        Ok(state) => {
            let expires_soon = cert::expires_within(expiry, now, EXPIRY_WARNING_DAYS);
            let message = if expires_soon {
                format!(
                    "certs expire within {EXPIRY_WARNING_DAYS} days: {}",
                    cert::format_rfc822(expiry)
                )
            } else {
                format!("certs are valid till: {}", cert::format_rfc822(expiry))
            };
            CertReport {
                state,
                valid_until,
                expires_soon,
                message,
            }
        }
        Err(err) => CertReport {
            state: err.state(),
            valid_until,
            expires_soon: false,
            message: err.to_string(),
        },
    }
}

/// Run the command. Exits non-zero unless the certificate is valid.
///
/// # Errors
///
/// Returns an error only if JSON output fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let report = build_report(remote_cert_dates(&app.ssh).await);

    if app.is_json() {
        json::print(&report)?;
    } else {
        match report.state {
            CertExpiryState::NotExpired if report.expires_soon => app.output.warn(&report.message),
            CertExpiryState::NotExpired => app.output.success(&report.message),
            CertExpiryState::Expired | CertExpiryState::Unknown => {
                app.output.error(&report.message);
            }
        }
    }

    Ok(if report.state == CertExpiryState::NotExpired {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
