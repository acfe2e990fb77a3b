//! Root partition usage parsed from `df` output.

use anyhow::{Context, Result};
use serde::Serialize;

/// Remote command reporting size, used bytes and mountpoint of `/sysroot`.
pub const ROOT_PARTITION_USAGE_COMMAND: &str =
    "df -B1 --output=size,used,target /sysroot | tail -1";

/// Point-in-time disk usage snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub mountpoint: String,
}

impl DiskUsage {
    #[must_use]
    pub fn available_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.used_bytes)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 * 100.0 / self.total_bytes as f64
    }
}

/// Parse the last line of `df -B1 --output=size,used,target`.
///
/// # Errors
///
/// Returns an error if the line has fewer than three fields or the sizes are
/// not integers.
pub fn parse_df_line(line: &str) -> Result<DiskUsage> {
    let mut fields = line.split_whitespace();
    let mut next = |name: &str| {
        fields
            .next()
            .with_context(|| format!("missing {name} in df output {line:?}"))
    };
    let total = next("size")?;
    let used = next("used")?;
    let mountpoint = next("mountpoint")?;
    Ok(DiskUsage {
        total_bytes: total
            .parse()
            .with_context(|| format!("invalid disk size {total:?}"))?,
        used_bytes: used
            .parse()
            .with_context(|| format!("invalid disk usage {used:?}"))?,
        mountpoint: mountpoint.to_string(),
    })
}
