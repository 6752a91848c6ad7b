//! Report cache trait for persistence abstraction
//!
//! A report is keyed by the repository fingerprint, so a cached report is
//! only ever returned for unchanged repository content.

use anyhow::{Context, Result};

use crate::model::StatisticsReport;

use super::database::{Database, ReportRow};

/// A report loaded from the cache together with when it was stored
#[derive(Debug, Clone, PartialEq)]
pub struct CachedReport {
    pub report: StatisticsReport,
    /// Unix timestamp (seconds)
    pub cached_at: i64,
}

/// Persistence layer for finished reports
#[allow(async_fn_in_trait)]
pub trait ReportCache {
    /// Report stored under `fingerprint`, if any
    async fn load_report(&self, fingerprint: &str) -> Result<Option<CachedReport>>;

    /// Store `report` under `fingerprint`, replacing older reports
    async fn save_report(
        &self,
        fingerprint: &str,
        repo_path: &str,
        report: &StatisticsReport,
    ) -> Result<()>;
}

impl ReportCache for Database {
    async fn load_report(&self, fingerprint: &str) -> Result<Option<CachedReport>> {
        let Some(row) = self.get_report_row(fingerprint).await? else {
            return Ok(None);
        };
        let report = serde_json::from_str(&row.report_json)
            .with_context(|| format!("Corrupt cached report for {}", row.repo_path))?;
        Ok(Some(CachedReport {
            report,
            cached_at: row.cached_at,
        }))
    }

    async fn save_report(
        &self,
        fingerprint: &str,
        repo_path: &str,
        report: &StatisticsReport,
    ) -> Result<()> {
        let row = ReportRow {
            fingerprint: fingerprint.to_string(),
            repo_path: repo_path.to_string(),
            report_json: serde_json::to_string(report).context("Failed to serialize report")?,
            cached_at: time::OffsetDateTime::now_utc().unix_timestamp(),
        };
        self.put_report_row(&row).await?;
        // One file per repository; older fingerprints are stale content
        let pruned = self.prune_reports(fingerprint).await?;
        if pruned > 0 {
            tracing::debug!(pruned, "dropped stale cached reports");
        }
        Ok(())
    }
}
