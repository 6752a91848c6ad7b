use anyhow::{Context, Result};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Row, Sqlite};
use std::str::FromStr;

use super::SCHEMA_VERSION;

const SCHEMA_VERSION_KEY: &str = "schema_version";

/// A stored report row
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub fingerprint: String,
    pub repo_path: String,
    pub report_json: String,
    pub cached_at: i64,
}

/// Database abstraction for SQLite operations
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection
    pub async fn new(db_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", db_path))?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool })
    }

    /// Initialize database schema, returns true if schema was rebuilt
    pub async fn init_schema(&self) -> Result<bool> {
        // Metadata first, it holds the schema version
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )"
        ).execute(&self.pool).await?;

        let stored_version = self.get_metadata(SCHEMA_VERSION_KEY).await?;

        let needs_rebuild = stored_version.as_deref() != Some(SCHEMA_VERSION);

        if needs_rebuild {
            if let Some(old) = &stored_version {
                tracing::info!(from = %old, to = SCHEMA_VERSION, "report cache schema changed, rebuilding");
            }
            sqlx::query("DROP TABLE IF EXISTS reports").execute(&self.pool).await?;
            sqlx::query("DELETE FROM metadata").execute(&self.pool).await?;
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS reports (
                fingerprint TEXT PRIMARY KEY,
                repo_path TEXT NOT NULL,
                report TEXT NOT NULL,
                cached_at INTEGER NOT NULL
            )"
        ).execute(&self.pool).await?;

        if needs_rebuild {
            self.set_metadata(SCHEMA_VERSION_KEY, SCHEMA_VERSION).await?;
        }

        Ok(needs_rebuild)
    }

    /// Get metadata value by key
    pub async fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM metadata WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get("value")))
    }

    /// Set metadata value
    pub async fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO metadata (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Look up the report stored for `fingerprint`
    pub async fn get_report_row(&self, fingerprint: &str) -> Result<Option<ReportRow>> {
        let row = sqlx::query(
            "SELECT fingerprint, repo_path, report, cached_at FROM reports WHERE fingerprint = ?"
        )
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ReportRow {
            fingerprint: row.get("fingerprint"),
            repo_path: row.get("repo_path"),
            report_json: row.get("report"),
            cached_at: row.get("cached_at"),
        }))
    }

    /// Store a report, replacing any previous one with the same fingerprint
    pub async fn put_report_row(&self, row: &ReportRow) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO reports (fingerprint, repo_path, report, cached_at) VALUES (?, ?, ?, ?)"
        )
        .bind(&row.fingerprint)
        .bind(&row.repo_path)
        .bind(&row.report_json)
        .bind(row.cached_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Drop every report except the one for `keep`; returns how many were removed
    pub async fn prune_reports(&self, keep: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM reports WHERE fingerprint != ?")
            .bind(keep)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn report_count(&self) -> Result<u64> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM reports")
            .fetch_one(&self.pool)
            .await?
            .get("n");
        Ok(count as u64)
    }
}
