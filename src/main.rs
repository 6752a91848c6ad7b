mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use repostats::analysis::analyze;
use repostats::model::StatisticsReport;
use repostats::repository::{Database, GixStore, ReportCache};
use repostats::util::format_duration;
use repostats::view::{cached_note, render_report};

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Open the per-repository report cache under the user cache directory
async fn open_cache(abs_repo_path: &Path) -> Result<Database> {
    let cache_dir = dirs::cache_dir()
        .context("Could not determine cache directory")?
        .join("repostats");
    fs::create_dir_all(&cache_dir)?;

    let repo_name = abs_repo_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("repo");
    let mut hasher = DefaultHasher::new();
    abs_repo_path.hash(&mut hasher);
    let hash = hasher.finish();
    let db_path = cache_dir.join(format!("{}_{:016x}.db", repo_name, hash));
    tracing::debug!(path = %db_path.display(), "using report cache");

    let db_path_str = db_path.to_str().context("Invalid path encoding")?;
    let db = Database::new(db_path_str).await?;
    db.init_schema().await?;
    Ok(db)
}

/// Pair the cache with the repository's current key, dropping the cache
/// when the repository cannot be fingerprinted
fn keyed_cache<E: std::fmt::Display>(
    cache: Option<Database>,
    fingerprint: impl FnOnce() -> Result<String, E>,
) -> Option<(Database, String)> {
    let db = cache?;
    match fingerprint() {
        Ok(fp) => Some((db, fp)),
        Err(e) => {
            tracing::warn!("Could not fingerprint repository, continuing without cache: {e}");
            None
        }
    }
}

fn print_report(report: &StatisticsReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render_report(report));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let abs_repo_path = fs::canonicalize(&cli.repo_path)
        .with_context(|| format!("Could not resolve path: {}", cli.repo_path.display()))?;
    let repo_path_str = abs_repo_path.display().to_string();

    let store = Arc::new(
        GixStore::open(&abs_repo_path)
            .with_context(|| format!("Failed to open git repository at {}", repo_path_str))?,
    );
    tracing::info!("Analyzing repository at: {}", repo_path_str);

    // A broken cache must never block an analysis
    let cache = if cli.no_cache {
        None
    } else {
        match open_cache(&abs_repo_path).await {
            Ok(db) => Some(db),
            Err(e) => {
                tracing::warn!("Report cache unavailable, continuing without it: {e:#}");
                None
            }
        }
    };
    let cache = keyed_cache(cache, || store.fingerprint());

    if let Some((db, fp)) = &cache {
        match db.load_report(fp).await {
            Ok(Some(cached)) => {
                tracing::info!("Repository unchanged, using cached report");
                eprintln!("{}", cached_note(cached.cached_at));
                return print_report(&cached.report, cli.json);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring unreadable cached report: {e:#}"),
        }
    }

    let start = Instant::now();
    let report = analyze(store, cli.analysis_options())
        .await
        .with_context(|| format!("Failed to analyze {}", repo_path_str))?;
    tracing::info!("Analysis finished in {}", format_duration(start.elapsed()));

    if let Some((db, fp)) = &cache {
        if let Err(e) = db.save_report(fp, &repo_path_str, &report).await {
            tracing::warn!("Failed to cache report: {e:#}");
        }
    }

    print_report(&report, cli.json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use repostats::analysis::AnalysisError;

    async fn memory_db() -> Database {
        let db = Database::new(":memory:").await.unwrap();
        db.init_schema().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_fingerprint_failure_disables_cache() {
        let cache = keyed_cache(Some(memory_db().await), || {
            Err(AnalysisError::References("packed-refs unreadable".into()))
        });
        assert!(cache.is_none());
    }

    #[tokio::test]
    async fn test_cache_keyed_by_fingerprint() {
        let cache = keyed_cache(Some(memory_db().await), || {
            Ok::<_, AnalysisError>("abc".to_string())
        });
        let (_db, fp) = cache.unwrap();
        assert_eq!(fp, "abc");
    }

    #[test]
    fn test_no_cache_skips_fingerprint() {
        let cache = keyed_cache(None, || -> Result<String, AnalysisError> {
            panic!("fingerprint computed without a cache")
        });
        assert!(cache.is_none());
    }
}
