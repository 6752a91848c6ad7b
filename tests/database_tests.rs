// Report cache integration tests
// SQLite operations against an in-memory database

mod common;

use repostats::model::{CheckoutStats, CountAndSize, StatisticsReport};
use repostats::repository::{Database, ReportCache, ReportRow, SCHEMA_VERSION};

/// Helper to create test database with initialized schema
async fn setup_db() -> Database {
    let db = common::create_test_db().await;
    db.init_schema().await.unwrap();
    db
}

fn sample_report() -> StatisticsReport {
    let mut report = StatisticsReport::default();
    report.repository_size.commits = CountAndSize { count: 12, size: 2_400 };
    report.history_structure.max_depth = 12;
    report.biggest_checkouts = CheckoutStats {
        num_directories: 4,
        max_path_depth: 3,
        max_path_length: 27,
        num_files: 40,
        total_file_size: 123_456,
        num_symlinks: 1,
        num_submodules: 0,
    };
    report
}

#[tokio::test]
async fn test_schema_init() {
    let db = common::create_test_db().await;

    let rebuilt = db.init_schema().await.unwrap();
    assert!(rebuilt, "First init_schema should return true");

    let rebuilt = db.init_schema().await.unwrap();
    assert!(!rebuilt, "Second init_schema should return false");

    let version = db.get_metadata("schema_version").await.unwrap();
    assert_eq!(version.as_deref(), Some(SCHEMA_VERSION));
}

#[tokio::test]
async fn test_metadata_roundtrip() {
    let db = setup_db().await;

    db.set_metadata("test_key", "test_value").await.unwrap();
    assert_eq!(db.get_metadata("test_key").await.unwrap().as_deref(), Some("test_value"));

    db.set_metadata("test_key", "updated_value").await.unwrap();
    assert_eq!(db.get_metadata("test_key").await.unwrap().as_deref(), Some("updated_value"));

    assert!(db.get_metadata("nonexistent").await.unwrap().is_none());
}

#[tokio::test]
async fn test_report_cache_roundtrip() {
    let db = setup_db().await;
    let report = sample_report();

    assert!(db.load_report("fp-1").await.unwrap().is_none());

    db.save_report("fp-1", "/repo", &report).await.unwrap();
    let cached = db.load_report("fp-1").await.unwrap().unwrap();
    assert_eq!(cached.report, report);
    assert!(cached.cached_at > 0);
}

#[tokio::test]
async fn test_new_fingerprint_replaces_old_report() {
    let db = setup_db().await;
    db.save_report("old", "/repo", &StatisticsReport::default()).await.unwrap();
    db.save_report("new", "/repo", &sample_report()).await.unwrap();

    assert!(db.load_report("old").await.unwrap().is_none());
    assert_eq!(db.load_report("new").await.unwrap().unwrap().report, sample_report());
    assert_eq!(db.report_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_corrupt_report_is_an_error() {
    let db = setup_db().await;
    db.put_report_row(&ReportRow {
        fingerprint: "fp".into(),
        repo_path: "/repo".into(),
        report_json: "{not json".into(),
        cached_at: 1,
    })
    .await
    .unwrap();

    assert!(db.load_report("fp").await.is_err());
}

#[tokio::test]
async fn test_cache_for_analyzed_repository() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    common::add_commit(&repo, &[("a.txt", b"hello")], "first");

    let store = repostats::repository::GixStore::open(&repo_path).unwrap();
    let fingerprint = store.fingerprint().unwrap();
    let report = common::analyze_repo(&repo_path, 2);

    let db = setup_db().await;
    db.save_report(&fingerprint, repo_path.to_str().unwrap(), &report).await.unwrap();

    let unchanged = repostats::repository::GixStore::open(&repo_path)
        .unwrap()
        .fingerprint()
        .unwrap();
    let cached = db.load_report(&unchanged).await.unwrap().unwrap();
    assert_eq!(cached.report, report);
}
