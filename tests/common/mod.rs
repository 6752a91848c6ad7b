// Shared test fixtures for integration tests
// Functions here are used across different test files
#![allow(dead_code)]

use git2::{FileMode, Oid, Repository, Signature};
use repostats::analysis::{AnalysisOptions, RepoAnalysis};
use repostats::model::StatisticsReport;
use repostats::repository::{Database, GixStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Create an in-memory test database
pub async fn create_test_db() -> Database {
    Database::new(":memory:").await.unwrap()
}

/// Create an empty temporary git repository
pub fn create_test_repo() -> (TempDir, PathBuf, Repository) {
    let dir = TempDir::new().unwrap();
    let repo_path = dir.path().to_path_buf();
    let repo = Repository::init(&repo_path).unwrap();

    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    (dir, repo_path, repo)
}

fn signature() -> Signature<'static> {
    Signature::now("Test User", "test@example.com").unwrap()
}

/// Write files to the work tree, stage them and commit on HEAD
pub fn add_commit(repo: &Repository, files: &[(&str, &[u8])], message: &str) -> Oid {
    let sig = signature();
    let mut index = repo.index().unwrap();

    for (path, content) in files {
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }

    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// A tree entry for `write_tree`
pub enum Entry<'a> {
    File(&'a [u8]),
    Link(&'a str),
    Dir(Vec<(&'a str, Entry<'a>)>),
    Submodule(Oid),
}

/// Write a (possibly nested) tree straight into the object database
pub fn write_tree(repo: &Repository, entries: &[(&str, Entry)]) -> Oid {
    let mut builder = repo.treebuilder(None).unwrap();
    for (name, entry) in entries {
        match entry {
            Entry::File(content) => {
                let blob = repo.blob(content).unwrap();
                builder.insert(name, blob, FileMode::Blob.into()).unwrap();
            }
            Entry::Link(target) => {
                let blob = repo.blob(target.as_bytes()).unwrap();
                builder.insert(name, blob, FileMode::Link.into()).unwrap();
            }
            Entry::Dir(children) => {
                let subtree = write_tree(repo, children);
                builder.insert(name, subtree, FileMode::Tree.into()).unwrap();
            }
            Entry::Submodule(commit) => {
                builder.insert(name, *commit, FileMode::Commit.into()).unwrap();
            }
        }
    }
    builder.write().unwrap()
}

/// Commit `tree` with explicit parents, optionally moving `update_ref`
pub fn commit_tree(
    repo: &Repository,
    tree: Oid,
    parents: &[Oid],
    message: &str,
    update_ref: Option<&str>,
) -> Oid {
    let sig = signature();
    let tree = repo.find_tree(tree).unwrap();
    let parents: Vec<git2::Commit> = parents
        .iter()
        .map(|p| repo.find_commit(*p).unwrap())
        .collect();
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(update_ref, &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

/// Create an annotated tag named `name` pointing at `target`
pub fn annotated_tag(repo: &Repository, name: &str, target: Oid) -> Oid {
    let object = repo.find_object(target, None).unwrap();
    repo.tag(name, &object, &signature(), &format!("tag {name}"), false)
        .unwrap()
}

/// Analyze the repository at `path` on the calling thread
pub fn analyze_repo(path: &Path, threads: usize) -> StatisticsReport {
    let store = Arc::new(GixStore::open(path).unwrap());
    RepoAnalysis::new(store, AnalysisOptions::quiet().with_threads(threads))
        .run()
        .unwrap()
}
