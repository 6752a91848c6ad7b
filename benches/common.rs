// Shared benchmark helpers
// Functions here are used across different benchmark files
#![allow(dead_code)]

use git2::{Repository, Signature};
use repostats::repository::{EntryKind, MemoryStore, TreeEntry};
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary git repository for benchmarks
pub fn create_bench_repo() -> (TempDir, PathBuf, Repository) {
    let dir = TempDir::new().unwrap();
    let repo_path = dir.path().to_path_buf();
    let repo = Repository::init(&repo_path).unwrap();

    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Bench User").unwrap();
    config.set_str("user.email", "bench@example.com").unwrap();

    (dir, repo_path, repo)
}

/// Add files and create a commit
pub fn add_commit(repo: &Repository, files: &[(&str, &[u8])], message: &str) -> git2::Oid {
    let sig = Signature::now("Bench User", "bench@example.com").unwrap();
    let mut index = repo.index().unwrap();

    for (path, content) in files {
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();
        index.add_path(std::path::Path::new(path)).unwrap();
    }

    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());

    if let Some(parent) = parent {
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent]).unwrap()
    } else {
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[]).unwrap()
    }
}

/// Build a repository with `num_commits` commits touching `files_per_commit`
/// of `num_files` files spread over 20 directories
pub fn build_history_repo(
    num_files: usize,
    num_commits: usize,
    files_per_commit: usize,
) -> (TempDir, PathBuf) {
    let (dir, repo_path, repo) = create_bench_repo();

    let files: Vec<_> = (0..num_files)
        .map(|i| {
            let path = format!("src/dir_{}/file_{}.rs", i % 20, i);
            let content = format!("// File {}\nfn func_{}() {{}}\n", i, i);
            (path, content.into_bytes())
        })
        .collect();
    let file_refs: Vec<_> = files.iter()
        .map(|(p, c)| (p.as_str(), c.as_slice()))
        .collect();
    add_commit(&repo, &file_refs, "Initial commit");

    for commit_num in 1..num_commits {
        let modified: Vec<_> = (0..files_per_commit)
            .map(|i| {
                let idx = (commit_num * files_per_commit + i) % num_files;
                let path = format!("src/dir_{}/file_{}.rs", idx % 20, idx);
                let content = format!("// File {} version {}\n", idx, commit_num);
                (path, content.into_bytes())
            })
            .collect();
        let refs: Vec<_> = modified.iter()
            .map(|(p, c)| (p.as_str(), c.as_slice()))
            .collect();
        add_commit(&repo, &refs, &format!("Commit {}", commit_num));
    }

    (dir, repo_path)
}

/// Synthetic in-memory history: `num_commits` commits, each replacing one
/// file of a `width`-wide directory
pub fn memory_history(num_commits: usize, width: usize) -> MemoryStore {
    let mut store = MemoryStore::new();
    let mut files: Vec<TreeEntry> = (0..width)
        .map(|i| {
            let blob = store.add_blob(100 + i as u64);
            TreeEntry::new(format!("file_{i}.rs"), blob, EntryKind::File)
        })
        .collect();

    let mut parent = None;
    for n in 0..num_commits {
        let blob = store.add_blob(200 + n as u64);
        files[n % width] = TreeEntry::new(format!("file_{}.rs", n % width), blob, EntryKind::File);
        let src = store.add_tree(files.clone());
        let root = store.add_tree(vec![TreeEntry::new("src", src, EntryKind::Tree)]);
        let parents: Vec<_> = parent.into_iter().collect();
        parent = Some(store.add_commit(root, &parents));
    }
    store.set_reference_count(1);
    store
}
