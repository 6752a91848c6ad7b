//! gix-backed object store
//!
//! The repository is opened once as a `ThreadSafeRepository`; every worker
//! thread turns it into its own thread-local handle when it opens a reader.

use gix::ObjectId;
use gix::prelude::FindExt;
use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisError, Result};
use crate::model::ObjectKind;

use super::object_store::{EntryKind, ObjectReader, ObjectStore, StoreObject, TreeEntry};

/// Object store over an on-disk git repository
pub struct GixStore {
    repo: gix::ThreadSafeRepository,
    path: PathBuf,
}

impl GixStore {
    /// Open the repository at `path` (work tree, `.git` dir or bare repo)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let repo = gix::open(&path).map_err(|e| AnalysisError::Open(e.to_string()))?;
        Ok(Self {
            repo: repo.into_sync(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Identify the current repository content for cache lookups.
    ///
    /// Covers every reference with its target, every pack file with its
    /// length, and the number of loose objects. Any fetch, commit, gc or
    /// repack changes at least one of them. The key is the hex-encoded
    /// listing itself, so two different states never share a key.
    pub fn fingerprint(&self) -> Result<String> {
        let repo = self.repo.to_thread_local();

        let mut refs = Vec::new();
        let platform = repo
            .references()
            .map_err(|e| AnalysisError::References(e.to_string()))?;
        let iter = platform
            .all()
            .map_err(|e| AnalysisError::References(e.to_string()))?;
        for reference in iter {
            let reference = reference.map_err(|e| AnalysisError::References(e.to_string()))?;
            let target = match &reference.inner.target {
                gix::refs::Target::Object(id) => id.to_hex().to_string(),
                gix::refs::Target::Symbolic(name) => name.as_bstr().to_string(),
            };
            refs.push(format!("ref {} {}", reference.name().as_bstr(), target));
        }
        refs.sort();

        let objects_dir = repo.objects.store_ref().path().to_path_buf();
        let packs = list_pack_files(&objects_dir);
        let loose = count_loose_objects(&objects_dir);

        let mut listing = String::new();
        for line in &refs {
            listing.push_str(line);
            listing.push('\n');
        }
        for (name, len) in &packs {
            listing.push_str(&format!("pack {name} {len}\n"));
        }
        listing.push_str(&format!("loose {loose}\n"));

        Ok(hex::encode(listing))
    }
}

impl ObjectStore for GixStore {
    type Reader = GixReader;

    fn reader(&self) -> Result<GixReader> {
        Ok(GixReader {
            repo: self.repo.to_thread_local(),
            buf: Vec::with_capacity(8 * 1024),
        })
    }

    fn for_each_object_id(&self, f: &mut dyn FnMut(ObjectId) -> Result<()>) -> Result<()> {
        let repo = self.repo.to_thread_local();
        let ids = repo
            .objects
            .iter()
            .map_err(|e| AnalysisError::Enumeration(e.to_string()))?;
        for id in ids {
            let id = id.map_err(|e| AnalysisError::Enumeration(e.to_string()))?;
            f(id)?;
        }
        Ok(())
    }

    fn reference_count(&self) -> Result<u64> {
        let repo = self.repo.to_thread_local();
        let platform = repo
            .references()
            .map_err(|e| AnalysisError::References(e.to_string()))?;
        let mut count = 0;
        for reference in platform
            .all()
            .map_err(|e| AnalysisError::References(e.to_string()))?
        {
            reference.map_err(|e| AnalysisError::References(e.to_string()))?;
            count += 1;
        }
        Ok(count)
    }
}

/// Thread-local reader with a reusable decode buffer
pub struct GixReader {
    repo: gix::Repository,
    buf: Vec<u8>,
}

impl ObjectReader for GixReader {
    fn read(&mut self, id: &ObjectId) -> Result<StoreObject> {
        // Blobs only need their size; skip inflating their content
        let header = self
            .repo
            .find_header(*id)
            .map_err(|e| AnalysisError::store_read(*id, e))?;
        if header.kind() == gix::object::Kind::Blob {
            return Ok(StoreObject::Blob {
                size: header.size(),
            });
        }

        let data = self
            .repo
            .objects
            .find(id, &mut self.buf)
            .map_err(|e| AnalysisError::store_read(*id, e))?;
        let size = data.data.len() as u64;
        let object = data
            .decode()
            .map_err(|e| AnalysisError::store_read(*id, e))?;

        Ok(match object {
            gix::objs::ObjectRef::Commit(commit) => StoreObject::Commit {
                tree: commit.tree(),
                parents: commit.parents().collect(),
                size,
            },
            gix::objs::ObjectRef::Tree(tree) => StoreObject::Tree {
                entries: tree
                    .entries
                    .iter()
                    .map(|entry| {
                        TreeEntry::new(
                            entry.filename.to_owned(),
                            entry.oid.to_owned(),
                            entry_kind(entry.mode),
                        )
                    })
                    .collect(),
                size,
            },
            gix::objs::ObjectRef::Blob(_) => StoreObject::Blob { size },
            gix::objs::ObjectRef::Tag(tag) => StoreObject::Tag {
                target: tag.target(),
                target_kind: ObjectKind::from(tag.target_kind),
                size,
            },
        })
    }
}

fn entry_kind(mode: gix::objs::tree::EntryMode) -> EntryKind {
    if mode.is_tree() {
        EntryKind::Tree
    } else if mode.is_commit() {
        EntryKind::Submodule
    } else if mode.is_link() {
        EntryKind::Symlink
    } else {
        EntryKind::File
    }
}

/// Pack files in objects/pack/ with their on-disk length, sorted by name
fn list_pack_files(objects_dir: &Path) -> Vec<(String, u64)> {
    let mut packs = Vec::new();
    if let Ok(entries) = std::fs::read_dir(objects_dir.join("pack")) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "pack") {
                let len = entry.metadata().map(|m| m.len()).unwrap_or(0);
                let name = entry.file_name().to_string_lossy().into_owned();
                packs.push((name, len));
            }
        }
    }
    packs.sort();
    packs
}

/// Count loose objects across the 256 fan-out directories
fn count_loose_objects(objects_dir: &Path) -> u64 {
    let mut count = 0;
    if let Ok(entries) = std::fs::read_dir(objects_dir) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.len() == 2 && name.chars().all(|c| c.is_ascii_hexdigit()) {
                if let Ok(files) = std::fs::read_dir(entry.path()) {
                    count += files.flatten().count() as u64;
                }
            }
        }
    }
    count
}
