//! Parallel object collection
//!
//! Every object id in the store is handed to a worker, which reads and
//! classifies the object and merges it into one of four shared maps. Each
//! map carries the running totals for its kind, updated only when an id is
//! seen for the first time, so duplicate enumeration never double-counts.

use gix::ObjectId;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::model::{BlobFacts, CommitFacts, TagFacts, TreePartialStats, TreeRecord};
use crate::repository::{EntryKind, ObjectReader, ObjectStore, StoreObject, TreeEntry};

use super::commit_graph::CommitGraph;
use super::error::AnalysisError;
use super::pool::Worker;
use super::shared_map::SharedMap;

#[derive(Debug, Default)]
pub struct CommitTotals {
    pub count: u64,
    pub size: u64,
    pub max_size: u64,
    pub max_parents: u64,
    pub graph: CommitGraph,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TreeTotals {
    pub count: u64,
    pub size: u64,
    pub entries: u64,
    pub max_entries: u64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BlobTotals {
    pub count: u64,
    pub size: u64,
    pub max_size: u64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TagTotals {
    pub count: u64,
}

/// State shared by all collection workers
#[derive(Default)]
pub struct CollectionContext {
    commits: SharedMap<CommitFacts, CommitTotals>,
    trees: SharedMap<TreeRecord, TreeTotals>,
    blobs: SharedMap<BlobFacts, BlobTotals>,
    tags: SharedMap<TagFacts, TagTotals>,
    failed: AtomicBool,
    first_error: Mutex<Option<AnalysisError>>,
    processed: AtomicU64,
}

/// Maps and totals after collection, owned by the sequential phases
pub struct Collected {
    pub commits: FxHashMap<ObjectId, CommitFacts>,
    pub commit_totals: CommitTotals,
    pub trees: FxHashMap<ObjectId, TreeRecord>,
    pub tree_totals: TreeTotals,
    pub blobs: FxHashMap<ObjectId, BlobFacts>,
    pub blob_totals: BlobTotals,
    pub tags: FxHashMap<ObjectId, TagFacts>,
    pub tag_totals: TagTotals,
}

impl CollectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `err` if it is the first failure of the run
    pub fn record_failure(&self, err: AnalysisError) {
        let mut slot = self.first_error.lock();
        if slot.is_none() {
            *slot = Some(err);
        }
        self.failed.store(true, Ordering::Release);
    }

    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    pub fn take_error(&self) -> Option<AnalysisError> {
        self.first_error.lock().take()
    }

    /// Objects read and merged so far, duplicates included
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Merge one decoded object into its map
    pub fn collect(&self, id: ObjectId, object: StoreObject) {
        match object {
            StoreObject::Commit {
                tree,
                parents,
                size,
            } => {
                let facts = CommitFacts {
                    tree,
                    parents,
                    size,
                };
                self.commits.upsert_with(id, facts, |facts, totals| {
                    totals.count += 1;
                    totals.size += facts.size;
                    totals.max_size = totals.max_size.max(facts.size);
                    totals.max_parents = totals.max_parents.max(facts.parents.len() as u64);
                    totals.graph.add_node(id, &facts.parents);
                });
            }
            StoreObject::Tree { entries, size } => {
                // Empty trees never appear in a checkout
                if entries.is_empty() {
                    return;
                }
                let entry_count = entries.len() as u64;
                let record = TreeRecord::new(partial_stats(&entries));
                self.trees.upsert_with(id, record, |_, totals| {
                    totals.count += 1;
                    totals.size += size;
                    totals.entries += entry_count;
                    totals.max_entries = totals.max_entries.max(entry_count);
                });
            }
            StoreObject::Blob { size } => {
                self.blobs.upsert_with(id, BlobFacts { size }, |_, totals| {
                    totals.count += 1;
                    totals.size += size;
                    totals.max_size = totals.max_size.max(size);
                });
            }
            StoreObject::Tag {
                target,
                target_kind,
                ..
            } => {
                let facts = TagFacts::new(target, target_kind);
                self.tags.upsert_with(id, facts, |_, totals| {
                    totals.count += 1;
                });
            }
        }
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn into_collected(self) -> Collected {
        let (commits, commit_totals) = self.commits.into_parts();
        let (trees, tree_totals) = self.trees.into_parts();
        let (blobs, blob_totals) = self.blobs.into_parts();
        let (tags, tag_totals) = self.tags.into_parts();
        Collected {
            commits,
            commit_totals,
            trees,
            tree_totals,
            blobs,
            blob_totals,
            tags,
            tag_totals,
        }
    }
}

/// Direct-entry statistics of a non-empty tree
pub fn partial_stats(entries: &[TreeEntry]) -> TreePartialStats {
    let mut partial = TreePartialStats::default();
    for entry in entries {
        match entry.kind {
            EntryKind::Submodule => partial.num_submodules += 1,
            EntryKind::Symlink => partial.num_symlinks += 1,
            EntryKind::Tree => partial.subtrees.push((entry.id, entry.name_len())),
            EntryKind::File => {
                partial.blob_ids.push(entry.id);
                partial.num_files += 1;
                partial.max_name_length = partial.max_name_length.max(entry.name_len());
            }
        }
    }
    partial
}

/// Pool worker reading objects through a per-thread reader
pub struct ObjectCollector<S: ObjectStore> {
    store: Arc<S>,
    ctx: Arc<CollectionContext>,
}

impl<S: ObjectStore> ObjectCollector<S> {
    pub fn new(store: Arc<S>, ctx: Arc<CollectionContext>) -> Self {
        Self { store, ctx }
    }
}

impl<S: ObjectStore> Worker for ObjectCollector<S> {
    type Item = ObjectId;
    type State = S::Reader;

    fn initialize(&self) -> Option<S::Reader> {
        match self.store.reader() {
            Ok(reader) => Some(reader),
            Err(err) => {
                tracing::warn!(error = %err, "worker could not open an object reader");
                self.ctx.record_failure(err);
                None
            }
        }
    }

    fn execute(&self, reader: &mut S::Reader, id: ObjectId) -> bool {
        // After a failure the remaining queue is drained without reading
        if self.ctx.has_failed() {
            return true;
        }
        match reader.read(&id) {
            Ok(object) => {
                self.ctx.collect(id, object);
                true
            }
            Err(err) => {
                tracing::debug!(%id, error = %err, "object read failed");
                self.ctx.record_failure(err);
                false
            }
        }
    }
}
