//! In-memory object store
//!
//! Builds small object graphs by hand, including shapes a real repository
//! cannot produce (tag cycles, dangling blob ids). Object ids are sequential
//! rather than content hashes.

use gix::ObjectId;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

use crate::analysis::{AnalysisError, Result};
use crate::model::ObjectKind;

use super::object_store::{EntryKind, ObjectReader, ObjectStore, StoreObject, TreeEntry};

#[derive(Default, Clone)]
struct Objects {
    by_id: FxHashMap<ObjectId, StoreObject>,
    failing_reads: FxHashSet<ObjectId>,
}

#[derive(Default)]
pub struct MemoryStore {
    objects: Arc<Objects>,
    order: Vec<ObjectId>,
    next_id: u64,
    references: u64,
    enumerate_twice: bool,
    reverse: bool,
    fail_enumeration_after: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id without storing anything under it yet
    pub fn reserve_id(&mut self) -> ObjectId {
        self.next_id += 1;
        let mut bytes = [0u8; 20];
        bytes[..8].copy_from_slice(&self.next_id.to_be_bytes());
        bytes[19] = 0x5a;
        ObjectId::from(bytes)
    }

    /// Store `object` under an id obtained from `reserve_id`
    pub fn insert_with_id(&mut self, id: ObjectId, object: StoreObject) {
        let objects = Arc::make_mut(&mut self.objects);
        if objects.by_id.insert(id, object).is_none() {
            self.order.push(id);
        }
    }

    pub fn insert(&mut self, object: StoreObject) -> ObjectId {
        let id = self.reserve_id();
        self.insert_with_id(id, object);
        id
    }

    pub fn add_blob(&mut self, size: u64) -> ObjectId {
        self.insert(StoreObject::Blob { size })
    }

    /// Add a tree; its size follows git's encoding of `<mode> <name>\0<id>`
    pub fn add_tree(&mut self, entries: Vec<TreeEntry>) -> ObjectId {
        let size = entries
            .iter()
            .map(|e| mode_len(e.kind) + 1 + e.name_len() + 1 + 20)
            .sum();
        self.insert(StoreObject::Tree { entries, size })
    }

    /// Add a commit; its size approximates a git commit header with a short message
    pub fn add_commit(&mut self, tree: ObjectId, parents: &[ObjectId]) -> ObjectId {
        let size = 46 + 48 * parents.len() as u64 + 120;
        self.insert(StoreObject::Commit {
            tree,
            parents: parents.to_vec(),
            size,
        })
    }

    pub fn add_tag(&mut self, target: ObjectId, target_kind: ObjectKind) -> ObjectId {
        self.insert(StoreObject::Tag {
            target,
            target_kind,
            size: 140,
        })
    }

    pub fn set_reference_count(&mut self, count: u64) {
        self.references = count;
    }

    /// Enumerate every id twice, as a store with overlapping packs would
    pub fn enumerate_twice(&mut self, enabled: bool) {
        self.enumerate_twice = enabled;
    }

    /// Enumerate ids in reverse insertion order
    pub fn reverse_enumeration(&mut self, enabled: bool) {
        self.reverse = enabled;
    }

    /// Make every read of `id` fail
    pub fn fail_reads_of(&mut self, id: ObjectId) {
        Arc::make_mut(&mut self.objects).failing_reads.insert(id);
    }

    /// Make enumeration fail after `n` ids were handed out
    pub fn fail_enumeration_after(&mut self, n: usize) {
        self.fail_enumeration_after = Some(n);
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn mode_len(kind: EntryKind) -> u64 {
    match kind {
        EntryKind::Tree => 5,
        _ => 6,
    }
}

impl ObjectStore for MemoryStore {
    type Reader = MemoryReader;

    fn reader(&self) -> Result<MemoryReader> {
        Ok(MemoryReader {
            objects: Arc::clone(&self.objects),
        })
    }

    fn for_each_object_id(&self, f: &mut dyn FnMut(ObjectId) -> Result<()>) -> Result<()> {
        let mut ids: Vec<ObjectId> = self.order.clone();
        if self.reverse {
            ids.reverse();
        }
        let rounds = if self.enumerate_twice { 2 } else { 1 };

        let mut handed_out = 0usize;
        for _ in 0..rounds {
            for id in &ids {
                if self.fail_enumeration_after == Some(handed_out) {
                    return Err(AnalysisError::Enumeration(format!(
                        "enumeration aborted after {handed_out} objects"
                    )));
                }
                f(*id)?;
                handed_out += 1;
            }
        }
        Ok(())
    }

    fn reference_count(&self) -> Result<u64> {
        Ok(self.references)
    }
}

pub struct MemoryReader {
    objects: Arc<Objects>,
}

impl ObjectReader for MemoryReader {
    fn read(&mut self, id: &ObjectId) -> Result<StoreObject> {
        if self.objects.failing_reads.contains(id) {
            return Err(AnalysisError::store_read(*id, "injected read failure"));
        }
        self.objects
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| AnalysisError::store_read(*id, "object not found"))
    }
}
