//! Object store trait for storage abstraction
//!
//! Decouples the statistics engine from how objects are actually stored.
//! The engine needs three things: enumerate every object id, read a typed
//! view of one object, and count references.

use gix::ObjectId;
use gix::bstr::BString;

use crate::analysis::Result;
use crate::model::ObjectKind;

/// How a tree entry materializes in a checkout
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EntryKind {
    /// Regular or executable file
    File,
    Symlink,
    Tree,
    /// Gitlink to a commit in another repository
    Submodule,
}

#[derive(Debug, Clone)]
pub struct TreeEntry {
    pub name: BString,
    pub id: ObjectId,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn new(name: impl Into<BString>, id: ObjectId, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            id,
            kind,
        }
    }

    /// Byte length of the entry name
    pub fn name_len(&self) -> u64 {
        self.name.len() as u64
    }
}

/// A decoded object together with its raw (uncompressed) size
#[derive(Debug, Clone)]
pub enum StoreObject {
    Commit {
        tree: ObjectId,
        parents: Vec<ObjectId>,
        size: u64,
    },
    Tree {
        entries: Vec<TreeEntry>,
        size: u64,
    },
    Blob {
        size: u64,
    },
    Tag {
        target: ObjectId,
        target_kind: ObjectKind,
        size: u64,
    },
}

impl StoreObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            StoreObject::Commit { .. } => ObjectKind::Commit,
            StoreObject::Tree { .. } => ObjectKind::Tree,
            StoreObject::Blob { .. } => ObjectKind::Blob,
            StoreObject::Tag { .. } => ObjectKind::Tag,
        }
    }
}

/// Reads objects on behalf of one worker thread
///
/// Readers are created on the thread that uses them and never cross threads,
/// so implementations may hold thread-local handles and scratch buffers.
pub trait ObjectReader {
    fn read(&mut self, id: &ObjectId) -> Result<StoreObject>;
}

/// Read-only, already-open object store
pub trait ObjectStore: Send + Sync + 'static {
    type Reader: ObjectReader;

    /// Open a reader for the calling thread
    fn reader(&self) -> Result<Self::Reader>;

    /// Call `f` once per object id in the store.
    ///
    /// Stops at the first error returned by `f` and passes it through.
    fn for_each_object_id(&self, f: &mut dyn FnMut(ObjectId) -> Result<()>) -> Result<()>;

    /// Number of references (branches, tags, remotes, ...)
    fn reference_count(&self) -> Result<u64>;
}
