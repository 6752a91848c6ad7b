//! Per-object facts gathered during collection
//!
//! These are the values stored in the four shared maps. They are written
//! once by the parallel phase and read (trees and tags: extended) by the
//! sequential phases.

use gix::ObjectId;

/// Kind of an object as seen from a reference to it
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl From<gix::object::Kind> for ObjectKind {
    fn from(kind: gix::object::Kind) -> Self {
        match kind {
            gix::object::Kind::Commit => ObjectKind::Commit,
            gix::object::Kind::Tree => ObjectKind::Tree,
            gix::object::Kind::Blob => ObjectKind::Blob,
            gix::object::Kind::Tag => ObjectKind::Tag,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommitFacts {
    pub tree: ObjectId,
    pub parents: Vec<ObjectId>,
    pub size: u64,
}

#[derive(Debug, Copy, Clone, Default)]
pub struct BlobFacts {
    pub size: u64,
}

/// Memoized chain depth of an annotated tag
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum TagDepth {
    #[default]
    Unset,
    /// On the resolver's current chain; meeting it again means a cycle
    Resolving,
    Resolved(u64),
}

#[derive(Debug, Clone)]
pub struct TagFacts {
    pub target: ObjectId,
    pub target_kind: ObjectKind,
    pub depth: TagDepth,
}

impl TagFacts {
    pub fn new(target: ObjectId, target_kind: ObjectKind) -> Self {
        Self {
            target,
            target_kind,
            depth: TagDepth::Unset,
        }
    }
}

/// Statistics of one tree considering only its direct entries
#[derive(Debug, Clone, Default)]
pub struct TreePartialStats {
    /// Regular and executable file blobs, one id per entry
    pub blob_ids: Vec<ObjectId>,
    /// Subtrees with the byte length of their entry name
    pub subtrees: Vec<(ObjectId, u64)>,
    pub num_submodules: u64,
    pub num_symlinks: u64,
    pub num_files: u64,
    pub max_name_length: u64,
}

/// Statistics of the full checkout rooted at one tree
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStats {
    pub num_directories: u64,
    pub max_path_depth: u64,
    pub max_path_length: u64,
    pub num_files: u64,
    pub total_file_size: u64,
    pub num_symlinks: u64,
    pub num_submodules: u64,
}

impl CheckoutStats {
    /// Fold a resolved subtree reached through an entry named with `name_len` bytes
    pub fn add_subtree(&mut self, child: &CheckoutStats, name_len: u64) {
        self.num_directories += child.num_directories;
        self.max_path_depth = self.max_path_depth.max(child.max_path_depth + 1);
        self.max_path_length = self
            .max_path_length
            .max(name_len + 1 + child.max_path_length);
        self.num_files += child.num_files;
        self.total_file_size += child.total_file_size;
        self.num_symlinks += child.num_symlinks;
        self.num_submodules += child.num_submodules;
    }

    /// Keep the per-field maximum of `self` and `other`
    pub fn max_with(&mut self, other: &CheckoutStats) {
        self.num_directories = self.num_directories.max(other.num_directories);
        self.max_path_depth = self.max_path_depth.max(other.max_path_depth);
        self.max_path_length = self.max_path_length.max(other.max_path_length);
        self.num_files = self.num_files.max(other.num_files);
        self.total_file_size = self.total_file_size.max(other.total_file_size);
        self.num_symlinks = self.num_symlinks.max(other.num_symlinks);
        self.num_submodules = self.num_submodules.max(other.num_submodules);
    }
}

/// One entry of the tree map: partial stats, extended in place into full stats
#[derive(Debug, Clone)]
pub struct TreeRecord {
    pub partial: TreePartialStats,
    pub full: CheckoutStats,
    pub stats_done: bool,
}

impl TreeRecord {
    pub fn new(partial: TreePartialStats) -> Self {
        Self {
            partial,
            full: CheckoutStats::default(),
            stats_done: false,
        }
    }
}
