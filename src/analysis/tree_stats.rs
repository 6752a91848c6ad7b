//! Checkout statistics
//!
//! Extends each tree's partial statistics into statistics of the full
//! checkout rooted at it. Trees are resolved in post-order with an explicit
//! stack and memoized through `stats_done`, so shared subtrees are visited
//! once and nesting depth is bounded only by memory.

use gix::ObjectId;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::model::{BlobFacts, CheckoutStats, TreeRecord};

use super::error::{AnalysisError, Result};

struct Frame {
    id: ObjectId,
    /// Name length of the entry through which the parent reached this tree
    name_len: u64,
    stats: CheckoutStats,
    subtrees: Vec<(ObjectId, u64)>,
    next: usize,
}

pub struct TreeAggregator<'a> {
    trees: &'a mut FxHashMap<ObjectId, TreeRecord>,
    blobs: &'a FxHashMap<ObjectId, BlobFacts>,
    resolved: usize,
}

impl<'a> TreeAggregator<'a> {
    pub fn new(
        trees: &'a mut FxHashMap<ObjectId, TreeRecord>,
        blobs: &'a FxHashMap<ObjectId, BlobFacts>,
    ) -> Self {
        Self {
            trees,
            blobs,
            resolved: 0,
        }
    }

    /// Trees whose full statistics were computed by this aggregator
    pub fn resolved_count(&self) -> usize {
        self.resolved
    }

    /// Full checkout statistics of `root`.
    ///
    /// Returns `None` for ids missing from the tree map, which are empty
    /// trees. A tree reachable from itself is malformed input.
    pub fn resolve(&mut self, root: &ObjectId) -> Result<Option<CheckoutStats>> {
        match self.trees.get(root) {
            None => return Ok(None),
            Some(record) if record.stats_done => return Ok(Some(record.full)),
            Some(_) => {}
        }

        let mut on_stack = FxHashSet::default();
        on_stack.insert(*root);
        let mut stack = vec![self.open_frame(*root, 0)?];

        loop {
            let Some(frame) = stack.last_mut() else {
                return Err(AnalysisError::InternalConsistency(format!(
                    "tree {root} left the resolution stack unfinished"
                )));
            };

            if let Some(&(child, name_len)) = frame.subtrees.get(frame.next) {
                frame.next += 1;
                match self.trees.get(&child) {
                    None => {}
                    Some(record) if record.stats_done => {
                        frame.stats.add_subtree(&record.full, name_len);
                    }
                    Some(_) => {
                        if !on_stack.insert(child) {
                            return Err(AnalysisError::MalformedInput(format!(
                                "tree {child} contains itself"
                            )));
                        }
                        let child_frame = self.open_frame(child, name_len)?;
                        stack.push(child_frame);
                    }
                }
                continue;
            }

            let Some(done) = stack.pop() else { continue };
            on_stack.remove(&done.id);
            if let Some(record) = self.trees.get_mut(&done.id) {
                record.full = done.stats;
                record.stats_done = true;
                self.resolved += 1;
            }
            match stack.last_mut() {
                Some(parent) => parent.stats.add_subtree(&done.stats, done.name_len),
                None => return Ok(Some(done.stats)),
            }
        }
    }

    /// Seed a frame with the tree's own entries and its file sizes
    fn open_frame(&self, id: ObjectId, name_len: u64) -> Result<Frame> {
        let record = self.trees.get(&id).ok_or_else(|| {
            AnalysisError::InternalConsistency(format!("tree {id} vanished from the tree map"))
        })?;
        let partial = &record.partial;

        let mut total_file_size = 0;
        for blob in &partial.blob_ids {
            let facts = self.blobs.get(blob).ok_or_else(|| {
                AnalysisError::InternalConsistency(format!(
                    "tree {id} references blob {blob} that was never collected"
                ))
            })?;
            total_file_size += facts.size;
        }

        Ok(Frame {
            id,
            name_len,
            stats: CheckoutStats {
                num_directories: 1,
                max_path_depth: 1,
                max_path_length: partial.max_name_length,
                num_files: partial.num_files,
                total_file_size,
                num_symlinks: partial.num_symlinks,
                num_submodules: partial.num_submodules,
            },
            subtrees: partial.subtrees.clone(),
            next: 0,
        })
    }

    /// Per-field maximum over the root trees of `commit_trees`
    pub fn biggest_checkouts<'t>(
        &mut self,
        commit_trees: impl IntoIterator<Item = &'t ObjectId>,
    ) -> Result<CheckoutStats> {
        let mut biggest = CheckoutStats::default();
        for tree in commit_trees {
            if let Some(stats) = self.resolve(tree)? {
                biggest.max_with(&stats);
            }
        }
        Ok(biggest)
    }
}
