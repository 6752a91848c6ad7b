//! Commit history graph
//!
//! Arena of nodes keyed by commit id. A node is created the first time an
//! id shows up, either as a commit being collected or as the parent of one,
//! so collection order does not matter.

use gix::ObjectId;
use rustc_hash::FxHashMap;

#[derive(Debug, Default, Clone)]
struct CommitNode {
    children: Vec<usize>,
    parents: usize,
    /// Set once the commit itself was collected, not just referenced
    collected: bool,
}

#[derive(Debug, Default)]
pub struct CommitGraph {
    index: FxHashMap<ObjectId, usize>,
    nodes: Vec<CommitNode>,
    roots: Vec<usize>,
}

impl CommitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node_index(&mut self, id: ObjectId) -> usize {
        let next = self.nodes.len();
        let idx = *self.index.entry(id).or_insert(next);
        if idx == next {
            self.nodes.push(CommitNode::default());
        }
        idx
    }

    /// Record a collected commit and its ordered parents
    pub fn add_node(&mut self, id: ObjectId, parents: &[ObjectId]) {
        let idx = self.node_index(id);
        if self.nodes[idx].collected {
            return;
        }
        self.nodes[idx].collected = true;
        self.nodes[idx].parents = parents.len();
        if parents.is_empty() {
            self.roots.push(idx);
        }
        // One child edge per listed parent, so `parents` and the edges agree
        // even if a parent is listed twice
        for parent in parents {
            let parent_idx = self.node_index(*parent);
            self.nodes[parent_idx].children.push(idx);
        }
    }

    /// Number of nodes, including referenced-but-uncollected parents
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Length of the longest root-to-commit chain, counted in commits.
    ///
    /// Walks level by level from the roots. A commit joins the next level
    /// only when the last of its parents has been visited, which places it
    /// at the level of its longest path and admits it exactly once. Parents
    /// that were referenced but never collected (shallow or partial stores)
    /// count as already visited. Commits on a cycle never become eligible,
    /// so malformed input cannot loop.
    pub fn calculate_max_depth(&self) -> u64 {
        let mut parents_left: Vec<usize> = self.nodes.iter().map(|n| n.parents).collect();
        let mut frontier: Vec<usize> = self.roots.clone();

        for node in self.nodes.iter().filter(|n| !n.collected) {
            for &child in &node.children {
                parents_left[child] -= 1;
                if parents_left[child] == 0 {
                    frontier.push(child);
                }
            }
        }

        let mut depth = 0;
        while !frontier.is_empty() {
            depth += 1;
            let mut next = Vec::new();
            for &idx in &frontier {
                for &child in &self.nodes[idx].children {
                    parents_left[child] -= 1;
                    if parents_left[child] == 0 {
                        next.push(child);
                    }
                }
            }
            frontier = next;
        }
        depth
    }
}
