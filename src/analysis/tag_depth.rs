//! Annotated tag chain depths
//!
//! A tag's depth is 1 plus the depth of its target when the target is
//! itself an annotated tag. Chains are walked iteratively and every tag on
//! a walked chain is memoized, so each tag is resolved exactly once.

use gix::ObjectId;
use rustc_hash::FxHashMap;

use crate::model::{ObjectKind, TagDepth, TagFacts};

use super::error::{AnalysisError, Result};

pub struct TagChainResolver<'a> {
    tags: &'a mut FxHashMap<ObjectId, TagFacts>,
}

impl<'a> TagChainResolver<'a> {
    pub fn new(tags: &'a mut FxHashMap<ObjectId, TagFacts>) -> Self {
        Self { tags }
    }

    /// Depth of tag `id`, or `None` if `id` is not a collected tag
    pub fn resolve(&mut self, id: &ObjectId) -> Result<Option<u64>> {
        if !self.tags.contains_key(id) {
            return Ok(None);
        }

        let mut chain = Vec::new();
        let mut current = *id;
        let base = loop {
            // A target tag that was never collected ends the chain
            let Some(tag) = self.tags.get_mut(&current) else {
                break 0;
            };
            match tag.depth {
                TagDepth::Resolved(depth) => break depth,
                TagDepth::Resolving => {
                    return Err(AnalysisError::MalformedInput(format!(
                        "annotated tag {current} is part of a tag cycle"
                    )));
                }
                TagDepth::Unset => {
                    tag.depth = TagDepth::Resolving;
                    chain.push(current);
                    if tag.target_kind == ObjectKind::Tag {
                        current = tag.target;
                    } else {
                        break 0;
                    }
                }
            }
        };

        let mut depth = base;
        for tag_id in chain.iter().rev() {
            depth += 1;
            if let Some(tag) = self.tags.get_mut(tag_id) {
                tag.depth = TagDepth::Resolved(depth);
            }
        }
        Ok(Some(depth))
    }

    /// Largest depth over all tags, 0 when there are none
    pub fn max_depth(&mut self) -> Result<u64> {
        let ids: Vec<ObjectId> = self.tags.keys().copied().collect();
        let mut max = 0;
        for id in &ids {
            if let Some(depth) = self.resolve(id)? {
                max = max.max(depth);
            }
        }
        Ok(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(n: u8) -> ObjectId {
        ObjectId::from([n; 20])
    }

    fn tag(tags: &mut FxHashMap<ObjectId, TagFacts>, id: u8, target: u8, kind: ObjectKind) {
        tags.insert(oid(id), TagFacts::new(oid(target), kind));
    }

    #[test]
    fn test_no_tags() {
        let mut tags = FxHashMap::default();
        assert_eq!(TagChainResolver::new(&mut tags).max_depth().unwrap(), 0);
    }

    #[test]
    fn test_tag_of_commit_has_depth_one() {
        let mut tags = FxHashMap::default();
        tag(&mut tags, 1, 100, ObjectKind::Commit);
        let mut resolver = TagChainResolver::new(&mut tags);
        assert_eq!(resolver.resolve(&oid(1)).unwrap(), Some(1));
        assert_eq!(resolver.resolve(&oid(100)).unwrap(), None);
    }

    #[test]
    fn test_chain_memoizes_every_link() {
        let mut tags = FxHashMap::default();
        tag(&mut tags, 1, 100, ObjectKind::Commit);
        tag(&mut tags, 2, 1, ObjectKind::Tag);
        tag(&mut tags, 3, 2, ObjectKind::Tag);

        let mut resolver = TagChainResolver::new(&mut tags);
        assert_eq!(resolver.resolve(&oid(3)).unwrap(), Some(3));
        assert_eq!(tags[&oid(1)].depth, TagDepth::Resolved(1));
        assert_eq!(tags[&oid(2)].depth, TagDepth::Resolved(2));
        assert_eq!(tags[&oid(3)].depth, TagDepth::Resolved(3));
    }

    #[test]
    fn test_max_depth_independent_of_order() {
        let mut tags = FxHashMap::default();
        tag(&mut tags, 1, 100, ObjectKind::Commit);
        tag(&mut tags, 2, 1, ObjectKind::Tag);
        tag(&mut tags, 3, 2, ObjectKind::Tag);
        tag(&mut tags, 4, 101, ObjectKind::Tree);

        let mut resolver = TagChainResolver::new(&mut tags);
        assert_eq!(resolver.resolve(&oid(2)).unwrap(), Some(2));
        assert_eq!(resolver.max_depth().unwrap(), 3);
    }

    #[test]
    fn test_uncollected_target_tag_ends_chain() {
        let mut tags = FxHashMap::default();
        tag(&mut tags, 2, 1, ObjectKind::Tag);
        let mut resolver = TagChainResolver::new(&mut tags);
        assert_eq!(resolver.resolve(&oid(2)).unwrap(), Some(1));
    }

    #[test]
    fn test_cycle_is_malformed() {
        let mut tags = FxHashMap::default();
        tag(&mut tags, 1, 2, ObjectKind::Tag);
        tag(&mut tags, 2, 1, ObjectKind::Tag);
        let err = TagChainResolver::new(&mut tags).max_depth().unwrap_err();
        assert_eq!(err.code(), "malformed_input");
    }

    #[test]
    fn test_long_chain() {
        let mut tags = FxHashMap::default();
        let id = |n: u32| {
            let mut bytes = [0u8; 20];
            bytes[..4].copy_from_slice(&n.to_be_bytes());
            ObjectId::from(bytes)
        };
        tags.insert(id(0), TagFacts::new(oid(255), ObjectKind::Commit));
        for n in 1..20_000 {
            tags.insert(id(n), TagFacts::new(id(n - 1), ObjectKind::Tag));
        }
        assert_eq!(TagChainResolver::new(&mut tags).max_depth().unwrap(), 20_000);
    }
}
