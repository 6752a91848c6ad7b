//! The statistics report handed to callers
//!
//! Field names serialize in camelCase and mirror the published report
//! layout one-to-one.

use serde::{Deserialize, Serialize};

use super::facts::CheckoutStats;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub repository_size: RepositorySize,
    pub biggest_objects: BiggestObjects,
    pub history_structure: HistoryStructure,
    pub biggest_checkouts: CheckoutStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySize {
    pub commits: CountAndSize,
    pub trees: TreeSize,
    pub blobs: CountAndSize,
    pub annotated_tags: Count,
    pub references: Count,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountAndSize {
    pub count: u64,
    pub size: u64,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSize {
    pub count: u64,
    pub size: u64,
    pub entries: u64,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiggestObjects {
    pub commits: BiggestCommits,
    pub trees: BiggestTrees,
    pub blobs: BiggestBlobs,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiggestCommits {
    pub max_size: u64,
    pub max_parents: u64,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiggestTrees {
    pub max_entries: u64,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiggestBlobs {
    pub max_size: u64,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStructure {
    pub max_depth: u64,
    pub max_tag_depth: u64,
}
