mod facts;
mod report;

pub use facts::{
    BlobFacts, CheckoutStats, CommitFacts, ObjectKind, TagDepth, TagFacts, TreePartialStats,
    TreeRecord,
};
pub use report::{
    BiggestBlobs, BiggestCommits, BiggestObjects, BiggestTrees, Count, CountAndSize,
    HistoryStructure, RepositorySize, StatisticsReport, TreeSize,
};
