mod cache;
mod database;
mod gix_store;
mod memory;
mod object_store;

pub use cache::{CachedReport, ReportCache};
pub use database::{Database, ReportRow};
pub use gix_store::{GixReader, GixStore};
pub use memory::{MemoryReader, MemoryStore};
pub use object_store::{EntryKind, ObjectReader, ObjectStore, StoreObject, TreeEntry};

// Bumped whenever the stored report layout changes
pub const SCHEMA_VERSION: &str = "1";
