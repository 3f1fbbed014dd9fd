//! Feed-generation metadata: record model, TTL cache, and the persistence
//! facade with its retention sweep.

mod cache;
pub mod record;
mod store;

pub use cache::{Clock, ManualClock, RecordCache, RecordCacheStats, SystemClock};
pub use record::{FeedRecord, FeedState};
pub use store::{FeedMetadataStore, MetadataError};
