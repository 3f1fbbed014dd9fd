//! Hierarchical node store: typed values, the session seam, and the
//! in-memory backend.

mod memory;
mod traits;
mod value;

pub use memory::{parent_path, MemoryRepository};
pub use traits::{Repository, Row, Session, StoreError};
pub use value::PropertyValue;
