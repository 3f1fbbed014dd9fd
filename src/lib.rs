//! # Catalog Search
//!
//! Criteria-to-query compilation, paging, and feed-metadata persistence over
//! a hierarchical document store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Criteria / Filter                       │
//! │  • Ordered multimap of predicate name → values             │
//! │  • Tri-state filter values (literal / null / not-null)     │
//! └─────────────────────────────────────────────────────────────┘
//!                │                            │
//!                ▼                            ▼
//! ┌──────────────────────────┐  ┌──────────────────────────────┐
//! │  Textual Query Compiler  │  │  Constraint-Tree Compiler    │
//! │  • quoting + escaping    │  │  • AND of per-key OR groups  │
//! │  • tag/category rule     │  │  • existence / negation      │
//! │  • date-range casts      │  │  • never-match escape hatch  │
//! └──────────────────────────┘  └──────────────────────────────┘
//!                │                            │
//!                └──────────┬─────────────────┘
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Executor & Pager (store seam)              │
//! │  • offset at the store, limit at the pager                 │
//! │  • offset-compensated best-effort totals                   │
//! │  • fail-fast row → entity projection                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The companion [`metadata`] module persists feed-generation records with a
//! TTL cache and an age-based retention sweep, filtering through the same
//! constraint-tree compiler.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use catalog_search::{Criteria, ProductSearch, NoUserDirectory};
//! use catalog_search::store::MemoryRepository;
//!
//! let repository = Arc::new(MemoryRepository::new());
//! let search = ProductSearch::new(repository, Arc::new(NoUserDirectory), "/content/catalog");
//!
//! let mut criteria = Criteria::new();
//! criteria.put("tags", "cat:shoes/running");
//! criteria.put("p.limit", "25");
//!
//! let page = search.find_products(&criteria).unwrap();
//! assert_eq!(page.total(), 0);
//! ```
//!
//! ## Modules
//!
//! - [`criteria`]: the shared compiler input model
//! - [`escape`]: literal quoting and full-text escaping
//! - [`query`]: the two query compilers and the compiled query types
//! - [`store`]: the repository/session seam and the in-memory backend
//! - [`search`]: executor/pager, record projection, and the search facade
//! - [`metadata`]: feed-generation records, cache, and maintenance

pub mod config;
pub mod criteria;
pub mod escape;
pub mod metadata;
pub mod query;
pub mod search;
pub mod store;

pub use config::EngineConfig;
pub use criteria::{Criteria, Filter, FilterValue};
pub use metadata::{FeedMetadataStore, FeedRecord, FeedState, MetadataError, RecordCache};
pub use query::{CompiledQuery, Constraint, SqlQuery, SqlQueryBuilder};
pub use search::{NoUserDirectory, Product, ProductSearch, PublishStatus, SearchError, SearchPage, UserDirectory};
pub use store::{PropertyValue, Repository, Row, Session, StoreError};
