//! Configuration for the catalog engine.
//!
//! # Example
//!
//! ```
//! use catalog_search::EngineConfig;
//!
//! // Minimal config (uses defaults)
//! let config = EngineConfig::default();
//! assert_eq!(config.retention_days, 7);
//!
//! // Full config
//! let config = EngineConfig {
//!     search_root: "/content/catalog".into(),
//!     metadata_root: "/var/feeds/generations".into(),
//!     retention_days: 14,
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;

/// Configuration for the catalog engine.
///
/// All fields have sensible defaults; deployments usually override only the
/// two root paths.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Root path catalog searches are scoped under
    #[serde(default = "default_search_root")]
    pub search_root: String,

    /// Root path feed-generation records are persisted under
    #[serde(default = "default_metadata_root")]
    pub metadata_root: String,

    /// How many days of feed-generation history to keep
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Record cache capacity
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Record cache entry TTL in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Removals per commit during a maintenance sweep
    #[serde(default = "default_maintenance_batch_size")]
    pub maintenance_batch_size: usize,
}

fn default_search_root() -> String {
    "/content/catalog".to_string()
}
fn default_metadata_root() -> String {
    "/var/feeds/generations".to_string()
}
fn default_retention_days() -> u32 {
    7
}
fn default_cache_max_entries() -> usize {
    1000
}
fn default_cache_ttl_secs() -> u64 {
    15 * 60
}
fn default_maintenance_batch_size() -> usize {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_root: default_search_root(),
            metadata_root: default_metadata_root(),
            retention_days: default_retention_days(),
            cache_max_entries: default_cache_max_entries(),
            cache_ttl_secs: default_cache_ttl_secs(),
            maintenance_batch_size: default_maintenance_batch_size(),
        }
    }
}
