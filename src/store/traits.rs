//! Store session seam.
//!
//! The content repository itself is an external collaborator; this module
//! defines the narrow surface the engine consumes. One scoped session is
//! acquired per top-level operation and is released on every exit path —
//! implementations release in `Drop`, so early returns and error paths
//! cannot leak a session.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::query::CompiledQuery;
use crate::store::PropertyValue;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("node not found: {0}")]
    NotFound(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// One result row: a node path plus its property snapshot.
///
/// The typed getters are total: a present-but-wrong-typed property yields
/// the caller-supplied default instead of an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    path: String,
    properties: BTreeMap<String, PropertyValue>,
}

impl Row {
    pub fn new(path: impl Into<String>, properties: BTreeMap<String, PropertyValue>) -> Self {
        Self {
            path: path.into(),
            properties,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn str_property(&self, name: &str, default: &str) -> String {
        self.properties
            .get(name)
            .and_then(PropertyValue::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn bool_property(&self, name: &str, default: bool) -> bool {
        self.properties
            .get(name)
            .and_then(PropertyValue::as_bool)
            .unwrap_or(default)
    }

    pub fn long_property(&self, name: &str) -> Option<i64> {
        self.properties.get(name).and_then(PropertyValue::as_long)
    }

    pub fn date_property(&self, name: &str) -> Option<DateTime<Utc>> {
        self.properties.get(name).and_then(PropertyValue::as_date)
    }
}

/// A scoped store session. Blocking; callers impose their own timeouts.
///
/// `execute` returns rows in compiled order with the requested offset
/// already applied. The length of the returned sequence is therefore the
/// count of rows *after* the offset — the executor's total-count rule
/// depends on no result limit ever being pushed down to this layer.
pub trait Session {
    /// Snapshot a node, `None` when absent.
    fn get_node(&self, path: &str) -> Result<Option<Row>, StoreError>;

    /// Create or fully replace a node's property bag, creating missing
    /// ancestor folders. Staged until [`Session::save`].
    fn write_node(
        &mut self,
        path: &str,
        properties: BTreeMap<String, PropertyValue>,
    ) -> Result<(), StoreError>;

    /// Remove a node and its subtree. Staged until [`Session::save`].
    fn remove_node(&mut self, path: &str) -> Result<(), StoreError>;

    /// Number of direct children, as seen by this session.
    fn child_count(&self, path: &str) -> Result<usize, StoreError>;

    /// Execute a compiled query, skipping `offset` rows.
    fn execute(&self, query: &CompiledQuery, offset: u64) -> Result<Vec<Row>, StoreError>;

    /// Commit staged changes to the shared store.
    fn save(&mut self) -> Result<(), StoreError>;
}

/// Session factory. Acquire one session per top-level operation.
pub trait Repository: Send + Sync {
    fn login(&self) -> Result<Box<dyn Session>, StoreError>;
}
