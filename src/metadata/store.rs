// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Feed-generation metadata store.
//!
//! A persistence facade over the node store: validated writes under a
//! deterministic date-derived path, cached reads, constraint-tree filtering,
//! and a retention sweep that reclaims emptied date folders. The cache entry
//! for an id is published only after the session commit succeeds, so cache
//! and store never disagree on a persisted record.

use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::criteria::Filter;
use crate::metadata::cache::{Clock, RecordCache};
use crate::metadata::record::{
    self, FeedRecord, FEED_GENERATION_ID, FEED_GENERATION_RESULT, FEED_GENERATION_STATE,
    FEED_GENERATION_START_TIME, MANDATORY_PROPERTIES, SYSTEM_PROPERTIES,
};
use crate::query::{build_filter_constraint, CompareOp, Constraint, Scope, SortDirection, TreeOrdering, TreeQuery};
use crate::store::{parent_path, PropertyValue, Repository, Session, StoreError};

const RECORD_RESOURCE_TYPE: &str = "feed/generation";
const RECORD_PRIMARY_TYPE: &str = "doc:unstructured";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("missing mandatory properties {0:?}")]
    MissingProperties(Vec<String>),
    #[error("property '{property}' must be {expected}")]
    InvalidProperty {
        property: &'static str,
        expected: &'static str,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct FeedMetadataStore {
    repository: Arc<dyn Repository>,
    cache: Arc<RecordCache>,
    clock: Arc<dyn Clock>,
    root: String,
    retention_days: u32,
    commit_batch_size: usize,
}

impl FeedMetadataStore {
    pub fn new(
        repository: Arc<dyn Repository>,
        cache: Arc<RecordCache>,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            repository,
            cache,
            clock,
            root: config.metadata_root.trim_end_matches('/').to_string(),
            retention_days: config.retention_days,
            commit_batch_size: config.maintenance_batch_size,
        }
    }

    /// Persist a record under its date-derived path.
    ///
    /// Non-system properties are written verbatim; the system properties are
    /// written explicitly, with the state normalized to its string form.
    /// Re-persisting an id for the same start date replaces the whole
    /// non-system property bag.
    pub fn persist(
        &self,
        id: &str,
        properties: &BTreeMap<String, PropertyValue>,
    ) -> Result<(), MetadataError> {
        validate_mandatory(properties)?;
        let start_time = start_time_of(properties)?;
        let path = record::record_path(&self.root, id, start_time);

        let mut session = self.repository.login()?;
        session.write_node(&path, node_properties(id, properties))?;
        session.save()?;

        self.cache
            .insert(FeedRecord::new(id, state_of(properties), properties.clone()));
        debug!(id, path = %path, "feed generation persisted");
        Ok(())
    }

    /// Record for an id, from the cache when possible.
    ///
    /// Absent records and failed lookups both yield `None`; a failure is
    /// logged, never surfaced.
    pub fn get(&self, id: &str) -> Option<FeedRecord> {
        if let Some(record) = self.cache.get(id) {
            return Some(record);
        }

        let mut filter = Filter::new();
        filter.put(FEED_GENERATION_ID, id);
        match self.find(&filter) {
            Ok(records) => records.into_iter().next(),
            Err(error) => {
                warn!(id, %error, "unable to find feed generation");
                None
            }
        }
    }

    /// All records matching a tri-state filter, oldest first. Every record
    /// returned is also written into the cache.
    pub fn find(&self, filter: &Filter) -> Result<Vec<FeedRecord>, MetadataError> {
        let query = self.scoped_query(build_filter_constraint(filter));
        let session = self.repository.login()?;
        let rows = session.execute(&query.into(), 0)?;

        let records: Vec<FeedRecord> = rows
            .iter()
            // Folder nodes along the date hierarchy carry no record id.
            .filter(|row| row.property(FEED_GENERATION_ID).is_some())
            .map(FeedRecord::from_row)
            .collect();
        for record in &records {
            self.cache.insert(record.clone());
        }
        Ok(records)
    }

    /// Remove records older than the retention period, oldest first,
    /// reclaiming emptied date folders and committing in batches. Failures
    /// are logged and stop the sweep; batches already committed stay
    /// committed.
    pub fn run_maintenance(&self) {
        debug!("running maintenance sweep");
        match self.sweep() {
            Ok(removed) => debug!(removed, "maintenance sweep completed"),
            Err(error) => warn!(%error, "error occurred during maintenance"),
        }
    }

    fn sweep(&self) -> Result<usize, MetadataError> {
        let cutoff = self.clock.now() - Duration::days(i64::from(self.retention_days));
        let query = self.scoped_query(Some(Constraint::compare(
            FEED_GENERATION_START_TIME,
            CompareOp::Le,
            PropertyValue::Long(cutoff.timestamp_millis()),
        )));

        let mut session = self.repository.login()?;
        let rows = session.execute(&query.into(), 0)?;

        let mut removed = 0usize;
        for row in &rows {
            let id = row.str_property(FEED_GENERATION_ID, "");
            let result_file = row.str_property(FEED_GENERATION_RESULT, "");

            remove_with_empty_ancestors(session.as_mut(), row.path(), &self.root)?;
            self.cache.invalidate(&id);
            if !result_file.is_empty() {
                // Best-effort removal of the exported file.
                let _ = fs::remove_file(&result_file);
            }

            removed += 1;
            if removed % self.commit_batch_size == 0 {
                session.save()?;
            }
        }
        session.save()?;
        Ok(removed)
    }

    fn scoped_query(&self, constraint: Option<Constraint>) -> TreeQuery {
        TreeQuery::new(
            Scope::Descendants(self.root.clone()),
            constraint,
            TreeOrdering {
                property: FEED_GENERATION_START_TIME.to_string(),
                direction: SortDirection::Ascending,
            },
        )
    }
}

fn validate_mandatory(properties: &BTreeMap<String, PropertyValue>) -> Result<(), MetadataError> {
    let missing: Vec<String> = MANDATORY_PROPERTIES
        .iter()
        .filter(|name| !properties.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(MetadataError::MissingProperties(missing))
    }
}

fn start_time_of(properties: &BTreeMap<String, PropertyValue>) -> Result<DateTime<Utc>, MetadataError> {
    properties
        .get(FEED_GENERATION_START_TIME)
        .and_then(PropertyValue::as_long)
        .and_then(DateTime::from_timestamp_millis)
        .ok_or(MetadataError::InvalidProperty {
            property: FEED_GENERATION_START_TIME,
            expected: "epoch milliseconds as a long",
        })
}

fn state_of(properties: &BTreeMap<String, PropertyValue>) -> String {
    properties
        .get(FEED_GENERATION_STATE)
        .map(PropertyValue::as_comparison_str)
        .unwrap_or_default()
}

/// Full node bag for a persisted record: the caller's non-system properties
/// verbatim, then the system properties written explicitly.
fn node_properties(
    id: &str,
    properties: &BTreeMap<String, PropertyValue>,
) -> BTreeMap<String, PropertyValue> {
    let mut bag: BTreeMap<String, PropertyValue> = properties
        .iter()
        .filter(|(name, _)| !SYSTEM_PROPERTIES.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    bag.insert(FEED_GENERATION_ID.to_string(), id.into());
    bag.insert(FEED_GENERATION_STATE.to_string(), state_of(properties).into());
    bag.insert(record::RESOURCE_TYPE.to_string(), RECORD_RESOURCE_TYPE.into());
    bag.insert(record::PRIMARY_TYPE.to_string(), RECORD_PRIMARY_TYPE.into());
    bag
}

/// Remove a record node and then the tallest chain of ancestors left with a
/// single child, stopping below the configured root.
fn remove_with_empty_ancestors(
    session: &mut dyn Session,
    path: &str,
    root: &str,
) -> Result<(), StoreError> {
    let mut to_remove = path.to_string();
    while let Some(parent) = parent_path(&to_remove) {
        if parent == root || session.child_count(parent)? != 1 {
            break;
        }
        to_remove = parent.to_string();
    }
    session.remove_node(&to_remove)
}
