// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Feed-generation record model.
//!
//! A record is a persisted key/value document describing one feed run. The
//! system properties (`id`, `state`, and the two structural node keys) are
//! excluded from the generic property bag and exposed through dedicated
//! accessors; everything else is carried verbatim.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::store::{PropertyValue, Row};

pub const FEED_GENERATION_RESULT: &str = "feed.generation.result";
pub const FEED_GENERATION_ID: &str = "feed.generation.id";
pub const FEED_GENERATION_STATE: &str = "feed.generation.state";
pub const FEED_GENERATION_START_TIME: &str = "feed.generation.start.time";
pub const FEED_EXPORTER_MANAGER_ID: &str = "feed.exporter.manager.id";
pub const FEED_EXPORTER_TYPE: &str = "feed.exporter.type";

/// Structural node keys written by the store layer, never by callers.
pub const RESOURCE_TYPE: &str = "doc:resourceType";
pub const PRIMARY_TYPE: &str = "doc:primaryType";

/// Properties a persist call must supply.
pub const MANDATORY_PROPERTIES: [&str; 4] = [
    FEED_GENERATION_START_TIME,
    FEED_EXPORTER_TYPE,
    FEED_EXPORTER_MANAGER_ID,
    FEED_GENERATION_STATE,
];

/// Properties synthesized by the store and excluded from the generic bag.
pub const SYSTEM_PROPERTIES: [&str; 4] = [
    FEED_GENERATION_ID,
    FEED_GENERATION_STATE,
    RESOURCE_TYPE,
    PRIMARY_TYPE,
];

/// Lifecycle state of one feed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeedState {
    Running,
    Failed,
    Succeeded,
}

impl FeedState {
    /// Name string stored as the normalized `state` value.
    pub fn as_str(self) -> &'static str {
        match self {
            FeedState::Running => "RUNNING",
            FeedState::Failed => "FAILED",
            FeedState::Succeeded => "SUCCEEDED",
        }
    }
}

impl From<FeedState> for PropertyValue {
    fn from(state: FeedState) -> Self {
        PropertyValue::Str(state.as_str().to_string())
    }
}

/// One persisted feed-generation record.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRecord {
    id: String,
    state: String,
    properties: BTreeMap<String, PropertyValue>,
}

impl FeedRecord {
    pub fn new(
        id: impl Into<String>,
        state: impl Into<String>,
        properties: BTreeMap<String, PropertyValue>,
    ) -> Self {
        let mut properties = properties;
        for system in SYSTEM_PROPERTIES {
            properties.remove(system);
        }
        Self {
            id: id.into(),
            state: state.into(),
            properties,
        }
    }

    /// Project a stored row back into a record. The id and state come from
    /// the system properties; the bag keeps everything else.
    pub fn from_row(row: &Row) -> Self {
        Self::new(
            row.str_property(FEED_GENERATION_ID, ""),
            row.str_property(FEED_GENERATION_STATE, ""),
            row.properties().clone(),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Declared start time, from the mandatory start-time millis property.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.properties
            .get(FEED_GENERATION_START_TIME)
            .and_then(PropertyValue::as_long)
            .and_then(|millis| DateTime::from_timestamp_millis(millis))
    }
}

/// Deterministic node path for a record: the root, the record's creation
/// year/month/day, and its sanitized id.
pub fn record_path(root: &str, id: &str, start_time: DateTime<Utc>) -> String {
    format!(
        "{}/{}/{}/{}/{}",
        root.trim_end_matches('/'),
        start_time.year(),
        start_time.month(),
        start_time.day(),
        sanitize_id(id)
    )
}

/// Replace characters that are not valid in a node name.
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
