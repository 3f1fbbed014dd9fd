//! Typed property values stored on nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single typed property value.
///
/// String conversion via [`PropertyValue::as_comparison_str`] is what the
/// equality operators in both query backends compare against, so a literal
/// filter value always compares against the stored value's string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Str(String),
    /// Multi-valued string property (tag lists). An equality or LIKE match
    /// succeeds when any element matches.
    StrList(Vec<String>),
    Bool(bool),
    Long(i64),
    Date(DateTime<Utc>),
}

impl PropertyValue {
    /// The canonical string form used by equality comparisons.
    pub fn as_comparison_str(&self) -> String {
        match self {
            PropertyValue::Str(s) => s.clone(),
            PropertyValue::StrList(values) => values.join(","),
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Long(n) => n.to_string(),
            PropertyValue::Date(d) => d.to_rfc3339(),
        }
    }

    /// Elements an any-element match should consider.
    pub fn elements(&self) -> Vec<String> {
        match self {
            PropertyValue::StrList(values) => values.clone(),
            other => vec![other.as_comparison_str()],
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            PropertyValue::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            PropertyValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Long(value)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(value: DateTime<Utc>) -> Self {
        PropertyValue::Date(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(values: Vec<String>) -> Self {
        PropertyValue::StrList(values)
    }
}
