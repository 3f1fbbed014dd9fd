// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Textual query compiler.
//!
//! Builds a point query string against a base path scope. The builder is a
//! one-shot compilation pipeline: every `add` consumes and returns the
//! builder, clause fragments accumulate in declaration order, and
//! [`SqlQueryBuilder::build`] folds them into an immutable [`SqlQuery`].
//! There is no way to append to a query after it has been built.
//!
//! # Statement shape
//!
//! ```text
//! SELECT node.* FROM [doc:record] AS node WHERE ISDESCENDANTNODE(node, '<path>')
//!   AND (node.'prop' = 'v1' OR node.'prop' = 'v2')
//!   AND (node.'tags' LIKE 'cat:a/%' OR node.'tags' LIKE 'cat:a')
//!   AND (CONTAINS(node.*, '*term*') or (CONTAINS(node.*, 'term')))
//!   AND node.'created' >= CAST('2024-01-02T03:04:05.000+00:00' AS DATE)
//!   ORDER BY SCORE(node) DESC
//! ```
//!
//! An empty value set never contributes a clause: absence of a filter must
//! never compile to an always-false or always-true constraint.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::escape::{escape_full_text, escape_single_quote, quote};

/// Selector name used for every compiled statement.
const SELECTOR: &str = "node";

/// Input pattern accepted by the date-range clauses.
const DATE_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Compilation failure for the textual backend.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid date-range value '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Path scope a compiled query is restricted to before any filters apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// All descendants of the path.
    Descendants(String),
    /// Direct children of the path only.
    Children(String),
}

/// One structured clause fragment. Raw values are kept unescaped; quoting
/// and full-text escaping happen exactly once, during rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    PropertyEq { property: String, values: Vec<String> },
    PropertyLike { property: String, patterns: Vec<String> },
    FullText { property: Option<String>, term: String },
    DateLowerBound { property: String, instant: DateTime<Utc> },
    DateUpperBound { property: String, instant: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }
}

/// Result ordering, fixed at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ordering {
    /// Relevance score, descending. The default; ascending is never default.
    Relevance,
    ByProperty {
        property: String,
        direction: Option<SortDirection>,
    },
}

/// Builder for one compiled query. Single-use, append-only, no undo.
#[derive(Debug, Clone)]
pub struct SqlQueryBuilder {
    scope: Scope,
    clauses: Vec<Clause>,
    ordering: Ordering,
}

impl SqlQueryBuilder {
    /// Start a query over all descendants of `path`.
    pub fn descendants_of(path: impl Into<String>) -> Self {
        Self {
            scope: Scope::Descendants(path.into()),
            clauses: Vec::new(),
            ordering: Ordering::Relevance,
        }
    }

    /// Start a query over the direct children of `path`.
    pub fn children_of(path: impl Into<String>) -> Self {
        Self {
            scope: Scope::Children(path.into()),
            clauses: Vec::new(),
            ordering: Ordering::Relevance,
        }
    }

    /// `AND (prop = v1 OR prop = v2 OR ...)`. No-op when `values` is empty.
    pub fn property_constraint(mut self, property: &str, values: &[String]) -> Self {
        if !values.is_empty() {
            self.clauses.push(Clause::PropertyEq {
                property: property.to_string(),
                values: values.to_vec(),
            });
        }
        self
    }

    /// Same OR-composition with the LIKE operator; used for hierarchical
    /// category matching. No-op when `patterns` is empty.
    pub fn property_like(mut self, property: &str, patterns: &[String]) -> Self {
        if !patterns.is_empty() {
            self.clauses.push(Clause::PropertyLike {
                property: property.to_string(),
                patterns: patterns.to_vec(),
            });
        }
        self
    }

    /// Full-text constraint over all properties. Only the first value is
    /// used; multiple full-text terms are not combined.
    pub fn full_text_constraint(self, values: &[String]) -> Self {
        self.full_text(None, values)
    }

    /// Full-text constraint restricted to a single property.
    pub fn property_full_text(self, property: &str, values: &[String]) -> Self {
        self.full_text(Some(property.to_string()), values)
    }

    fn full_text(mut self, property: Option<String>, values: &[String]) -> Self {
        if let Some(term) = values.first() {
            self.clauses.push(Clause::FullText {
                property,
                term: term.clone(),
            });
        }
        self
    }

    /// `AND prop >= CAST(...)` from the first value. No-op when empty.
    pub fn date_range_lower_bound(
        mut self,
        property: &str,
        values: &[String],
    ) -> Result<Self, QueryError> {
        if let Some(value) = values.first() {
            self.clauses.push(Clause::DateLowerBound {
                property: property.to_string(),
                instant: parse_date(value)?,
            });
        }
        Ok(self)
    }

    /// `AND prop <= CAST(...)` from the first value. No-op when empty.
    pub fn date_range_upper_bound(
        mut self,
        property: &str,
        values: &[String],
    ) -> Result<Self, QueryError> {
        if let Some(value) = values.first() {
            self.clauses.push(Clause::DateUpperBound {
                property: property.to_string(),
                instant: parse_date(value)?,
            });
        }
        Ok(self)
    }

    /// Order by the first sort field and, if given, the first direction.
    /// Without a sort field the query orders by relevance score descending.
    pub fn sorting_clause(mut self, sort_by: &[String], sort_order: &[String]) -> Self {
        self.ordering = match sort_by.first() {
            None => Ordering::Relevance,
            Some(property) => Ordering::ByProperty {
                property: property.clone(),
                direction: sort_order.first().and_then(|d| SortDirection::parse(d)),
            },
        };
        self
    }

    /// Fold the accumulated fragments into an immutable compiled query.
    pub fn build(self) -> SqlQuery {
        SqlQuery {
            scope: self.scope,
            clauses: self.clauses,
            ordering: self.ordering,
        }
    }
}

/// An immutable compiled textual query.
///
/// Opaque to callers: ordering is fixed at compile time and never re-derived.
/// The structured fragments remain accessible so a store backend that does
/// not consume statement text can interpret the query directly.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    scope: Scope,
    clauses: Vec<Clause>,
    ordering: Ordering,
}

impl SqlQuery {
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn ordering(&self) -> &Ordering {
        &self.ordering
    }

    /// Render the final statement. A pure fold over the fragment list.
    pub fn statement(&self) -> String {
        let mut out = String::new();
        out.push_str("SELECT node.* FROM [doc:record] AS node WHERE ");
        match &self.scope {
            Scope::Descendants(path) => {
                out.push_str(&format!(
                    "ISDESCENDANTNODE({}, '{}')",
                    SELECTOR,
                    escape_single_quote(path)
                ));
            }
            Scope::Children(path) => {
                out.push_str(&format!(
                    "ISCHILDNODE({}, '{}')",
                    SELECTOR,
                    escape_single_quote(path)
                ));
            }
        }
        for clause in &self.clauses {
            out.push_str(&render_clause(clause));
        }
        out.push_str(&render_ordering(&self.ordering));
        out
    }
}

fn render_clause(clause: &Clause) -> String {
    match clause {
        Clause::PropertyEq { property, values } => render_raw_constraint(property, values, " = "),
        Clause::PropertyLike { property, patterns } => {
            render_raw_constraint(property, patterns, " LIKE ")
        }
        Clause::FullText { property, term } => {
            let target = match property {
                Some(p) => format!("{}.{}", SELECTOR, quote(p)),
                None => format!("{}.*", SELECTOR),
            };
            let escaped = escape_full_text(term);
            // The plain CONTAINS alternative keeps terms that start or end
            // with an apostrophe (men's) matching when the wildcard form
            // fails to tokenize.
            format!(
                " AND (CONTAINS({target}, '*{escaped}*') or (CONTAINS({target}, '{escaped}')))"
            )
        }
        Clause::DateLowerBound { property, instant } => {
            format!(" AND {}.{} >= {}", SELECTOR, quote(property), cast_as_date(instant))
        }
        Clause::DateUpperBound { property, instant } => {
            format!(" AND {}.{} <= {}", SELECTOR, quote(property), cast_as_date(instant))
        }
    }
}

fn render_raw_constraint(property: &str, values: &[String], operator: &str) -> String {
    let mut out = String::from(" AND (");
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(" OR ");
        }
        out.push_str(SELECTOR);
        out.push('.');
        out.push_str(&quote(property));
        out.push_str(operator);
        out.push_str(&quote(value));
    }
    out.push(')');
    out
}

fn render_ordering(ordering: &Ordering) -> String {
    match ordering {
        Ordering::Relevance => format!(" ORDER BY SCORE({SELECTOR}) DESC"),
        Ordering::ByProperty { property, direction } => {
            let mut out = format!(" ORDER BY {}.{}", SELECTOR, quote(property));
            match direction {
                Some(SortDirection::Ascending) => out.push_str(" ASC"),
                Some(SortDirection::Descending) => out.push_str(" DESC"),
                None => {}
            }
            out
        }
    }
}

fn cast_as_date(instant: &DateTime<Utc>) -> String {
    format!(
        "CAST('{}' AS DATE)",
        instant.to_rfc3339_opts(SecondsFormat::Millis, false)
    )
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, QueryError> {
    NaiveDateTime::parse_from_str(value, DATE_INPUT_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|source| QueryError::InvalidDate {
            value: value.to_string(),
            source,
        })
}
