// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query compilation.
//!
//! Two backends share the same criteria input:
//!
//! ```text
//! Criteria / Filter
//!     ↓
//!     ├─→ SqlQueryBuilder → SqlQuery (point query statement text)
//!     └─→ build_filter_constraint → Constraint (abstract AND/OR tree)
//! ```
//!
//! Both compile to a [`CompiledQuery`] a [`crate::store::Session`] can
//! execute. A compiled query is opaque to the caller and single-use; its
//! clause order and ordering are fixed at compile time.

mod builder;
mod constraint;

pub use builder::{
    Clause, Ordering, QueryError, Scope, SortDirection, SqlQuery, SqlQueryBuilder,
};
pub use constraint::{
    all_of, any_of, build_filter_constraint, never_match, CompareOp, Constraint,
};

/// A query ready for execution, in whichever backend produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledQuery {
    /// Textual backend output.
    Statement(SqlQuery),
    /// Constraint-tree backend output: a scope, an optional filter
    /// constraint (absence matches everything in scope), and an ordering.
    Tree(TreeQuery),
}

impl From<SqlQuery> for CompiledQuery {
    fn from(query: SqlQuery) -> Self {
        CompiledQuery::Statement(query)
    }
}

impl From<TreeQuery> for CompiledQuery {
    fn from(query: TreeQuery) -> Self {
        CompiledQuery::Tree(query)
    }
}

/// Constraint-tree query bound to a path scope.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeQuery {
    pub scope: Scope,
    pub constraint: Option<Constraint>,
    pub ordering: TreeOrdering,
}

/// Ordering for tree queries: by one property, ascending or descending.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeOrdering {
    pub property: String,
    pub direction: SortDirection,
}

impl TreeQuery {
    pub fn new(scope: Scope, constraint: Option<Constraint>, ordering: TreeOrdering) -> Self {
        Self {
            scope,
            constraint,
            ordering,
        }
    }
}
