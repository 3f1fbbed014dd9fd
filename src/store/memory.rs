// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-memory hierarchical node store.
//!
//! Nodes live in a path-keyed map; containment is implied by path prefixes.
//! Each session works on its own snapshot of the tree and publishes it back
//! on `save()` — concurrent sessions for different subtrees do not block
//! each other, and concurrent writes to the same node are last-writer-wins
//! at the store level, which is the documented (not guaranteed-atomic)
//! behavior of this layer.
//!
//! Query evaluation interprets the structured form of a compiled query, so
//! both the textual and the constraint-tree backend execute here without a
//! statement parser:
//!
//! - equality and LIKE match any element of a multi-valued property
//! - CONTAINS is a case-insensitive substring match over the node's string
//!   properties (or one named property)
//! - LIKE treats `%` as any sequence and `_` as any single character

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use parking_lot::RwLock;
use regex::Regex;
use tracing::trace;

use crate::query::{
    Clause, CompareOp, CompiledQuery, Constraint, Ordering, Scope, SortDirection, SqlQuery,
    TreeQuery,
};
use crate::store::traits::{Repository, Row, Session, StoreError};
use crate::store::PropertyValue;

type Tree = BTreeMap<String, BTreeMap<String, PropertyValue>>;

/// Shared in-memory repository.
#[derive(Default)]
pub struct MemoryRepository {
    tree: Arc<RwLock<Tree>>,
    fail_logins: Arc<AtomicBool>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent logins fail, for exercising degraded paths.
    pub fn set_fail_logins(&self, fail: bool) {
        self.fail_logins.store(fail, AtomicOrdering::SeqCst);
    }

    /// Committed node count, folders included.
    pub fn node_count(&self) -> usize {
        self.tree.read().len()
    }

    /// Whether a committed node exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.tree.read().contains_key(path)
    }
}

impl Repository for MemoryRepository {
    fn login(&self) -> Result<Box<dyn Session>, StoreError> {
        if self.fail_logins.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Backend("repository unavailable".to_string()));
        }
        let view = self.tree.read().clone();
        Ok(Box::new(MemorySession {
            shared: Arc::clone(&self.tree),
            view,
        }))
    }
}

struct MemorySession {
    shared: Arc<RwLock<Tree>>,
    view: Tree,
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        trace!("store session released");
    }
}

impl Session for MemorySession {
    fn get_node(&self, path: &str) -> Result<Option<Row>, StoreError> {
        Ok(self
            .view
            .get(path)
            .map(|props| Row::new(path, props.clone())))
    }

    fn write_node(
        &mut self,
        path: &str,
        properties: BTreeMap<String, PropertyValue>,
    ) -> Result<(), StoreError> {
        for ancestor in ancestors(path) {
            self.view.entry(ancestor).or_default();
        }
        self.view.insert(path.to_string(), properties);
        Ok(())
    }

    fn remove_node(&mut self, path: &str) -> Result<(), StoreError> {
        if !self.view.contains_key(path) {
            return Err(StoreError::NotFound(path.to_string()));
        }
        let prefix = format!("{}/", path);
        self.view
            .retain(|candidate, _| candidate != path && !candidate.starts_with(&prefix));
        Ok(())
    }

    fn child_count(&self, path: &str) -> Result<usize, StoreError> {
        if !self.view.contains_key(path) {
            return Err(StoreError::NotFound(path.to_string()));
        }
        Ok(self
            .view
            .keys()
            .filter(|candidate| parent_path(candidate) == Some(path))
            .count())
    }

    fn execute(&self, query: &CompiledQuery, offset: u64) -> Result<Vec<Row>, StoreError> {
        let rows = match query {
            CompiledQuery::Statement(sql) => self.execute_sql(sql),
            CompiledQuery::Tree(tree) => self.execute_tree(tree),
        };
        Ok(rows.into_iter().skip(offset as usize).collect())
    }

    fn save(&mut self) -> Result<(), StoreError> {
        *self.shared.write() = self.view.clone();
        Ok(())
    }
}

impl MemorySession {
    fn execute_sql(&self, query: &SqlQuery) -> Vec<Row> {
        let mut rows: Vec<Row> = self
            .view
            .iter()
            .filter(|(path, _)| in_scope(path, query.scope()))
            .filter(|(_, props)| query.clauses().iter().all(|c| clause_matches(c, props)))
            .map(|(path, props)| Row::new(path.clone(), props.clone()))
            .collect();
        order_rows(&mut rows, query.ordering());
        rows
    }

    fn execute_tree(&self, query: &TreeQuery) -> Vec<Row> {
        let mut rows: Vec<Row> = self
            .view
            .iter()
            .filter(|(path, _)| in_scope(path, &query.scope))
            .filter(|(_, props)| match &query.constraint {
                Some(constraint) => constraint_matches(constraint, props),
                None => true,
            })
            .map(|(path, props)| Row::new(path.clone(), props.clone()))
            .collect();
        rows.sort_by(|a, b| {
            let ordering = compare_by_property(a, b, &query.ordering.property);
            match query.ordering.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        rows
    }
}

fn ancestors(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = path;
    while let Some(parent) = parent_path(current) {
        if parent.is_empty() {
            break;
        }
        out.push(parent.to_string());
        current = parent;
    }
    out.reverse();
    out
}

/// Parent of a path, `None` at the root.
pub fn parent_path(path: &str) -> Option<&str> {
    path.rfind('/').map(|idx| &path[..idx]).filter(|p| !p.is_empty())
}

fn in_scope(path: &str, scope: &Scope) -> bool {
    match scope {
        Scope::Descendants(root) => {
            path != root && path.starts_with(&format!("{}/", root.trim_end_matches('/')))
        }
        Scope::Children(root) => parent_path(path) == Some(root.trim_end_matches('/')),
    }
}

fn clause_matches(clause: &Clause, props: &BTreeMap<String, PropertyValue>) -> bool {
    match clause {
        Clause::PropertyEq { property, values } => props.get(property).is_some_and(|stored| {
            stored
                .elements()
                .iter()
                .any(|element| values.iter().any(|v| v == element))
        }),
        Clause::PropertyLike { property, patterns } => {
            props.get(property).is_some_and(|stored| {
                stored
                    .elements()
                    .iter()
                    .any(|element| patterns.iter().any(|p| like_matches(element, p)))
            })
        }
        Clause::FullText { property, term } => {
            let haystack = match property {
                Some(name) => props
                    .get(name)
                    .map(|v| v.elements().join(" "))
                    .unwrap_or_default(),
                None => props
                    .values()
                    .flat_map(|v| v.elements())
                    .collect::<Vec<_>>()
                    .join(" "),
            };
            haystack.to_lowercase().contains(&term.to_lowercase())
        }
        Clause::DateLowerBound { property, instant } => props
            .get(property)
            .and_then(PropertyValue::as_date)
            .is_some_and(|stored| stored >= *instant),
        Clause::DateUpperBound { property, instant } => props
            .get(property)
            .and_then(PropertyValue::as_date)
            .is_some_and(|stored| stored <= *instant),
    }
}

fn constraint_matches(constraint: &Constraint, props: &BTreeMap<String, PropertyValue>) -> bool {
    match constraint {
        Constraint::Exists { property } => props.contains_key(property),
        Constraint::Not(inner) => !constraint_matches(inner, props),
        Constraint::And(a, b) => constraint_matches(a, props) && constraint_matches(b, props),
        Constraint::Or(a, b) => constraint_matches(a, props) || constraint_matches(b, props),
        Constraint::Compare { property, op, value } => {
            let Some(stored) = props.get(property) else {
                return false;
            };
            match op {
                CompareOp::Eq => {
                    let wanted = value.as_comparison_str();
                    stored.elements().iter().any(|element| *element == wanted)
                }
                CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
                    let Some(ordering) = compare_values(stored, value) else {
                        return false;
                    };
                    match op {
                        CompareOp::Lt => ordering.is_lt(),
                        CompareOp::Le => ordering.is_le(),
                        CompareOp::Gt => ordering.is_gt(),
                        CompareOp::Ge => ordering.is_ge(),
                        CompareOp::Eq => unreachable!(),
                    }
                }
            }
        }
    }
}

/// Ordered comparison of same-typed values; cross-type comparisons are
/// undefined and match nothing.
fn compare_values(stored: &PropertyValue, literal: &PropertyValue) -> Option<std::cmp::Ordering> {
    match (stored, literal) {
        (PropertyValue::Long(a), PropertyValue::Long(b)) => Some(a.cmp(b)),
        (PropertyValue::Date(a), PropertyValue::Date(b)) => Some(a.cmp(b)),
        (PropertyValue::Str(a), PropertyValue::Str(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}

fn like_matches(element: &str, pattern: &str) -> bool {
    let regex_pattern = format!(
        "^{}$",
        regex::escape(pattern).replace('%', ".*").replace('_', ".")
    );
    Regex::new(&regex_pattern)
        .map(|re| re.is_match(element))
        .unwrap_or(false)
}

fn order_rows(rows: &mut [Row], ordering: &Ordering) {
    match ordering {
        // All rows score equally here; descending relevance keeps the
        // deterministic path order.
        Ordering::Relevance => {}
        Ordering::ByProperty { property, direction } => {
            rows.sort_by(|a, b| {
                let cmp = compare_by_property(a, b, property);
                match direction {
                    Some(SortDirection::Descending) => cmp.reverse(),
                    _ => cmp,
                }
            });
        }
    }
}

fn compare_by_property(a: &Row, b: &Row, property: &str) -> std::cmp::Ordering {
    let left = a.property(property);
    let right = b.property(property);
    match (left, right) {
        (None, None) => a.path().cmp(b.path()),
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(l), Some(r)) => compare_values(l, r)
            .unwrap_or_else(|| l.as_comparison_str().cmp(&r.as_comparison_str()))
            .then_with(|| a.path().cmp(b.path())),
    }
}
