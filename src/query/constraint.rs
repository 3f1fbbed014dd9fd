// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Constraint-tree compiler.
//!
//! The object backend: instead of rendering statement text, filters compile
//! to an abstract boolean [`Constraint`] tree (AND of ORs) that a store
//! backend interprets directly. Values are tri-state: a literal compiles to
//! a property-equality leaf, [`FilterValue::IsNotNull`] to an existence
//! check, and [`FilterValue::IsNull`] to a negated double-existence check.

use std::sync::OnceLock;

use rand::distributions::{Alphanumeric, DistString};

use crate::criteria::{Filter, FilterValue};
use crate::store::PropertyValue;

/// Comparison operator for a constraint leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Boolean AND/OR tree of atomic property comparisons, existence checks,
/// and negations.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Compare {
        property: String,
        op: CompareOp,
        value: PropertyValue,
    },
    Exists {
        property: String,
    },
    Not(Box<Constraint>),
    And(Box<Constraint>, Box<Constraint>),
    Or(Box<Constraint>, Box<Constraint>),
}

impl Constraint {
    pub fn eq(property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Constraint::Compare {
            property: property.into(),
            op: CompareOp::Eq,
            value: value.into(),
        }
    }

    pub fn compare(
        property: impl Into<String>,
        op: CompareOp,
        value: impl Into<PropertyValue>,
    ) -> Self {
        Constraint::Compare {
            property: property.into(),
            op,
            value: value.into(),
        }
    }

    pub fn exists(property: impl Into<String>) -> Self {
        Constraint::Exists {
            property: property.into(),
        }
    }

    pub fn and(self, other: Constraint) -> Self {
        Constraint::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Constraint) -> Self {
        Constraint::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Constraint::Not(Box::new(self))
    }
}

/// Compile a tri-state filter to a constraint tree.
///
/// For each distinct key, the key's values compile to an any-of group;
/// the per-key groups are then all-of'd together in insertion order. An
/// empty filter yields no constraint: the caller must treat absence as
/// "matches everything in scope". A key whose value set is empty compiles
/// to the [`never_match`] escape hatch so an empty OR group has a
/// deterministic (always-false) meaning instead of an engine-specific one.
pub fn build_filter_constraint(filter: &Filter) -> Option<Constraint> {
    let per_key: Vec<Constraint> = filter
        .groups()
        .map(|(property, values)| {
            let leaves: Vec<Constraint> =
                values.iter().map(|value| value_leaf(property, value)).collect();
            any_of(leaves).unwrap_or_else(never_match)
        })
        .collect();
    all_of(per_key)
}

fn value_leaf(property: &str, value: &FilterValue) -> Constraint {
    match value {
        FilterValue::IsNotNull => Constraint::exists(property),
        // A bare negated existence check does not compose correctly when
        // AND/OR'd with sibling constraints in this query model, so IS NULL
        // keeps the double existence-OR wrapped in NOT. Do not simplify.
        FilterValue::IsNull => Constraint::exists(property)
            .or(Constraint::exists(property))
            .negate(),
        FilterValue::Literal(literal) | FilterValue::EnumName(literal) => {
            Constraint::eq(property, literal.as_str())
        }
    }
}

/// AND-reduce a collection of constraints. Empty input is neutral, not a
/// contradiction.
pub fn all_of(constraints: Vec<Constraint>) -> Option<Constraint> {
    constraints.into_iter().reduce(Constraint::and)
}

/// OR-reduce a collection of constraints. Empty input is neutral.
pub fn any_of(constraints: Vec<Constraint>) -> Option<Constraint> {
    constraints.into_iter().reduce(Constraint::or)
}

/// A deterministic always-false constraint: equality against a randomly
/// generated token that no record property carries.
pub fn never_match() -> Constraint {
    let token = disjunction_token();
    Constraint::eq(token, token)
}

fn disjunction_token() -> &'static str {
    static TOKEN: OnceLock<String> = OnceLock::new();
    TOKEN.get_or_init(|| Alphanumeric.sample_string(&mut rand::thread_rng(), 16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_is_no_constraint() {
        assert_eq!(build_filter_constraint(&Filter::new()), None);
    }

    #[test]
    fn test_single_literal_is_equality_leaf() {
        let mut filter = Filter::new();
        filter.put("state", "RUNNING");
        assert_eq!(
            build_filter_constraint(&filter),
            Some(Constraint::eq("state", "RUNNING"))
        );
    }

    #[test]
    fn test_values_of_one_key_are_ored() {
        let mut filter = Filter::new();
        filter.put("state", "RUNNING");
        filter.put("state", "FAILED");
        assert_eq!(
            build_filter_constraint(&filter),
            Some(Constraint::eq("state", "RUNNING").or(Constraint::eq("state", "FAILED")))
        );
    }

    #[test]
    fn test_keys_are_anded() {
        let mut filter = Filter::new();
        filter.put("state", "RUNNING");
        filter.put("id", "abc");
        assert_eq!(
            build_filter_constraint(&filter),
            Some(Constraint::eq("state", "RUNNING").and(Constraint::eq("id", "abc")))
        );
    }

    #[test]
    fn test_is_not_null_is_existence() {
        let mut filter = Filter::new();
        filter.put("result", FilterValue::IsNotNull);
        assert_eq!(
            build_filter_constraint(&filter),
            Some(Constraint::exists("result"))
        );
    }

    #[test]
    fn test_is_null_keeps_double_existence_wrap() {
        let mut filter = Filter::new();
        filter.put("result", FilterValue::IsNull);
        assert_eq!(
            build_filter_constraint(&filter),
            Some(
                Constraint::exists("result")
                    .or(Constraint::exists("result"))
                    .negate()
            )
        );
    }

    #[test]
    fn test_enum_name_resolves_to_literal() {
        let mut filter = Filter::new();
        filter.put("state", FilterValue::EnumName("SUCCEEDED".into()));
        assert_eq!(
            build_filter_constraint(&filter),
            Some(Constraint::eq("state", "SUCCEEDED"))
        );
    }

    #[test]
    fn test_empty_value_group_compiles_to_never_match() {
        let mut filter = Filter::new();
        filter.put_all("state", vec![]);
        assert_eq!(build_filter_constraint(&filter), Some(never_match()));
    }

    #[test]
    fn test_all_of_empty_is_neutral() {
        assert_eq!(all_of(vec![]), None);
        assert_eq!(any_of(vec![]), None);
    }

    #[test]
    fn test_all_of_folds_left() {
        let a = Constraint::eq("a", "1");
        let b = Constraint::eq("b", "2");
        let c = Constraint::eq("c", "3");
        assert_eq!(
            all_of(vec![a.clone(), b.clone(), c.clone()]),
            Some(a.and(b).and(c))
        );
    }

    #[test]
    fn test_never_match_is_stable_within_process() {
        assert_eq!(never_match(), never_match());
    }
}
