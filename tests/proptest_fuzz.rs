//! Property-based tests for the query compilers.
//!
//! Uses proptest to generate arbitrary criteria values and verify the
//! compilers never panic, never leak unescaped quotes, and never emit a
//! clause for an absent predicate.
//!
//! Run with: `cargo test --test proptest_fuzz`

use proptest::prelude::*;

use catalog_search::escape::{escape_full_text, quote};
use catalog_search::query::build_filter_constraint;
use catalog_search::{Filter, FilterValue, SqlQueryBuilder};

/// Re-parse a quoted literal: strip the outer quotes and undo the doubling.
fn unquote(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('\'')?.strip_suffix('\'')?;
    Some(inner.replace("''", "'"))
}

proptest! {
    #[test]
    fn quoting_round_trips_any_literal(value in ".*") {
        let quoted = quote(&value);
        prop_assert_eq!(unquote(&quoted), Some(value));
    }

    #[test]
    fn quoted_literal_has_no_bare_single_quote(value in ".*") {
        let quoted = quote(&value);
        let inner = &quoted[1..quoted.len() - 1];
        // Every quote inside the literal must come in pairs.
        let mut chars = inner.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                prop_assert_eq!(chars.next(), Some('\''));
            }
        }
    }

    #[test]
    fn escape_full_text_is_total(term in ".*") {
        // Never panics, and non-special characters pass through.
        let _ = escape_full_text(&term);
    }

    #[test]
    fn statement_compiles_for_any_values(
        brand in ".*",
        tag in ".*",
        term in ".*",
    ) {
        let query = SqlQueryBuilder::descendants_of("/content/catalog")
            .property_constraint("brand", &[brand])
            .property_like("tags", &[tag])
            .full_text_constraint(&[term])
            .build();
        prop_assert!(query.statement().starts_with("SELECT node.*"));
    }

    #[test]
    fn empty_predicate_compiles_identically(
        property in "[a-z]{1,12}",
        values in prop::collection::vec("[a-z0-9]{1,8}", 1..4),
    ) {
        let with_empty = SqlQueryBuilder::descendants_of("/content")
            .property_constraint(&property, &values)
            .property_constraint("unused", &[])
            .build();
        let without = SqlQueryBuilder::descendants_of("/content")
            .property_constraint(&property, &values)
            .build();
        prop_assert_eq!(with_empty.statement(), without.statement());
    }

    #[test]
    fn filter_constraint_is_none_only_for_empty_filter(
        entries in prop::collection::vec(("[a-z]{1,8}", "[a-zA-Z0-9]{0,8}"), 0..6),
    ) {
        let mut filter = Filter::new();
        for (key, value) in &entries {
            filter.put(key.clone(), FilterValue::Literal(value.clone()));
        }
        let constraint = build_filter_constraint(&filter);
        prop_assert_eq!(constraint.is_none(), entries.is_empty());
    }
}
