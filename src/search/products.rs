// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Catalog search facade: criteria in, typed result page out.
//!
//! Compiles a [`Criteria`] into a textual query against the configured
//! search root, executes it through a fresh store session, and projects the
//! rows into [`Product`] entities.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::trace;

use crate::criteria::{self, Criteria};
use crate::query::{QueryError, SqlQuery, SqlQueryBuilder};
use crate::search::executor::{execute_paged, SearchError, SearchPage};
use crate::search::product::{Product, PublishStatus, UserDirectory};
use crate::search::properties;
use crate::store::Repository;

const ANY_DESCENDANT: &str = "/%";

const FULL_TEXT_PREDICATE: &str = "fulltext";
const NAME_PREDICATE: &str = "name";
const IDENTIFIER_PREDICATE: &str = "id";
const FULFILLER_NAME_PREDICATE: &str = "fulfillerName";
const SELLABLE_PREDICATE: &str = "sellable";
const STATUS_PREDICATE: &str = "publishStatus";
const TAGS_PREDICATE: &str = "tags";
const MODIFIED_LOWER_BOUND_PREDICATE: &str = "0_daterange.lowerBound";
const MODIFIED_UPPER_BOUND_PREDICATE: &str = "0_daterange.upperBound";
const CREATION_LOWER_BOUND_PREDICATE: &str = "1_daterangecustom.lowerBound";
const CREATION_UPPER_BOUND_PREDICATE: &str = "1_daterangecustom.upperBound";

/// Brand and vendor filters arrive under positional form-field keys; any
/// key not matching its pattern is ignored.
fn brand_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^3_group\.property\.\d+_value$").unwrap())
}

fn vendor_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^2_group\.property\.\d+_value$").unwrap())
}

pub struct ProductSearch {
    repository: Arc<dyn Repository>,
    users: Arc<dyn UserDirectory>,
    search_root: String,
}

impl ProductSearch {
    pub fn new(
        repository: Arc<dyn Repository>,
        users: Arc<dyn UserDirectory>,
        search_root: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            users,
            search_root: search_root.into(),
        }
    }

    /// Search the catalog with generic criteria.
    pub fn find_products(&self, search_criteria: &Criteria) -> Result<SearchPage<Product>, SearchError> {
        let query = self.compile(search_criteria)?;
        let offset = search_criteria.offset();
        let limit = search_criteria.limit();

        trace!(statement = %query.statement(), "searching catalog");
        let session = self.repository.login()?;
        execute_paged(session.as_ref(), &query.into(), offset, limit, |row| {
            Product::from_row(row, self.users.as_ref())
        })
    }

    /// Search for records in any of the given publish states.
    pub fn find_by_statuses(&self, statuses: &[PublishStatus]) -> Result<SearchPage<Product>, SearchError> {
        let mut search_criteria = Criteria::new();
        for status in statuses {
            search_criteria.put(STATUS_PREDICATE, status.id().to_string());
        }
        self.find_products(&search_criteria)
    }

    fn compile(&self, search_criteria: &Criteria) -> Result<SqlQuery, QueryError> {
        let mut path = self.search_root.clone();
        if let Some(sub_path) = search_criteria.first(criteria::PATH) {
            path.push_str(sub_path);
        }

        let mut builder = SqlQueryBuilder::descendants_of(path)
            .full_text_constraint(search_criteria.get(FULL_TEXT_PREDICATE))
            .property_full_text(
                properties::PRODUCT_NAME,
                search_criteria.get(NAME_PREDICATE),
            )
            .property_constraint(properties::EXT_ID, search_criteria.get(IDENTIFIER_PREDICATE))
            .property_constraint(
                properties::FULFILLER_NAME,
                search_criteria.get(FULFILLER_NAME_PREDICATE),
            )
            .property_constraint(properties::SELLABLE, search_criteria.get(SELLABLE_PREDICATE))
            .property_constraint(
                properties::PUBLISH_STATUS,
                search_criteria.get(STATUS_PREDICATE),
            )
            .property_constraint(
                properties::BRAND,
                &collect_positional(search_criteria, brand_key_pattern()),
            )
            .property_constraint(
                properties::VENDOR,
                &collect_positional(search_criteria, vendor_key_pattern()),
            );

        builder = add_tags_criteria(builder, search_criteria.get(TAGS_PREDICATE));

        builder = builder
            .date_range_lower_bound(
                properties::CREATION_DATE,
                search_criteria.get(CREATION_LOWER_BOUND_PREDICATE),
            )?
            .date_range_upper_bound(
                properties::CREATION_DATE,
                search_criteria.get(CREATION_UPPER_BOUND_PREDICATE),
            )?
            .date_range_lower_bound(
                properties::LAST_MODIFIED_DATE,
                search_criteria.get(MODIFIED_LOWER_BOUND_PREDICATE),
            )?
            .date_range_upper_bound(
                properties::LAST_MODIFIED_DATE,
                search_criteria.get(MODIFIED_UPPER_BOUND_PREDICATE),
            )?
            .sorting_clause(
                search_criteria.get(criteria::SORT),
                search_criteria.get(criteria::DIR),
            );

        Ok(builder.build())
    }
}

/// Partition tag values into hierarchical and exact groups. Category-prefixed
/// values match both exactly and with a trailing descendant wildcard; all
/// other tags must match exactly. The groups are independent ANDed clauses.
fn add_tags_criteria(builder: SqlQueryBuilder, tags: &[String]) -> SqlQueryBuilder {
    if tags.is_empty() {
        return builder;
    }
    let mut strong = Vec::new();
    let mut weak = Vec::new();

    for tag in tags {
        if tag
            .to_lowercase()
            .starts_with(properties::CATEGORY_TAG_PREFIX)
        {
            weak.push(format!("{tag}{ANY_DESCENDANT}"));
            weak.push(tag.clone());
        } else {
            strong.push(tag.clone());
        }
    }

    builder
        .property_constraint(properties::TAGS, &strong)
        .property_like(properties::TAGS, &weak)
}

fn collect_positional(search_criteria: &Criteria, pattern: &Regex) -> Vec<String> {
    let values: BTreeSet<String> = search_criteria
        .pairs()
        .filter(|(key, _)| pattern.is_match(key))
        .map(|(_, value)| value.to_string())
        .collect();
    values.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::product::NoUserDirectory;
    use crate::store::{MemoryRepository, PropertyValue, Session};
    use std::collections::BTreeMap;

    const ROOT: &str = "/content/catalog";

    fn search_with(repo: MemoryRepository) -> ProductSearch {
        ProductSearch::new(Arc::new(repo), Arc::new(NoUserDirectory), ROOT)
    }

    fn product_props(pairs: &[(&str, PropertyValue)]) -> BTreeMap<String, PropertyValue> {
        let mut props: BTreeMap<String, PropertyValue> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        props
            .entry(properties::PRODUCT_STATUS.to_string())
            .or_insert(1i64.into());
        props
            .entry(properties::FULFILLER_ID.to_string())
            .or_insert(1i64.into());
        props
            .entry(properties::PUBLISH_STATUS.to_string())
            .or_insert(2i64.into());
        props
    }

    fn seed(nodes: &[(&str, BTreeMap<String, PropertyValue>)]) -> MemoryRepository {
        let repo = MemoryRepository::new();
        let mut session = repo.login().unwrap();
        for (path, props) in nodes {
            session.write_node(path, props.clone()).unwrap();
        }
        session.save().unwrap();
        repo
    }

    fn statement(search: &ProductSearch, criteria: &Criteria) -> String {
        search.compile(criteria).unwrap().statement()
    }

    #[test]
    fn test_compile_scopes_to_search_root() {
        let search = search_with(MemoryRepository::new());
        let stmt = statement(&search, &Criteria::new());
        assert!(stmt.contains("ISDESCENDANTNODE(node, '/content/catalog')"));
    }

    #[test]
    fn test_path_predicate_extends_root() {
        let search = search_with(MemoryRepository::new());
        let mut c = Criteria::new();
        c.put(criteria::PATH, "/shoes");
        let stmt = statement(&search, &c);
        assert!(stmt.contains("ISDESCENDANTNODE(node, '/content/catalog/shoes')"));
    }

    #[test]
    fn test_brand_keys_collected_by_pattern() {
        let search = search_with(MemoryRepository::new());
        let mut c = Criteria::new();
        c.put("3_group.property.0_value", "Nykee");
        c.put("3_group.property.1_value", "Adeedas");
        c.put("3_group.property.x_value", "Ignored");
        c.put("2_group.property.0_value", "AcmeVendor");
        let stmt = statement(&search, &c);
        assert!(stmt.contains("(node.'brand' = 'Adeedas' OR node.'brand' = 'Nykee')"));
        assert!(stmt.contains("(node.'vendor' = 'AcmeVendor')"));
        assert!(!stmt.contains("Ignored"));
    }

    #[test]
    fn test_category_tags_become_like_group_others_equality() {
        let search = search_with(MemoryRepository::new());
        let mut c = Criteria::new();
        c.put(TAGS_PREDICATE, "cat:shoes/running");
        c.put(TAGS_PREDICATE, "brand:nykee");
        let stmt = statement(&search, &c);
        assert!(stmt.contains(" AND (node.'tags' = 'brand:nykee')"));
        assert!(stmt.contains(
            " AND (node.'tags' LIKE 'cat:shoes/running/%' OR node.'tags' LIKE 'cat:shoes/running')"
        ));
    }

    #[test]
    fn test_empty_criteria_compiles_bare_scope() {
        let search = search_with(MemoryRepository::new());
        let stmt = statement(&search, &Criteria::new());
        assert!(!stmt.contains(" AND "));
    }

    #[test]
    fn test_find_products_by_brand() {
        let repo = seed(&[
            (
                "/content/catalog/p1",
                product_props(&[(properties::BRAND, "Nykee".into())]),
            ),
            (
                "/content/catalog/p2",
                product_props(&[(properties::BRAND, "Adeedas".into())]),
            ),
        ]);
        let search = search_with(repo);
        let mut c = Criteria::new();
        c.put("3_group.property.0_value", "Nykee");

        let page = search.find_products(&c).unwrap();
        assert_eq!(page.total(), 1);
        assert_eq!(page.items()[0].brand, "Nykee");
    }

    #[test]
    fn test_find_products_respects_paging() {
        let nodes: Vec<_> = (0..5)
            .map(|i| (format!("/content/catalog/p{i}"), product_props(&[])))
            .collect();
        let borrowed: Vec<_> = nodes
            .iter()
            .map(|(p, props)| (p.as_str(), props.clone()))
            .collect();
        let search = search_with(seed(&borrowed));

        let mut c = Criteria::new();
        c.put(criteria::OFFSET, "2");
        c.put(criteria::LIMIT, "2");

        let page = search.find_products(&c).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total(), 5);
    }

    #[test]
    fn test_find_by_statuses() {
        let repo = seed(&[
            (
                "/content/catalog/p1",
                product_props(&[(properties::PUBLISH_STATUS, 2i64.into())]),
            ),
            (
                "/content/catalog/p2",
                product_props(&[(properties::PUBLISH_STATUS, 3i64.into())]),
            ),
            (
                "/content/catalog/p3",
                product_props(&[(properties::PUBLISH_STATUS, 5i64.into())]),
            ),
        ]);
        let search = search_with(repo);

        let page = search
            .find_by_statuses(&[PublishStatus::Published, PublishStatus::Failed])
            .unwrap();
        assert_eq!(page.total(), 2);
        assert!(page
            .items()
            .iter()
            .all(|p| p.publish_status != PublishStatus::Pending));
    }

    #[test]
    fn test_login_failure_surfaces_as_store_error() {
        let repo = seed(&[]);
        repo.set_fail_logins(true);
        let search = search_with(repo);
        assert!(matches!(
            search.find_products(&Criteria::new()),
            Err(SearchError::Store(_))
        ));
    }
}
