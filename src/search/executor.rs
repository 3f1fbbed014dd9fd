//! Query executor and pager.

use thiserror::Error;

use crate::query::{CompiledQuery, QueryError};
use crate::store::{Row, Session, StoreError};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("row mapping failed for '{path}': {reason}")]
    Mapping { path: String, reason: String },
    #[error("unmapped publish status id: {0}")]
    UnknownPublishStatus(i64),
}

impl SearchError {
    pub(crate) fn mapping(path: &str, reason: impl Into<String>) -> Self {
        SearchError::Mapping {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// A bounded slice of results plus a best-effort total match count.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage<T> {
    items: Vec<T>,
    total: u64,
}

impl<T> SearchPage<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Execute a compiled query and page the results.
///
/// The store applies the offset; the limit is applied here, after the row
/// sequence's size has been observed. Pushing the limit down would make the
/// store report the limit instead of the true remaining count, so the total
/// for a positive offset is reconstructed as `remaining + offset`.
///
/// A mapping failure for any row aborts the whole page. A malformed record
/// is a hard error, not a skip.
pub fn execute_paged<T>(
    session: &dyn Session,
    query: &CompiledQuery,
    offset: u64,
    limit: i64,
    map: impl Fn(&Row) -> Result<T, SearchError>,
) -> Result<SearchPage<T>, SearchError> {
    let rows = session.execute(query, offset)?;
    let remaining = rows.len() as u64;
    let total = if offset > 0 { remaining + offset } else { remaining };

    let page = if limit > 0 {
        &rows[..rows.len().min(limit as usize)]
    } else {
        &rows[..]
    };

    let items = page.iter().map(|row| map(row)).collect::<Result<_, _>>()?;
    Ok(SearchPage { items, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SqlQueryBuilder;
    use crate::store::{MemoryRepository, PropertyValue, Repository};
    use std::collections::BTreeMap;

    fn repo_with(count: usize) -> MemoryRepository {
        let repo = MemoryRepository::new();
        let mut session = repo.login().unwrap();
        for i in 0..count {
            let mut props = BTreeMap::new();
            props.insert("n".to_string(), PropertyValue::Long(i as i64));
            session
                .write_node(&format!("/content/p{:02}", i), props)
                .unwrap();
        }
        session.save().unwrap();
        repo
    }

    fn query() -> CompiledQuery {
        SqlQueryBuilder::children_of("/content").build().into()
    }

    fn paths(session: &dyn Session, offset: u64, limit: i64) -> (Vec<String>, u64) {
        let page = execute_paged(session, &query(), offset, limit, |row| {
            Ok(row.path().to_string())
        })
        .unwrap();
        let total = page.total();
        (page.into_items(), total)
    }

    #[test]
    fn test_zero_offset_total_is_row_count() {
        let repo = repo_with(5);
        let session = repo.login().unwrap();
        let (items, total) = paths(session.as_ref(), 0, 2);
        assert_eq!(items.len(), 2);
        assert_eq!(total, 5);
    }

    #[test]
    fn test_positive_offset_total_is_compensated() {
        let repo = repo_with(5);
        let session = repo.login().unwrap();
        let (items, total) = paths(session.as_ref(), 2, 2);
        assert_eq!(items.len(), 2);
        assert_eq!(total, 3 + 2);
    }

    #[test]
    fn test_nonpositive_limit_is_unlimited() {
        let repo = repo_with(5);
        let session = repo.login().unwrap();
        let (items, _) = paths(session.as_ref(), 0, 0);
        assert_eq!(items.len(), 5);
        let (items, _) = paths(session.as_ref(), 0, -1);
        assert_eq!(items.len(), 5);
    }

    #[test]
    fn test_pages_concatenate_without_overlap() {
        let repo = repo_with(6);
        let session = repo.login().unwrap();
        let (first, _) = paths(session.as_ref(), 0, 3);
        let (second, _) = paths(session.as_ref(), 3, 3);
        let (all, _) = paths(session.as_ref(), 0, 6);
        let joined: Vec<_> = first.into_iter().chain(second).collect();
        assert_eq!(joined, all);
    }

    #[test]
    fn test_mapping_failure_aborts_page() {
        let repo = repo_with(3);
        let session = repo.login().unwrap();
        let result = execute_paged(session.as_ref(), &query(), 0, 0, |row| {
            if row.path().ends_with("p01") {
                Err(SearchError::mapping(row.path(), "boom"))
            } else {
                Ok(row.path().to_string())
            }
        });
        assert!(matches!(result, Err(SearchError::Mapping { .. })));
    }

    #[test]
    fn test_empty_result_is_empty_page_not_error() {
        let repo = MemoryRepository::new();
        let session = repo.login().unwrap();
        let (items, total) = paths(session.as_ref(), 0, 10);
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }
}
