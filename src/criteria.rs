//! Criteria model shared by both query backends.
//!
//! A [`Criteria`] is an ordered multimap from predicate name to one or more
//! string values. Duplicate keys mean OR-of-values; an absent or empty value
//! set means the predicate contributes no clause at all. A handful of
//! reserved predicate names carry structural meaning (path scope, paging,
//! sorting) rather than filtering.
//!
//! The constraint-tree backend additionally accepts tri-state values via
//! [`FilterValue`]: a plain literal, an existence assertion, or a
//! non-existence assertion. Enum-typed values are normalized to their name
//! string before they ever reach a comparison.

/// Reserved predicate: path scope appended to the configured search root.
pub const PATH: &str = "path";
/// Reserved predicate: result offset.
pub const OFFSET: &str = "p.offset";
/// Reserved predicate: result limit (`<= 0` means unlimited).
pub const LIMIT: &str = "p.limit";
/// Reserved predicate: sort property.
pub const SORT: &str = "p.sort";
/// Reserved predicate: sort direction (`asc`/`desc`).
pub const DIR: &str = "p.dir";

/// Ordered multimap of predicate name to values.
///
/// Insertion order of keys is preserved so compiled clause order is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    entries: Vec<(String, Vec<String>)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value under a predicate, creating the key on first use.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into()),
            None => self.entries.push((key, vec![value.into()])),
        }
        self
    }

    /// All values recorded under a predicate, empty if absent.
    pub fn get(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// First value under a predicate, if any.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).first().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterate `(key, value)` pairs in insertion order, one pair per value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Requested offset, defaulting to 0 when absent or unparseable.
    pub fn offset(&self) -> u64 {
        self.first(OFFSET).and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    /// Requested limit, defaulting to 0 (unlimited) when absent or unparseable.
    pub fn limit(&self) -> i64 {
        self.first(LIMIT).and_then(|v| v.parse().ok()).unwrap_or(0)
    }
}

/// Tri-state value for the constraint-tree backend.
///
/// Sentinels never participate in literal quoting or escaping; enum values
/// resolve to their name string at the comparison leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Compare the property against a literal string.
    Literal(String),
    /// An enum-typed value, normalized to its name string at the leaf.
    EnumName(String),
    /// Assert the property is absent.
    IsNull,
    /// Assert the property is present, whatever its value.
    IsNotNull,
}

impl FilterValue {
    /// The literal string a comparison leaf should use, if this is a value
    /// rather than an existence sentinel.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            FilterValue::Literal(s) | FilterValue::EnumName(s) => Some(s),
            FilterValue::IsNull | FilterValue::IsNotNull => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Literal(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Literal(value)
    }
}

/// Ordered multimap of property name to tri-state values, the input of
/// [`crate::query::build_filter_constraint`].
#[derive(Debug, Clone, Default)]
pub struct Filter {
    entries: Vec<(String, Vec<FilterValue>)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> &mut Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into()),
            None => self.entries.push((key, vec![value.into()])),
        }
        self
    }

    /// Record a key with an explicit (possibly empty) value set.
    pub fn put_all(&mut self, key: impl Into<String>, values: Vec<FilterValue>) -> &mut Self {
        self.entries.push((key.into(), values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, values)` groups in insertion order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[FilterValue])> {
        self.entries.iter().map(|(k, vs)| (k.as_str(), vs.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_preserves_key_order() {
        let mut criteria = Criteria::new();
        criteria.put("b", "1");
        criteria.put("a", "2");
        criteria.put("b", "3");

        let pairs: Vec<_> = criteria.pairs().collect();
        assert_eq!(pairs, vec![("b", "1"), ("b", "3"), ("a", "2")]);
    }

    #[test]
    fn test_get_absent_is_empty() {
        let criteria = Criteria::new();
        assert!(criteria.get("missing").is_empty());
        assert!(criteria.first("missing").is_none());
    }

    #[test]
    fn test_duplicate_key_is_or_of_values() {
        let mut criteria = Criteria::new();
        criteria.put("publishStatus", "1");
        criteria.put("publishStatus", "2");
        assert_eq!(criteria.get("publishStatus"), ["1", "2"]);
    }

    #[test]
    fn test_offset_and_limit_defaults() {
        let criteria = Criteria::new();
        assert_eq!(criteria.offset(), 0);
        assert_eq!(criteria.limit(), 0);

        let mut criteria = Criteria::new();
        criteria.put(OFFSET, "25");
        criteria.put(LIMIT, "10");
        assert_eq!(criteria.offset(), 25);
        assert_eq!(criteria.limit(), 10);
    }

    #[test]
    fn test_unparseable_paging_falls_back() {
        let mut criteria = Criteria::new();
        criteria.put(OFFSET, "not-a-number");
        assert_eq!(criteria.offset(), 0);
    }

    #[test]
    fn test_filter_value_literal_resolution() {
        assert_eq!(FilterValue::from("x").as_literal(), Some("x"));
        assert_eq!(
            FilterValue::EnumName("RUNNING".into()).as_literal(),
            Some("RUNNING")
        );
        assert_eq!(FilterValue::IsNull.as_literal(), None);
        assert_eq!(FilterValue::IsNotNull.as_literal(), None);
    }

    #[test]
    fn test_filter_groups_in_order() {
        let mut filter = Filter::new();
        filter.put("state", "RUNNING");
        filter.put("id", "abc");
        filter.put("state", FilterValue::IsNotNull);

        let groups: Vec<_> = filter.groups().map(|(k, vs)| (k, vs.len())).collect();
        assert_eq!(groups, vec![("state", 2), ("id", 1)]);
    }
}
