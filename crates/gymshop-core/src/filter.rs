//! Query filters for paginated list endpoints.
//!
//! A [`Filter`] is a flat map of field name to [`FilterValue`]. Updates are
//! shallow merges: a key present in the partial filter replaces the whole
//! value. Serialization to query pairs expands lists into repeated keys and
//! omits [`FilterValue::Null`] entirely.

use std::collections::BTreeMap;

/// Page size applied when a filter carries no `limit`.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<FilterValue>),
}

impl FilterValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FilterValue::Int(n) => Some(*n),
            FilterValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Renders a scalar for a query string. Lists and nulls have no scalar form.
    fn render_scalar(&self) -> Option<String> {
        match self {
            FilterValue::Bool(b) => Some(b.to_string()),
            FilterValue::Int(n) => Some(n.to_string()),
            FilterValue::Text(s) => Some(s.clone()),
            FilterValue::Null | FilterValue::List(_) => None,
        }
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Int(i64::from(value))
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        FilterValue::Int(i64::from(value))
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(value: Vec<T>) -> Self {
        FilterValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FilterValue::Null, Into::into)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: BTreeMap<String, FilterValue>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<FilterValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<FilterValue>) {
        self.fields.insert(key.to_owned(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.fields.get(key)
    }

    /// `true` when `key` is present and not null.
    #[must_use]
    pub fn has_value(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|v| !v.is_null())
    }

    /// Shallow merge: every key in `partial` overwrites the current value.
    pub fn merge(&mut self, partial: Filter) {
        self.fields.extend(partial.fields);
    }

    /// Sets `limit` to `limit` if it is absent or null.
    #[must_use]
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        if !self.has_value("limit") {
            self.set("limit", limit);
        }
        self
    }

    /// Current page, 1-based. Missing or malformed values read as page 1.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.get("page")
            .and_then(FilterValue::as_int)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n >= 1)
            .unwrap_or(1)
    }

    #[must_use]
    pub fn limit(&self) -> Option<u32> {
        self.get("limit")
            .and_then(FilterValue::as_int)
            .and_then(|n| u32::try_from(n).ok())
    }

    /// Serializes the filter as query pairs in key order.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.fields {
            match value {
                FilterValue::Null => {}
                FilterValue::List(items) => {
                    pairs.extend(
                        items
                            .iter()
                            .filter_map(FilterValue::render_scalar)
                            .map(|v| (key.clone(), v)),
                    );
                }
                scalar => {
                    if let Some(v) = scalar.render_scalar() {
                        pairs.push((key.clone(), v));
                    }
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limit_applies_only_when_unset() {
        let f = Filter::new().with_default_limit(10);
        assert_eq!(f.limit(), Some(10));

        let f = Filter::new().with("limit", 25u32).with_default_limit(10);
        assert_eq!(f.limit(), Some(25));

        let f = Filter::new()
            .with("limit", FilterValue::Null)
            .with_default_limit(10);
        assert_eq!(f.limit(), Some(10));
    }

    #[test]
    fn merge_is_shallow() {
        let mut f = Filter::new()
            .with("brandId", vec![1i64, 2])
            .with("search", "bench");
        f.merge(Filter::new().with("brandId", vec![3i64]));
        assert_eq!(f.get("brandId"), Some(&FilterValue::List(vec![FilterValue::Int(3)])));
        assert_eq!(f.get("search"), Some(&FilterValue::Text("bench".into())));
    }

    #[test]
    fn query_pairs_expand_lists_and_skip_nulls() {
        let f = Filter::new()
            .with("brandId", vec![4i64, 9])
            .with("customerId", Option::<i64>::None)
            .with("page", 2u32)
            .with("search", "kettle bell");
        assert_eq!(
            f.to_query_pairs(),
            vec![
                ("brandId".to_string(), "4".to_string()),
                ("brandId".to_string(), "9".to_string()),
                ("page".to_string(), "2".to_string()),
                ("search".to_string(), "kettle bell".to_string()),
            ]
        );
    }

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(Filter::new().page(), 1);
        assert_eq!(Filter::new().with("page", 0u32).page(), 1);
        assert_eq!(Filter::new().with("page", "3").page(), 3);
    }

    #[test]
    fn has_value_ignores_null() {
        let f = Filter::new().with("customerId", FilterValue::Null);
        assert!(!f.has_value("customerId"));
        assert!(f.clone().with("customerId", 42i64).has_value("customerId"));
    }
}
