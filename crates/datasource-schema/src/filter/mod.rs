//! Search filter structures and sanitization.
//!
//! Filters arrive from user-built UI components, which routinely submit
//! empty inputs. Empty entries must be stripped before the filters reach
//! a query builder, or every row gets excluded by `= ''` conditions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One operator group: column name → filter value.
pub type FilterGroup = HashMap<String, Value>;

/// Search filters grouped by operator, as submitted by API callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchFilters {
    /// Combine groups with OR instead of AND.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub all_or: bool,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub string: FilterGroup,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub fuzzy: FilterGroup,

    /// Range filters: column name → `{low, high}` object.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub range: FilterGroup,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub equal: FilterGroup,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub not_equal: FilterGroup,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub empty: FilterGroup,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub not_empty: FilterGroup,

    /// Column name → array of candidate values.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub one_of: FilterGroup,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub contains: FilterGroup,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub not_contains: FilterGroup,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub contains_any: FilterGroup,
}

impl SearchFilters {
    /// True when no operator group has any entries.
    pub fn is_empty(&self) -> bool {
        self.string.is_empty()
            && self.fuzzy.is_empty()
            && self.range.is_empty()
            && self.equal.is_empty()
            && self.not_equal.is_empty()
            && self.empty.is_empty()
            && self.not_empty.is_empty()
            && self.one_of.is_empty()
            && self.contains.is_empty()
            && self.not_contains.is_empty()
            && self.contains_any.is_empty()
    }
}

/// Strip `null` and empty-string entries from the nullable-sensitive
/// operator groups before query execution.
///
/// Not a plain falsy check: `0` and `false` are meaningful filter values
/// and are preserved. `range`, `empty`, `notEmpty` and `oneOf` groups are
/// left untouched - their values are structural, not user text. Consumes
/// and returns the structure; the caller receives the cleaned filters.
pub fn remove_empty_filters(mut filters: SearchFilters) -> SearchFilters {
    let nullable_sensitive = [
        &mut filters.string,
        &mut filters.fuzzy,
        &mut filters.equal,
        &mut filters.not_equal,
        &mut filters.contains,
        &mut filters.not_contains,
        &mut filters.contains_any,
    ];
    for group in nullable_sensitive {
        group.retain(|_, value| !is_empty_filter_value(value));
    }
    filters
}

fn is_empty_filter_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
