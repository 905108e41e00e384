//! Table definitions and small value helpers shared across the crate.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fields::Column;

/// Where a table's rows live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSourceType {
    /// The platform's own document store.
    Internal,
    /// A connected external database.
    External,
}

/// A table definition as persisted on a datasource document.
///
/// Recreated wholesale on each schema introspection pass; the
/// reconciliation engine then restores the fields introspection cannot
/// discover (relationships, views, display column, special types).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Document id (`{datasourceId}__{tableName}` for external tables).
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Document revision, required for conflict-safe overwrites.
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,

    /// Table name.
    pub name: String,

    /// Column definitions keyed by column name. Insertion order is
    /// irrelevant; ordering for display is decided downstream.
    pub schema: HashMap<String, Column>,

    /// Ordered primary key column names. Empty means the table is not
    /// usable as an external table.
    #[serde(default)]
    pub primary: Vec<String>,

    /// Column used as the human-readable row label.
    #[serde(
        rename = "primaryDisplay",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_display: Option<String>,

    /// User-defined views, opaque to this layer.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub views: HashMap<String, Value>,

    /// Owning datasource id.
    #[serde(rename = "sourceId")]
    pub source_id: String,

    /// Internal vs external.
    #[serde(rename = "sourceType")]
    pub source_type: TableSourceType,

    /// Set once the table has been persisted by the builder.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub created: bool,
}

impl Table {
    /// Create an empty external table owned by the given datasource.
    pub fn external(name: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            id: None,
            rev: None,
            name: name.into(),
            schema: HashMap::new(),
            primary: Vec::new(),
            primary_display: None,
            views: HashMap::new(),
            source_id: source_id.into(),
            source_type: TableSourceType::External,
            created: false,
        }
    }

    /// Check if the table has a primary key.
    pub fn has_primary_key(&self) -> bool {
        !self.primary.is_empty()
    }
}

/// Extract a human-readable primary display string from a row value.
///
/// Dates and primitive arrays stringify; objects, arrays of objects and
/// arrays starting with `null` cannot be used as a display value and
/// yield `None`. Arrays starting with `0` or `false` do display: those
/// are real values, not missing ones.
pub fn get_primary_display(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => match items.first() {
            Some(first) if !first.is_null() && !first.is_object() && !first.is_array() => Some(
                items
                    .iter()
                    .map(display_scalar)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        },
        Value::Object(_) => None,
        Value::Null => None,
        other => Some(display_scalar(other)),
    }
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// True if the value is usable as a search filter: non-null and not the
/// empty string. Zero and `false` are valid filter values.
pub fn is_valid_filter(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Check if a string is a millisecond-precision ISO-8601 UTC timestamp.
///
/// The round-trip comparison rejects strings that parse but are not in
/// canonical form (e.g. out-of-range components normalized by parsing).
pub fn is_iso_date_string(value: &str) -> bool {
    let trimmed = value.trim();
    let Ok(parsed) = trimmed.parse::<DateTime<Utc>>() else {
        return false;
    };
    parsed.to_rfc3339_opts(SecondsFormat::Millis, true) == trimmed
}
