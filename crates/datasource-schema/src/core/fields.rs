//! Internal field-type model for columns.
//!
//! External column types (driver-reported strings such as `varchar` or
//! `double precision`) are mapped into this model by the type mapper.
//! The raw driver string is preserved on the column as `external_type`
//! so nothing is lost across repeated introspection passes.

use serde::{Deserialize, Serialize};

/// Internal field types that external column types resolve to.
///
/// A subset of these (`Link`, `Formula`, `Longform`, `Array`, `Reference`)
/// can never be produced by raw introspection; they only exist because a
/// user configured them, and the reconciliation engine preserves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Datetime,
    Options,
    Json,
    Bigint,
    /// Relationship to another table.
    Link,
    /// Virtual column computed from other fields. Never present in raw
    /// introspection output.
    Formula,
    /// Multi-line text.
    Longform,
    Array,
    /// Reference to internal user records.
    Reference,
    /// System-managed auto column.
    Auto,
}

impl FieldType {
    /// True for types that raw introspection can never report and which
    /// must therefore always be copied over from the previous schema.
    pub fn is_special(&self) -> bool {
        matches!(
            self,
            FieldType::Options
                | FieldType::Longform
                | FieldType::Array
                | FieldType::Formula
                | FieldType::Reference
        )
    }
}

/// Direction of a relationship column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// Validation constraints attached to a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Whether a value is required.
    #[serde(default)]
    pub presence: bool,

    /// Allowed values, set for `Options` columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion: Option<Vec<String>>,
}

/// A single column definition within a table schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Resolved internal field type.
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Raw driver type string (e.g. "character varying"), preserved for
    /// round-tripping through repeated introspection.
    #[serde(
        rename = "externalType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub external_type: Option<String>,

    /// Whether the column is system-managed (identity/autoincrement).
    #[serde(default)]
    pub autocolumn: bool,

    /// Validation constraints.
    #[serde(default)]
    pub constraints: Constraints,

    /// For `Datetime` columns: the external type stores a date with no
    /// time component.
    #[serde(rename = "dateOnly", default, skip_serializing_if = "Option::is_none")]
    pub date_only: Option<bool>,

    /// For `Datetime` columns: the external type stores a time with no
    /// date component.
    #[serde(rename = "timeOnly", default, skip_serializing_if = "Option::is_none")]
    pub time_only: Option<bool>,

    /// For `Link` columns: the id of the table on the other side.
    #[serde(rename = "tableId", default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,

    /// For `Link` columns: the relationship direction.
    #[serde(
        rename = "relationshipType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub relationship_type: Option<RelationshipType>,

    /// For `Link` columns: the inverse column name on the other table.
    #[serde(rename = "fieldName", default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
}

impl Column {
    /// Create a plain column of the given type with no constraints.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            external_type: None,
            autocolumn: false,
            constraints: Constraints::default(),
            date_only: None,
            time_only: None,
            table_id: None,
            relationship_type: None,
            field_name: None,
        }
    }

    /// Create a relationship column pointing at another table.
    pub fn link(
        name: impl Into<String>,
        table_id: impl Into<String>,
        relationship_type: RelationshipType,
        field_name: impl Into<String>,
    ) -> Self {
        let mut col = Self::new(name, FieldType::Link);
        col.table_id = Some(table_id.into());
        col.relationship_type = Some(relationship_type);
        col.field_name = Some(field_name.into());
        col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&FieldType::Datetime).unwrap(),
            "\"datetime\""
        );
        assert_eq!(
            serde_json::to_string(&FieldType::Reference).unwrap(),
            "\"reference\""
        );
        let parsed: FieldType = serde_json::from_str("\"bigint\"").unwrap();
        assert_eq!(parsed, FieldType::Bigint);
    }

    #[test]
    fn test_special_types() {
        assert!(FieldType::Formula.is_special());
        assert!(FieldType::Options.is_special());
        assert!(FieldType::Longform.is_special());
        assert!(FieldType::Array.is_special());
        assert!(FieldType::Reference.is_special());

        assert!(!FieldType::String.is_special());
        assert!(!FieldType::Link.is_special());
        assert!(!FieldType::Boolean.is_special());
    }

    #[test]
    fn test_column_serializes_camel_case_fields() {
        let mut col = Column::new("created_at", FieldType::Datetime);
        col.external_type = Some("timestamp".to_string());
        col.date_only = Some(false);

        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(json["type"], "datetime");
        assert_eq!(json["externalType"], "timestamp");
        assert_eq!(json["dateOnly"], false);
        // unset optional fields stay out of the document
        assert!(json.get("tableId").is_none());
    }

    #[test]
    fn test_link_constructor() {
        let col = Column::link(
            "orders",
            "datasource_abc__orders",
            RelationshipType::ManyToOne,
            "customer_id",
        );
        assert_eq!(col.field_type, FieldType::Link);
        assert_eq!(col.table_id.as_deref(), Some("datasource_abc__orders"));
        assert_eq!(col.field_name.as_deref(), Some("customer_id"));
    }
}
