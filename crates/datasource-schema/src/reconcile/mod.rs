//! Schema reconciliation between fresh introspection output and
//! previously stored table definitions.
//!
//! External databases are a moving target: re-introspection must reflect
//! genuine structural drift (added/removed/retyped columns) without
//! silently destroying user-configured relationships, views or synthetic
//! columns that the live database cannot report.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::fields::{Column, FieldType};
use crate::core::table::Table;

/// Column names reserved for document-store metadata. A table exposing
/// any of these cannot be imported.
pub const INVALID_COLUMN_NAMES: &[&str] = &["_id", "_rev", "deleted", "tableId"];

/// Error message for tables without a primary key.
pub const ERR_NO_PRIMARY_KEY: &str = "Table must have a primary key.";

/// Error message for tables using reserved column names.
pub const ERR_INVALID_COLUMNS: &str = "Table contains invalid columns.";

/// Decide whether a previously configured relationship column is still
/// valid and should be carried into the fresh schema.
///
/// Tables can be deleted in the external database outside our control;
/// a link whose target table no longer exists is dropped.
pub fn should_copy_relationship(column: &Column, table_ids: &[String]) -> bool {
    column.field_type == FieldType::Link
        && column
            .table_id
            .as_ref()
            .is_some_and(|id| table_ids.iter().any(|t| t == id))
}

/// Decide whether a user-authored column override should be carried into
/// the fresh schema.
///
/// Special types (options, longform, array, formula, reference) cannot be
/// reconstructed from raw introspection and are always copied. A boolean
/// override is copied when the freshly fetched column is absent or a
/// number, covering drivers that only expose tinyint as a number. Formula
/// columns are virtual and never appear in introspection output, so they
/// are eligible even when the fetched column is missing entirely.
pub fn should_copy_special_column(column: &Column, fetched_column: Option<&Column>) -> bool {
    let is_formula = column.field_type == FieldType::Formula;
    // column has been deleted, remove - formulas will never exist, always copy
    if !is_formula && fetched_column.is_none() {
        return false;
    }
    let fetched_is_number =
        fetched_column.map_or(true, |c| c.field_type == FieldType::Number);
    column.field_type.is_special()
        || (fetched_is_number && column.field_type == FieldType::Boolean)
}

/// Copy user-authored properties from a previous table definition into a
/// freshly introspected one: display column, created flag, views, and any
/// columns that qualify under the copy rules.
fn copy_existing_props_over(table: &mut Table, previous: &Table, table_ids: &[String]) {
    if previous.primary_display.is_some() {
        table.primary_display = previous.primary_display.clone();
    }
    if previous.created {
        table.created = previous.created;
    }
    // views always overwrite, even when absent
    table.views = previous.views.clone();

    for (key, column) in &previous.schema {
        if should_copy_relationship(column, table_ids)
            || should_copy_special_column(column, table.schema.get(key))
        {
            debug!(table = %table.name, column = %key, "restoring user-configured column");
            table.schema.insert(key.clone(), column.clone());
        }
    }
}

/// Reconcile freshly introspected tables against the previously stored
/// set, restoring per-table metadata that introspection cannot discover.
///
/// Output is keyed by table name in ascending order - deterministic for
/// downstream UI consumption regardless of input order.
pub fn finalise_external_tables(
    tables: BTreeMap<String, Table>,
    previous_tables: &BTreeMap<String, Table>,
) -> BTreeMap<String, Table> {
    let table_ids: Vec<String> = tables
        .values()
        .filter_map(|table| table.id.clone())
        .collect();

    let mut final_tables = BTreeMap::new();
    for (name, mut table) in tables {
        if let Some(previous) = previous_tables.get(&name) {
            copy_existing_props_over(&mut table, previous, &table_ids);
        }
        final_tables.insert(name, table);
    }
    final_tables
}

/// Validate external tables for import, returning a per-table error
/// message for each unusable table. Tables absent from the result are
/// valid.
///
/// Rules are checked sequentially and the last failing rule's message
/// wins per table.
pub fn check_external_tables(tables: &BTreeMap<String, Table>) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    for (name, table) in tables {
        if !table.has_primary_key() {
            errors.insert(name.clone(), ERR_NO_PRIMARY_KEY.to_string());
        }
        if table
            .schema
            .keys()
            .any(|column| INVALID_COLUMN_NAMES.contains(&column.as_str()))
        {
            errors.insert(name.clone(), ERR_INVALID_COLUMNS.to_string());
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fields::RelationshipType;
    use serde_json::json;

    fn table_with(name: &str, columns: Vec<Column>) -> Table {
        let mut table = Table::external(name, "datasource_abc");
        table.id = Some(format!("datasource_abc__{name}"));
        table.primary = vec!["id".to_string()];
        for column in columns {
            table.schema.insert(column.name.clone(), column);
        }
        table
    }

    fn as_map(tables: Vec<Table>) -> BTreeMap<String, Table> {
        tables
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect()
    }

    #[test]
    fn test_relationship_kept_when_target_exists() {
        let link = Column::link(
            "orders",
            "datasource_abc__orders",
            RelationshipType::OneToMany,
            "customer_id",
        );
        let previous = as_map(vec![table_with("customers", vec![link.clone()])]);
        let fresh = as_map(vec![
            table_with("customers", vec![]),
            table_with("orders", vec![]),
        ]);

        let merged = finalise_external_tables(fresh, &previous);
        assert_eq!(merged["customers"].schema.get("orders"), Some(&link));
    }

    #[test]
    fn test_relationship_dropped_when_target_removed() {
        let link = Column::link(
            "orders",
            "datasource_abc__orders",
            RelationshipType::OneToMany,
            "customer_id",
        );
        let previous = as_map(vec![table_with("customers", vec![link])]);
        // "orders" no longer exists in the external database
        let fresh = as_map(vec![table_with("customers", vec![])]);

        let merged = finalise_external_tables(fresh, &previous);
        assert!(!merged["customers"].schema.contains_key("orders"));
    }

    #[test]
    fn test_formula_column_survives_missing_fetch() {
        let formula = Column::new("total", FieldType::Formula);
        let previous = as_map(vec![table_with("invoices", vec![formula.clone()])]);
        let fresh = as_map(vec![table_with("invoices", vec![])]);

        let merged = finalise_external_tables(fresh, &previous);
        assert_eq!(merged["invoices"].schema.get("total"), Some(&formula));
    }

    #[test]
    fn test_options_column_overrides_fetched_string() {
        let options = Column::new("status", FieldType::Options);
        let fetched = Column::new("status", FieldType::String);
        let previous = as_map(vec![table_with("tickets", vec![options.clone()])]);
        let fresh = as_map(vec![table_with("tickets", vec![fetched])]);

        let merged = finalise_external_tables(fresh, &previous);
        assert_eq!(
            merged["tickets"].schema["status"].field_type,
            FieldType::Options
        );
    }

    #[test]
    fn test_boolean_override_of_number_column() {
        // tinyint drivers report a number; a user-chosen boolean sticks
        let boolean = Column::new("active", FieldType::Boolean);
        let fetched = Column::new("active", FieldType::Number);
        assert!(should_copy_special_column(&boolean, Some(&fetched)));

        // but not when the fetched column became a string
        let fetched_string = Column::new("active", FieldType::String);
        assert!(!should_copy_special_column(&boolean, Some(&fetched_string)));

        // deleted non-formula columns are dropped
        assert!(!should_copy_special_column(&boolean, None));
    }

    #[test]
    fn test_plain_deleted_column_not_copied() {
        let plain = Column::new("nickname", FieldType::String);
        let previous = as_map(vec![table_with("users", vec![plain])]);
        let fresh = as_map(vec![table_with("users", vec![])]);

        let merged = finalise_external_tables(fresh, &previous);
        assert!(!merged["users"].schema.contains_key("nickname"));
    }

    #[test]
    fn test_display_created_and_views_copied() {
        let mut previous_table = table_with("users", vec![]);
        previous_table.primary_display = Some("email".to_string());
        previous_table.created = true;
        previous_table
            .views
            .insert("active users".to_string(), json!({ "filter": "active" }));
        let previous = as_map(vec![previous_table]);
        let fresh = as_map(vec![table_with("users", vec![])]);

        let merged = finalise_external_tables(fresh, &previous);
        let users = &merged["users"];
        assert_eq!(users.primary_display.as_deref(), Some("email"));
        assert!(users.created);
        assert!(users.views.contains_key("active users"));
    }

    #[test]
    fn test_output_sorted_by_name() {
        let fresh = as_map(vec![
            table_with("zebra", vec![]),
            table_with("apple", vec![]),
            table_with("mango", vec![]),
        ]);
        let merged = finalise_external_tables(fresh, &BTreeMap::new());
        let names: Vec<&String> = merged.keys().collect();
        assert_eq!(names, ["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_check_missing_primary_key() {
        let mut table = table_with("logs", vec![]);
        table.primary.clear();
        let errors = check_external_tables(&as_map(vec![table]));
        assert_eq!(errors.get("logs").map(String::as_str), Some(ERR_NO_PRIMARY_KEY));
    }

    #[test]
    fn test_check_invalid_columns() {
        let table = table_with("users", vec![Column::new("_rev", FieldType::String)]);
        let errors = check_external_tables(&as_map(vec![table]));
        assert_eq!(
            errors.get("users").map(String::as_str),
            Some(ERR_INVALID_COLUMNS)
        );
    }

    #[test]
    fn test_check_last_failing_rule_wins() {
        // both rules fail; the invalid-columns message overwrites
        let mut table = table_with("users", vec![Column::new("_id", FieldType::String)]);
        table.primary.clear();
        let errors = check_external_tables(&as_map(vec![table]));
        assert_eq!(
            errors.get("users").map(String::as_str),
            Some(ERR_INVALID_COLUMNS)
        );
    }

    #[test]
    fn test_check_valid_table_absent_from_errors() {
        let table = table_with("users", vec![Column::new("id", FieldType::Number)]);
        let errors = check_external_tables(&as_map(vec![table]));
        assert!(errors.is_empty());
    }
}
