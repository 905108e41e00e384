//! Core data model: field types, table definitions and identifiers.

pub mod fields;
pub mod identifier;
pub mod table;

pub use fields::{Column, Constraints, FieldType, RelationshipType};
pub use identifier::{
    break_external_table_id, build_external_table_id, is_external_table, is_external_table_id,
    is_internal_table_id, DEFAULT_DATASOURCE_ID, DOUBLE_SEPARATOR, SEPARATOR,
};
pub use table::{
    get_primary_display, is_iso_date_string, is_valid_filter, Table, TableSourceType,
};
