//! # datasource-schema
//!
//! Schema reconciliation and identifier encoding for external SQL
//! datasources. This library maps heterogeneous external column types
//! into a unified internal field-type model, packs composite primary
//! keys into opaque row identifiers, and merges freshly introspected
//! schemas with previously stored table definitions without losing
//! user-authored metadata:
//!
//! - **Type mapping** from driver-reported type strings to internal
//!   field types (longest-substring-match resolution)
//! - **Row-identifier codec** for composite primary keys, URL- and
//!   template-safe
//! - **Schema reconciliation** preserving relationships, views and
//!   synthetic columns across re-introspection
//! - **Table validity checking** and **search-filter sanitization**
//! - Driver and document-store seams as async traits
//!
//! ## Example
//!
//! ```rust
//! use datasource_schema::typemap::{generate_column_definition, ColumnDefinitionConfig};
//! use datasource_schema::core::FieldType;
//!
//! let column = generate_column_definition(ColumnDefinitionConfig {
//!     external_type: "double precision".to_string(),
//!     autocolumn: false,
//!     name: "price".to_string(),
//!     presence: true,
//!     options: None,
//! });
//! assert_eq!(column.field_type, FieldType::Number);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod filter;
pub mod introspect;
pub mod reconcile;
pub mod rowid;
pub mod store;
pub mod typemap;

// Re-exports for convenient access
pub use config::{DatasourceConfig, SqlEngine};
pub use core::{
    break_external_table_id, build_external_table_id, is_external_table, is_external_table_id,
    is_internal_table_id, Column, FieldType, Table, TableSourceType,
};
pub use error::{Result, SchemaError};
pub use filter::{remove_empty_filters, SearchFilters};
pub use introspect::{fetch_and_reconcile, QueryExecutor, RawColumn, SchemaIntrospector};
pub use reconcile::{check_external_tables, finalise_external_tables};
pub use rowid::{break_row_id_field, convert_row_id, generate_row_id_field, is_row_id};
pub use store::{save_table, DocumentStore};
pub use typemap::{generate_column_definition, ColumnDefinitionConfig};
