//! Driver-facing seams: schema introspection and query execution.
//!
//! Per-engine driver adapters implement [`SchemaIntrospector`] and
//! [`QueryExecutor`]; this module owns the engine-independent work of
//! assembling raw introspection rows into table definitions and
//! reconciling them against previously stored tables.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::identifier::build_external_table_id;
use crate::core::table::Table;
use crate::error::Result;
use crate::filter::{remove_empty_filters, SearchFilters};
use crate::reconcile::{check_external_tables, finalise_external_tables};
use crate::typemap::{generate_column_definition, ColumnDefinitionConfig};

/// One raw column as reported by a driver's introspection query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawColumn {
    /// Table the column belongs to.
    pub table_name: String,

    /// Column name.
    pub column_name: String,

    /// Driver type string, verbatim.
    pub external_type: String,

    /// Whether the column participates in the primary key.
    pub is_primary_key: bool,

    /// Whether the column is identity/autoincrement.
    pub autoincrement: bool,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Allowed values for enum-like columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

/// Introspects a live external database for its current schema.
///
/// One implementation per engine; the returned rows are unordered and
/// carry no user-authored metadata.
#[async_trait]
pub trait SchemaIntrospector: Send + Sync {
    /// Get the engine identifier (e.g. "postgres", "mssql").
    fn engine(&self) -> &str;

    /// Fetch the raw column list for every table visible to the
    /// connection.
    async fn fetch_raw_schema(&self) -> Result<Vec<RawColumn>>;
}

/// Result of a schema fetch: the reconciled tables plus per-table errors
/// for tables that cannot be imported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFetchResult {
    /// Reconciled table definitions, keyed by table name in ascending
    /// order.
    pub tables: BTreeMap<String, Table>,

    /// Per-table error messages for unusable tables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

/// Assemble raw introspection rows into external table definitions.
///
/// Groups rows by table, runs the type mapper over each column, collects
/// primary-key columns in raw order and stamps the external table id.
pub fn build_table_map(datasource_id: &str, rows: Vec<RawColumn>) -> BTreeMap<String, Table> {
    let mut tables: BTreeMap<String, Table> = BTreeMap::new();

    for row in rows {
        let table = tables.entry(row.table_name.clone()).or_insert_with(|| {
            let mut table = Table::external(&row.table_name, datasource_id);
            table.id = Some(build_external_table_id(datasource_id, &row.table_name));
            table
        });

        if row.is_primary_key {
            table.primary.push(row.column_name.clone());
        }

        let column = generate_column_definition(ColumnDefinitionConfig {
            external_type: row.external_type,
            autocolumn: row.autoincrement,
            name: row.column_name.clone(),
            // autoincrement columns are filled by the database
            presence: !row.is_nullable && !row.autoincrement,
            options: row.enum_values,
        });
        table.schema.insert(row.column_name, column);
    }

    debug!(datasource = %datasource_id, tables = tables.len(), "assembled raw schema");
    tables
}

/// Run a full schema fetch: introspect, assemble, reconcile against the
/// previously stored tables and validity-check the result.
///
/// Invalid tables stay in the output alongside their error message so the
/// caller can decide whether to block the import.
pub async fn fetch_and_reconcile(
    datasource_id: &str,
    introspector: &dyn SchemaIntrospector,
    previous_tables: &BTreeMap<String, Table>,
) -> Result<SchemaFetchResult> {
    let rows = introspector.fetch_raw_schema().await?;
    let fresh = build_table_map(datasource_id, rows);
    let tables = finalise_external_tables(fresh, previous_tables);
    let errors = check_external_tables(&tables);
    info!(
        datasource = %datasource_id,
        engine = introspector.engine(),
        tables = tables.len(),
        invalid = errors.len(),
        "schema fetch complete"
    );
    Ok(SchemaFetchResult { tables, errors })
}

/// A page of rows from a query, with an optional total count and
/// continuation cursor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    /// Matching rows.
    pub rows: Vec<Value>,

    /// Total number of matching rows, when the engine can report it
    /// cheaply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    /// Opaque cursor for fetching the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
}

/// Executes searches against a live external database connection.
///
/// Implementations translate the filter structure into engine-specific
/// SQL; the provided [`search`](QueryExecutor::search) method sanitizes
/// filters first so drivers never see empty entries.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Get the engine identifier.
    fn engine(&self) -> &str;

    /// Execute a query with already-sanitized filters.
    async fn run_query(
        &self,
        table: &Table,
        filters: SearchFilters,
        limit: Option<usize>,
    ) -> Result<QueryResult>;

    /// Search a table: strips empty filter entries, then delegates to
    /// [`run_query`](QueryExecutor::run_query).
    async fn search(
        &self,
        table: &Table,
        filters: SearchFilters,
        limit: Option<usize>,
    ) -> Result<QueryResult> {
        self.run_query(table, remove_empty_filters(filters), limit)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fields::FieldType;
    use crate::error::SchemaError;
    use serde_json::json;
    use std::sync::Mutex;

    fn raw(
        table: &str,
        column: &str,
        external_type: &str,
        is_primary_key: bool,
    ) -> RawColumn {
        RawColumn {
            table_name: table.to_string(),
            column_name: column.to_string(),
            external_type: external_type.to_string(),
            is_primary_key,
            autoincrement: false,
            is_nullable: true,
            enum_values: None,
        }
    }

    struct StaticIntrospector {
        rows: Vec<RawColumn>,
    }

    #[async_trait]
    impl SchemaIntrospector for StaticIntrospector {
        fn engine(&self) -> &str {
            "postgres"
        }

        async fn fetch_raw_schema(&self) -> Result<Vec<RawColumn>> {
            Ok(self.rows.clone())
        }
    }

    #[test]
    fn test_build_table_map_groups_by_table() {
        let rows = vec![
            raw("users", "id", "integer", true),
            raw("users", "name", "varchar", false),
            raw("orders", "id", "bigint", true),
        ];
        let tables = build_table_map("datasource_abc", rows);

        assert_eq!(tables.len(), 2);
        let users = &tables["users"];
        assert_eq!(users.id.as_deref(), Some("datasource_abc__users"));
        assert_eq!(users.primary, vec!["id"]);
        assert_eq!(users.schema["name"].field_type, FieldType::String);
        assert_eq!(tables["orders"].schema["id"].field_type, FieldType::Bigint);
    }

    #[test]
    fn test_build_table_map_composite_key_in_raw_order() {
        let rows = vec![
            raw("order_items", "order_id", "integer", true),
            raw("order_items", "product_id", "integer", true),
            raw("order_items", "qty", "integer", false),
        ];
        let tables = build_table_map("ds", rows);
        assert_eq!(tables["order_items"].primary, vec!["order_id", "product_id"]);
    }

    #[test]
    fn test_build_table_map_presence_rules() {
        let mut required = raw("users", "email", "varchar", false);
        required.is_nullable = false;
        let mut auto = raw("users", "id", "integer", true);
        auto.is_nullable = false;
        auto.autoincrement = true;

        let tables = build_table_map("ds", vec![required, auto]);
        let users = &tables["users"];
        assert!(users.schema["email"].constraints.presence);
        // identity columns are filled by the database, never required
        assert!(!users.schema["id"].constraints.presence);
        assert!(users.schema["id"].autocolumn);
    }

    #[tokio::test]
    async fn test_fetch_and_reconcile_flags_invalid_tables() {
        let introspector = StaticIntrospector {
            rows: vec![
                raw("users", "id", "integer", true),
                raw("logs", "message", "text", false),
            ],
        };
        let result = fetch_and_reconcile("ds", &introspector, &BTreeMap::new())
            .await
            .unwrap();

        assert!(result.tables.contains_key("users"));
        assert!(!result.errors.contains_key("users"));
        assert_eq!(
            result.errors.get("logs").map(String::as_str),
            Some("Table must have a primary key.")
        );
    }

    #[tokio::test]
    async fn test_fetch_and_reconcile_preserves_previous_metadata() {
        let introspector = StaticIntrospector {
            rows: vec![raw("users", "id", "integer", true)],
        };
        let mut previous = build_table_map("ds", vec![raw("users", "id", "integer", true)]);
        previous.get_mut("users").unwrap().primary_display = Some("id".to_string());

        let result = fetch_and_reconcile("ds", &introspector, &previous)
            .await
            .unwrap();
        assert_eq!(
            result.tables["users"].primary_display.as_deref(),
            Some("id")
        );
    }

    struct RecordingExecutor {
        seen: Mutex<Option<SearchFilters>>,
    }

    #[async_trait]
    impl QueryExecutor for RecordingExecutor {
        fn engine(&self) -> &str {
            "mysql"
        }

        async fn run_query(
            &self,
            _table: &Table,
            filters: SearchFilters,
            _limit: Option<usize>,
        ) -> Result<QueryResult> {
            *self.seen.lock().map_err(|_| {
                SchemaError::query("users", "poisoned lock")
            })? = Some(filters);
            Ok(QueryResult::default())
        }
    }

    #[tokio::test]
    async fn test_search_sanitizes_filters() {
        let executor = RecordingExecutor {
            seen: Mutex::new(None),
        };
        let mut filters = SearchFilters::default();
        filters.string.insert("name".to_string(), json!(""));
        filters.string.insert("age".to_string(), json!(0));

        let table = Table::external("users", "ds");
        executor.search(&table, filters, None).await.unwrap();

        let seen = executor.seen.lock().unwrap().clone().unwrap();
        assert!(!seen.string.contains_key("name"));
        assert_eq!(seen.string.get("age"), Some(&json!(0)));
    }
}
