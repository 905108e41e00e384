//! Table and document identifier composition.
//!
//! Document ids in the internal store are `{prefix}_{uuid}` with a single
//! underscore separator. External table ids join the owning datasource id
//! and the table name with a **doubled** separator, so a table name that
//! itself contains a single underscore can never be confused with the
//! datasource prefix. Table names containing spaces are percent-encoded
//! before joining, since table ids travel in URL path segments.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::table::{Table, TableSourceType};

/// Single separator used inside document ids.
pub const SEPARATOR: &str = "_";

/// Doubled separator joining datasource id and table name.
pub const DOUBLE_SEPARATOR: &str = "__";

/// Document id prefix for datasource documents.
pub const DATASOURCE_PREFIX: &str = "datasource";

/// Document id prefix for internal table documents.
pub const TABLE_PREFIX: &str = "ta";

/// Document id prefix for row documents.
pub const ROW_PREFIX: &str = "ro";

/// Sentinel id of the built-in internal datasource. Tables under it are
/// never treated as external even though the id carries the datasource
/// prefix.
pub const DEFAULT_DATASOURCE_ID: &str = "datasource_internal_default";

/// Percent-encoding of a single space.
const ENCODED_SPACE: &str = "%20";

/// Characters escaped by `encodeURIComponent`: everything except
/// alphanumerics and `- _ . ! ~ * ' ( )`.
pub(crate) const URI_COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Compose an external table id from a datasource id and table name.
///
/// Table names containing spaces are percent-encoded so the id is safe in
/// URL path segments.
pub fn build_external_table_id(datasource_id: &str, table_name: &str) -> String {
    let table_name = if table_name.contains(' ') {
        utf8_percent_encode(table_name, URI_COMPONENT_SET).to_string()
    } else {
        table_name.to_string()
    };
    format!("{datasource_id}{DOUBLE_SEPARATOR}{table_name}")
}

/// Decompose an external table id into `(datasource_id, table_name)`.
///
/// Only the first doubled-separator segment is split off, so table names
/// that themselves contain the doubled separator survive intact. Returns
/// `None` for empty input.
pub fn break_external_table_id(table_id: &str) -> Option<(String, String)> {
    if table_id.is_empty() {
        return None;
    }
    let mut parts = table_id.split(DOUBLE_SEPARATOR);
    let datasource_id = parts.next().unwrap_or_default().to_string();
    let mut table_name = parts.collect::<Vec<_>>().join(DOUBLE_SEPARATOR);
    if table_name.contains(ENCODED_SPACE) {
        if let Ok(decoded) = percent_decode_str(&table_name).decode_utf8() {
            table_name = decoded.into_owned();
        }
    }
    Some((datasource_id, table_name))
}

/// True if the table id refers to a table in an external datasource.
pub fn is_external_table_id(table_id: &str) -> bool {
    table_id.contains(DATASOURCE_PREFIX)
}

/// True if the table id refers to a table in the internal document store.
pub fn is_internal_table_id(table_id: &str) -> bool {
    !is_external_table_id(table_id)
}

/// Classify a table as external by source id prefix, explicit source type
/// or document id, excluding the built-in default datasource.
pub fn is_external_table(table: &Table) -> bool {
    let prefix = format!("{DATASOURCE_PREFIX}{SEPARATOR}");
    if table.source_id.contains(&prefix) && table.source_id != DEFAULT_DATASOURCE_ID {
        return true;
    }
    if table.source_type == TableSourceType::External {
        return true;
    }
    if let Some(id) = &table.id {
        if is_external_table_id(id) {
            return true;
        }
    }
    false
}
