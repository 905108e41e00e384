//! Mapping from driver-reported column types to internal field types.
//!
//! Drivers report type names with wide variation across engines and
//! versions ("int4", "character varying(255)", "DOUBLE PRECISION"), so the
//! mapping works on lower-cased substrings rather than exact names. When
//! several substrings match, the longest one wins; this is what keeps
//! "double precision" a number rather than whatever "precision" alone
//! would suggest, and "bigint" a bigint rather than an int.

use crate::core::fields::{Column, Constraints, FieldType};

/// Ordered substring → internal type mapping. Constructed once, never
/// mutated. Grouped by internal type for readability; order only matters
/// for equal-length ties, where the first entry wins.
pub const EXTERNAL_TYPE_MAP: &[(&str, FieldType)] = &[
    // number types
    ("integer", FieldType::Number),
    ("int", FieldType::Number),
    ("decimal", FieldType::Number),
    ("smallint", FieldType::Number),
    ("real", FieldType::Number),
    ("float", FieldType::Number),
    ("numeric", FieldType::Number),
    ("mediumint", FieldType::Number),
    ("dec", FieldType::Number),
    ("double", FieldType::Number),
    ("fixed", FieldType::Number),
    ("double precision", FieldType::Number),
    ("number", FieldType::Number),
    ("binary_float", FieldType::Number),
    ("binary_double", FieldType::Number),
    ("money", FieldType::Number),
    ("smallmoney", FieldType::Number),
    // date/time types
    ("timestamp", FieldType::Datetime),
    ("time", FieldType::Datetime),
    ("datetime", FieldType::Datetime),
    ("smalldatetime", FieldType::Datetime),
    ("date", FieldType::Datetime),
    // string types
    ("varchar", FieldType::String),
    ("char", FieldType::String),
    ("nchar", FieldType::String),
    ("nvarchar", FieldType::String),
    ("ntext", FieldType::String),
    ("enum", FieldType::String),
    ("blob", FieldType::String),
    ("long", FieldType::String),
    ("text", FieldType::String),
    // boolean types
    ("boolean", FieldType::Boolean),
    ("bit", FieldType::Boolean),
    ("tinyint", FieldType::Boolean),
    // misc
    ("json", FieldType::Json),
    ("bigint", FieldType::Bigint),
    // postgres user-defined enums surface as options
    ("user-defined", FieldType::Options),
];

/// External types whose datetime values carry no time component.
const DATE_ONLY_TYPES: &[&str] = &["date"];

/// External types whose datetime values carry no date component.
const TIME_ONLY_TYPES: &[&str] = &["time"];

/// Input for [`generate_column_definition`], as supplied by a driver
/// adapter from raw introspection output.
#[derive(Debug, Clone)]
pub struct ColumnDefinitionConfig {
    /// Raw driver type string.
    pub external_type: String,
    /// Whether the column is system-managed (identity/autoincrement).
    pub autocolumn: bool,
    /// Column name.
    pub name: String,
    /// Whether a value is required.
    pub presence: bool,
    /// Allowed values for enum-like columns.
    pub options: Option<Vec<String>>,
}

/// Translate a driver-reported column type into an internal column
/// definition.
///
/// Collects every map entry whose key is a substring of the lower-cased
/// external type and selects the internal type of the longest match
/// (first entry wins on equal length). Unknown types degrade to `String`
/// rather than erroring: a lossy but safe default.
pub fn generate_column_definition(config: ColumnDefinitionConfig) -> Column {
    let lowered = config.external_type.to_lowercase();

    let mut found: Option<(&str, FieldType)> = None;
    for (external, internal) in EXTERNAL_TYPE_MAP {
        if lowered.contains(external) {
            match found {
                Some((best, _)) if best.len() >= external.len() => {}
                _ => found = Some((external, *internal)),
            }
        }
    }
    let field_type = found.map(|(_, internal)| internal).unwrap_or(FieldType::String);

    let mut constraints = Constraints {
        presence: config.presence,
        inclusion: None,
    };
    if field_type == FieldType::Options {
        constraints.inclusion = config.options;
    }

    let mut column = Column::new(config.name, field_type);
    column.external_type = Some(config.external_type);
    column.autocolumn = config.autocolumn;
    column.constraints = constraints;
    if field_type == FieldType::Datetime {
        column.date_only = Some(DATE_ONLY_TYPES.contains(&lowered.as_str()));
        column.time_only = Some(TIME_ONLY_TYPES.contains(&lowered.as_str()));
    }
    column
}
