//! Error types for the datasource schema library.

use thiserror::Error;

/// Main error type for schema operations.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema introspection against the external database failed
    #[error("Schema introspection failed: {0}")]
    Introspection(String),

    /// Query execution against the external database failed
    #[error("Query failed for table {table}: {message}")]
    Query { table: String, message: String },

    /// Document not found in the internal document store
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Document revision conflict (HTTP 409 equivalent).
    ///
    /// Raised by the document store when a write loses a revision race.
    /// Callers resolve it by refetching the latest document and retrying
    /// the write once (see [`crate::store::save_table`]).
    #[error("Document conflict (status {status}): {message}")]
    Conflict { status: u16, message: String },

    /// Table failed validation (no primary key, reserved column names)
    #[error("Invalid table {table}: {message}")]
    InvalidTable { table: String, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Create a Conflict error with the standard 409 status.
    pub fn conflict(message: impl Into<String>) -> Self {
        SchemaError::Conflict {
            status: 409,
            message: message.into(),
        }
    }

    /// Create a Query error.
    pub fn query(table: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::Query {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidTable error.
    pub fn invalid_table(table: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::InvalidTable {
            table: table.into(),
            message: message.into(),
        }
    }

    /// True if this error is a document revision conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, SchemaError::Conflict { .. })
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Map the error to a process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            SchemaError::Config(_) | SchemaError::Yaml(_) => 2,
            SchemaError::InvalidTable { .. } => 3,
            SchemaError::Conflict { .. } => 4,
            _ => 1,
        }
    }
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
