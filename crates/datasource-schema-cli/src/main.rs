//! datasource-schema CLI - schema reconciliation tools for external
//! datasources, operating on JSON table snapshots.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use datasource_schema::typemap::{generate_column_definition, ColumnDefinitionConfig};
use datasource_schema::{
    break_row_id_field, check_external_tables, finalise_external_tables, generate_row_id_field,
    SchemaError, Table,
};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "datasource-schema")]
#[command(about = "Schema reconciliation tools for external datasources")]
#[command(version)]
struct Cli {
    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "warn")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile freshly introspected tables against a previous snapshot
    Reconcile {
        /// JSON file with the freshly introspected tables (name -> table)
        #[arg(long)]
        fresh: PathBuf,

        /// JSON file with the previously stored tables
        #[arg(long)]
        previous: Option<PathBuf>,
    },

    /// Validate tables for import and report per-table errors
    Check {
        /// JSON file with the tables to validate (name -> table)
        #[arg(long)]
        tables: PathBuf,
    },

    /// Map an external column type to an internal column definition
    MapType {
        /// Raw driver type string (e.g. "double precision")
        external_type: String,

        /// Allowed values for enum-like columns (comma separated)
        #[arg(long, value_delimiter = ',')]
        options: Vec<String>,

        /// Mark the column as required
        #[arg(long)]
        required: bool,

        /// Mark the column as system-managed
        #[arg(long)]
        autocolumn: bool,
    },

    /// Encode ordered primary-key values into an opaque row id
    RowIdEncode {
        /// Key values as a JSON array (e.g. '[1, "abc"]')
        values: String,
    },

    /// Decode an opaque row id back into its key values
    RowIdDecode {
        /// The encoded row id
        id: String,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), SchemaError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| SchemaError::Config(e.to_string()))?;

    match cli.command {
        Commands::Reconcile { fresh, previous } => {
            let fresh = load_tables(&fresh)?;
            let previous = match previous {
                Some(path) => load_tables(&path)?,
                None => BTreeMap::new(),
            };
            let merged = finalise_external_tables(fresh, &previous);
            info!(tables = merged.len(), "reconciled tables");
            println!("{}", serde_json::to_string_pretty(&merged)?);
        }

        Commands::Check { tables } => {
            let tables = load_tables(&tables)?;
            let errors = check_external_tables(&tables);
            println!("{}", serde_json::to_string_pretty(&errors)?);
            if let Some((name, message)) = errors.iter().next() {
                return Err(SchemaError::invalid_table(name.clone(), message.clone()));
            }
        }

        Commands::MapType {
            external_type,
            options,
            required,
            autocolumn,
        } => {
            let column = generate_column_definition(ColumnDefinitionConfig {
                external_type,
                autocolumn,
                name: "column".to_string(),
                presence: required,
                options: if options.is_empty() {
                    None
                } else {
                    Some(options)
                },
            });
            println!("{}", serde_json::to_string_pretty(&column)?);
        }

        Commands::RowIdEncode { values } => {
            let values: Vec<serde_json::Value> = serde_json::from_str(&values)?;
            println!("{}", generate_row_id_field(&values));
        }

        Commands::RowIdDecode { id } => {
            println!("{}", serde_json::to_string(&break_row_id_field(&id))?);
        }
    }

    Ok(())
}

fn load_tables(path: &Path) -> Result<BTreeMap<String, Table>, SchemaError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("Unknown verbosity: {other}").into()),
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr);

    match format {
        "json" => builder.json().init(),
        "text" => builder.init(),
        other => return Err(format!("Unknown log format: {other}").into()),
    }

    Ok(())
}
