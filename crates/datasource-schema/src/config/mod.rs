//! Datasource configuration loading and validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::identifier::{DATASOURCE_PREFIX, SEPARATOR};
use crate::error::{Result, SchemaError};

/// Supported external SQL engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlEngine {
    Mssql,
    Postgres,
    Mysql,
    Oracle,
}

impl SqlEngine {
    /// Default port for the engine.
    pub fn default_port(&self) -> u16 {
        match self {
            SqlEngine::Mssql => 1433,
            SqlEngine::Postgres => 5432,
            SqlEngine::Mysql => 3306,
            SqlEngine::Oracle => 1521,
        }
    }
}

/// Connection settings for one external datasource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasourceConfig {
    /// Datasource document id (`datasource_...`).
    pub id: String,

    /// External engine kind.
    pub engine: SqlEngine,

    /// Database host.
    pub host: String,

    /// Database port. Defaults to the engine's standard port.
    #[serde(default)]
    pub port: Option<u16>,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password. Never serialized back out.
    #[serde(skip_serializing)]
    pub password: String,

    /// Schema to introspect (e.g. "public", "dbo").
    #[serde(default)]
    pub schema: Option<String>,
}

impl DatasourceConfig {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: DatasourceConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let prefix = format!("{DATASOURCE_PREFIX}{SEPARATOR}");
        if !self.id.starts_with(&prefix) {
            return Err(SchemaError::Config(format!(
                "Datasource id must start with '{prefix}': {}",
                self.id
            )));
        }
        if self.host.is_empty() {
            return Err(SchemaError::Config("Host cannot be empty".to_string()));
        }
        if self.database.is_empty() {
            return Err(SchemaError::Config("Database cannot be empty".to_string()));
        }
        if self.port == Some(0) {
            return Err(SchemaError::Config("Port cannot be 0".to_string()));
        }
        Ok(())
    }

    /// The effective port: configured value or the engine default.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.engine.default_port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_YAML: &str = "\
id: datasource_abc123
engine: postgres
host: localhost
database: app
user: app
password: secret
";

    #[test]
    fn test_from_yaml_valid() {
        let config = DatasourceConfig::from_yaml(VALID_YAML).unwrap();
        assert_eq!(config.engine, SqlEngine::Postgres);
        assert_eq!(config.effective_port(), 5432);
        assert!(config.schema.is_none());
    }

    #[test]
    fn test_explicit_port_wins() {
        let yaml = format!("{VALID_YAML}port: 6543\n");
        let config = DatasourceConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.effective_port(), 6543);
    }

    #[test]
    fn test_rejects_bad_id_prefix() {
        let yaml = VALID_YAML.replace("datasource_abc123", "table_abc123");
        let err = DatasourceConfig::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));
    }

    #[test]
    fn test_rejects_empty_host() {
        let yaml = VALID_YAML.replace("localhost", "\"\"");
        assert!(DatasourceConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_password_not_serialized() {
        let config = DatasourceConfig::from_yaml(VALID_YAML).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"), "Password was serialized: {json}");
    }

    #[test]
    fn test_engine_default_ports() {
        assert_eq!(SqlEngine::Mssql.default_port(), 1433);
        assert_eq!(SqlEngine::Mysql.default_port(), 3306);
        assert_eq!(SqlEngine::Oracle.default_port(), 1521);
    }
}
