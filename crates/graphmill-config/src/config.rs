//! Configuration structures
//!
//! Every field has a default so a partial TOML file (or none at all) is valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};

/// Default number of records sent in one transaction
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Top-level loader configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphmillConfig {
    /// Target database connection settings
    pub database: DatabaseConfig,
    /// Ingestion behaviour
    pub ingest: IngestConfig,
}

impl GraphmillConfig {
    /// Check that resolved values are usable.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.ingest.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "ingest.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.database.backend == Backend::Neo4j && self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "database.url must be set for the neo4j backend".to_string(),
            ));
        }
        Ok(())
    }
}

/// Supported graph database backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Neo4j over Bolt
    #[default]
    Neo4j,
    /// Embedded SurrealDB (in-memory or RocksDB)
    Surrealdb,
}

impl Backend {
    /// Lowercase name as used in config files and env vars
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Neo4j => "neo4j",
            Backend::Surrealdb => "surrealdb",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neo4j" => Ok(Backend::Neo4j),
            "surrealdb" | "surreal" => Ok(Backend::Surrealdb),
            other => Err(format!("unknown backend '{}', expected neo4j or surrealdb", other)),
        }
    }
}

/// Connection settings for the target database
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Which backend to load into
    pub backend: Backend,
    /// Bolt URL for Neo4j
    pub url: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Logical database name (Neo4j database, SurrealDB database)
    pub database: String,
    /// SurrealDB namespace
    pub namespace: String,
    /// SurrealDB storage path, `:memory:` for an in-memory store
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            url: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: String::new(),
            database: "neo4j".to_string(),
            namespace: "graphmill".to_string(),
            path: ":memory:".to_string(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.password.is_empty() { "" } else { "***" };
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &password)
            .field("database", &self.database)
            .field("namespace", &self.namespace)
            .field("path", &self.path)
            .finish()
    }
}

/// How records are batched and how failures are treated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Maximum records per transaction
    pub chunk_size: usize,
    /// Abort a label when its constraints cannot be provisioned
    pub strict_provisioning: bool,
    /// Sort discovered files by path before processing
    pub sort_files: bool,
    /// Truncate numeric edge properties to integers like node properties
    pub coerce_edge_numbers: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            strict_provisioning: false,
            sort_files: true,
            coerce_edge_numbers: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GraphmillConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ingest.chunk_size, 10_000);
        assert!(!config.ingest.strict_provisioning);
        assert_eq!(config.database.backend, Backend::Neo4j);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let mut config = GraphmillConfig::default();
        config.ingest.chunk_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn debug_redacts_password() {
        let mut db = DatabaseConfig::default();
        db.password = "hunter2".to_string();
        let rendered = format!("{:?}", db);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn backend_parses_aliases() {
        assert_eq!("Neo4j".parse::<Backend>().unwrap(), Backend::Neo4j);
        assert_eq!("surreal".parse::<Backend>().unwrap(), Backend::Surrealdb);
        assert!("postgres".parse::<Backend>().is_err());
    }
}
