//! Layered configuration loading
//!
//! Defaults, then a TOML file, then `.env`, then the process environment.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{Backend, GraphmillConfig};
use crate::error::{ConfigError, ConfigResult};

/// Neo4j connection URL
pub const ENV_URL: &str = "NEO4J_URL";
/// Database user
pub const ENV_USER: &str = "NEO4J_USER";
/// Database password
pub const ENV_PASSWORD: &str = "NEO4J_PASSWORD";
/// Database name
pub const ENV_DATABASE: &str = "NEO4J_DATABASE";
/// Backend selection (`neo4j` or `surrealdb`)
pub const ENV_BACKEND: &str = "GRAPHMILL_BACKEND";
/// Records per transaction
pub const ENV_CHUNK_SIZE: &str = "GRAPHMILL_CHUNK_SIZE";
/// Fail a label when provisioning fails
pub const ENV_STRICT_PROVISIONING: &str = "GRAPHMILL_STRICT_PROVISIONING";

/// Resolves a [`GraphmillConfig`] from files and environment
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    load_dotenv: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader that reads `.env` before the environment.
    pub fn new() -> Self {
        Self { load_dotenv: true }
    }

    /// Skip the `.env` file (tests, or callers that manage env themselves).
    pub fn without_dotenv(mut self) -> Self {
        self.load_dotenv = false;
        self
    }

    /// Default config file: `$XDG_CONFIG_HOME/graphmill/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".config")
            })
            .join("graphmill")
            .join("config.toml")
    }

    /// Resolve configuration from every layer and validate it.
    ///
    /// An explicit `path` must exist; the default path is used only if present.
    pub fn load(&self, path: Option<&Path>) -> ConfigResult<GraphmillConfig> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Self::default_path();
                if default.is_file() {
                    Self::from_file(&default)?
                } else {
                    GraphmillConfig::default()
                }
            }
        };

        if self.load_dotenv {
            match dotenvy::dotenv() {
                Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
                Err(e) => debug!("No .env file loaded: {}", e),
            }
        }

        Self::apply_env_with(&mut config, |key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> ConfigResult<GraphmillConfig> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Overlay environment values using `lookup` as the variable source.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env_with<F>(config: &mut GraphmillConfig, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_URL) {
            config.database.url = url;
        }
        if let Some(user) = get(ENV_USER) {
            config.database.user = user;
        }
        if let Some(password) = get(ENV_PASSWORD) {
            config.database.password = password;
        }
        if let Some(database) = get(ENV_DATABASE) {
            config.database.database = database;
        }
        if let Some(raw) = get(ENV_BACKEND) {
            config.database.backend =
                raw.parse::<Backend>()
                    .map_err(|reason| ConfigError::InvalidEnv {
                        key: ENV_BACKEND.to_string(),
                        value: raw.clone(),
                        reason,
                    })?;
        }
        if let Some(raw) = get(ENV_CHUNK_SIZE) {
            config.ingest.chunk_size =
                raw.trim()
                    .parse::<usize>()
                    .map_err(|e| ConfigError::InvalidEnv {
                        key: ENV_CHUNK_SIZE.to_string(),
                        value: raw.clone(),
                        reason: e.to_string(),
                    })?;
        }
        if let Some(raw) = get(ENV_STRICT_PROVISIONING) {
            config.ingest.strict_provisioning = parse_flag(&raw).ok_or_else(|| {
                ConfigError::InvalidEnv {
                    key: ENV_STRICT_PROVISIONING.to_string(),
                    value: raw.clone(),
                    reason: "expected true/false".to_string(),
                }
            })?;
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
