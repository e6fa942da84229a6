//! Embedded SurrealDB connection
//!
//! `:memory:` (or an empty path) opens the in-memory engine; any other path
//! opens a RocksDB store in that directory.

use std::sync::Arc;

use serde_json::Value;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::{Response, Surreal};
use tracing::debug;

use graphmill_config::DatabaseConfig;

use crate::error::{SurrealError, SurrealResult};

pub const MEMORY_PATH: &str = ":memory:";

/// Cheaply cloneable handle to one embedded database
///
/// Clones share the same engine, so a RocksDB directory is opened once.
#[derive(Clone)]
pub struct SurrealClient {
    inner: Arc<SurrealClientInner>,
}

struct SurrealClientInner {
    db: Surreal<Db>,
    namespace: String,
    database: String,
    path: String,
}

impl std::fmt::Debug for SurrealClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealClient")
            .field("namespace", &self.inner.namespace)
            .field("database", &self.inner.database)
            .field("path", &self.inner.path)
            .finish()
    }
}

impl SurrealClient {
    /// Open the engine named by `config.path` and select its namespace/database
    pub async fn new(config: &DatabaseConfig) -> SurrealResult<Self> {
        let db = if config.path.is_empty() || config.path == MEMORY_PATH {
            Surreal::new::<Mem>(()).await.map_err(|e| {
                SurrealError::Connection(format!("Failed to create in-memory database: {}", e))
            })?
        } else {
            Surreal::new::<RocksDb>(config.path.as_str())
                .await
                .map_err(|e| {
                    SurrealError::Connection(format!(
                        "Failed to create file database at {}: {}",
                        config.path, e
                    ))
                })?
        };

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await
            .map_err(|e| {
                SurrealError::Connection(format!(
                    "Failed to use namespace '{}' and database '{}': {}",
                    config.namespace, config.database, e
                ))
            })?;

        debug!(path = %config.path, namespace = %config.namespace, "Opened SurrealDB");
        Ok(Self {
            inner: Arc::new(SurrealClientInner {
                db,
                namespace: config.namespace.clone(),
                database: config.database.clone(),
                path: config.path.clone(),
            }),
        })
    }

    /// Fresh in-memory database; every call is isolated from the others
    pub async fn new_memory() -> SurrealResult<Self> {
        let config = DatabaseConfig {
            path: MEMORY_PATH.to_string(),
            ..DatabaseConfig::default()
        };
        Self::new(&config).await
    }

    /// Run `sql` with named bindings and fail if any statement errored.
    pub async fn execute(&self, sql: &str, bindings: Vec<(String, Value)>) -> SurrealResult<Response> {
        let mut query = self.inner.db.query(sql);
        for binding in bindings {
            query = query.bind(binding);
        }

        let response = query
            .await
            .map_err(|e| SurrealError::Query(format!("Query execution failed: {}", e)))?;

        response
            .check()
            .map_err(|e| SurrealError::Query(format!("Query returned error: {}", e)))
    }

    /// Number of records in `table`, zero when the table does not exist
    pub async fn count(&self, table: &str) -> SurrealResult<usize> {
        let mut response = self
            .execute(
                "SELECT count() AS total FROM type::table($table) GROUP ALL",
                vec![("table".to_string(), Value::from(table))],
            )
            .await?;
        let total: Option<i64> = response
            .take((0, "total"))
            .map_err(|e| SurrealError::Query(format!("Failed to read count: {}", e)))?;
        Ok(total.unwrap_or(0).max(0) as usize)
    }

    /// Underlying SDK handle, for ad-hoc queries
    pub fn db(&self) -> &Surreal<Db> {
        &self.inner.db
    }
}
