//! [`GraphStore`] over a Neo4j server
//!
//! Every trait call opens one explicit transaction, runs its statements and
//! commits. Any statement failure rolls the transaction back before the error
//! is returned.

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Query};
use tracing::{debug, warn};

use graphmill_config::DatabaseConfig;
use graphmill_core::{EdgeRecord, EdgeSchema, GraphStore, NodeLabel, NodeRecord, StoreResult};

use crate::cypher::{self, BATCH_PARAM};
use crate::error::{Neo4jError, Neo4jResult};
use crate::params::{edge_row, node_row, BoltRow};

/// Neo4j-backed graph store
///
/// `Graph` pools its connections internally, so one store can be shared
/// across tasks.
#[derive(Clone)]
pub struct Neo4jGraphStore {
    graph: Graph,
    url: String,
}

impl std::fmt::Debug for Neo4jGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neo4jGraphStore")
            .field("url", &self.url)
            .finish()
    }
}

impl Neo4jGraphStore {
    /// Connect with the url, credentials and database name from `config`
    pub async fn connect(config: &DatabaseConfig) -> Neo4jResult<Self> {
        let bolt_config = ConfigBuilder::default()
            .uri(config.url.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .build()
            .map_err(Neo4jError::Config)?;

        let graph = Graph::connect(bolt_config)
            .await
            .map_err(|source| Neo4jError::Connect {
                url: config.url.clone(),
                source,
            })?;

        debug!(url = %config.url, database = %config.database, "Connected to Neo4j");
        Ok(Self {
            graph,
            url: config.url.clone(),
        })
    }

    /// Run `queries` in order inside one transaction
    async fn in_transaction(&self, queries: Vec<Query>) -> Neo4jResult<()> {
        let mut txn = self.graph.start_txn().await.map_err(Neo4jError::Begin)?;

        for q in queries {
            if let Err(e) = txn.run(q).await {
                if let Err(rollback) = txn.rollback().await {
                    warn!(error = %rollback, "Rollback failed after statement error");
                }
                return Err(Neo4jError::Statement(e));
            }
        }

        txn.commit().await.map_err(Neo4jError::Commit)
    }

    fn batch_query(statement: String, rows: Vec<BoltRow>) -> Query {
        query(&statement).param(BATCH_PARAM, rows)
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    fn backend_name(&self) -> &'static str {
        "neo4j"
    }

    async fn provision_label(&self, label: &NodeLabel) -> StoreResult<()> {
        let queries = cypher::provision_statements(label)
            .iter()
            .map(|statement| query(statement))
            .collect();
        self.in_transaction(queries).await?;
        debug!(label = %label, "Provisioned constraint and indexes");
        Ok(())
    }

    async fn upsert_node_chunk(&self, label: &NodeLabel, chunk: &[NodeRecord]) -> StoreResult<()> {
        let rows: Vec<BoltRow> = chunk.iter().map(node_row).collect();
        let q = Self::batch_query(cypher::node_upsert(label), rows);
        self.in_transaction(vec![q]).await?;
        Ok(())
    }

    async fn create_edge_chunk(
        &self,
        schema: &EdgeSchema,
        chunk: &[EdgeRecord],
    ) -> StoreResult<()> {
        let rows: Vec<BoltRow> = chunk.iter().map(edge_row).collect();
        let q = Self::batch_query(cypher::edge_create(schema), rows);
        self.in_transaction(vec![q]).await?;
        Ok(())
    }
}
