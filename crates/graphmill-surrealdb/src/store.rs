//! [`GraphStore`] over embedded SurrealDB
//!
//! Each call sends one `BEGIN ... COMMIT` query, so a failing statement
//! cancels the whole chunk.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use graphmill_config::DatabaseConfig;
use graphmill_core::{
    EdgeRecord, EdgeSchema, GraphStore, NodeLabel, NodeRecord, PropertyMap, StoreResult,
};

use crate::client::SurrealClient;
use crate::error::SurrealResult;
use crate::surql;

#[derive(Serialize)]
struct NodeRow<'a> {
    key: &'a str,
    fields: &'a PropertyMap,
}

#[derive(Serialize)]
struct EdgeRow<'a> {
    source: &'a str,
    target: &'a str,
    fields: &'a PropertyMap,
}

/// SurrealDB-backed graph store
#[derive(Debug, Clone)]
pub struct SurrealGraphStore {
    client: SurrealClient,
}

impl SurrealGraphStore {
    pub fn new(client: SurrealClient) -> Self {
        Self { client }
    }

    pub async fn connect(config: &DatabaseConfig) -> SurrealResult<Self> {
        Ok(Self::new(SurrealClient::new(config).await?))
    }

    pub fn client(&self) -> &SurrealClient {
        &self.client
    }
}

fn bind(name: &str, value: Value) -> (String, Value) {
    (name.to_string(), value)
}

/// Relation content without the fields that would replace its id or endpoints
fn relation_fields(properties: &PropertyMap) -> PropertyMap {
    properties
        .iter()
        .filter(|(key, _)| !surql::RESERVED_RELATION_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[async_trait]
impl GraphStore for SurrealGraphStore {
    fn backend_name(&self) -> &'static str {
        "surrealdb"
    }

    async fn provision_label(&self, label: &NodeLabel) -> StoreResult<()> {
        self.client.execute(&surql::provision(label), Vec::new()).await?;
        debug!(label = %label, "Provisioned table and label index");
        Ok(())
    }

    async fn upsert_node_chunk(&self, label: &NodeLabel, chunk: &[NodeRecord]) -> StoreResult<()> {
        let rows: Vec<NodeRow<'_>> = chunk
            .iter()
            .map(|record| NodeRow {
                key: &record.id,
                fields: &record.properties,
            })
            .collect();
        let rows = serde_json::to_value(rows).map_err(crate::error::SurrealError::from)?;

        self.client
            .execute(
                surql::NODE_UPSERT,
                vec![
                    bind("table", Value::from(label.as_str())),
                    bind("rows", rows),
                ],
            )
            .await?;
        Ok(())
    }

    async fn create_edge_chunk(
        &self,
        schema: &EdgeSchema,
        chunk: &[EdgeRecord],
    ) -> StoreResult<()> {
        let reserved: Vec<&String> = schema
            .property_columns
            .iter()
            .filter(|c| surql::RESERVED_RELATION_FIELDS.contains(&c.as_str()))
            .collect();
        if !reserved.is_empty() {
            warn!(relation = %schema.relation, columns = ?reserved, "Dropping reserved relation columns");
        }

        let fields: Vec<PropertyMap> = chunk
            .iter()
            .map(|record| relation_fields(&record.properties))
            .collect();
        let rows: Vec<EdgeRow<'_>> = chunk
            .iter()
            .zip(&fields)
            .map(|(record, fields)| EdgeRow {
                source: &record.source,
                target: &record.target,
                fields,
            })
            .collect();
        let rows = serde_json::to_value(rows).map_err(crate::error::SurrealError::from)?;

        self.client
            .execute(
                &surql::edge_create(schema),
                vec![
                    bind("source_table", Value::from(schema.source.as_str())),
                    bind("target_table", Value::from(schema.target.as_str())),
                    bind("rows", rows),
                ],
            )
            .await?;
        Ok(())
    }
}
