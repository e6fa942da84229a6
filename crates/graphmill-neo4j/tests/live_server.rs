//! Tests against a running Neo4j server
//!
//! Ignored by default. Run with a disposable database:
//!
//! ```bash
//! NEO4J_URL=bolt://localhost:7687 NEO4J_PASSWORD=secret \
//!     cargo test -p graphmill-neo4j -- --ignored
//! ```

use graphmill_config::{ConfigLoader, DatabaseConfig};
use graphmill_core::{EdgeRecord, EdgeSchema, GraphStore, NodeLabel, NodeRecord, PropertyMap};
use graphmill_neo4j::Neo4jGraphStore;

fn live_config() -> DatabaseConfig {
    ConfigLoader::new()
        .load(None)
        .expect("Failed to load configuration from environment")
        .database
}

fn named(row: usize, name: &str) -> NodeRecord {
    let mut props = PropertyMap::new();
    props.insert("name".into(), name.into());
    NodeRecord::new(row, props)
}

#[tokio::test]
#[ignore = "requires a Neo4j server"]
async fn provisioning_is_idempotent() {
    let store = Neo4jGraphStore::connect(&live_config()).await.unwrap();
    let label = NodeLabel::from_token("Graphmill_Probe");

    store.provision_label(&label).await.unwrap();
    store.provision_label(&label).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a Neo4j server"]
async fn node_and_edge_chunks_commit() {
    let store = Neo4jGraphStore::connect(&live_config()).await.unwrap();
    let label = NodeLabel::from_token("Graphmill_Probe");
    store.provision_label(&label).await.unwrap();

    store
        .upsert_node_chunk(&label, &[named(0, "TP53"), named(1, "BRCA1")])
        .await
        .unwrap();

    let mut props = PropertyMap::new();
    props.insert("weight".into(), 0.9f64.into());
    let schema = EdgeSchema {
        relation: "probes".into(),
        source: label.clone(),
        target: label.clone(),
        property_columns: vec!["weight".into()],
    };
    store
        .create_edge_chunk(
            &schema,
            &[EdgeRecord {
                source: "0".into(),
                target: "1".into(),
                properties: props,
            }],
        )
        .await
        .unwrap();
}
