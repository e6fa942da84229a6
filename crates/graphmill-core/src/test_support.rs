//! In-memory graph store for testing
//!
//! [`InMemoryGraphStore`] reproduces the observable semantics the loader relies
//! on, without a database:
//!
//! - **Upsert**: a node is keyed by `(label, id)`; writing it replaces its whole
//!   property set
//! - **Create**: every relationship write appends, so re-runs duplicate
//! - **Atomic chunks**: a failing transaction applies nothing
//! - **Error injection**: fail the k-th chunk transaction or every provisioning call
//! - **Observable**: transaction and provisioning counters for assertions
//!
//! # Examples
//!
//! ```rust
//! use graphmill_core::test_support::InMemoryGraphStore;
//! use graphmill_core::{GraphStore, NodeLabel, NodeRecord, PropertyMap};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryGraphStore::new();
//! let label = NodeLabel::from_token("Gene");
//! store.upsert_node_chunk(&label, &[NodeRecord::new(0, PropertyMap::new())]).await?;
//! assert_eq!(store.node_count(&label), 1);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use crate::error::{StoreError, StoreResult};
use crate::records::{EdgeRecord, NodeRecord, PropertyMap, PropertyValue, ID_PROPERTY};
use crate::schema::NodeLabel;
use crate::store::{EdgeSchema, GraphStore};

/// A relationship as stored by [`InMemoryGraphStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRelationship {
    pub relation: String,
    pub source_label: String,
    pub source_id: String,
    pub target_label: String,
    pub target_id: String,
    pub properties: PropertyMap,
}

#[derive(Debug, Default)]
struct InMemoryState {
    nodes: BTreeMap<(String, String), PropertyMap>,
    relationships: Vec<StoredRelationship>,
    constraints: BTreeSet<String>,
    transactions: usize,
    provisions: usize,
    fail_on: BTreeSet<usize>,
    fail_provisioning: bool,
}

impl InMemoryState {
    /// Count a chunk transaction and decide whether it is injected to fail
    fn begin(&mut self) -> StoreResult<()> {
        self.transactions += 1;
        if self.fail_on.contains(&self.transactions) {
            return Err(StoreError::transaction(format!(
                "injected failure in transaction {}",
                self.transactions
            )));
        }
        Ok(())
    }

    fn ensure_node(&mut self, label: &str, id: &str) {
        self.nodes
            .entry((label.to_string(), id.to_string()))
            .or_insert_with(|| {
                let mut props = PropertyMap::new();
                props.insert(ID_PROPERTY.to_string(), PropertyValue::Text(id.to_string()));
                props
            });
    }
}

/// Thread-safe in-memory [`GraphStore`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraphStore {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `n`-th chunk transaction (1-based, counted across nodes and edges) fail.
    pub fn fail_transaction(&self, n: usize) {
        self.state.lock().unwrap().fail_on.insert(n);
    }

    /// Make every provisioning call fail (or stop failing).
    pub fn fail_provisioning(&self, enabled: bool) {
        self.state.lock().unwrap().fail_provisioning = enabled;
    }

    /// Chunk transactions attempted so far, failed ones included
    pub fn transaction_count(&self) -> usize {
        self.state.lock().unwrap().transactions
    }

    /// Provisioning transactions attempted so far
    pub fn provision_count(&self) -> usize {
        self.state.lock().unwrap().provisions
    }

    pub fn node(&self, label: &NodeLabel, id: &str) -> Option<PropertyMap> {
        self.state
            .lock()
            .unwrap()
            .nodes
            .get(&(label.as_str().to_string(), id.to_string()))
            .cloned()
    }

    pub fn node_count(&self, label: &NodeLabel) -> usize {
        self.state
            .lock()
            .unwrap()
            .nodes
            .keys()
            .filter(|(l, _)| l == label.as_str())
            .count()
    }

    pub fn relationships(&self, relation: &str) -> Vec<StoredRelationship> {
        self.state
            .lock()
            .unwrap()
            .relationships
            .iter()
            .filter(|r| r.relation == relation)
            .cloned()
            .collect()
    }

    pub fn relationship_count(&self, relation: &str) -> usize {
        self.relationships(relation).len()
    }

    pub fn has_constraint(&self, name: &str) -> bool {
        self.state.lock().unwrap().constraints.contains(name)
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn provision_label(&self, label: &NodeLabel) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.provisions += 1;
        if state.fail_provisioning {
            return Err(StoreError::Schema(format!(
                "injected provisioning failure for {}",
                label
            )));
        }
        let suffix = label.index_suffix();
        for prefix in ["unique_id", "index_id", "index_label"] {
            state.constraints.insert(format!("{}_{}", prefix, suffix));
        }
        Ok(())
    }

    async fn upsert_node_chunk(&self, label: &NodeLabel, chunk: &[NodeRecord]) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        for record in chunk {
            state.nodes.insert(
                (label.as_str().to_string(), record.id.clone()),
                record.to_property_map(),
            );
        }
        Ok(())
    }

    async fn create_edge_chunk(
        &self,
        schema: &EdgeSchema,
        chunk: &[EdgeRecord],
    ) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        for record in chunk {
            state.ensure_node(schema.source.as_str(), &record.source);
            state.ensure_node(schema.target.as_str(), &record.target);
            let properties = record
                .properties
                .iter()
                .filter(|(k, _)| schema.property_columns.contains(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            state.relationships.push(StoredRelationship {
                relation: schema.relation.clone(),
                source_label: schema.source.as_str().to_string(),
                source_id: record.source.clone(),
                target_label: schema.target.as_str().to_string(),
                target_id: record.target.clone(),
                properties,
            });
        }
        Ok(())
    }
}
