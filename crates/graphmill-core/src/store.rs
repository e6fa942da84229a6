//! Graph store abstraction
//!
//! Business logic depends on [`GraphStore`], not on a particular database.
//! Each method is one transaction: the backend opens it, runs the statements
//! for exactly the data passed in, and either commits or rolls back before
//! returning. No transaction outlives a call, so callers never juggle
//! session or transaction handles.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::records::{EdgeRecord, NodeRecord};
use crate::schema::{EdgeFile, NodeLabel};

/// Shape of the relationships in one edge file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSchema {
    pub relation: String,
    pub source: NodeLabel,
    pub target: NodeLabel,
    /// Relationship property columns (every CSV column except source/target)
    pub property_columns: Vec<String>,
}

impl EdgeSchema {
    pub fn from_file(file: &EdgeFile, property_columns: Vec<String>) -> Self {
        Self {
            relation: file.relation.clone(),
            source: file.source_type.clone(),
            target: file.target_type.clone(),
            property_columns,
        }
    }
}

/// Transactional graph database operations needed by the loader
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Short backend name for log lines
    fn backend_name(&self) -> &'static str;

    /// Ensure, in one transaction, a uniqueness constraint on `id` plus
    /// indexes on `id` and `label` for `label`.
    ///
    /// Must be idempotent: existing constraints/indexes are not an error.
    async fn provision_label(&self, label: &NodeLabel) -> StoreResult<()>;

    /// Upsert one chunk of nodes in one transaction.
    ///
    /// Each record finds-or-creates the node with its `id` under `label` and
    /// then replaces the node's entire property set with the record's fields.
    async fn upsert_node_chunk(&self, label: &NodeLabel, chunk: &[NodeRecord]) -> StoreResult<()>;

    /// Create one chunk of relationships in one transaction.
    ///
    /// Endpoints are found-or-created by `id`; the relationship itself is
    /// always created, so re-running a file duplicates relationships.
    async fn create_edge_chunk(&self, schema: &EdgeSchema, chunk: &[EdgeRecord])
        -> StoreResult<()>;
}

#[async_trait]
impl<S: GraphStore + ?Sized> GraphStore for std::sync::Arc<S> {
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    async fn provision_label(&self, label: &NodeLabel) -> StoreResult<()> {
        (**self).provision_label(label).await
    }

    async fn upsert_node_chunk(&self, label: &NodeLabel, chunk: &[NodeRecord]) -> StoreResult<()> {
        (**self).upsert_node_chunk(label, chunk).await
    }

    async fn create_edge_chunk(
        &self,
        schema: &EdgeSchema,
        chunk: &[EdgeRecord],
    ) -> StoreResult<()> {
        (**self).create_edge_chunk(schema, chunk).await
    }
}
