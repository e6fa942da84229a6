//! Constraint provisioning and chunked upserts
//!
//! A record set is split into chunks of at most `chunk_size` records and each
//! chunk is one [`GraphStore`] transaction, committed in row order. The first
//! chunk that fails is rolled back by the store and ends the batch: earlier
//! chunks stay committed, later chunks are never sent, nothing is retried.

use std::num::NonZeroUsize;
use tracing::{debug, error, info, warn};

use crate::error::IngestError;
use crate::records::{EdgeRecord, NodeRecord};
use crate::schema::NodeLabel;
use crate::store::{EdgeSchema, GraphStore};

/// What to do when constraints/indexes for a label cannot be created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProvisioningPolicy {
    /// Log and continue; schema problems surface later as chunk failures
    #[default]
    BestEffort,
    /// Treat the failure as fatal for the label
    Strict,
}

impl ProvisioningPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            ProvisioningPolicy::Strict
        } else {
            ProvisioningPolicy::BestEffort
        }
    }
}

/// Ensure the uniqueness constraint and indexes for `label` exist.
///
/// Under [`ProvisioningPolicy::BestEffort`] a store failure is logged and
/// `Ok(())` is returned.
pub async fn provision_constraints<S>(
    store: &S,
    label: &NodeLabel,
    policy: ProvisioningPolicy,
) -> Result<(), IngestError>
where
    S: GraphStore + ?Sized,
{
    match store.provision_label(label).await {
        Ok(()) => {
            debug!(label = %label, "Constraints and indexes in place");
            Ok(())
        }
        Err(e) => match policy {
            ProvisioningPolicy::BestEffort => {
                warn!(label = %label, "Provisioning failed, continuing: {}", e);
                Ok(())
            }
            ProvisioningPolicy::Strict => Err(IngestError::Provisioning {
                label: label.to_string(),
                source: e,
            }),
        },
    }
}

/// Number of transactions needed for `records` records
pub fn chunk_count(records: usize, chunk_size: NonZeroUsize) -> usize {
    records.div_ceil(chunk_size.get())
}

/// Totals for a batch whose chunks all committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub records: usize,
    pub chunks: usize,
}

/// Sends record sets to a store one chunk per transaction
pub struct BatchUpserter<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    chunk_size: NonZeroUsize,
}

impl<'a, S: GraphStore + ?Sized> BatchUpserter<'a, S> {
    pub fn new(store: &'a S, chunk_size: NonZeroUsize) -> Self {
        Self { store, chunk_size }
    }

    pub fn chunk_size(&self) -> NonZeroUsize {
        self.chunk_size
    }

    /// Upsert nodes of `label`, stopping at the first failed chunk.
    pub async fn upsert_nodes(
        &self,
        label: &NodeLabel,
        records: &[NodeRecord],
    ) -> Result<BatchSummary, IngestError> {
        let total = chunk_count(records.len(), self.chunk_size);
        info!(
            label = %label,
            records = records.len(),
            chunks = total,
            "Ingesting {} nodes",
            label
        );

        for (index, chunk) in records.chunks(self.chunk_size.get()).enumerate() {
            let number = index + 1;
            if let Err(e) = self.store.upsert_node_chunk(label, chunk).await {
                error!(
                    label = %label,
                    chunk = number,
                    "Node chunk {}/{} rolled back: {}",
                    number,
                    total,
                    e
                );
                return Err(IngestError::Chunk {
                    chunk: number,
                    total,
                    source: e,
                });
            }
            debug!(label = %label, chunk = number, size = chunk.len(), "Committed node chunk");
        }

        Ok(BatchSummary {
            records: records.len(),
            chunks: total,
        })
    }

    /// Create relationships described by `schema`, stopping at the first failed chunk.
    pub async fn create_edges(
        &self,
        schema: &EdgeSchema,
        records: &[EdgeRecord],
    ) -> Result<BatchSummary, IngestError> {
        let total = chunk_count(records.len(), self.chunk_size);
        info!(
            relation = %schema.relation,
            records = records.len(),
            chunks = total,
            "Ingesting {} {} relations",
            records.len(),
            schema.relation
        );

        for (index, chunk) in records.chunks(self.chunk_size.get()).enumerate() {
            let number = index + 1;
            if let Err(e) = self.store.create_edge_chunk(schema, chunk).await {
                error!(
                    relation = %schema.relation,
                    chunk = number,
                    "Edge chunk {}/{} rolled back: {}",
                    number,
                    total,
                    e
                );
                return Err(IngestError::Chunk {
                    chunk: number,
                    total,
                    source: e,
                });
            }
            debug!(relation = %schema.relation, chunk = number, size = chunk.len(), "Committed edge chunk");
        }

        Ok(BatchSummary {
            records: records.len(),
            chunks: total,
        })
    }
}
