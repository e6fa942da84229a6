//! # Graphmill Core
//!
//! Loads directories of CSV files into a labeled property graph. File names
//! carry the schema, rows sharing a position coalesce into one node, and
//! records go to the database in bounded, individually committed chunks so a
//! failure never leaves a half-written chunk behind.
//!
//! ## Architecture
//!
//! - [`schema`]: filename grammar → [`FileSpec`]
//! - [`table`]: CSV reading with per-column type inference
//! - [`coalesce`]: row merging into [`NodeRecord`]s and [`EdgeRecord`]s
//! - [`store`]: the [`GraphStore`] trait backends implement
//! - [`ingest`]: constraint provisioning and chunked upserts
//! - [`orchestrator`]: per-directory sequencing and reporting
//!
//! Backends live in their own crates (`graphmill-neo4j`, `graphmill-surrealdb`);
//! this crate depends only on the trait.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use graphmill_core::{IngestOptions, Orchestrator};
//!
//! let orchestrator = Orchestrator::new(store, IngestOptions::default());
//! let report = orchestrator.run(&["data/"]).await;
//! assert!(report.is_success());
//! ```

pub mod coalesce;
pub mod error;
pub mod ingest;
pub mod orchestrator;
pub mod records;
pub mod report;
pub mod schema;
pub mod store;
pub mod table;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use coalesce::{coalesce_rows, edge_property_columns, edge_records, NodeCoalescer};
pub use error::{
    DiscoveryError, DiscoveryResult, IngestError, SchemaError, SchemaResult, StoreError,
    StoreResult, TableError, TableResult,
};
pub use ingest::{chunk_count, provision_constraints, BatchSummary, BatchUpserter, ProvisioningPolicy};
pub use orchestrator::{discover, IngestOptions, Orchestrator};
pub use records::{EdgeRecord, NodeRecord, PropertyMap, PropertyValue, ID_PROPERTY};
pub use report::{
    DirectoryReport, EdgeFileReport, IngestReport, NodeGroupReport, Outcome, RejectedFile,
};
pub use schema::{classify, EdgeFile, FileSpec, NodeFile, NodeLabel};
pub use store::{EdgeSchema, GraphStore};
pub use table::{ColumnType, CsvTable};
