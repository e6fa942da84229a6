//! Neo4j backend for graphmill
//!
//! Renders Cypher with quoted identifiers and sends every chunk as a `$batch`
//! list parameter through `neo4rs`.

pub mod cypher;
mod error;
mod params;
mod store;

pub use error::{Neo4jError, Neo4jResult};
pub use store::Neo4jGraphStore;
