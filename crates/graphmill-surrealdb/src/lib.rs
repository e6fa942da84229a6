//! Embedded SurrealDB backend for graphmill
//!
//! Labels map to tables, node ids to record keys and relationship types to
//! edge tables created with `RELATE`. Intended for local runs and tests; it
//! needs no server.

mod client;
mod error;
pub mod surql;
mod store;

pub use client::{SurrealClient, MEMORY_PATH};
pub use error::{SurrealError, SurrealResult};
pub use store::SurrealGraphStore;
