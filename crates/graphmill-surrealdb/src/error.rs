//! SurrealDB backend errors

use graphmill_core::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurrealError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SurrealResult<T> = Result<T, SurrealError>;

impl From<SurrealError> for StoreError {
    fn from(err: SurrealError) -> Self {
        match err {
            SurrealError::Connection(msg) => StoreError::Connection(msg),
            SurrealError::Query(msg) => StoreError::Query(msg),
            SurrealError::Serialization(e) => StoreError::Query(e.to_string()),
        }
    }
}
