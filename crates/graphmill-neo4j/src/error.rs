//! Neo4j backend errors

use graphmill_core::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Neo4jError {
    #[error("invalid connection settings: {0}")]
    Config(#[source] neo4rs::Error),

    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: neo4rs::Error,
    },

    #[error("failed to begin transaction: {0}")]
    Begin(#[source] neo4rs::Error),

    #[error("statement failed: {0}")]
    Statement(#[source] neo4rs::Error),

    #[error("commit failed: {0}")]
    Commit(#[source] neo4rs::Error),
}

pub type Neo4jResult<T> = Result<T, Neo4jError>;

impl From<Neo4jError> for StoreError {
    fn from(err: Neo4jError) -> Self {
        match err {
            Neo4jError::Config(_) | Neo4jError::Connect { .. } => {
                StoreError::Connection(err.to_string())
            }
            Neo4jError::Statement(_) => StoreError::Query(err.to_string()),
            Neo4jError::Begin(_) | Neo4jError::Commit(_) => StoreError::Transaction(err.to_string()),
        }
    }
}
