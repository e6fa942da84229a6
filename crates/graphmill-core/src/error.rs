//! Error types for schema inference, table reading and graph store access

use std::path::PathBuf;
use thiserror::Error;

/// A filename that does not follow either file grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unrecognized filename {path}: expected <label>.<entity>.nodes.csv or <source>.<relation>.<target>.<entity>.edges.csv")]
    UnrecognizedFilename { path: PathBuf },

    #[error("path has no usable file name: {path}")]
    InvalidPath { path: PathBuf },
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors listing the input files of a directory
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("directory is not valid UTF-8: {path}")]
    NonUtf8Path { path: PathBuf },

    #[error("invalid glob '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Errors reading a CSV file into typed rows
#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: required column '{column}' is missing")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path}: row {row} has no value for '{column}'")]
    MissingValue {
        path: PathBuf,
        row: usize,
        column: String,
    },
}

pub type TableResult<T> = Result<T, TableError>;

/// Errors returned by a [`crate::store::GraphStore`] backend
///
/// Every variant means the transaction that produced it was rolled back.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Schema error: {0}")]
    Schema(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn query<S: Into<String>>(msg: S) -> Self {
        Self::Query(msg.into())
    }

    pub fn transaction<S: Into<String>>(msg: S) -> Self {
        Self::Transaction(msg.into())
    }
}

/// Why a unit of ingestion work (a label group or an edge file) did not load
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("provisioning failed for label '{label}': {source}")]
    Provisioning {
        label: String,
        #[source]
        source: StoreError,
    },

    #[error("chunk {chunk} of {total} failed: {source}")]
    Chunk {
        chunk: usize,
        total: usize,
        #[source]
        source: StoreError,
    },
}
