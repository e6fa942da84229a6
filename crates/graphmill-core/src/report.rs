//! Ingestion results
//!
//! Failures never escape the per-file/per-label unit that produced them; they
//! are recorded here instead, and the caller decides what a failed run means
//! (the CLI maps it to a non-zero exit status).

use std::path::PathBuf;

use crate::schema::NodeLabel;

/// Result of one unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every chunk committed
    Loaded { records: usize, chunks: usize },
    /// The unit stopped; committed chunks before the failure remain
    Failed { reason: String },
    /// Not attempted because an earlier edge file in the directory failed
    Skipped,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// All node files sharing a label, loaded as one coalesced record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGroupReport {
    pub label: NodeLabel,
    pub files: Vec<PathBuf>,
    pub outcome: Outcome,
}

/// One edge file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeFileReport {
    pub path: PathBuf,
    pub relation: String,
    pub outcome: Outcome,
}

/// A discovered file whose name follows neither grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything that happened in one input directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryReport {
    pub directory: PathBuf,
    /// Set when the directory itself could not be scanned
    pub error: Option<String>,
    pub nodes: Vec<NodeGroupReport>,
    pub edges: Vec<EdgeFileReport>,
    pub rejected: Vec<RejectedFile>,
    /// Whether an edge failure stopped the remaining edge files
    pub edges_halted: bool,
}

impl DirectoryReport {
    pub fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            error: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            rejected: Vec::new(),
            edges_halted: false,
        }
    }

    pub fn failed(directory: PathBuf, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(directory)
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
            && self.rejected.is_empty()
            && !self.nodes.iter().any(|n| n.outcome.is_failure())
            && !self.edges.iter().any(|e| e.outcome.is_failure())
    }

    /// Node records committed across all label groups
    pub fn nodes_loaded(&self) -> usize {
        self.nodes
            .iter()
            .filter_map(|n| match n.outcome {
                Outcome::Loaded { records, .. } => Some(records),
                _ => None,
            })
            .sum()
    }

    /// Relationship records committed across all edge files
    pub fn edges_loaded(&self) -> usize {
        self.edges
            .iter()
            .filter_map(|e| match e.outcome {
                Outcome::Loaded { records, .. } => Some(records),
                _ => None,
            })
            .sum()
    }

    /// Number of failed units plus rejected files and directory errors
    pub fn failure_count(&self) -> usize {
        usize::from(self.error.is_some())
            + self.rejected.len()
            + self.nodes.iter().filter(|n| n.outcome.is_failure()).count()
            + self.edges.iter().filter(|e| e.outcome.is_failure()).count()
    }
}

/// Results for a whole run, one entry per directory argument in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub directories: Vec<DirectoryReport>,
}

impl IngestReport {
    pub fn is_success(&self) -> bool {
        self.directories.iter().all(DirectoryReport::is_success)
    }

    pub fn failure_count(&self) -> usize {
        self.directories.iter().map(DirectoryReport::failure_count).sum()
    }
}
