//! Filename-as-schema inference
//!
//! Input files carry their graph schema in their names:
//!
//! - Node files: `<label>.<entity>.nodes.csv`
//! - Edge files: `<source_type>.<relation>.<target_type>.<entity>.edges.csv`
//!
//! [`classify`] turns a path into a [`FileSpec`]. The two grammars are mutually
//! exclusive (they differ in the `nodes`/`edges` suffix and in segment count),
//! and a name matching neither is an [`SchemaError::UnrecognizedFilename`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{SchemaError, SchemaResult};

/// Glob suffix for node files
pub const NODE_FILE_GLOB: &str = "*.nodes.csv";
/// Glob suffix for edge files
pub const EDGE_FILE_GLOB: &str = "*.edges.csv";

static NODE_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<label>[^.]+)\.(?P<entity>[^.]+)\.nodes\.csv$")
        .expect("node filename pattern is valid")
});

static EDGE_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<source>[^.]+)\.(?P<relation>[^.]+)\.(?P<target>[^.]+)\.(?P<entity>[^.]+)\.edges\.csv$",
    )
    .expect("edge filename pattern is valid")
});

/// A graph node label recovered from a filename token.
///
/// Underscores in the token become spaces in the label, so `Gene_Product`
/// labels nodes as `Gene Product`. The underscore form is kept as the suffix
/// for constraint and index names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeLabel(String);

impl NodeLabel {
    /// Build a label from a raw filename token.
    pub fn from_token(token: &str) -> Self {
        Self(token.replace('_', " "))
    }

    /// Display / graph label text (spaces, not underscores)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Suffix used in constraint and index names, e.g. `unique_id_Gene_Product`
    pub fn index_suffix(&self) -> String {
        self.0.replace(' ', "_")
    }

    /// Whether the label has more than one word and therefore must be quoted
    pub fn is_multi_word(&self) -> bool {
        self.0.split(' ').count() > 1
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file holding node rows for one label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFile {
    pub directory: PathBuf,
    pub label: NodeLabel,
    pub entity: String,
    pub path: PathBuf,
}

/// A file holding relationship rows of one type between two labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeFile {
    pub directory: PathBuf,
    pub source_type: NodeLabel,
    pub relation: String,
    pub target_type: NodeLabel,
    pub entity: String,
    pub path: PathBuf,
}

/// Parsed schema of an input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSpec {
    Node(NodeFile),
    Edge(EdgeFile),
}

impl FileSpec {
    pub fn path(&self) -> &Path {
        match self {
            FileSpec::Node(node) => &node.path,
            FileSpec::Edge(edge) => &edge.path,
        }
    }
}

/// Classify `path` as a node or edge file from its name alone.
///
/// This is a pure function: the file is never opened.
pub fn classify(path: &Path) -> SchemaResult<FileSpec> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| SchemaError::InvalidPath {
            path: path.to_path_buf(),
        })?;
    let directory = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    if let Some(caps) = NODE_FILE_RE.captures(file_name) {
        return Ok(FileSpec::Node(NodeFile {
            directory,
            label: NodeLabel::from_token(&caps["label"]),
            entity: caps["entity"].to_string(),
            path: path.to_path_buf(),
        }));
    }

    if let Some(caps) = EDGE_FILE_RE.captures(file_name) {
        return Ok(FileSpec::Edge(EdgeFile {
            directory,
            source_type: NodeLabel::from_token(&caps["source"]),
            relation: caps["relation"].to_string(),
            target_type: NodeLabel::from_token(&caps["target"]),
            entity: caps["entity"].to_string(),
            path: path.to_path_buf(),
        }));
    }

    Err(SchemaError::UnrecognizedFilename {
        path: path.to_path_buf(),
    })
}
