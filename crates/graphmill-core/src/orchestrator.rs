//! Directory-level ingestion driver
//!
//! For each directory, in argument order:
//!
//! 1. Node files (`*.nodes.csv`) are classified and grouped by label. Each
//!    group is provisioned, coalesced across its files and upserted. Groups
//!    succeed or fail independently.
//! 2. Edge files (`*.edges.csv`) are classified, read into independent
//!    records and created. The first edge file whose upsert fails stops the
//!    remaining edge files of that directory; other directories continue.
//!
//! Everything runs sequentially on one store: one transaction at a time.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use graphmill_config::{ConfigError, IngestConfig};

use crate::coalesce::{edge_property_columns, edge_records, NodeCoalescer};
use crate::error::{DiscoveryError, DiscoveryResult, IngestError};
use crate::ingest::{provision_constraints, BatchSummary, BatchUpserter, ProvisioningPolicy};
use crate::report::{
    DirectoryReport, EdgeFileReport, IngestReport, NodeGroupReport, Outcome, RejectedFile,
};
use crate::schema::{classify, EdgeFile, FileSpec, NodeFile, NodeLabel, EDGE_FILE_GLOB, NODE_FILE_GLOB};
use crate::store::{EdgeSchema, GraphStore};
use crate::table::CsvTable;

/// Runtime ingestion settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub chunk_size: NonZeroUsize,
    pub provisioning: ProvisioningPolicy,
    pub sort_files: bool,
    pub coerce_edge_numbers: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunk_size: NonZeroUsize::new(graphmill_config::DEFAULT_CHUNK_SIZE)
                .unwrap_or(NonZeroUsize::MIN),
            provisioning: ProvisioningPolicy::BestEffort,
            sort_files: true,
            coerce_edge_numbers: false,
        }
    }
}

impl TryFrom<&IngestConfig> for IngestOptions {
    type Error = ConfigError;

    fn try_from(config: &IngestConfig) -> Result<Self, Self::Error> {
        let chunk_size = NonZeroUsize::new(config.chunk_size).ok_or_else(|| {
            ConfigError::Invalid("ingest.chunk_size must be greater than zero".to_string())
        })?;
        Ok(Self {
            chunk_size,
            provisioning: ProvisioningPolicy::from_strict(config.strict_provisioning),
            sort_files: config.sort_files,
            coerce_edge_numbers: config.coerce_edge_numbers,
        })
    }
}

/// Find files in `directory` matching `pattern` (e.g. `*.nodes.csv`).
pub fn discover(directory: &Path, pattern: &str, sort: bool) -> DiscoveryResult<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: directory.to_path_buf(),
        });
    }
    let dir = directory.to_str().ok_or_else(|| DiscoveryError::NonUtf8Path {
        path: directory.to_path_buf(),
    })?;
    let full = format!("{}/{}", glob::Pattern::escape(dir), pattern);

    let entries = glob::glob(&full).map_err(|source| DiscoveryError::Pattern {
        pattern: full.clone(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => warn!("Skipping unreadable entry: {}", e),
        }
    }
    if sort {
        paths.sort();
    }
    Ok(paths)
}

/// Group node files by label, keeping first-seen label order and file order.
fn group_by_label(files: Vec<NodeFile>) -> Vec<(NodeLabel, Vec<NodeFile>)> {
    let mut groups: Vec<(NodeLabel, Vec<NodeFile>)> = Vec::new();
    for file in files {
        match groups.iter_mut().find(|(label, _)| *label == file.label) {
            Some((_, group)) => group.push(file),
            None => groups.push((file.label.clone(), vec![file])),
        }
    }
    groups
}

/// Sequential, single-writer ingestion driver
pub struct Orchestrator<S: GraphStore> {
    store: S,
    options: IngestOptions,
}

impl<S: GraphStore> Orchestrator<S> {
    pub fn new(store: S, options: IngestOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Ingest every directory in order. Never stops early: failures are
    /// recorded per directory.
    pub async fn run<P: AsRef<Path>>(&self, directories: &[P]) -> IngestReport {
        let mut report = IngestReport::default();
        for directory in directories {
            report
                .directories
                .push(self.ingest_directory(directory.as_ref()).await);
        }
        report
    }

    /// Node phase then edge phase for one directory.
    pub async fn ingest_directory(&self, directory: &Path) -> DirectoryReport {
        info!(
            directory = %directory.display(),
            backend = self.store.backend_name(),
            "Ingesting directory"
        );

        let discovered = discover(directory, NODE_FILE_GLOB, self.options.sort_files).and_then(
            |nodes| {
                discover(directory, EDGE_FILE_GLOB, self.options.sort_files)
                    .map(|edges| (nodes, edges))
            },
        );
        let (node_paths, edge_paths) = match discovered {
            Ok(paths) => paths,
            Err(e) => {
                error!(directory = %directory.display(), "Cannot scan directory: {}", e);
                return DirectoryReport::failed(directory.to_path_buf(), e.to_string());
            }
        };

        let mut report = DirectoryReport::new(directory.to_path_buf());

        let mut node_files = Vec::new();
        for path in node_paths {
            match classify(&path) {
                Ok(FileSpec::Node(file)) => node_files.push(file),
                Ok(FileSpec::Edge(_)) => reject(&mut report, path, "edge grammar in node file pass".into()),
                Err(e) => reject(&mut report, path, e.to_string()),
            }
        }

        for (label, files) in group_by_label(node_files) {
            let outcome = match self.ingest_node_group(&label, &files).await {
                Ok(summary) => Outcome::Loaded {
                    records: summary.records,
                    chunks: summary.chunks,
                },
                Err(e) => {
                    error!(label = %label, "Node ingestion failed: {}", e);
                    Outcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            report.nodes.push(NodeGroupReport {
                label,
                files: files.into_iter().map(|f| f.path).collect(),
                outcome,
            });
        }

        let mut edge_files = Vec::new();
        for path in edge_paths {
            match classify(&path) {
                Ok(FileSpec::Edge(file)) => edge_files.push(file),
                Ok(FileSpec::Node(_)) => reject(&mut report, path, "node grammar in edge file pass".into()),
                Err(e) => reject(&mut report, path, e.to_string()),
            }
        }

        for file in edge_files {
            if report.edges_halted {
                report.edges.push(EdgeFileReport {
                    path: file.path,
                    relation: file.relation,
                    outcome: Outcome::Skipped,
                });
                continue;
            }

            let outcome = match self.ingest_edge_file(&file).await {
                Ok(summary) => Outcome::Loaded {
                    records: summary.records,
                    chunks: summary.chunks,
                },
                Err(e) => {
                    error!(path = %file.path.display(), "Edge ingestion failed: {}", e);
                    // Only a failed upsert halts the edge phase; unreadable files do not
                    if matches!(e, IngestError::Chunk { .. }) {
                        warn!(
                            directory = %directory.display(),
                            "Stopping remaining edge files in directory"
                        );
                        report.edges_halted = true;
                    }
                    Outcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            report.edges.push(EdgeFileReport {
                path: file.path,
                relation: file.relation,
                outcome,
            });
        }

        info!(
            directory = %directory.display(),
            nodes = report.nodes_loaded(),
            edges = report.edges_loaded(),
            failures = report.failure_count(),
            "Directory complete"
        );
        report
    }

    async fn ingest_node_group(
        &self,
        label: &NodeLabel,
        files: &[NodeFile],
    ) -> Result<BatchSummary, IngestError> {
        provision_constraints(&self.store, label, self.options.provisioning).await?;

        // Read every file before writing: a partial merge would be written as a full replace
        let mut coalescer = NodeCoalescer::new();
        for file in files {
            debug!(path = %file.path.display(), entity = %file.entity, "Reading node file");
            let table = CsvTable::read(&file.path)?;
            coalescer.absorb_table(&table);
        }
        let records = coalescer.into_records();

        BatchUpserter::new(&self.store, self.options.chunk_size)
            .upsert_nodes(label, &records)
            .await
    }

    async fn ingest_edge_file(&self, file: &EdgeFile) -> Result<BatchSummary, IngestError> {
        debug!(path = %file.path.display(), entity = %file.entity, "Reading edge file");
        let table = CsvTable::read(&file.path)?;
        let records = edge_records(&table, self.options.coerce_edge_numbers)?;
        let schema = EdgeSchema::from_file(file, edge_property_columns(&table));

        BatchUpserter::new(&self.store, self.options.chunk_size)
            .create_edges(&schema, &records)
            .await
    }
}

fn reject(report: &mut DirectoryReport, path: PathBuf, reason: String) {
    warn!(path = %path.display(), "Skipping file: {}", reason);
    report.rejected.push(RejectedFile { path, reason });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryGraphStore;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn options_from_config() {
        let mut config = IngestConfig::default();
        config.chunk_size = 3;
        config.strict_provisioning = true;
        let options = IngestOptions::try_from(&config).unwrap();
        assert_eq!(options.chunk_size.get(), 3);
        assert_eq!(options.provisioning, ProvisioningPolicy::Strict);

        config.chunk_size = 0;
        assert!(IngestOptions::try_from(&config).is_err());
    }

    #[test]
    fn discover_sorts_and_filters() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.v1.nodes.csv", "x\n");
        write(dir.path(), "a.v1.nodes.csv", "x\n");
        write(dir.path(), "a.r.b.v1.edges.csv", "source,target\n");

        let nodes = discover(dir.path(), NODE_FILE_GLOB, true).unwrap();
        let names: Vec<_> = nodes
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.v1.nodes.csv", "b.v1.nodes.csv"]);
    }

    #[test]
    fn discover_escapes_glob_characters_in_directory() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("batch[1]");
        fs::create_dir(&dir).unwrap();
        write(&dir, "Gene.v1.nodes.csv", "name\nTP53\n");
        assert_eq!(discover(&dir, NODE_FILE_GLOB, true).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn node_groups_merge_across_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Gene.a.nodes.csv", "name,score\nTP53,1\nBRCA1,2\n");
        write(dir.path(), "Gene.b.nodes.csv", "score\n10\n");

        let store = InMemoryGraphStore::new();
        let orchestrator = Orchestrator::new(store.clone(), IngestOptions::default());
        let report = orchestrator.ingest_directory(dir.path()).await;

        assert!(report.is_success());
        assert_eq!(report.nodes.len(), 1);
        assert_eq!(report.nodes[0].files.len(), 2);
        assert_eq!(store.provision_count(), 1);

        let gene = NodeLabel::from_token("Gene");
        let first = store.node(&gene, "0").unwrap();
        assert_eq!(first.get("name").and_then(|v| v.as_str()), Some("TP53"));
        assert_eq!(first.get("score").and_then(|v| v.as_i64()), Some(10));
        let second = store.node(&gene, "1").unwrap();
        assert_eq!(second.get("score").and_then(|v| v.as_i64()), Some(2));
    }

    #[tokio::test]
    async fn unrecognized_file_is_reported_and_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Gene.nodes.csv", "name\nTP53\n");
        write(dir.path(), "Drug.v1.nodes.csv", "name\naspirin\n");

        let store = InMemoryGraphStore::new();
        let orchestrator = Orchestrator::new(store.clone(), IngestOptions::default());
        let report = orchestrator.ingest_directory(dir.path()).await;

        assert_eq!(report.rejected.len(), 1);
        assert!(report.rejected[0].path.ends_with("Gene.nodes.csv"));
        assert_eq!(store.node_count(&NodeLabel::from_token("Drug")), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn discover_reports_typed_errors() {
        let missing = Path::new("/nonexistent/graphmill-input");
        assert!(matches!(
            discover(missing, NODE_FILE_GLOB, true),
            Err(DiscoveryError::NotADirectory { .. })
        ));

        let dir = TempDir::new().unwrap();
        assert!(matches!(
            discover(dir.path(), "***", true),
            Err(DiscoveryError::Pattern { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn discover_rejects_non_utf8_directory() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = TempDir::new().unwrap();
        let dir = root.path().join(OsStr::from_bytes(b"batch-\xff"));
        if fs::create_dir(&dir).is_err() {
            // Some filesystems refuse non-UTF-8 names
            return;
        }
        assert!(matches!(
            discover(&dir, NODE_FILE_GLOB, true),
            Err(DiscoveryError::NonUtf8Path { .. })
        ));
    }

    #[tokio::test]
    async fn missing_directory_is_a_directory_error() {
        let store = InMemoryGraphStore::new();
        let orchestrator = Orchestrator::new(store, IngestOptions::default());
        let report = orchestrator
            .run(&[PathBuf::from("/nonexistent/graphmill-input")])
            .await;
        assert!(!report.is_success());
        let error = report.directories[0].error.as_deref().unwrap();
        assert!(error.starts_with("not a directory"), "error: {error}");
    }
}
