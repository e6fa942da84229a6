//! Config resolution, backend selection and the ingestion run

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info};

use graphmill_config::{Backend, ConfigLoader, GraphmillConfig};
use graphmill_core::{GraphStore, IngestOptions, IngestReport, Orchestrator};

use crate::cli::Cli;

/// Resolve configuration, connect the selected backend and ingest every
/// directory argument. Failures inside the run are in the report; only setup
/// problems (config, connection) are returned as errors.
pub async fn run(cli: &Cli) -> Result<IngestReport> {
    let mut config = ConfigLoader::new()
        .load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    let options = IngestOptions::try_from(&config.ingest)?;
    let directories = cli.directory_paths();

    info!(
        backend = %config.database.backend,
        chunk_size = options.chunk_size.get(),
        directories = directories.len(),
        "Starting ingestion"
    );

    let report = match config.database.backend {
        Backend::Neo4j => run_neo4j(&config, options, &directories).await?,
        Backend::Surrealdb => run_surrealdb(&config, options, &directories).await?,
    };

    log_summary(&report);
    Ok(report)
}

async fn ingest<S: GraphStore>(
    store: S,
    options: IngestOptions,
    directories: &[PathBuf],
) -> IngestReport {
    Orchestrator::new(store, options).run(directories).await
}

#[cfg(feature = "neo4j")]
async fn run_neo4j(
    config: &GraphmillConfig,
    options: IngestOptions,
    directories: &[PathBuf],
) -> Result<IngestReport> {
    let store = graphmill_neo4j::Neo4jGraphStore::connect(&config.database)
        .await
        .context("Failed to connect to Neo4j")?;
    Ok(ingest(store, options, directories).await)
}

#[cfg(not(feature = "neo4j"))]
async fn run_neo4j(
    _config: &GraphmillConfig,
    _options: IngestOptions,
    _directories: &[PathBuf],
) -> Result<IngestReport> {
    anyhow::bail!("graphmill was built without the neo4j backend")
}

#[cfg(feature = "surrealdb")]
async fn run_surrealdb(
    config: &GraphmillConfig,
    options: IngestOptions,
    directories: &[PathBuf],
) -> Result<IngestReport> {
    let store = graphmill_surrealdb::SurrealGraphStore::connect(&config.database)
        .await
        .context("Failed to open SurrealDB")?;
    Ok(ingest(store, options, directories).await)
}

#[cfg(not(feature = "surrealdb"))]
async fn run_surrealdb(
    _config: &GraphmillConfig,
    _options: IngestOptions,
    _directories: &[PathBuf],
) -> Result<IngestReport> {
    anyhow::bail!("graphmill was built without the surrealdb backend")
}

fn log_summary(report: &IngestReport) {
    let nodes: usize = report.directories.iter().map(|d| d.nodes_loaded()).sum();
    let relationships: usize = report.directories.iter().map(|d| d.edges_loaded()).sum();

    if report.is_success() {
        info!(nodes, relationships, "Ingestion complete");
    } else {
        error!(
            nodes,
            relationships,
            failures = report.failure_count(),
            "Ingestion finished with failures"
        );
    }
}
