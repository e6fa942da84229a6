//! End-to-end pipeline tests against the in-memory store
//!
//! These exercise discovery → classification → coalescing → chunked upsert
//! with real files on disk and injected transaction failures.

use graphmill_core::test_support::InMemoryGraphStore;
use graphmill_core::{
    IngestOptions, NodeLabel, Orchestrator, Outcome, PropertyValue, ProvisioningPolicy,
};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("Failed to write fixture");
}

fn options(chunk_size: usize) -> IngestOptions {
    IngestOptions {
        chunk_size: NonZeroUsize::new(chunk_size).unwrap(),
        ..IngestOptions::default()
    }
}

fn gene() -> NodeLabel {
    NodeLabel::from_token("Gene")
}

#[tokio::test]
async fn gene_regulation_scenario() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Gene.v1.nodes.csv", "name\nTP53\nBRCA1\n");
    write(
        dir.path(),
        "Gene.regulates.Gene.v1.edges.csv",
        "source,target,weight\n0,1,0.9\n",
    );

    let store = InMemoryGraphStore::new();
    let report = Orchestrator::new(store.clone(), IngestOptions::default())
        .run(&[dir.path()])
        .await;

    assert!(report.is_success(), "report: {report:?}");
    assert_eq!(store.node_count(&gene()), 2);
    let tp53 = store.node(&gene(), "0").unwrap();
    assert_eq!(tp53.get("id"), Some(&PropertyValue::Text("0".into())));
    assert_eq!(tp53.get("name"), Some(&PropertyValue::Text("TP53".into())));
    assert_eq!(
        store.node(&gene(), "1").unwrap().get("name"),
        Some(&PropertyValue::Text("BRCA1".into()))
    );

    let rels = store.relationships("regulates");
    assert_eq!(rels.len(), 1);
    assert_eq!(rels[0].source_id, "0");
    assert_eq!(rels[0].target_id, "1");
    // Edge properties keep their CSV type by default
    assert_eq!(rels[0].properties.get("weight"), Some(&PropertyValue::Float(0.9)));
    // Endpoints existed, nothing extra was created
    assert_eq!(store.node_count(&gene()), 2);
}

#[tokio::test]
async fn edge_weight_truncates_when_coercion_enabled() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Gene.v1.nodes.csv", "name\nTP53\nBRCA1\n");
    write(
        dir.path(),
        "Gene.regulates.Gene.v1.edges.csv",
        "source,target,weight\n0,1,0.9\n",
    );

    let store = InMemoryGraphStore::new();
    let opts = IngestOptions {
        coerce_edge_numbers: true,
        ..IngestOptions::default()
    };
    Orchestrator::new(store.clone(), opts).run(&[dir.path()]).await;

    let rels = store.relationships("regulates");
    assert_eq!(rels[0].properties.get("weight"), Some(&PropertyValue::Integer(0)));
}

#[tokio::test]
async fn reingesting_nodes_replaces_properties_without_duplicates() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Gene.v1.nodes.csv", "name,score\nTP53,5\nBRCA1,7\n");

    let store = InMemoryGraphStore::new();
    let orchestrator = Orchestrator::new(store.clone(), IngestOptions::default());
    orchestrator.run(&[dir.path()]).await;
    assert_eq!(
        store.node(&gene(), "0").unwrap().get("score"),
        Some(&PropertyValue::Integer(5))
    );

    // Same ids, score column dropped
    write(dir.path(), "Gene.v1.nodes.csv", "name\nTP53\nBRCA1\n");
    let report = orchestrator.run(&[dir.path()]).await;

    assert!(report.is_success());
    assert_eq!(store.node_count(&gene()), 2);
    let node = store.node(&gene(), "0").unwrap();
    assert!(node.get("score").is_none(), "full replace must erase omitted fields");
    assert_eq!(node.get("name"), Some(&PropertyValue::Text("TP53".into())));
}

#[tokio::test]
async fn reingesting_edges_duplicates_relationships() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Gene.v1.nodes.csv", "name\nTP53\nBRCA1\n");
    write(
        dir.path(),
        "Gene.regulates.Gene.v1.edges.csv",
        "source,target\n0,1\n1,0\n",
    );

    let store = InMemoryGraphStore::new();
    let orchestrator = Orchestrator::new(store.clone(), IngestOptions::default());
    orchestrator.run(&[dir.path()]).await;
    assert_eq!(store.relationship_count("regulates"), 2);

    orchestrator.run(&[dir.path()]).await;
    assert_eq!(store.relationship_count("regulates"), 4);
    assert_eq!(store.node_count(&gene()), 2);
}

#[tokio::test]
async fn chunk_failure_commits_only_earlier_chunks() {
    let dir = TempDir::new().unwrap();
    let rows: String = (0..10).map(|i| format!("gene-{i}\n")).collect();
    write(dir.path(), "Gene.v1.nodes.csv", &format!("name\n{rows}"));

    let store = InMemoryGraphStore::new();
    // 10 records, chunk size 3 → 4 transactions; fail the 3rd
    store.fail_transaction(3);
    let report = Orchestrator::new(store.clone(), options(3))
        .run(&[dir.path()])
        .await;

    let outcome = &report.directories[0].nodes[0].outcome;
    assert!(outcome.is_failure());
    assert_eq!(store.transaction_count(), 3);
    assert_eq!(store.node_count(&gene()), 6);
    assert!(store.node(&gene(), "5").is_some());
    assert!(store.node(&gene(), "6").is_none());
}

#[tokio::test]
async fn ceil_chunks_per_record_set() {
    let dir = TempDir::new().unwrap();
    let rows: String = (0..7).map(|i| format!("g{i}\n")).collect();
    write(dir.path(), "Gene.v1.nodes.csv", &format!("name\n{rows}"));

    let store = InMemoryGraphStore::new();
    let report = Orchestrator::new(store.clone(), options(2))
        .run(&[dir.path()])
        .await;

    assert_eq!(
        report.directories[0].nodes[0].outcome,
        Outcome::Loaded { records: 7, chunks: 4 }
    );
    assert_eq!(store.transaction_count(), 4);
}

#[tokio::test]
async fn node_label_failures_are_independent() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Drug.v1.nodes.csv", "name\naspirin\n");
    write(dir.path(), "Gene.v1.nodes.csv", "name\nTP53\n");

    let store = InMemoryGraphStore::new();
    // Files are sorted: Drug is transaction 1, Gene is transaction 2
    store.fail_transaction(1);
    let report = Orchestrator::new(store.clone(), IngestOptions::default())
        .run(&[dir.path()])
        .await;

    let nodes = &report.directories[0].nodes;
    assert!(nodes[0].outcome.is_failure());
    assert_eq!(nodes[1].outcome, Outcome::Loaded { records: 1, chunks: 1 });
    assert_eq!(store.node_count(&gene()), 1);
}

#[tokio::test]
async fn edge_failure_halts_remaining_edge_files_in_directory_only() {
    let first = TempDir::new().unwrap();
    write(first.path(), "A.links.B.v1.edges.csv", "source,target\n0,1\n");
    write(first.path(), "B.links.C.v1.edges.csv", "source,target\n0,1\n");
    write(first.path(), "C.links.D.v1.edges.csv", "source,target\n0,1\n");

    let second = TempDir::new().unwrap();
    write(second.path(), "X.links.Y.v1.edges.csv", "source,target\n0,1\n");

    let store = InMemoryGraphStore::new();
    store.fail_transaction(2);
    let report = Orchestrator::new(store.clone(), IngestOptions::default())
        .run(&[first.path(), second.path()])
        .await;

    let edges = &report.directories[0].edges;
    assert_eq!(edges[0].outcome, Outcome::Loaded { records: 1, chunks: 1 });
    assert!(edges[1].outcome.is_failure());
    assert_eq!(edges[2].outcome, Outcome::Skipped);
    assert!(report.directories[0].edges_halted);

    // The next directory still runs
    assert!(report.directories[1].is_success());
    assert_eq!(store.relationship_count("links"), 2);
    assert!(!report.is_success());
}

#[tokio::test]
async fn unreadable_edge_file_does_not_halt_edges() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "A.links.B.v1.edges.csv", "from,to\n0,1\n");
    write(dir.path(), "B.links.C.v1.edges.csv", "source,target\n0,1\n");

    let store = InMemoryGraphStore::new();
    let report = Orchestrator::new(store.clone(), IngestOptions::default())
        .run(&[dir.path()])
        .await;

    let edges = &report.directories[0].edges;
    assert!(edges[0].outcome.is_failure());
    assert_eq!(edges[1].outcome, Outcome::Loaded { records: 1, chunks: 1 });
    assert!(!report.directories[0].edges_halted);
}

#[tokio::test]
async fn strict_provisioning_blocks_label_best_effort_does_not() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Gene.v1.nodes.csv", "name\nTP53\n");

    let lenient = InMemoryGraphStore::new();
    lenient.fail_provisioning(true);
    let report = Orchestrator::new(lenient.clone(), IngestOptions::default())
        .run(&[dir.path()])
        .await;
    assert!(report.is_success());
    assert_eq!(lenient.node_count(&gene()), 1);

    let strict = InMemoryGraphStore::new();
    strict.fail_provisioning(true);
    let opts = IngestOptions {
        provisioning: ProvisioningPolicy::Strict,
        ..IngestOptions::default()
    };
    let report = Orchestrator::new(strict.clone(), opts)
        .run(&[dir.path()])
        .await;
    assert!(!report.is_success());
    assert_eq!(strict.node_count(&gene()), 0);
    assert_eq!(strict.transaction_count(), 0);
}

#[tokio::test]
async fn multi_word_labels_use_spaces_in_graph_and_underscores_in_index_names() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Gene_Product.v1.nodes.csv", "name\np53 protein\n");
    write(
        dir.path(),
        "Gene.encodes.Gene_Product.v1.edges.csv",
        "source,target\n0,0\n",
    );

    let store = InMemoryGraphStore::new();
    let report = Orchestrator::new(store.clone(), IngestOptions::default())
        .run(&[dir.path()])
        .await;

    assert!(report.is_success());
    let product = NodeLabel::from_token("Gene_Product");
    assert_eq!(product.as_str(), "Gene Product");
    assert!(store.has_constraint("unique_id_Gene_Product"));
    assert_eq!(store.node_count(&product), 1);

    let rels = store.relationships("encodes");
    assert_eq!(rels[0].target_label, "Gene Product");
    // The Gene endpoint did not exist and was created by id
    assert!(store.node(&gene(), "0").is_some());
}
