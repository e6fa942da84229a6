//! File and process-environment loading tests
//!
//! Tests touching the real environment are serialized.

use graphmill_config::{Backend, ConfigError, ConfigLoader, GraphmillConfig};
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
fn partial_toml_keeps_defaults() {
    let file = write_config(
        r#"
[ingest]
chunk_size = 500
"#,
    );

    let config = ConfigLoader::from_file(file.path()).expect("Failed to parse config");
    assert_eq!(config.ingest.chunk_size, 500);
    assert!(config.ingest.sort_files);
    assert_eq!(config.database.url, "bolt://localhost:7687");
}

#[test]
fn full_toml_round_trips() {
    let mut original = GraphmillConfig::default();
    original.database.backend = Backend::Surrealdb;
    original.database.path = "/var/lib/graphmill".to_string();
    original.ingest.coerce_edge_numbers = true;

    let toml_str = toml::to_string_pretty(&original).expect("Failed to serialize");
    let file = write_config(&toml_str);
    let parsed = ConfigLoader::from_file(file.path()).expect("Failed to parse config");

    assert_eq!(parsed, original);
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("[ingest\nchunk_size = ");
    let err = ConfigLoader::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn missing_explicit_file_is_an_io_error() {
    let err = ConfigLoader::new()
        .without_dotenv()
        .load(Some(std::path::Path::new("/nonexistent/graphmill.toml")))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
#[serial]
fn process_env_overrides_file() {
    let file = write_config(
        r#"
[database]
url = "bolt://from-file:7687"
user = "file-user"
"#,
    );

    std::env::set_var("NEO4J_URL", "bolt://from-env:7687");
    let result = ConfigLoader::new().without_dotenv().load(Some(file.path()));
    std::env::remove_var("NEO4J_URL");

    let config = result.expect("Failed to load config");
    assert_eq!(config.database.url, "bolt://from-env:7687");
    assert_eq!(config.database.user, "file-user");
}

#[test]
#[serial]
fn zero_chunk_size_from_env_fails_validation() {
    let file = write_config("");

    std::env::set_var("GRAPHMILL_CHUNK_SIZE", "0");
    let result = ConfigLoader::new().without_dotenv().load(Some(file.path()));
    std::env::remove_var("GRAPHMILL_CHUNK_SIZE");

    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}
