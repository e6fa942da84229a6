//! Cypher statement rendering
//!
//! Labels, relationship types and property keys come from file names and CSV
//! headers, so they are spliced into statement text as identifiers. Values
//! never are: every record travels in the `$batch` parameter.

use once_cell::sync::Lazy;
use regex::Regex;

use graphmill_core::{EdgeSchema, NodeLabel, ID_PROPERTY};

/// Name of the list parameter every batch statement unwinds
pub const BATCH_PARAM: &str = "batch";

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Wrap `name` in backticks, doubling any backtick inside it.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote `name` only when it is not a plain identifier.
pub fn identifier(name: &str) -> String {
    if PLAIN_IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        quote_identifier(name)
    }
}

/// Node label as it appears in a pattern; multi-word labels are quoted
pub fn label(label: &NodeLabel) -> String {
    identifier(label.as_str())
}

pub fn constraint_name(label: &NodeLabel) -> String {
    format!("unique_id_{}", label.index_suffix())
}

pub fn id_index_name(label: &NodeLabel) -> String {
    format!("index_id_{}", label.index_suffix())
}

pub fn label_index_name(label: &NodeLabel) -> String {
    format!("index_label_{}", label.index_suffix())
}

/// Constraint and index DDL for one label, run together in one transaction
pub fn provision_statements(node_label: &NodeLabel) -> Vec<String> {
    let l = label(node_label);
    vec![
        format!(
            "CREATE CONSTRAINT {} IF NOT EXISTS FOR (n:{}) REQUIRE n.{} IS UNIQUE",
            identifier(&constraint_name(node_label)),
            l,
            ID_PROPERTY
        ),
        format!(
            "CREATE INDEX {} IF NOT EXISTS FOR (n:{}) ON (n.{})",
            identifier(&id_index_name(node_label)),
            l,
            ID_PROPERTY
        ),
        format!(
            "CREATE INDEX {} IF NOT EXISTS FOR (n:{}) ON (n.label)",
            identifier(&label_index_name(node_label)),
            l
        ),
    ]
}

/// Find-or-create each node by `id`, then replace its whole property set.
pub fn node_upsert(node_label: &NodeLabel) -> String {
    format!(
        "UNWIND ${batch} AS map\nMERGE (n:{label} {{{id}: map.{id}}})\nSET n = map",
        batch = BATCH_PARAM,
        label = label(node_label),
        id = ID_PROPERTY,
    )
}

/// Find-or-create both endpoints by `id` and always create the relationship.
///
/// Endpoint and relationship type tokens are always quoted.
pub fn edge_create(schema: &EdgeSchema) -> String {
    let properties = if schema.property_columns.is_empty() {
        String::new()
    } else {
        let assignments: Vec<String> = schema
            .property_columns
            .iter()
            .map(|column| {
                let key = identifier(column);
                format!("    {}: row.properties.{}", key, key)
            })
            .collect();
        format!(" {{\n{}\n}}", assignments.join(",\n"))
    };

    format!(
        "UNWIND ${batch} AS row\n\
         MERGE (n:{source} {{{id}: row.source}})\n\
         MERGE (m:{target} {{{id}: row.target}})\n\
         CREATE (n)-[r:{relation}{properties}]->(m)",
        batch = BATCH_PARAM,
        source = quote_identifier(schema.source.as_str()),
        target = quote_identifier(schema.target.as_str()),
        relation = quote_identifier(&schema.relation),
        id = ID_PROPERTY,
        properties = properties,
    )
}
