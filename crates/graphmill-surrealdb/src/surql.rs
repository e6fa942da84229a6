//! SurrealQL statement rendering
//!
//! A node label is a table and a node `id` is the record key, so the key is
//! unique per label without a separate constraint. Table and relation names
//! are escaped identifiers; all values arrive through bindings.

use once_cell::sync::Lazy;
use regex::Regex;

use graphmill_core::{EdgeSchema, NodeLabel};

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Backtick-escape `name` unless it is a plain identifier.
pub fn identifier(name: &str) -> String {
    if PLAIN_IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

pub fn label_index_name(label: &NodeLabel) -> String {
    format!("index_label_{}", label.index_suffix())
}

/// Table definition plus a `label` field index, idempotent
pub fn provision(label: &NodeLabel) -> String {
    let table = identifier(label.as_str());
    format!(
        "BEGIN TRANSACTION;\n\
         DEFINE TABLE IF NOT EXISTS {table} SCHEMALESS;\n\
         DEFINE INDEX IF NOT EXISTS {index} ON TABLE {table} FIELDS label;\n\
         COMMIT TRANSACTION;",
        table = table,
        index = identifier(&label_index_name(label)),
    )
}

/// Upsert `$rows` (`[{key, fields}]`) into `$table`, replacing each record's content.
pub const NODE_UPSERT: &str = "BEGIN TRANSACTION;
FOR $row IN $rows {
    UPSERT type::thing($table, $row.key) CONTENT $row.fields;
};
COMMIT TRANSACTION;";

/// Fields SurrealDB owns on a relation record; CSV columns with these names are dropped
pub const RESERVED_RELATION_FIELDS: &[&str] = &["id", "in", "out"];

/// Relate `$rows` (`[{source, target, fields}]`), creating missing endpoints.
///
/// Endpoint tables come from `$source_table`/`$target_table`; the relation
/// table is spliced in because `RELATE` needs a literal edge table.
pub fn edge_create(schema: &EdgeSchema) -> String {
    format!(
        "BEGIN TRANSACTION;
FOR $row IN $rows {{
    LET $from = type::thing($source_table, $row.source);
    LET $to = type::thing($target_table, $row.target);
    UPSERT $from;
    UPSERT $to;
    RELATE $from->{relation}->$to CONTENT $row.fields;
}};
COMMIT TRANSACTION;",
        relation = identifier(&schema.relation),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_word_tables_are_escaped() {
        let label = NodeLabel::from_token("Gene_Product");
        let sql = provision(&label);
        assert!(sql.contains("DEFINE TABLE IF NOT EXISTS `Gene Product` SCHEMALESS;"));
        assert!(sql.contains(
            "DEFINE INDEX IF NOT EXISTS index_label_Gene_Product ON TABLE `Gene Product` FIELDS label;"
        ));
    }

    #[test]
    fn relation_is_spliced_as_identifier() {
        let schema = EdgeSchema {
            relation: "binds to".into(),
            source: NodeLabel::from_token("Drug"),
            target: NodeLabel::from_token("Gene"),
            property_columns: vec![],
        };
        assert!(edge_create(&schema).contains("RELATE $from->`binds to`->$to"));
    }

    #[test]
    fn escapes_backticks_and_backslashes() {
        assert_eq!(identifier("plain_name"), "plain_name");
        assert_eq!(identifier("a`b"), "`a\\`b`");
        assert_eq!(identifier("a\\b"), "`a\\\\b`");
    }
}
