//! Conversion of loader records into Bolt parameter values

use std::collections::HashMap;

use neo4rs::BoltType;

use graphmill_core::{EdgeRecord, NodeRecord, PropertyMap, PropertyValue};

pub type BoltRow = HashMap<String, BoltType>;

pub fn bolt_value(value: &PropertyValue) -> BoltType {
    match value {
        PropertyValue::Text(s) => s.clone().into(),
        PropertyValue::Integer(i) => (*i).into(),
        PropertyValue::Float(f) => (*f).into(),
        PropertyValue::Boolean(b) => (*b).into(),
    }
}

pub fn bolt_properties(properties: &PropertyMap) -> BoltRow {
    properties
        .iter()
        .map(|(key, value)| (key.clone(), bolt_value(value)))
        .collect()
}

/// One `map` entry for the node upsert statement, `id` included
pub fn node_row(record: &NodeRecord) -> BoltRow {
    bolt_properties(&record.to_property_map())
}

/// One `row` entry for the edge statement: `{source, target, properties}`
pub fn edge_row(record: &EdgeRecord) -> BoltRow {
    let mut row = BoltRow::with_capacity(3);
    row.insert("source".to_string(), record.source.clone().into());
    row.insert("target".to_string(), record.target.clone().into());
    row.insert(
        "properties".to_string(),
        bolt_properties(&record.properties).into(),
    );
    row
}
