//! Record types sent to the graph store

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name of the identifier property every node carries
pub const ID_PROPERTY: &str = "id";

/// A scalar property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl PropertyValue {
    /// Node-path coercion: numbers become integers (floats truncate toward zero),
    /// booleans become 1/0, text is unchanged.
    pub fn to_node_value(&self) -> PropertyValue {
        match self {
            PropertyValue::Text(s) => PropertyValue::Text(s.clone()),
            PropertyValue::Integer(i) => PropertyValue::Integer(*i),
            PropertyValue::Float(f) => match truncate_to_i64(*f) {
                Some(i) => PropertyValue::Integer(i),
                None => PropertyValue::Text(f.to_string()),
            },
            PropertyValue::Boolean(b) => PropertyValue::Integer(i64::from(*b)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

/// Truncate toward zero, `None` for NaN, infinities and values outside `i64`
fn truncate_to_i64(f: f64) -> Option<i64> {
    let t = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(s) => f.write_str(s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(x) => write!(f, "{}", x),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

/// Column name to value, sorted for stable query parameters
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// One node, identified by its row position, with its merged properties.
///
/// `properties` never contains `id`; the identifier is held separately and
/// re-added by [`NodeRecord::to_property_map`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub properties: PropertyMap,
}

impl NodeRecord {
    /// Identifier derived from a 0-based CSV row position
    pub fn id_for_row(row: usize) -> String {
        row.to_string()
    }

    pub fn new(row: usize, mut properties: PropertyMap) -> Self {
        properties.remove(ID_PROPERTY);
        Self {
            id: Self::id_for_row(row),
            properties,
        }
    }

    /// The full property set written to the graph, `id` included
    pub fn to_property_map(&self) -> PropertyMap {
        let mut map = self.properties.clone();
        map.insert(ID_PROPERTY.to_string(), PropertyValue::Text(self.id.clone()));
        map
    }
}

/// One relationship row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    pub properties: PropertyMap,
}
