//! Record coalescing
//!
//! Node rows are keyed by their 0-based row position. Rows from several files
//! of the same label that share a position merge into one record: later
//! present values overwrite earlier ones, and a missing value never erases
//! an earlier one. Edge rows never merge; each row is its own relationship.

use std::collections::BTreeMap;

use crate::error::{TableError, TableResult};
use crate::records::{EdgeRecord, NodeRecord, PropertyMap, PropertyValue};
use crate::table::CsvTable;

/// Column holding the relationship's start node identifier
pub const SOURCE_COLUMN: &str = "source";
/// Column holding the relationship's end node identifier
pub const TARGET_COLUMN: &str = "target";

/// Accumulates node rows for one label across one or more tables
#[derive(Debug, Default)]
pub struct NodeCoalescer {
    records: BTreeMap<usize, PropertyMap>,
}

impl NodeCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one row's present values into the record at `row`.
    pub fn absorb_row(&mut self, row: usize, values: PropertyMap) {
        self.records.entry(row).or_default().extend(values);
    }

    /// Merge every row of `table`, applying node coercion.
    pub fn absorb_table(&mut self, table: &CsvTable) {
        for row in 0..table.len() {
            let values = table
                .row_values(row)
                .into_iter()
                .map(|(column, value)| (column, value.to_node_value()))
                .collect();
            self.absorb_row(row, values);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finished records in row order, each carrying `id` = its row position.
    pub fn into_records(self) -> Vec<NodeRecord> {
        self.records
            .into_iter()
            .map(|(row, properties)| NodeRecord::new(row, properties))
            .collect()
    }
}

/// Coalesce an ordered sequence of `(row, values)` pairs into node records.
pub fn coalesce_rows<I>(rows: I) -> Vec<NodeRecord>
where
    I: IntoIterator<Item = (usize, PropertyMap)>,
{
    let mut coalescer = NodeCoalescer::new();
    for (row, values) in rows {
        coalescer.absorb_row(row, values);
    }
    coalescer.into_records()
}

/// Every column of an edge table except `source` and `target`
pub fn edge_property_columns(table: &CsvTable) -> Vec<String> {
    table
        .headers()
        .iter()
        .filter(|h| h.as_str() != SOURCE_COLUMN && h.as_str() != TARGET_COLUMN)
        .cloned()
        .collect()
}

/// Turn each row of an edge table into an independent [`EdgeRecord`].
///
/// `source`/`target` are taken from the raw cell text so identifiers stay
/// strings regardless of how the column was typed. Missing property values
/// are dropped. With `coerce_numbers`, numeric properties are truncated to
/// integers as on the node path; otherwise they keep their inferred type.
pub fn edge_records(table: &CsvTable, coerce_numbers: bool) -> TableResult<Vec<EdgeRecord>> {
    let source_col = required_column(table, SOURCE_COLUMN)?;
    let target_col = required_column(table, TARGET_COLUMN)?;

    (0..table.len())
        .map(|row| {
            let source = endpoint(table, row, source_col, SOURCE_COLUMN)?;
            let target = endpoint(table, row, target_col, TARGET_COLUMN)?;

            let properties = table
                .headers()
                .iter()
                .enumerate()
                .filter(|(col, _)| *col != source_col && *col != target_col)
                .filter_map(|(col, name)| {
                    table.value(row, col).map(|value| {
                        let value = if coerce_numbers {
                            coerce_edge_value(value)
                        } else {
                            value
                        };
                        (name.clone(), value)
                    })
                })
                .collect();

            Ok(EdgeRecord {
                source,
                target,
                properties,
            })
        })
        .collect()
}

fn coerce_edge_value(value: PropertyValue) -> PropertyValue {
    match value {
        PropertyValue::Text(_) => value,
        other => other.to_node_value(),
    }
}

fn required_column(table: &CsvTable, column: &str) -> TableResult<usize> {
    table
        .column_index(column)
        .ok_or_else(|| TableError::MissingColumn {
            path: table.path().to_path_buf(),
            column: column.to_string(),
        })
}

fn endpoint(table: &CsvTable, row: usize, col: usize, column: &str) -> TableResult<String> {
    table
        .raw(row, col)
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty())
        .ok_or_else(|| TableError::MissingValue {
            path: table.path().to_path_buf(),
            row,
            column: column.to_string(),
        })
}
