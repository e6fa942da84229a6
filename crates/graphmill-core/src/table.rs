//! CSV tables with per-column type inference
//!
//! Columns are typed the way dataframe readers type them: a column whose
//! present cells all parse as integers is an integer column, all numeric is a
//! float column, all `true`/`false` is a boolean column, anything else is text.
//! Empty cells and common NA spellings are missing values.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{TableError, TableResult};
use crate::records::{PropertyMap, PropertyValue};

/// Cell spellings read as a missing value
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.trim() {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Inferred type of a CSV column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnType {
    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut all_int = true;
        let mut all_float = true;
        let mut all_bool = true;
        let mut any = false;

        for cell in cells {
            any = true;
            let trimmed = cell.trim();
            if all_int && trimmed.parse::<i64>().is_err() {
                all_int = false;
            }
            if all_float && trimmed.parse::<f64>().is_err() {
                all_float = false;
            }
            if all_bool && parse_bool(trimmed).is_none() {
                all_bool = false;
            }
            if !all_int && !all_float && !all_bool {
                return ColumnType::Text;
            }
        }

        // An all-missing column reads as floats (all NaN) and yields no values
        if !any {
            return ColumnType::Float;
        }
        if all_int {
            ColumnType::Integer
        } else if all_float {
            ColumnType::Float
        } else if all_bool {
            ColumnType::Boolean
        } else {
            ColumnType::Text
        }
    }

    fn parse(&self, cell: &str) -> PropertyValue {
        let trimmed = cell.trim();
        match self {
            ColumnType::Integer => trimmed
                .parse::<i64>()
                .map(PropertyValue::Integer)
                .unwrap_or_else(|_| PropertyValue::Text(cell.to_string())),
            ColumnType::Float => trimmed
                .parse::<f64>()
                .map(PropertyValue::Float)
                .unwrap_or_else(|_| PropertyValue::Text(cell.to_string())),
            ColumnType::Boolean => parse_bool(trimmed)
                .map(PropertyValue::Boolean)
                .unwrap_or_else(|| PropertyValue::Text(cell.to_string())),
            ColumnType::Text => PropertyValue::Text(cell.to_string()),
        }
    }
}

/// A fully read CSV file: header, inferred column types and raw cells
#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
    headers: Vec<String>,
    column_types: Vec<ColumnType>,
    rows: Vec<Vec<Option<String>>>,
}

impl CsvTable {
    /// Read and type a CSV file with a header row.
    pub fn read(path: &Path) -> TableResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| TableError::Csv {
            path: path.to_path_buf(),
            source: csv::Error::from(e),
        })?;
        Self::from_reader(path, file)
    }

    /// Read from any reader; `path` is used only in error messages.
    pub fn from_reader<R: io::Read>(path: &Path, reader: R) -> TableResult<Self> {
        let csv_err = |source: csv::Error| TableError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            let row = (0..headers.len())
                .map(|i| {
                    record
                        .get(i)
                        .filter(|cell| !is_missing(cell))
                        .map(str::to_string)
                })
                .collect();
            rows.push(row);
        }

        let column_types = (0..headers.len())
            .map(|col| {
                ColumnType::infer(rows.iter().filter_map(|row: &Vec<Option<String>>| {
                    row[col].as_deref()
                }))
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            column_types,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column_index(name).map(|i| self.column_types[i])
    }

    /// Raw cell text, `None` when missing
    pub fn raw(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Typed cell value, `None` when missing
    pub fn value(&self, row: usize, col: usize) -> Option<PropertyValue> {
        self.raw(row, col).map(|cell| self.column_types[col].parse(cell))
    }

    /// All present values of a row, keyed by column name
    pub fn row_values(&self, row: usize) -> PropertyMap {
        self.headers
            .iter()
            .enumerate()
            .filter_map(|(col, name)| self.value(row, col).map(|v| (name.clone(), v)))
            .collect()
    }
}
