//! Raw tabular data as it arrives from a source export.
//!
//! A `RawTable` is columnar: every column holds one `serde_json::Value` per
//! row, `Value::Null` marking an empty cell. Column order is the order the
//! headers were first seen, so alias resolution stays deterministic.

use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    columns: Vec<String>,
    data: HashMap<String, Vec<Value>>,
    nrows: usize,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from row objects (one JSON object per row), taking the
    /// column set as the union of all keys. Cells absent from a row are null.
    pub fn from_rows(rows: &[serde_json::Map<String, Value>]) -> Self {
        let mut table = Self::new();
        for row in rows {
            for key in row.keys() {
                if !table.data.contains_key(key) {
                    table.columns.push(key.clone());
                    table.data.insert(key.clone(), vec![Value::Null; table.nrows]);
                }
            }
            for (name, cells) in table.data.iter_mut() {
                cells.push(row.get(name).cloned().unwrap_or(Value::Null));
            }
            table.nrows += 1;
        }
        table
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn is_empty(&self) -> bool {
        self.nrows == 0
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.data.get(name).map(|v| v.as_slice())
    }

    pub fn cell(&self, name: &str, row: usize) -> &Value {
        self.data
            .get(name)
            .and_then(|col| col.get(row))
            .unwrap_or(&Value::Null)
    }

    /// True when the column is absent or every cell is empty.
    pub fn is_all_empty(&self, name: &str) -> bool {
        match self.data.get(name) {
            Some(cells) => cells.iter().all(cell_is_empty),
            None => true,
        }
    }
}

/// Empty means null, blank text, or the literal `nan` a sloppy export writes.
pub fn cell_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
        }
        _ => false,
    }
}
