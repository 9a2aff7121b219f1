//! Tabular source reading.
//!
//! Spreadsheet mechanics live outside this crate: the upstream ETL step
//! exports each workbook as JSON (an object mapping sheet name → array of
//! row objects, or a bare array for a single sheet). `TableSource` is the
//! seam; anything that can list sheets and hand back rows can feed the
//! pipeline.

use crate::error::{CoreError, CoreResult};
use crate::raw::RawTable;
use serde_json::Value;
use std::path::Path;

pub trait TableSource {
    fn sheet_names(&self) -> Vec<String>;
    fn read_sheet(&self, name: &str) -> CoreResult<RawTable>;
}

/// Pick the sheet to ingest: the first sheet whose name contains a keyword,
/// keywords tried in order, case-insensitive. No hit falls back to the first
/// sheet.
pub fn select_sheet(source: &dyn TableSource, keywords: &[String]) -> Option<String> {
    let names = source.sheet_names();
    for keyword in keywords {
        let kw = keyword.to_lowercase();
        for name in &names {
            if name.to_lowercase().contains(&kw) {
                return Some(name.clone());
            }
        }
    }
    names.first().cloned()
}

// ── JSON workbook export ─────────────────────────────────────────────────────

pub struct JsonWorkbook {
    sheets: Vec<(String, Vec<serde_json::Map<String, Value>>)>,
}

impl JsonWorkbook {
    pub fn open(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::SourceMissing {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> CoreResult<Self> {
        let value: Value = serde_json::from_str(content)?;
        let mut sheets = Vec::new();
        match value {
            // Bare array: a single-sheet export.
            Value::Array(rows) => {
                sheets.push(("dados".to_string(), object_rows(rows)));
            }
            Value::Object(map) => {
                for (name, sheet) in map {
                    if let Value::Array(rows) = sheet {
                        sheets.push((name, object_rows(rows)));
                    }
                }
            }
            _ => {}
        }
        Ok(Self { sheets })
    }
}

fn object_rows(rows: Vec<Value>) -> Vec<serde_json::Map<String, Value>> {
    rows.into_iter()
        .filter_map(|row| match row {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

impl TableSource for JsonWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn read_sheet(&self, name: &str) -> CoreResult<RawTable> {
        let sheet = self
            .sheets
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| CoreError::SheetNotFound {
                sheet: name.to_string(),
            })?;
        Ok(RawTable::from_rows(&sheet.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_order_decides_the_sheet() {
        let wb = JsonWorkbook::from_str(
            r#"{"Resumo": [], "Base CPJ": [{"a": 1}], "Entradas": [{"a": 2}]}"#,
        )
        .unwrap();

        let picked = select_sheet(&wb, &["dados".into(), "cpj".into(), "base".into()]);
        assert_eq!(picked.as_deref(), Some("Base CPJ"));

        // No keyword hit: first sheet wins.
        let picked = select_sheet(&wb, &["xyz".into()]);
        assert_eq!(picked.as_deref(), Some("Resumo"));
    }

    #[test]
    fn bare_array_is_a_single_sheet() {
        let wb = JsonWorkbook::from_str(r#"[{"Estado": "SP"}, {"Estado": "RJ"}]"#).unwrap();
        assert_eq!(wb.sheet_names(), vec!["dados".to_string()]);
        let table = wb.read_sheet("dados").unwrap();
        assert_eq!(table.nrows(), 2);
    }

    #[test]
    fn unknown_sheet_is_an_error() {
        let wb = JsonWorkbook::from_str(r#"{"in": []}"#).unwrap();
        assert!(matches!(
            wb.read_sheet("outra"),
            Err(CoreError::SheetNotFound { .. })
        ));
    }
}
