//! View library — every pre-aggregated dashboard answer.
//!
//! RULE: a view is a pure function `(table, params) -> serde_json::Value`.
//! It never mutates the table, never panics on a thin table, and when the
//! data cannot answer (no rows, no usable column) it returns its own empty
//! shape instead of an error. Open/closed classification always goes
//! through `derive::is_encerrado`.

pub mod carteira;
pub mod cliente;
pub mod critico;
pub mod estado;
pub mod generic;
pub mod objeto;
pub mod resultado;
pub mod sentenca;
pub mod sla;

use crate::record::CaseRecord;
use crate::types::{Ano, Periodo};
use chrono::{Datelike, NaiveDate};

/// Year of a date, when present.
pub(crate) fn ano(date: Option<NaiveDate>) -> Option<Ano> {
    date.map(|d| d.year())
}

/// `YYYY-MM` period key, chronologically sortable as a string.
pub(crate) fn periodo(date: NaiveDate) -> Periodo {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Intake year with the fallback the dashboard uses for undated rows.
pub(crate) fn ano_entrada_ou(rec: &CaseRecord, fallback: Ano) -> Ano {
    ano(rec.data_entrada).unwrap_or(fallback)
}

/// Closure year with the same fallback.
pub(crate) fn ano_encerramento_ou(rec: &CaseRecord, fallback: Ano) -> Ano {
    ano(rec.data_encerramento).unwrap_or(fallback)
}

/// Normalized UF or `None` when the cell is garbage ("nan", "N/A", the
/// unknown sentinel). State-keyed views only count real state codes.
pub(crate) fn uf_valida(rec: &CaseRecord) -> Option<String> {
    let uf = rec.estado.trim().to_uppercase();
    match uf.as_str() {
        "" | "NAN" | "NONE" | "NULL" | "N/A" | "NA" | "NÃO INFORMADO" => None,
        _ => Some(uf),
    }
}

/// Descending sort by a numeric key. The sort is stable, so ties keep
/// their input order and view output stays deterministic.
pub(crate) fn sort_desc_by<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
