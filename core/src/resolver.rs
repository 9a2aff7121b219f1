//! Column resolver — maps heterogeneous source headers onto the canonical
//! schema.
//!
//! For each canonical field the ordered alias list from `config` is tried;
//! the first header present in the raw table wins. A raw table that already
//! carries the canonical name passes through unchanged for that field.
//! Fields with no matching header get typed defaults. Two fields get an
//! extra substring scan over every header as a defense against
//! encoding-mangled accents: `objeto_acao` and `numero_processo`.

use crate::config::FieldAliases;
use crate::raw::{cell_is_empty, RawTable};
use crate::record::{CaseRecord, CaseTable, Status};
use crate::types::NAO_INFORMADO;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Resolve a raw table into the canonical schema. Unmapped columns are
/// carried through in each record's `extras`.
pub fn resolve(raw: &RawTable, aliases: &[FieldAliases]) -> CaseTable {
    let mut mapping: HashMap<&str, String> = HashMap::new();

    for campo in aliases {
        // Idempotence: an already-normalized table keeps its column.
        if raw.has_column(&campo.canonical) {
            mapping.insert(campo.canonical.as_str(), campo.canonical.clone());
            continue;
        }
        for alias in &campo.aliases {
            if raw.has_column(alias) {
                mapping.insert(campo.canonical.as_str(), alias.clone());
                break;
            }
        }
    }

    // Fallback scan for the action object: headers survive export pipelines
    // with their accents mangled, so match on fragments.
    let objeto_unusable = mapping
        .get("objeto_acao")
        .map(|col| raw.is_all_empty(col))
        .unwrap_or(true);
    if objeto_unusable {
        for col in raw.column_names() {
            let lower = col.to_lowercase();
            let descricao_tipo = lower.contains("descricao") && lower.contains("tipo");
            let objeto_acao = lower.contains("objeto")
                && (lower.contains("ac") || lower.contains("ao") || lower.contains("aç"));
            if descricao_tipo || objeto_acao {
                mapping.insert("objeto_acao", col.clone());
                break;
            }
        }
    }

    // Same defense for the process number.
    let processo_unusable = mapping
        .get("numero_processo")
        .map(|col| raw.is_all_empty(col))
        .unwrap_or(true);
    if processo_unusable {
        for col in raw.column_names() {
            let lower = col.to_lowercase();
            let hit = ["processo", "autos", "nº", "numero", "num"]
                .iter()
                .any(|t| lower.contains(t));
            if hit && !lower.contains("objeto") {
                mapping.insert("numero_processo", col.clone());
                break;
            }
        }
    }

    let consumed: HashSet<&String> = mapping.values().collect();
    let col = |field: &str| mapping.get(field).map(|s| s.as_str());

    let mut rows = Vec::with_capacity(raw.nrows());
    for i in 0..raw.nrows() {
        let cell = |field: &str| col(field).map(|c| raw.cell(c, i)).unwrap_or(&Value::Null);

        let mut rec = CaseRecord {
            numero_processo: parse_string(cell("numero_processo")),
            objeto_acao: parse_string(cell("objeto_acao"))
                .unwrap_or_else(|| NAO_INFORMADO.to_string()),
            estado: parse_string(cell("estado")).unwrap_or_else(|| NAO_INFORMADO.to_string()),
            nome_cliente: parse_string(cell("nome_cliente"))
                .unwrap_or_else(|| NAO_INFORMADO.to_string()),
            situacao: parse_string(cell("situacao")),
            prognostico: parse_string(cell("prognostico")),
            area_juridica: parse_string(cell("area_juridica")),
            comarca: parse_string(cell("comarca")),
            foro: parse_string(cell("foro")),
            vara: parse_string(cell("vara")),
            motivo_encerramento: parse_string(cell("motivo_encerramento")),
            area_responsavel: parse_string(cell("area_responsavel")),
            sentenca_orig: parse_string(cell("sentenca_orig")),
            descumprimento_obrigacao: parse_string(cell("descumprimento_obrigacao")),
            data_encerramento: parse_date(cell("data_encerramento")),
            data_distribuicao: parse_date(cell("data_distribuicao")),
            impacto_financeiro: parse_currency(cell("impacto_financeiro")),
            valor_causa: parse_currency(cell("valor_causa")),
            impacto_negativo: parse_currency_opt(cell("impacto_negativo")),
            valor_acordo: parse_currency_opt(cell("valor_acordo")),
            reiteracoes_orig: parse_int(cell("reiteracoes_orig")),
            ..CaseRecord::default()
        };

        // Intake date falls back to the distribution date only when no
        // intake column was mapped at all.
        rec.data_entrada = match col("data_entrada") {
            Some(c) => parse_date(raw.cell(c, i)),
            None => rec.data_distribuicao,
        };

        rec.status = resolve_status(cell("status"), &rec.situacao);

        for name in raw.column_names() {
            if !consumed.contains(name) {
                let value = raw.cell(name, i);
                if !value.is_null() {
                    rec.extras.insert(name.clone(), value.clone());
                }
            }
        }

        rows.push(rec);
    }

    CaseTable::new(rows)
}

/// Normalize the literal status column. `derive_fields` recomputes status
/// from the closure reason afterwards; this only seeds the value for tables
/// that never reach the deriver.
fn resolve_status(raw_status: &Value, situacao: &Option<String>) -> Status {
    let text = parse_string(raw_status).or_else(|| situacao.clone());
    match text {
        Some(s) if s.trim().eq_ignore_ascii_case("encerrado") => Status::Encerrado,
        _ => Status::EmTramitacao,
    }
}

// ── Cell parsers ─────────────────────────────────────────────────────────────
// Parse failures are never surfaced: bad cells coerce to the field default.

pub(crate) fn parse_string(value: &Value) -> Option<String> {
    if cell_is_empty(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = match value {
        Value::String(s) => s.trim(),
        _ => return None,
    };
    if text.is_empty() || text.eq_ignore_ascii_case("nan") || text.eq_ignore_ascii_case("nat") {
        return None;
    }
    // Datetime exports: keep the date part.
    let date_part = text.split(['T', ' ']).next().unwrap_or(text);
    for format in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(date_part, format) {
            return Some(d);
        }
    }
    None
}

/// Currency cell → non-negative-ish f64, 0.0 when unparseable. Accepts plain
/// numbers and Brazilian-formatted strings ("R$ 1.234,56").
pub(crate) fn parse_currency(value: &Value) -> f64 {
    parse_currency_opt(value).unwrap_or(0.0)
}

pub(crate) fn parse_currency_opt(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => {
            let x = n.as_f64()?;
            if x.is_finite() {
                Some(x)
            } else {
                Some(0.0)
            }
        }
        Value::String(s) => {
            let mut text = s.trim().trim_start_matches("R$").trim().to_string();
            if text.is_empty() || text.eq_ignore_ascii_case("nan") {
                return None;
            }
            if text.contains(',') {
                text = text.replace('.', "").replace(',', ".");
            }
            match text.parse::<f64>() {
                Ok(x) if x.is_finite() => Some(x),
                Ok(_) => Some(0.0),
                Err(_) => Some(0.0),
            }
        }
        _ => None,
    }
}

pub(crate) fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|x| x.is_finite()).map(|x| x as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
                None
            } else {
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().map(|x| x as i64))
            }
        }
        _ => None,
    }
}
