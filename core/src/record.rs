//! Canonical case-record schema.
//!
//! One `CaseRecord` is one lawsuit. The typed fields are the canonical
//! columns every aggregation relies on; `extras` carries source columns the
//! resolver did not map, so a merge can union them and the generic
//! aggregator can still group by them.

use crate::types::NAO_INFORMADO;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// ── Enums ────────────────────────────────────────────────────────────────────

/// Open/closed classification. Derived from `motivo_encerramento` only —
/// never trust a literal status column from the source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    #[serde(rename = "Em Tramitação")]
    EmTramitacao,
    #[serde(rename = "Encerrado")]
    Encerrado,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::EmTramitacao => write!(f, "Em Tramitação"),
            Status::Encerrado => write!(f, "Encerrado"),
        }
    }
}

/// Outcome classification carried by every record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sentenca {
    #[serde(rename = "Favorável")]
    Favoravel,
    #[serde(rename = "Desfavorável")]
    Desfavoravel,
    #[serde(rename = "Parcial")]
    Parcial,
}

impl fmt::Display for Sentenca {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentenca::Favoravel => write!(f, "Favorável"),
            Sentenca::Desfavoravel => write!(f, "Desfavorável"),
            Sentenca::Parcial => write!(f, "Parcial"),
        }
    }
}

// ── Record ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    // Canonical source fields
    pub numero_processo: Option<String>,
    pub nome_cliente: String,
    pub objeto_acao: String,
    pub estado: String,
    pub status: Status,
    pub situacao: Option<String>,
    pub prognostico: Option<String>,
    pub area_juridica: Option<String>,
    pub comarca: Option<String>,
    pub foro: Option<String>,
    pub vara: Option<String>,
    pub data_entrada: Option<NaiveDate>,
    pub data_encerramento: Option<NaiveDate>,
    pub data_distribuicao: Option<NaiveDate>,
    pub motivo_encerramento: Option<String>,
    pub impacto_financeiro: f64,
    pub valor_causa: f64,
    pub impacto_negativo: Option<f64>,
    pub valor_acordo: Option<f64>,
    pub reiteracoes_orig: Option<i64>,
    pub area_responsavel: Option<String>,
    pub sentenca_orig: Option<String>,
    pub descumprimento_obrigacao: Option<String>,

    // Derived fields — always populated after `derive_fields`
    pub tempo_tramitacao: i64,
    pub sla_real: f64,
    pub sla_dias: i64,
    pub prazo_dias: i64,
    pub custo_encerramento: f64,
    pub area_interna: String,
    pub sentenca: Sentenca,
    pub tipo_acao: String,
    pub reiteracoes: i64,
    pub reincidencia: bool,
    pub erro_sistemico: bool,
    pub critico: bool,

    /// Source columns the resolver did not map. Kept for merge column-union
    /// and for `totais_por_coluna`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, Value>,
}

impl Default for CaseRecord {
    fn default() -> Self {
        Self {
            numero_processo: None,
            nome_cliente: NAO_INFORMADO.to_string(),
            objeto_acao: NAO_INFORMADO.to_string(),
            estado: NAO_INFORMADO.to_string(),
            status: Status::EmTramitacao,
            situacao: None,
            prognostico: None,
            area_juridica: None,
            comarca: None,
            foro: None,
            vara: None,
            data_entrada: None,
            data_encerramento: None,
            data_distribuicao: None,
            motivo_encerramento: None,
            impacto_financeiro: 0.0,
            valor_causa: 0.0,
            impacto_negativo: None,
            valor_acordo: None,
            reiteracoes_orig: None,
            area_responsavel: None,
            sentenca_orig: None,
            descumprimento_obrigacao: None,
            tempo_tramitacao: 0,
            sla_real: 0.0,
            sla_dias: 30,
            prazo_dias: 0,
            custo_encerramento: 0.0,
            area_interna: NAO_INFORMADO.to_string(),
            sentenca: Sentenca::Parcial,
            tipo_acao: NAO_INFORMADO.to_string(),
            reiteracoes: 0,
            reincidencia: false,
            erro_sistemico: false,
            critico: false,
            extras: BTreeMap::new(),
        }
    }
}

impl CaseRecord {
    /// Claimed value ("valor pretendido") — valor da causa, falling back to
    /// the financial impact when the source never carried a claim value.
    pub fn valor_pretendido(&self) -> f64 {
        if self.valor_causa > 0.0 {
            self.valor_causa
        } else {
            self.impacto_financeiro
        }
    }

    /// Look up a column by canonical name, covering typed fields and extras.
    /// This is the seam the generic aggregator goes through.
    pub fn field_value(&self, name: &str) -> Option<Value> {
        let v = match name {
            "numero_processo" => opt_str(&self.numero_processo),
            "nome_cliente" => Value::String(self.nome_cliente.clone()),
            "objeto_acao" => Value::String(self.objeto_acao.clone()),
            "estado" => Value::String(self.estado.clone()),
            "status" => Value::String(self.status.to_string()),
            "situacao" => opt_str(&self.situacao),
            "prognostico" => opt_str(&self.prognostico),
            "area_juridica" => opt_str(&self.area_juridica),
            "comarca" => opt_str(&self.comarca),
            "foro" => opt_str(&self.foro),
            "vara" => opt_str(&self.vara),
            "data_entrada" => opt_date(&self.data_entrada),
            "data_encerramento" => opt_date(&self.data_encerramento),
            "data_distribuicao" => opt_date(&self.data_distribuicao),
            "motivo_encerramento" => opt_str(&self.motivo_encerramento),
            "impacto_financeiro" => json_num(self.impacto_financeiro),
            "valor_causa" => json_num(self.valor_causa),
            "area_interna" => Value::String(self.area_interna.clone()),
            "sentenca" => Value::String(self.sentenca.to_string()),
            "tipo_acao" => Value::String(self.tipo_acao.clone()),
            "tempo_tramitacao" => Value::from(self.tempo_tramitacao),
            "sla_real" => json_num(self.sla_real),
            "sla_dias" => Value::from(self.sla_dias),
            "prazo_dias" => Value::from(self.prazo_dias),
            "custo_encerramento" => json_num(self.custo_encerramento),
            "impacto_negativo" => self.impacto_negativo.map(json_num).unwrap_or(Value::Null),
            "valor_acordo" => self.valor_acordo.map(json_num).unwrap_or(Value::Null),
            "reiteracoes" => Value::from(self.reiteracoes),
            "reincidencia" => Value::Bool(self.reincidencia),
            "erro_sistemico" => Value::Bool(self.erro_sistemico),
            "critico" => Value::Bool(self.critico),
            "descumprimento_obrigacao" => opt_str(&self.descumprimento_obrigacao),
            _ => return self.extras.get(name).cloned(),
        };
        Some(v)
    }
}

fn opt_str(value: &Option<String>) -> Value {
    match value {
        Some(s) => Value::String(s.clone()),
        None => Value::Null,
    }
}

fn opt_date(value: &Option<NaiveDate>) -> Value {
    match value {
        Some(d) => Value::String(d.to_string()),
        None => Value::Null,
    }
}

fn json_num(value: f64) -> Value {
    if value.is_finite() {
        Value::from(value)
    } else {
        Value::from(0)
    }
}

// ── Table ────────────────────────────────────────────────────────────────────

/// The canonical table. Published snapshots are immutable; aggregations only
/// ever read it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseTable {
    pub rows: Vec<CaseRecord>,
}

impl CaseTable {
    pub fn new(rows: Vec<CaseRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CaseRecord> {
        self.rows.iter()
    }

    /// Distinct `objeto_acao` values in row order of first appearance.
    pub fn objetos(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for row in &self.rows {
            if seen.insert(row.objeto_acao.clone()) {
                out.push(row.objeto_acao.clone());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_sentenca_serialize_with_accents() {
        assert_eq!(
            serde_json::to_value(Status::EmTramitacao).unwrap(),
            Value::String("Em Tramitação".into())
        );
        assert_eq!(
            serde_json::to_value(Sentenca::Favoravel).unwrap(),
            Value::String("Favorável".into())
        );
    }

    #[test]
    fn field_value_reaches_extras() {
        let mut rec = CaseRecord::default();
        rec.extras
            .insert("cidade".into(), Value::String("Campinas".into()));

        assert_eq!(
            rec.field_value("cidade"),
            Some(Value::String("Campinas".into()))
        );
        assert_eq!(rec.field_value("coluna_inexistente"), None);
        assert_eq!(
            rec.field_value("estado"),
            Some(Value::String(NAO_INFORMADO.into()))
        );
    }
}
