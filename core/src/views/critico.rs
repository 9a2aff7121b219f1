//! Critical-case extraction.

use crate::record::{CaseRecord, CaseTable};
use crate::sanitize::safe_num;
use crate::views::ano;
use serde_json::{json, Value};

/// Top-N critical cases by financial impact. When no row carries the
/// criticality flag the global top-N by impact stands in, so the panel is
/// never blank on a thin filter.
pub fn filtrar_casos_criticos(df: &CaseTable, top_n: usize) -> Vec<Value> {
    let mut criticos: Vec<&CaseRecord> = df.iter().filter(|r| r.critico).collect();
    if criticos.is_empty() {
        criticos = df.iter().collect();
    }
    criticos.sort_by(|a, b| {
        b.impacto_financeiro
            .partial_cmp(&a.impacto_financeiro)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    criticos.truncate(top_n);

    criticos
        .into_iter()
        .map(|rec| {
            json!({
                "nome_cliente": rec.nome_cliente,
                "tipo_ocorrencia": rec.objeto_acao,
                "motivo_detalhado": rec.motivo_encerramento.clone().unwrap_or_else(|| "N/A".into()),
                "situacao": rec.status.to_string(),
                "prejuizo": safe_num(rec.impacto_financeiro),
                "valor_pretendido": safe_num(rec.valor_pretendido()),
                "ano": ano(rec.data_entrada),
                "objeto_acao": rec.objeto_acao,
                "estado": rec.estado,
                "impacto_financeiro": safe_num(rec.impacto_financeiro),
                "reiteracoes": rec.reiteracoes,
            })
        })
        .collect()
}

/// Critical-case panel: the extraction above plus the 2025 / other-years
/// partition the dashboard charts separately.
pub fn casos_criticos(df: &CaseTable, top_n: usize) -> Value {
    let dados = filtrar_casos_criticos(df, top_n);

    let de_2025: Vec<Value> = dados
        .iter()
        .filter(|c| c["ano"].as_i64() == Some(2025))
        .cloned()
        .collect();
    let outros: Vec<Value> = dados
        .iter()
        .filter(|c| c["ano"].as_i64() != Some(2025))
        .cloned()
        .collect();

    let total = dados.len();
    let total_2025 = de_2025.len();
    let total_outros = outros.len();

    json!({
        "dados": dados,
        "dados_2025": de_2025,
        "dados_outros": outros,
        "total": total,
        "total_2025": total_2025,
        "total_outros": total_outros,
    })
}
