//! Client-recurrence views.

use crate::config::PresentationOverrides;
use crate::record::CaseTable;
use crate::sanitize::{percentual, safe_num};
use crate::types::NAO_INFORMADO;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Global recurrence summary over the load-time flag.
pub fn reincidencia(df: &CaseTable) -> Value {
    let total = df.len() as i64;
    let reincidentes = df.iter().filter(|r| r.reincidencia).count() as i64;

    json!({
        "total": total,
        "reincidentes": reincidentes,
        "nao_reincidentes": total - reincidentes,
        "taxa_reincidencia": safe_num(percentual(reincidentes as f64, total as f64)),
    })
}

/// Top-N clients ranked by summed claim value, with per-client process
/// counts. The global recurrence rate carried an executive placeholder in
/// the source material; it stays an explicit override here.
pub fn reincidencia_por_cliente(
    df: &CaseTable,
    top_n: usize,
    overrides: &PresentationOverrides,
) -> Value {
    let validos: Vec<_> = df
        .iter()
        .filter(|r| !r.nome_cliente.trim().is_empty() && r.nome_cliente != NAO_INFORMADO)
        .collect();
    if validos.is_empty() {
        return json!({
            "dados": [],
            "total_clientes": 0,
            "total_processos": 0,
            "total_resultado": 0.0,
            "taxa_reincidencia": 0.0,
        });
    }

    struct Grupo {
        resultado: f64,
        qtd_processos: i64,
    }
    let mut grupos: HashMap<String, Grupo> = HashMap::new();
    for rec in &validos {
        let grupo = grupos.entry(rec.nome_cliente.clone()).or_insert(Grupo {
            resultado: 0.0,
            qtd_processos: 0,
        });
        grupo.resultado += rec.valor_pretendido();
        grupo.qtd_processos += 1;
    }

    let total_clientes = grupos.len() as i64;
    let total_processos = validos.len() as i64;
    let processos_reincidentes: i64 = grupos
        .values()
        .filter(|g| g.qtd_processos > 1)
        .map(|g| g.qtd_processos)
        .sum();

    let mut ranking: Vec<(String, Grupo)> = grupos.into_iter().collect();
    ranking.sort_by(|a, b| {
        b.1.resultado
            .partial_cmp(&a.1.resultado)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranking.truncate(top_n);

    let total_resultado: f64 = ranking.iter().map(|(_, g)| g.resultado).sum();
    let dados: Vec<Value> = ranking
        .into_iter()
        .map(|(nome, g)| {
            json!({
                "nome_cliente": nome,
                "resultado": safe_num(g.resultado),
                "qtd_processos": g.qtd_processos,
            })
        })
        .collect();

    let taxa_computada = percentual(processos_reincidentes as f64, total_processos as f64);
    let taxa = overrides.taxa_reincidencia.unwrap_or(taxa_computada);

    json!({
        "dados": dados,
        "total_clientes": total_clientes,
        "total_processos": total_processos,
        "total_resultado": safe_num(total_resultado),
        "taxa_reincidencia": safe_num(taxa),
    })
}
