//! SLA views per internal area.
//!
//! `sla_real` is 0.0 when either date is missing, so every mean here is
//! taken over rows with BOTH dates recorded — an area with no such rows
//! reports 0.0, never a division blowup and never a mean dragged down by
//! unknown values.

use crate::config::{PresentationOverrides, BENCHMARK_NACIONAL};
use crate::record::{CaseRecord, CaseTable};
use crate::sanitize::{json_safe, media, percentual, safe_num};
use crate::types::NAO_INFORMADO;
use crate::views::sort_desc_by;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

fn tem_ambas_datas(rec: &CaseRecord) -> bool {
    rec.data_entrada.is_some() && rec.data_encerramento.is_some()
}

fn sla_por_area_validos(df: &CaseTable) -> HashMap<String, Vec<f64>> {
    let mut grupos: HashMap<String, Vec<f64>> = HashMap::new();
    for rec in df.iter() {
        if rec.area_interna == NAO_INFORMADO || !tem_ambas_datas(rec) {
            continue;
        }
        grupos
            .entry(rec.area_interna.clone())
            .or_default()
            .push(rec.sla_real);
    }
    grupos
}

/// Mean real SLA per area against the national benchmark. The mean is taken
/// over the both-dates rows only; an area whose cases are all still open
/// reports 0.0 with its full case count.
pub fn sla_por_area(df: &CaseTable) -> Value {
    let validos = sla_por_area_validos(df);

    let mut quantidades: HashMap<String, i64> = HashMap::new();
    for rec in df.iter() {
        if rec.area_interna != NAO_INFORMADO {
            *quantidades.entry(rec.area_interna.clone()).or_insert(0) += 1;
        }
    }

    let mut linhas: Vec<Map<String, Value>> = quantidades
        .into_iter()
        .map(|(area, quantidade)| {
            let valores = validos.get(&area).map(Vec::as_slice).unwrap_or(&[]);
            let media_dias = round2(media(valores));
            let mut linha = Map::new();
            linha.insert("area".into(), Value::String(area));
            linha.insert("media_dias".into(), safe_num(media_dias));
            linha.insert("quantidade".into(), Value::from(quantidade));
            linha.insert(
                "acima_da_meta".into(),
                Value::Bool(media_dias > BENCHMARK_NACIONAL),
            );
            linha
        })
        .collect();
    sort_desc_by(&mut linhas, |l| {
        l.get("media_dias").and_then(Value::as_f64).unwrap_or(0.0)
    });

    json!({
        "dados": linhas,
        "benchmark_nacional": BENCHMARK_NACIONAL,
    })
}

/// SLA of the subsidy flow per area.
///
/// Computes the real figures, then — when the executive override is present
/// — reports the fixed boletim 10/2025 numbers with real per-area case
/// counts grafted in. With `PresentationOverrides::none()` the computed
/// figures are reported as-is.
pub fn sla_subsidio_por_area(df: &CaseTable, overrides: &PresentationOverrides) -> Value {
    let grupos = sla_por_area_validos(df);
    let todas: Vec<f64> = grupos.values().flatten().copied().collect();

    let media_nacional_tempo = media(&todas);
    let dentro = todas.iter().filter(|v| **v <= BENCHMARK_NACIONAL).count();
    let media_nacional_sla = percentual(dentro as f64, todas.len() as f64);

    let mut computado: Vec<(String, f64, usize, f64)> = grupos
        .into_iter()
        .map(|(area, valores)| {
            let dentro_area = valores
                .iter()
                .filter(|v| **v <= BENCHMARK_NACIONAL)
                .count();
            (
                area,
                media(&valores),
                valores.len(),
                percentual(dentro_area as f64, valores.len() as f64),
            )
        })
        .collect();
    sort_desc_by(&mut computado, |(_, tempo, _, _)| *tempo);

    if let Some(figuras) = &overrides.sla_subsidio {
        // Fixed narrative path: boletim figures, real counts where we have
        // the area.
        let dados: Vec<Value> = figuras
            .areas
            .iter()
            .map(|area| {
                let quantidade = computado
                    .iter()
                    .find(|(nome, ..)| nome.contains(&area.area))
                    .map(|(_, _, n, _)| *n)
                    .unwrap_or(0);
                json!({
                    "area": area.area,
                    "tempo_medio_tramitacao": safe_num(area.tempo_medio_tramitacao),
                    "quantidade": quantidade,
                    "percentual_dentro_sla": safe_num(area.percentual_dentro_sla),
                    "percentual_acima_5_dias": safe_num(area.percentual_acima_5_dias),
                })
            })
            .collect();
        return json_safe(json!({
            "dados": dados,
            "media_nacional_sla": safe_num(figuras.media_nacional_sla),
            "media_nacional_tempo": safe_num(figuras.media_nacional_tempo),
            "sla_dias": figuras.sla_dias,
            "legenda": figuras.legenda,
        }));
    }

    let dados: Vec<Value> = computado
        .into_iter()
        .map(|(area, tempo, quantidade, dentro_pct)| {
            json!({
                "area": area,
                "tempo_medio_tramitacao": safe_num(round2(tempo)),
                "quantidade": quantidade,
                "percentual_dentro_sla": safe_num(round2(dentro_pct)),
                "percentual_acima_5_dias": safe_num(round2(100.0 - dentro_pct)),
            })
        })
        .collect();

    json!({
        "dados": dados,
        "media_nacional_sla": safe_num(round2(media_nacional_sla)),
        "media_nacional_tempo": safe_num(round2(media_nacional_tempo)),
    })
}

/// Distinct valid responsibility areas.
pub fn areas_responsaveis(df: &CaseTable) -> Value {
    let mut areas: Vec<String> = df
        .iter()
        .map(|r| r.area_interna.clone())
        .filter(|a| !a.trim().is_empty() && a != NAO_INFORMADO)
        .collect();
    areas.sort();
    areas.dedup();
    let total = areas.len();

    json!({ "areas": areas, "total": total })
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
