//! State-keyed views feeding the national map and the cross-filter panel.

use crate::record::CaseTable;
use crate::sanitize::{media, percentual, safe_num};
use crate::views::{sort_desc_by, uf_valida};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

struct GrupoUf {
    quantidade: i64,
    entradas: i64,
    impacto: f64,
    tempos: Vec<f64>,
}

fn agrupar_por_uf(df: &CaseTable, normalizar: bool) -> Vec<(String, GrupoUf)> {
    let mut grupos: HashMap<String, GrupoUf> = HashMap::new();
    for rec in df.iter() {
        let chave = if normalizar {
            match uf_valida(rec) {
                Some(uf) => uf,
                None => continue,
            }
        } else {
            rec.estado.clone()
        };
        let grupo = grupos.entry(chave).or_insert(GrupoUf {
            quantidade: 0,
            entradas: 0,
            impacto: 0.0,
            tempos: Vec::new(),
        });
        grupo.quantidade += 1;
        if rec.data_entrada.is_some() {
            grupo.entradas += 1;
        }
        grupo.impacto += rec.impacto_financeiro;
        grupo.tempos.push(rec.tempo_tramitacao as f64);
    }
    grupos.into_iter().collect()
}

/// Per-state aggregate for the national map: count, summed impact, mean
/// elapsed days. States are reported as they appear in the table.
pub fn mapa_nacional(df: &CaseTable) -> Value {
    let mut grupos = agrupar_por_uf(df, false);
    sort_desc_by(&mut grupos, |(_, g)| g.entradas as f64);

    let estados: Vec<Value> = grupos
        .into_iter()
        .map(|(estado, g)| {
            json!({
                "estado": estado,
                "quantidade": g.entradas,
                "impacto_total": safe_num(g.impacto),
                "tempo_medio": safe_num(media(&g.tempos)),
            })
        })
        .collect();
    let total = estados.len();

    json!({ "estados": estados, "total_estados": total })
}

/// Case and object counts per UF, garbage state codes dropped.
pub fn casos_objetos_por_uf(df: &CaseTable) -> Value {
    let mut por_uf: Vec<(String, GrupoUf)> = agrupar_por_uf(df, true);
    sort_desc_by(&mut por_uf, |(_, g)| g.quantidade as f64);

    let total_casos: i64 = por_uf.iter().map(|(_, g)| g.quantidade).sum();
    let total_ufs = por_uf.len();
    let dados_uf: Vec<Value> = por_uf
        .into_iter()
        .filter(|(_, g)| g.quantidade > 0)
        .map(|(uf, g)| json!({ "uf": uf, "quantidade": g.quantidade }))
        .collect();

    let mut por_objeto: HashMap<(String, String), i64> = HashMap::new();
    for rec in df.iter() {
        if let Some(uf) = uf_valida(rec) {
            *por_objeto
                .entry((uf, rec.objeto_acao.clone()))
                .or_insert(0) += 1;
        }
    }
    let mut objeto_uf: Vec<((String, String), i64)> = por_objeto.into_iter().collect();
    objeto_uf.sort_by(|a, b| a.0 .0.cmp(&b.0 .0).then(b.1.cmp(&a.1)));
    let dados_objeto_uf: Vec<Value> = objeto_uf
        .into_iter()
        .map(|((uf, objeto), quantidade)| {
            json!({ "uf": uf, "objeto": objeto, "quantidade": quantidade })
        })
        .collect();

    json!({
        "por_uf": dados_uf,
        "por_objeto_uf": dados_objeto_uf,
        "total_casos": total_casos,
        "total_ufs": total_ufs,
    })
}

/// Total financial loss per UF, with shares and R$-thousand figures.
pub fn prejuizo_por_uf(df: &CaseTable) -> Value {
    let mut grupos = agrupar_por_uf(df, true);
    if grupos.is_empty() {
        return json!({
            "dados": [],
            "total_prejuizo": 0.0,
            "total_prejuizo_mil": 0.0,
            "total_ufs": 0,
        });
    }
    sort_desc_by(&mut grupos, |(_, g)| g.impacto);

    let total_prejuizo: f64 = grupos.iter().map(|(_, g)| g.impacto).sum();
    let dados: Vec<Value> = grupos
        .iter()
        .map(|(uf, g)| {
            let prejuizo_medio = if g.quantidade > 0 {
                g.impacto / g.quantidade as f64
            } else {
                0.0
            };
            json!({
                "uf": uf,
                "prejuizo_total": safe_num(g.impacto),
                "prejuizo_medio": safe_num(prejuizo_medio),
                "quantidade": g.quantidade,
                "percentual": safe_num(round1(percentual(g.impacto, total_prejuizo))),
                "prejuizo_total_mil": safe_num(round2(g.impacto / 1000.0)),
            })
        })
        .collect();
    let total_ufs = grupos.len();

    json!({
        "dados": dados,
        "total_prejuizo": safe_num(total_prejuizo),
        "total_prejuizo_mil": safe_num(round2(total_prejuizo / 1000.0)),
        "total_ufs": total_ufs,
    })
}

/// Cross-filter bundle for the impact-analysis panel: map aggregates, top
/// objects per UF, mean elapsed days per UF, the mixed bar/line series and
/// the loss-share distribution. Accepts an optional object filter.
pub fn analise_correlacao(df: &CaseTable, filtro_objeto: Option<&str>) -> Value {
    let filtrado;
    let df = match filtro_objeto.map(str::trim).filter(|s| !s.is_empty()) {
        Some(objeto) => {
            filtrado = CaseTable::new(
                df.iter()
                    .filter(|r| r.objeto_acao.trim() == objeto)
                    .cloned()
                    .collect(),
            );
            &filtrado
        }
        None => df,
    };

    let mapa = mapa_nacional(df);

    // Top 10 objects per UF.
    let mut por_objeto_uf: HashMap<(String, String), i64> = HashMap::new();
    for rec in df.iter() {
        *por_objeto_uf
            .entry((rec.estado.clone(), rec.objeto_acao.clone()))
            .or_insert(0) += 1;
    }
    let mut pares: Vec<((String, String), i64)> = por_objeto_uf.into_iter().collect();
    pares.sort_by(|a, b| a.0 .0.cmp(&b.0 .0).then(b.1.cmp(&a.1)));
    let mut por_objeto: Vec<Value> = Vec::new();
    let mut vistos_por_uf: HashMap<&str, usize> = HashMap::new();
    for ((uf, objeto), quantidade) in &pares {
        let vistos = vistos_por_uf.entry(uf.as_str()).or_insert(0);
        if *vistos < 10 {
            *vistos += 1;
            por_objeto.push(json!({
                "uf": uf,
                "objeto": objeto,
                "quantidade": quantidade,
            }));
        }
    }

    // Mean elapsed days per UF.
    let mut tempos: HashMap<String, Vec<f64>> = HashMap::new();
    for rec in df.iter() {
        tempos
            .entry(rec.estado.clone())
            .or_default()
            .push(rec.tempo_tramitacao as f64);
    }
    let mut tempo_linhas: Vec<(String, f64)> = tempos
        .into_iter()
        .map(|(uf, valores)| (uf, media(&valores)))
        .collect();
    sort_desc_by(&mut tempo_linhas, |(_, m)| *m);
    let tempo_tramitacao: Vec<Value> = tempo_linhas
        .into_iter()
        .map(|(uf, tempo)| json!({ "uf": uf, "tempo_medio": safe_num(tempo) }))
        .collect();

    // Base chart (bar = count, line = mean loss in R$ thousand) and the
    // loss-share donut, both over normalized UFs.
    let mut grupos = agrupar_por_uf(df, true);
    sort_desc_by(&mut grupos, |(_, g)| g.quantidade as f64);

    let labels: Vec<Value> = grupos
        .iter()
        .map(|(uf, _)| Value::String(uf.clone()))
        .collect();
    let quantidades: Vec<Value> = grupos
        .iter()
        .map(|(_, g)| Value::from(g.quantidade))
        .collect();
    let medias_mil: Vec<Value> = grupos
        .iter()
        .map(|(_, g)| {
            let media_impacto = if g.quantidade > 0 {
                g.impacto / g.quantidade as f64
            } else {
                0.0
            };
            safe_num(round2(media_impacto / 1000.0))
        })
        .collect();

    let total_prejuizo: f64 = grupos.iter().map(|(_, g)| g.impacto).sum();
    let mut distribuicao: Vec<(String, i64, f64, f64)> = grupos
        .iter()
        .map(|(uf, g)| {
            let media_impacto = if g.quantidade > 0 {
                g.impacto / g.quantidade as f64
            } else {
                0.0
            };
            (uf.clone(), g.quantidade, g.impacto, media_impacto)
        })
        .collect();
    sort_desc_by(&mut distribuicao, |(_, _, prejuizo, _)| *prejuizo);
    let distribuicao_uf: Vec<Value> = distribuicao
        .into_iter()
        .map(|(uf, quantidade, prejuizo, media_impacto)| {
            json!({
                "uf": uf,
                "quantidade": quantidade,
                "prejuizo_total": safe_num(prejuizo),
                "prejuizo_total_mil": safe_num(round2(prejuizo / 1000.0)),
                "percentual": safe_num(round1(percentual(prejuizo, total_prejuizo))),
                "impacto_mil": safe_num(round2(media_impacto / 1000.0)),
            })
        })
        .collect();

    json!({
        "mapa": { "estados": mapa["estados"] },
        "por_objeto": por_objeto,
        "tempo_tramitacao": tempo_tramitacao,
        "base": {
            "labels": labels,
            "quantidade": quantidades,
            "media_impacto_mil": medias_mil,
        },
        "distribuicao_uf": distribuicao_uf,
        "filtro_objeto": filtro_objeto,
    })
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
