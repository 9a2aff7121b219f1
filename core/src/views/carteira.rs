//! Portfolio-level views: global balance, monthly evolution, elapsed-time
//! summaries and deadline splits.

use crate::config::PRAZO_LIMITE_DIAS;
use crate::derive::is_encerrado;
use crate::record::CaseTable;
use crate::sanitize::{media, percentual, safe_num};
use crate::types::{Periodo, NAO_INFORMADO};
use crate::views::{periodo, sort_desc_by};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Global balance: open vs closed counts and their financial split.
pub fn saldo(df: &CaseTable) -> Value {
    let encerrados = df
        .iter()
        .filter(|r| is_encerrado(&r.motivo_encerramento))
        .count() as i64;
    let entradas = df.len() as i64 - encerrados;

    let impacto_encerrados: f64 = df
        .iter()
        .filter(|r| is_encerrado(&r.motivo_encerramento))
        .map(|r| r.impacto_financeiro)
        .sum();
    let impacto_entradas: f64 = df
        .iter()
        .filter(|r| !is_encerrado(&r.motivo_encerramento))
        .map(|r| r.impacto_financeiro)
        .sum();

    json!({
        "entradas": entradas,
        "encerrados": encerrados,
        "saldo": entradas - encerrados,
        "impacto_entradas": safe_num(impacto_entradas),
        "impacto_encerrados": safe_num(impacto_encerrados),
        "saldo_impacto": safe_num(impacto_entradas - impacto_encerrados),
    })
}

/// Monthly evolution: intakes by intake month, closures by closure month,
/// outer-joined over the union of periods, missing months zero-filled.
pub fn evolucao(df: &CaseTable) -> Value {
    let mut entradas: BTreeMap<Periodo, i64> = BTreeMap::new();
    for rec in df.iter() {
        if let Some(data) = rec.data_entrada {
            *entradas.entry(periodo(data)).or_insert(0) += 1;
        }
    }

    let mut encerramentos: BTreeMap<Periodo, i64> = BTreeMap::new();
    for rec in df.iter() {
        if is_encerrado(&rec.motivo_encerramento) {
            if let Some(data) = rec.data_encerramento {
                *encerramentos.entry(periodo(data)).or_insert(0) += 1;
            }
        }
    }

    // BTreeMap keys are already chronological ("YYYY-MM" sorts as text).
    let mut periodos: Vec<Periodo> = entradas.keys().cloned().collect();
    for p in encerramentos.keys() {
        if !periodos.contains(p) {
            periodos.push(p.clone());
        }
    }
    periodos.sort();

    let dados: Vec<Value> = periodos
        .iter()
        .map(|p| {
            json!({
                "periodo": p,
                "entradas": entradas.get(p).copied().unwrap_or(0),
                "encerramentos": encerramentos.get(p).copied().unwrap_or(0),
            })
        })
        .collect();

    json!({
        "dados": dados,
        "total_periodos": periodos.len(),
    })
}

/// Mean elapsed days overall, per object and per internal area.
pub fn tempo_medio(df: &CaseTable) -> Value {
    if df.is_empty() {
        return json!({ "media_geral": 0, "por_objeto": [], "por_area": [] });
    }

    let tempos: Vec<f64> = df.iter().map(|r| r.tempo_tramitacao as f64).collect();
    let media_geral = media(&tempos);

    let por = |chave: fn(&crate::record::CaseRecord) -> String, rotulo: &str| -> Vec<Value> {
        let mut grupos: HashMap<String, Vec<f64>> = HashMap::new();
        for rec in df.iter() {
            grupos
                .entry(chave(rec))
                .or_default()
                .push(rec.tempo_tramitacao as f64);
        }
        let mut linhas: Vec<Map<String, Value>> = grupos
            .into_iter()
            .map(|(nome, valores)| {
                let mut linha = Map::new();
                linha.insert(rotulo.to_string(), Value::String(nome));
                linha.insert("tempo_medio".into(), safe_num(media(&valores)));
                linha
            })
            .collect();
        sort_desc_by(&mut linhas, |l| {
            l.get("tempo_medio").and_then(Value::as_f64).unwrap_or(0.0)
        });
        linhas.into_iter().map(Value::Object).collect()
    };

    json!({
        "media_geral": safe_num(media_geral),
        "por_objeto": por(|r| r.objeto_acao.clone(), "objeto"),
        "por_area": por(|r| r.area_interna.clone(), "area"),
    })
}

/// Requests split at the deadline cut (> 5 days of current processing).
pub fn solicitacoes_prazo(df: &CaseTable) -> Value {
    struct Lado {
        quantidade: i64,
        impacto: f64,
    }
    let mut dentro = Lado {
        quantidade: 0,
        impacto: 0.0,
    };
    let mut fora = Lado {
        quantidade: 0,
        impacto: 0.0,
    };
    for rec in df.iter() {
        let lado = if rec.prazo_dias > PRAZO_LIMITE_DIAS {
            &mut fora
        } else {
            &mut dentro
        };
        if rec.data_entrada.is_some() {
            lado.quantidade += 1;
        }
        lado.impacto += rec.impacto_financeiro;
    }

    json!({
        "dados": [
            {
                "prazo_maior_5": false,
                "quantidade": dentro.quantidade,
                "impacto_financeiro": safe_num(dentro.impacto),
            },
            {
                "prazo_maior_5": true,
                "quantidade": fora.quantidade,
                "impacto_financeiro": safe_num(fora.impacto),
            },
        ],
        "total_maior_5": df.iter().filter(|r| r.prazo_dias > PRAZO_LIMITE_DIAS).count(),
    })
}

/// Deadline split per internal area, unknown areas excluded.
pub fn solicitacoes_prazo_por_area(df: &CaseTable) -> Value {
    struct Grupo {
        menor_igual_5: i64,
        maior_5: i64,
    }
    let mut grupos: HashMap<String, Grupo> = HashMap::new();
    for rec in df.iter() {
        if rec.area_interna == NAO_INFORMADO {
            continue;
        }
        let grupo = grupos.entry(rec.area_interna.clone()).or_insert(Grupo {
            menor_igual_5: 0,
            maior_5: 0,
        });
        if rec.prazo_dias > PRAZO_LIMITE_DIAS {
            grupo.maior_5 += 1;
        } else {
            grupo.menor_igual_5 += 1;
        }
    }

    let mut linhas: Vec<Map<String, Value>> = grupos
        .into_iter()
        .map(|(area, g)| {
            let mut linha = Map::new();
            linha.insert("area".into(), Value::String(area));
            linha.insert("total".into(), Value::from(g.menor_igual_5 + g.maior_5));
            linha.insert("menor_igual_5".into(), Value::from(g.menor_igual_5));
            linha.insert("maior_5".into(), Value::from(g.maior_5));
            linha
        })
        .collect();
    sort_desc_by(&mut linhas, |l| {
        l.get("total").and_then(Value::as_i64).unwrap_or(0) as f64
    });

    json!({ "dados": linhas })
}

/// Simple per-object summary: totals, counts and share of the portfolio.
pub fn agregado_por_objeto(df: &CaseTable) -> Value {
    struct Grupo {
        impacto: f64,
        quantidade: i64,
    }
    let mut grupos: HashMap<String, Grupo> = HashMap::new();
    for rec in df.iter() {
        let grupo = grupos.entry(rec.objeto_acao.clone()).or_insert(Grupo {
            impacto: 0.0,
            quantidade: 0,
        });
        grupo.impacto += rec.impacto_financeiro;
        if rec.data_entrada.is_some() {
            grupo.quantidade += 1;
        }
    }

    let total_geral: i64 = grupos.values().map(|g| g.quantidade).sum();
    let mut linhas: Vec<Map<String, Value>> = grupos
        .into_iter()
        .map(|(objeto, g)| {
            let mut linha = Map::new();
            linha.insert("objeto_acao".into(), Value::String(objeto));
            linha.insert("total_impacto".into(), safe_num(g.impacto));
            linha.insert("quantidade".into(), Value::from(g.quantidade));
            linha.insert(
                "percentual".into(),
                safe_num(percentual(g.quantidade as f64, total_geral as f64)),
            );
            linha
        })
        .collect();
    sort_desc_by(&mut linhas, |l| {
        l.get("quantidade").and_then(Value::as_i64).unwrap_or(0) as f64
    });

    json!({ "dados": linhas })
}
