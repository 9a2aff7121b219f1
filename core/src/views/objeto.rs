//! Views keyed by `objeto_acao` — the year pivots and their satellites.

use crate::derive::is_encerrado;
use crate::record::CaseTable;
use crate::sanitize::{json_safe, safe_num};
use crate::types::Ano;
use crate::views::{ano_encerramento_ou, ano_entrada_ou, sort_desc_by};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Years the intake pivot reports. Rows outside the window still count in
/// impact totals but get no year column.
const ANOS_ENTRADAS: [Ano; 4] = [2022, 2023, 2024, 2025];
const ANOS_ENCERRAMENTOS: [Ano; 3] = [2023, 2024, 2025];

/// Undated rows fall into the current reporting year.
const ANO_FALLBACK: Ano = 2025;

/// Intakes per action object, pivoted by year. `todos_objetos` is the
/// distinct object set of the UNFILTERED table: every one of them appears in
/// the output, zero-filled, so charts keep a stable row set across filters.
pub fn entradas_por_objeto(df: &CaseTable, todos_objetos: &[String]) -> Value {
    let entradas: Vec<_> = df.iter().filter(|r| r.data_entrada.is_some()).collect();

    let mut contagem: HashMap<(String, Ano), i64> = HashMap::new();
    let mut total_impacto = 0.0;
    for rec in &entradas {
        let ano = ano_entrada_ou(rec, ANO_FALLBACK);
        *contagem.entry((rec.objeto_acao.clone(), ano)).or_insert(0) += 1;
        total_impacto += rec.impacto_financeiro;
    }

    let dados = pivot_por_ano(&contagem, todos_objetos, &ANOS_ENTRADAS, df);
    let total: i64 = dados
        .iter()
        .filter_map(|linha| linha.get("Total").and_then(Value::as_i64))
        .sum();

    json_safe(json!({
        "dados": dados,
        "total": total,
        "total_impacto": safe_num(total_impacto),
    }))
}

/// Closures per action object, pivoted by year (2023–2025 window). Closure
/// status comes from `is_encerrado`; the counted date is the closure date.
pub fn encerrados_por_objeto(df: &CaseTable, todos_objetos: &[String]) -> Value {
    let encerrados: Vec<_> = df
        .iter()
        .filter(|r| is_encerrado(&r.motivo_encerramento))
        .filter(|r| {
            let ano = ano_encerramento_ou(r, ANO_FALLBACK);
            (2023..=2025).contains(&ano)
        })
        .collect();

    let mut contagem: HashMap<(String, Ano), i64> = HashMap::new();
    let mut total_impacto = 0.0;
    for rec in &encerrados {
        total_impacto += rec.impacto_financeiro;
        // An undated closure contributes to the impact total but cannot be
        // placed in a year column.
        if rec.data_encerramento.is_some() {
            let ano = ano_encerramento_ou(rec, ANO_FALLBACK);
            *contagem.entry((rec.objeto_acao.clone(), ano)).or_insert(0) += 1;
        }
    }

    let dados = pivot_por_ano(&contagem, todos_objetos, &ANOS_ENCERRAMENTOS, df);
    let total: i64 = dados
        .iter()
        .filter_map(|linha| linha.get("Total").and_then(Value::as_i64))
        .sum();

    json_safe(json!({
        "dados": dados,
        "total": total,
        "total_impacto": safe_num(total_impacto),
    }))
}

fn pivot_por_ano(
    contagem: &HashMap<(String, Ano), i64>,
    todos_objetos: &[String],
    anos: &[Ano],
    df: &CaseTable,
) -> Vec<Map<String, Value>> {
    // Row set = unfiltered universe ∪ whatever showed up here.
    let mut objetos: Vec<String> = todos_objetos.to_vec();
    for obj in df.objetos() {
        if !objetos.contains(&obj) {
            objetos.push(obj);
        }
    }
    objetos.sort();

    let mut linhas: Vec<Map<String, Value>> = Vec::with_capacity(objetos.len());
    for objeto in &objetos {
        let mut linha = Map::new();
        linha.insert("objeto_acao".into(), Value::String(objeto.clone()));
        let mut total = 0i64;
        for &ano in anos {
            let n = contagem
                .get(&(objeto.clone(), ano))
                .copied()
                .unwrap_or(0);
            total += n;
            linha.insert(ano.to_string(), Value::from(n));
        }
        linha.insert("Total".into(), Value::from(total));
        linhas.push(linha);
    }

    sort_desc_by(&mut linhas, |l| {
        l.get("Total").and_then(Value::as_i64).unwrap_or(0) as f64
    });
    linhas
}

/// Per-object balance: intakes vs closures, closures only counted among
/// rows that are intakes (a case cannot close without having opened). The
/// balance is floored at zero — a business rule, not arithmetic.
pub fn resumo_saldo(df: &CaseTable) -> Value {
    let mut entradas: HashMap<String, i64> = HashMap::new();
    let mut encerramentos: HashMap<String, i64> = HashMap::new();

    for rec in df.iter().filter(|r| r.data_entrada.is_some()) {
        *entradas.entry(rec.objeto_acao.clone()).or_insert(0) += 1;
        if is_encerrado(&rec.motivo_encerramento) {
            *encerramentos.entry(rec.objeto_acao.clone()).or_insert(0) += 1;
        }
    }

    let mut objetos = df.objetos();
    objetos.sort();

    let mut linhas: Vec<Map<String, Value>> = Vec::new();
    let mut total_entradas = 0i64;
    let mut total_encerramentos = 0i64;
    let mut total_saldo = 0i64;
    for objeto in objetos {
        let qtd_entradas = entradas.get(&objeto).copied().unwrap_or(0);
        let qtd_encerramentos = encerramentos.get(&objeto).copied().unwrap_or(0);
        let saldo = (qtd_entradas - qtd_encerramentos).max(0);
        total_entradas += qtd_entradas;
        total_encerramentos += qtd_encerramentos;
        total_saldo += saldo;

        let mut linha = Map::new();
        linha.insert("objeto_acao".into(), Value::String(objeto));
        linha.insert("qtd_entradas".into(), Value::from(qtd_entradas));
        linha.insert("qtd_encerramentos".into(), Value::from(qtd_encerramentos));
        linha.insert("saldo".into(), Value::from(saldo));
        linhas.push(linha);
    }
    sort_desc_by(&mut linhas, |l| {
        l.get("saldo").and_then(Value::as_i64).unwrap_or(0) as f64
    });

    json!({
        "dados": linhas,
        "total_entradas": total_entradas,
        "total_encerramentos": total_encerramentos,
        "total_saldo": total_saldo,
    })
}

/// Case count vs mean financial impact per object.
pub fn casos_impacto(df: &CaseTable) -> Value {
    struct Grupo {
        quantidade: i64,
        soma: f64,
        linhas: i64,
    }
    let mut grupos: HashMap<String, Grupo> = HashMap::new();
    for rec in df.iter() {
        let grupo = grupos.entry(rec.objeto_acao.clone()).or_insert(Grupo {
            quantidade: 0,
            soma: 0.0,
            linhas: 0,
        });
        if rec.data_entrada.is_some() {
            grupo.quantidade += 1;
        }
        grupo.soma += rec.impacto_financeiro;
        grupo.linhas += 1;
    }

    let mut linhas: Vec<Map<String, Value>> = grupos
        .into_iter()
        .map(|(objeto, g)| {
            let medio = if g.linhas > 0 {
                g.soma / g.linhas as f64
            } else {
                0.0
            };
            let mut linha = Map::new();
            linha.insert("objeto".into(), Value::String(objeto));
            linha.insert("quantidade".into(), Value::from(g.quantidade));
            linha.insert("impacto_medio".into(), safe_num(medio));
            linha
        })
        .collect();
    linhas.sort_by(|a, b| {
        let qa = a.get("quantidade").and_then(Value::as_i64).unwrap_or(0);
        let qb = b.get("quantidade").and_then(Value::as_i64).unwrap_or(0);
        qb.cmp(&qa).then_with(|| {
            a.get("objeto")
                .and_then(Value::as_str)
                .cmp(&b.get("objeto").and_then(Value::as_str))
        })
    });

    json!({ "dados": linhas })
}

/// UF × object count pivot.
pub fn objeto_por_estado(df: &CaseTable) -> Value {
    let mut contagem: HashMap<(String, String), i64> = HashMap::new();
    for rec in df.iter() {
        *contagem
            .entry((rec.estado.clone(), rec.objeto_acao.clone()))
            .or_insert(0) += 1;
    }

    let mut estados: Vec<String> = df.iter().map(|r| r.estado.clone()).collect();
    estados.sort();
    estados.dedup();
    let mut objetos = df.objetos();
    objetos.sort();

    let mut linhas: Vec<Map<String, Value>> = Vec::new();
    for estado in estados {
        let mut linha = Map::new();
        linha.insert("estado".into(), Value::String(estado.clone()));
        for objeto in &objetos {
            let n = contagem
                .get(&(estado.clone(), objeto.clone()))
                .copied()
                .unwrap_or(0);
            linha.insert(objeto.clone(), Value::from(n));
        }
        linhas.push(linha);
    }

    json!({ "dados": linhas })
}

/// Repeat-request totals per object.
pub fn reiteracoes_por_objeto(df: &CaseTable) -> Value {
    struct Grupo {
        total: i64,
        quantidade: i64,
    }
    let mut grupos: HashMap<String, Grupo> = HashMap::new();
    for rec in df.iter() {
        let grupo = grupos.entry(rec.objeto_acao.clone()).or_insert(Grupo {
            total: 0,
            quantidade: 0,
        });
        grupo.total += rec.reiteracoes;
        if rec.data_entrada.is_some() {
            grupo.quantidade += 1;
        }
    }

    let mut linhas: Vec<Map<String, Value>> = grupos
        .into_iter()
        .map(|(objeto, g)| {
            let divisor = if g.quantidade == 0 { 1 } else { g.quantidade };
            let mut linha = Map::new();
            linha.insert("objeto".into(), Value::String(objeto));
            linha.insert("total_reiteracoes".into(), Value::from(g.total));
            linha.insert("quantidade".into(), Value::from(g.quantidade));
            linha.insert(
                "media_reiteracoes".into(),
                safe_num(g.total as f64 / divisor as f64),
            );
            linha
        })
        .collect();
    sort_desc_by(&mut linhas, |l| {
        l.get("total_reiteracoes")
            .and_then(Value::as_i64)
            .unwrap_or(0) as f64
    });

    json!({ "dados": linhas })
}

/// Action types for intakes dated 2025.
pub fn tipos_acoes_2025(df: &CaseTable) -> Value {
    struct Grupo {
        quantidade: i64,
        impacto: f64,
    }
    let mut grupos: HashMap<String, Grupo> = HashMap::new();
    for rec in df.iter() {
        if crate::views::ano(rec.data_entrada) != Some(2025) {
            continue;
        }
        let grupo = grupos.entry(rec.tipo_acao.clone()).or_insert(Grupo {
            quantidade: 0,
            impacto: 0.0,
        });
        grupo.quantidade += 1;
        grupo.impacto += rec.impacto_financeiro;
    }

    let mut linhas: Vec<Map<String, Value>> = grupos
        .into_iter()
        .map(|(tipo, g)| {
            let mut linha = Map::new();
            linha.insert("tipo".into(), Value::String(tipo));
            linha.insert("quantidade".into(), Value::from(g.quantidade));
            linha.insert("impacto".into(), safe_num(g.impacto));
            linha
        })
        .collect();
    sort_desc_by(&mut linhas, |l| {
        l.get("quantidade").and_then(Value::as_i64).unwrap_or(0) as f64
    });

    json!({ "dados": linhas })
}

/// Top 20 cases by repeat-request count.
pub fn maior_reiteracao(df: &CaseTable) -> Value {
    let mut indices: Vec<usize> = (0..df.len()).collect();
    indices.sort_by(|&a, &b| df.rows[b].reiteracoes.cmp(&df.rows[a].reiteracoes));

    let dados: Vec<Value> = indices
        .into_iter()
        .take(20)
        .map(|i| {
            let rec = &df.rows[i];
            json!({
                "objeto_acao": rec.objeto_acao,
                "reiteracoes": rec.reiteracoes,
                "impacto_financeiro": safe_num(rec.impacto_financeiro),
                "estado": rec.estado,
            })
        })
        .collect();

    json!({ "dados": dados })
}

/// Pareto curve of financial impact by object: groups sorted by summed
/// impact descending, with running total and cumulative share.
pub fn pareto_impacto(df: &CaseTable) -> Value {
    let mut somas: HashMap<String, f64> = HashMap::new();
    for rec in df.iter() {
        *somas.entry(rec.objeto_acao.clone()).or_insert(0.0) += rec.impacto_financeiro;
    }
    if somas.is_empty() {
        return json!({ "dados": [] });
    }

    let mut grupos: Vec<(String, f64)> = somas.into_iter().collect();
    grupos.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let total: f64 = grupos.iter().map(|(_, v)| v).sum();
    let mut acumulado = 0.0;
    let dados: Vec<Value> = grupos
        .into_iter()
        .map(|(objeto, valor)| {
            acumulado += valor;
            json!({
                "objeto_acao": objeto,
                "impacto_financeiro": safe_num(valor),
                "acumulado": safe_num(acumulado),
                "percentual_acumulado": safe_num(crate::sanitize::percentual(acumulado, total)),
                "percentual": safe_num(crate::sanitize::percentual(valor, total)),
            })
        })
        .collect();

    json!({ "dados": dados })
}

/// Outcome counts pivoted per object.
pub fn sentencas_por_objeto(df: &CaseTable) -> Value {
    let validos: Vec<_> = df
        .iter()
        .filter(|r| !r.objeto_acao.trim().is_empty())
        .collect();
    if validos.is_empty() {
        return json!({ "dados": [], "totais_gerais": {}, "total_registros": 0 });
    }

    let mut contagem: HashMap<(String, String), i64> = HashMap::new();
    let mut totais: HashMap<String, i64> = HashMap::new();
    for rec in &validos {
        let sentenca = rec.sentenca.to_string();
        *contagem
            .entry((rec.objeto_acao.clone(), sentenca.clone()))
            .or_insert(0) += 1;
        *totais.entry(sentenca).or_insert(0) += 1;
    }

    let mut objetos: Vec<String> = validos.iter().map(|r| r.objeto_acao.clone()).collect();
    objetos.sort();
    objetos.dedup();

    let sentencas = ["Favorável", "Desfavorável", "Parcial"];
    let dados: Vec<Value> = objetos
        .into_iter()
        .map(|objeto| {
            let mut linha = Map::new();
            linha.insert("objeto_acao".into(), Value::String(objeto.clone()));
            for s in sentencas {
                let n = contagem
                    .get(&(objeto.clone(), s.to_string()))
                    .copied()
                    .unwrap_or(0);
                linha.insert(s.to_string(), Value::from(n));
            }
            Value::Object(linha)
        })
        .collect();

    let totais_gerais: Map<String, Value> = totais
        .into_iter()
        .map(|(k, v)| (k, Value::from(v)))
        .collect();

    json!({
        "dados": dados,
        "totais_gerais": totais_gerais,
        "total_registros": validos.len(),
    })
}
