//! The one ad-hoc query surface: group-by-count over arbitrary columns.

use crate::record::CaseTable;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

fn valor_como_chave(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Totals of `coluna`, optionally pivoted by `agrupar_por`. A name that
/// matches no canonical field and no extra column yields an error RESULT —
/// the caller gets a shape with an `erro` message, never an exception.
pub fn totais_por_coluna(df: &CaseTable, coluna: &str, agrupar_por: Option<&str>) -> Value {
    let coluna_existe = df.iter().any(|r| r.field_value(coluna).is_some());
    if !coluna_existe {
        return json!({
            "coluna": coluna,
            "agrupar_por": agrupar_por,
            "dados": [],
            "total_geral": 0,
            "erro": format!("Coluna \"{coluna}\" não encontrada"),
        });
    }

    // Rows where the target column has a usable value.
    let celulas: Vec<(usize, String)> = df
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            r.field_value(coluna)
                .as_ref()
                .and_then(valor_como_chave)
                .map(|v| (i, v))
        })
        .collect();
    if celulas.is_empty() {
        return json!({
            "coluna": coluna,
            "agrupar_por": agrupar_por,
            "dados": [],
            "total_geral": 0,
        });
    }

    let dados: Vec<Value> = match agrupar_por {
        Some(grupo_col) => {
            let grupo_existe = df.iter().any(|r| r.field_value(grupo_col).is_some());
            if !grupo_existe {
                return json!({
                    "coluna": coluna,
                    "agrupar_por": agrupar_por,
                    "dados": [],
                    "total_geral": 0,
                    "erro": format!("Coluna \"{grupo_col}\" não encontrada"),
                });
            }

            let mut contagem: HashMap<(String, String), i64> = HashMap::new();
            let mut grupos: Vec<String> = Vec::new();
            let mut valores: Vec<String> = Vec::new();
            for (i, valor) in &celulas {
                let chave_grupo = df.rows[*i]
                    .field_value(grupo_col)
                    .as_ref()
                    .and_then(valor_como_chave)
                    .unwrap_or_default();
                if !grupos.contains(&chave_grupo) {
                    grupos.push(chave_grupo.clone());
                }
                if !valores.contains(valor) {
                    valores.push(valor.clone());
                }
                *contagem.entry((chave_grupo, valor.clone())).or_insert(0) += 1;
            }
            grupos.sort();
            valores.sort();

            grupos
                .into_iter()
                .map(|grupo| {
                    let mut linha = Map::new();
                    linha.insert(grupo_col.to_string(), Value::String(grupo.clone()));
                    for valor in &valores {
                        let n = contagem
                            .get(&(grupo.clone(), valor.clone()))
                            .copied()
                            .unwrap_or(0);
                        linha.insert(valor.clone(), Value::from(n));
                    }
                    Value::Object(linha)
                })
                .collect()
        }
        None => {
            let mut contagem: HashMap<String, i64> = HashMap::new();
            for (_, valor) in &celulas {
                *contagem.entry(valor.clone()).or_insert(0) += 1;
            }
            let mut pares: Vec<(String, i64)> = contagem.into_iter().collect();
            pares.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            pares
                .into_iter()
                .map(|(valor, quantidade)| {
                    let mut linha = Map::new();
                    linha.insert(coluna.to_string(), Value::String(valor));
                    linha.insert("quantidade".into(), Value::from(quantidade));
                    Value::Object(linha)
                })
                .collect()
        }
    };

    json!({
        "coluna": coluna,
        "agrupar_por": agrupar_por,
        "dados": dados,
        "total_geral": celulas.len(),
    })
}
