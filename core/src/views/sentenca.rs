//! Outcome-distribution views.

use crate::record::{CaseTable, Sentenca};
use crate::sanitize::{percentual, safe_num};
use crate::types::NAO_INFORMADO;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Global outcome distribution with percentages.
pub fn sentencas(df: &CaseTable) -> Value {
    if df.is_empty() {
        return json!({
            "favoravel": 0,
            "desfavoravel": 0,
            "parcial": 0,
            "total": 0,
            "percentuais": {},
        });
    }

    let mut favoravel = 0i64;
    let mut desfavoravel = 0i64;
    let mut parcial = 0i64;
    for rec in df.iter() {
        match rec.sentenca {
            Sentenca::Favoravel => favoravel += 1,
            Sentenca::Desfavoravel => desfavoravel += 1,
            Sentenca::Parcial => parcial += 1,
        }
    }
    let total = df.len() as f64;

    json!({
        "favoravel": favoravel,
        "desfavoravel": desfavoravel,
        "parcial": parcial,
        "total": df.len(),
        "percentuais": {
            "favoravel": safe_num(percentual(favoravel as f64, total)),
            "desfavoravel": safe_num(percentual(desfavoravel as f64, total)),
            "parcial": safe_num(percentual(parcial as f64, total)),
        },
    })
}

/// Outcome counts per responsibility area, unknown areas excluded, ordered
/// by volume.
pub fn sentencas_por_area(df: &CaseTable) -> Value {
    let mut grupos: HashMap<String, (i64, i64, i64)> = HashMap::new();
    for rec in df.iter() {
        if rec.area_interna == NAO_INFORMADO {
            continue;
        }
        let grupo = grupos.entry(rec.area_interna.clone()).or_insert((0, 0, 0));
        match rec.sentenca {
            Sentenca::Favoravel => grupo.0 += 1,
            Sentenca::Desfavoravel => grupo.1 += 1,
            Sentenca::Parcial => grupo.2 += 1,
        }
    }

    let mut linhas: Vec<(String, i64, i64, i64, i64)> = grupos
        .into_iter()
        .map(|(area, (f, d, p))| (area, f, d, p, f + d + p))
        .filter(|(_, _, _, _, total)| *total > 0)
        .collect();
    linhas.sort_by(|a, b| b.4.cmp(&a.4).then_with(|| a.0.cmp(&b.0)));

    let dados: Vec<Value> = linhas
        .into_iter()
        .map(|(area, favoravel, desfavoravel, parcial, total)| {
            json!({
                "area": area,
                "favoravel": favoravel,
                "desfavoravel": desfavoravel,
                "parcial": parcial,
                "total": total,
            })
        })
        .collect();

    json!({ "dados": dados })
}
