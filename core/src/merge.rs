//! Multi-source merger.
//!
//! Combines the principal base with the newer "novos casos" base. With a
//! usable `numero_processo` key on both sides the tables are outer-joined:
//! the newer source wins every conflict, but only with an informative value —
//! a blank, null or "Não Informado" cell never overwrites real data. Without
//! a key the tables are appended over the column union, duplicates and all;
//! that duplication is a documented limitation, not something to paper over
//! with an invented key. `MergePolicy::require_key` turns the keyless case
//! into an error for deployments that cannot tolerate it.

use crate::config::MergePolicy;
use crate::error::{CoreError, CoreResult};
use crate::record::{CaseRecord, CaseTable};
use crate::types::NAO_INFORMADO;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Operational counts for one merge, returned to the caller instead of
/// being printed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeReport {
    pub apenas_principal: usize,
    pub apenas_novos: usize,
    pub em_ambos: usize,
    pub total: usize,
    pub com_chave: bool,
}

pub fn merge(
    principal: CaseTable,
    novos: CaseTable,
    policy: &MergePolicy,
) -> CoreResult<(CaseTable, MergeReport)> {
    if principal.is_empty() {
        let report = MergeReport {
            apenas_novos: novos.len(),
            total: novos.len(),
            ..MergeReport::default()
        };
        return Ok((novos, report));
    }
    if novos.is_empty() {
        let report = MergeReport {
            apenas_principal: principal.len(),
            total: principal.len(),
            ..MergeReport::default()
        };
        return Ok((principal, report));
    }

    let tem_chave = has_usable_key(&principal) && has_usable_key(&novos);
    if !tem_chave {
        if policy.require_key {
            return Err(CoreError::KeylessMerge);
        }
        log::warn!(
            "merge: numero_processo indisponível, concatenando {} + {} registros (duplicatas possíveis)",
            novos.len(),
            principal.len(),
        );
        // Newer source first, mirroring its conflict priority.
        let mut rows = novos.rows;
        let apenas_novos = rows.len();
        let apenas_principal = principal.rows.len();
        rows.extend(principal.rows);
        let total = rows.len();
        return Ok((
            CaseTable::new(rows),
            MergeReport {
                apenas_principal,
                apenas_novos,
                em_ambos: 0,
                total,
                com_chave: false,
            },
        ));
    }

    // Keyed outer join. Each principal row matches the first unconsumed
    // newer row with the same key; leftover newer rows are appended.
    let mut por_chave: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, rec) in novos.rows.iter().enumerate() {
        if let Some(chave) = chave(rec) {
            por_chave.entry(chave).or_default().push(idx);
        }
    }

    let mut consumido = vec![false; novos.rows.len()];
    let mut em_ambos = 0usize;
    let mut apenas_principal = 0usize;
    let mut rows: Vec<CaseRecord> = Vec::with_capacity(principal.len() + novos.len());

    for rec in principal.rows.into_iter() {
        let parceiro = chave(&rec)
            .and_then(|k| por_chave.get(&k).cloned())
            .and_then(|indices| indices.into_iter().find(|i| !consumido[*i]));
        match parceiro {
            Some(idx) => {
                consumido[idx] = true;
                em_ambos += 1;
                rows.push(merge_record(rec, novos.rows[idx].clone()));
            }
            None => {
                apenas_principal += 1;
                rows.push(rec);
            }
        }
    }

    let mut apenas_novos = 0usize;
    for (idx, rec) in novos.rows.into_iter().enumerate() {
        if !consumido[idx] {
            apenas_novos += 1;
            rows.push(rec);
        }
    }

    let report = MergeReport {
        apenas_principal,
        apenas_novos,
        em_ambos,
        total: rows.len(),
        com_chave: true,
    };
    log::info!(
        "merge: {} só no principal, {} só nos novos, {} em ambos, total {}",
        report.apenas_principal,
        report.apenas_novos,
        report.em_ambos,
        report.total,
    );

    Ok((CaseTable::new(rows), report))
}

fn chave(rec: &CaseRecord) -> Option<String> {
    rec.numero_processo
        .as_ref()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

fn has_usable_key(table: &CaseTable) -> bool {
    table.rows.iter().any(|r| chave(r).is_some())
}

// ── Field-level conflict resolution ─────────────────────────────────────────

fn informativo_str(s: &str) -> bool {
    let t = s.trim();
    !t.is_empty() && t != NAO_INFORMADO
}

fn pick_string(novo: String, velho: String) -> String {
    if informativo_str(&novo) {
        novo
    } else {
        velho
    }
}

fn pick_opt_string(novo: Option<String>, velho: Option<String>) -> Option<String> {
    match novo {
        Some(s) if informativo_str(&s) => Some(s),
        _ => velho,
    }
}

fn pick_date(novo: Option<NaiveDate>, velho: Option<NaiveDate>) -> Option<NaiveDate> {
    novo.or(velho)
}

fn pick_money(novo: f64, velho: f64) -> f64 {
    if novo > 0.0 {
        novo
    } else {
        velho
    }
}

fn pick_opt<T>(novo: Option<T>, velho: Option<T>) -> Option<T> {
    novo.or(velho)
}

/// Merge one matched pair. The newer record wins wherever it has something
/// to say. Derived fields are not reconciled here — the loader reruns
/// `derive_fields` on the merged table.
fn merge_record(principal: CaseRecord, novo: CaseRecord) -> CaseRecord {
    let mut extras = principal.extras.clone();
    for (k, v) in novo.extras.into_iter() {
        let vazio = v.is_null() || matches!(&v, Value::String(s) if s.trim().is_empty());
        if !vazio || !extras.contains_key(&k) {
            extras.insert(k, v);
        }
    }

    CaseRecord {
        numero_processo: principal.numero_processo.or(novo.numero_processo),
        nome_cliente: pick_string(novo.nome_cliente, principal.nome_cliente),
        objeto_acao: pick_string(novo.objeto_acao, principal.objeto_acao),
        estado: pick_string(novo.estado, principal.estado),
        status: novo.status,
        situacao: pick_opt_string(novo.situacao, principal.situacao),
        prognostico: pick_opt_string(novo.prognostico, principal.prognostico),
        area_juridica: pick_opt_string(novo.area_juridica, principal.area_juridica),
        comarca: pick_opt_string(novo.comarca, principal.comarca),
        foro: pick_opt_string(novo.foro, principal.foro),
        vara: pick_opt_string(novo.vara, principal.vara),
        data_entrada: pick_date(novo.data_entrada, principal.data_entrada),
        data_encerramento: pick_date(novo.data_encerramento, principal.data_encerramento),
        data_distribuicao: pick_date(novo.data_distribuicao, principal.data_distribuicao),
        motivo_encerramento: pick_opt_string(
            novo.motivo_encerramento,
            principal.motivo_encerramento,
        ),
        impacto_financeiro: pick_money(novo.impacto_financeiro, principal.impacto_financeiro),
        valor_causa: pick_money(novo.valor_causa, principal.valor_causa),
        impacto_negativo: pick_opt(novo.impacto_negativo, principal.impacto_negativo),
        valor_acordo: pick_opt(novo.valor_acordo, principal.valor_acordo),
        reiteracoes_orig: pick_opt(novo.reiteracoes_orig, principal.reiteracoes_orig),
        area_responsavel: pick_opt_string(novo.area_responsavel, principal.area_responsavel),
        sentenca_orig: pick_opt_string(novo.sentenca_orig, principal.sentenca_orig),
        descumprimento_obrigacao: pick_opt_string(
            novo.descumprimento_obrigacao,
            principal.descumprimento_obrigacao,
        ),
        extras,
        // Derived fields are recomputed by the post-merge derive pass.
        ..CaseRecord::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(numero: &str, estado: &str) -> CaseRecord {
        CaseRecord {
            numero_processo: Some(numero.to_string()),
            estado: estado.to_string(),
            ..CaseRecord::default()
        }
    }

    #[test]
    fn empty_side_returns_other_unchanged() {
        let principal = CaseTable::new(vec![rec("1", "SP")]);
        let (merged, report) =
            merge(principal, CaseTable::default(), &MergePolicy::default()).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(report.apenas_principal, 1);
        assert_eq!(report.em_ambos, 0);
    }

    #[test]
    fn uninformative_newer_cell_does_not_clobber() {
        let principal = CaseTable::new(vec![rec("1", "SP")]);
        let mut novo = rec("1", NAO_INFORMADO);
        novo.extras
            .insert("cidade".into(), Value::String("Campinas".into()));
        let novos = CaseTable::new(vec![novo]);

        let (merged, report) = merge(principal, novos, &MergePolicy::default()).unwrap();
        assert_eq!(report.em_ambos, 1);
        assert_eq!(merged.rows[0].estado, "SP");
        assert_eq!(
            merged.rows[0].extras.get("cidade"),
            Some(&Value::String("Campinas".into()))
        );
    }

    #[test]
    fn require_key_fails_fast_on_keyless_sources() {
        let mut a = rec("", "SP");
        a.numero_processo = None;
        let mut b = rec("", "RJ");
        b.numero_processo = None;
        let policy = MergePolicy { require_key: true };

        let result = merge(
            CaseTable::new(vec![a]),
            CaseTable::new(vec![b]),
            &policy,
        );
        assert!(matches!(result, Err(CoreError::KeylessMerge)));
    }
}
