//! Derived-field calculator.
//!
//! RULE: `is_encerrado` is the only open/closed rule in the crate. Views
//! never reimplement it.
//!
//! `derive_fields` is pure given the reference date and idempotent — the
//! loader runs it before and after merging two sources.

use crate::record::{CaseRecord, CaseTable, Sentenca, Status};
use crate::types::NAO_INFORMADO;
use chrono::NaiveDate;
use std::collections::HashMap;

// ── Closure classification ───────────────────────────────────────────────────

/// Closure-reason values that mean the case is still OPEN. Anything else in
/// a non-empty `motivo_encerramento` closes the case.
const MOTIVOS_NAO_ENCERRADOS: &[&str] = &[
    "ativo",
    "ativos",
    "atividade",
    "atividades",
    "sem sentença",
    "sem sentenca",
    "sem sentenç",
    "sem senten",
    "fase de recurso",
    "fase recurso",
    "recurso",
    "recursos",
    "em recurso",
    "em fase de recurso",
];

/// The single source of truth for closed/open. A case is closed iff the
/// closure reason is non-empty and does not match an "open" keyword. The
/// presence of `data_encerramento` is NOT the signal.
pub fn is_encerrado(motivo_encerramento: &Option<String>) -> bool {
    let motivo = match motivo_encerramento {
        Some(m) => m.trim().to_lowercase(),
        None => return false,
    };
    if motivo.is_empty() || motivo == "nan" {
        return false;
    }
    !MOTIVOS_NAO_ENCERRADOS.iter().any(|kw| motivo.contains(kw))
}

// ── Area normalization ───────────────────────────────────────────────────────

const OPERACOES_VARIANTES: &[&str] = &[
    "Operações II",
    "Operações",
    "Customer do Banco",
    "Operações Customer",
    "Operações Customer do Banco",
    "Customer",
    "Operações I",
];

const COBRANCAS_VARIANTES: &[&str] = &["Cobranças", "Cobrança", "Cobranca"];

const JURIDICO_VARIANTES: &[&str] = &[
    "Jurídico Interno",
    "Juridico Interno",
    "Jurídico",
    "Juridico",
];

/// Collapse a raw responsibility-area string into one of the three buckets.
/// Buckets are checked in fixed order (Operações, Cobranças, Jurídico
/// Interno) and the first variant hit wins — a string containing keywords
/// from several buckets lands in the earliest one.
pub fn normalizar_area(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("none")
    {
        return NAO_INFORMADO.to_string();
    }

    for (bucket, variantes) in [
        ("Operações", OPERACOES_VARIANTES),
        ("Cobranças", COBRANCAS_VARIANTES),
        ("Jurídico Interno", JURIDICO_VARIANTES),
    ] {
        if variantes.iter().any(|v| lower.contains(&v.to_lowercase())) {
            return bucket.to_string();
        }
    }
    // Unknown areas pass through untouched.
    trimmed.to_string()
}

// ── Systemic-error flag ──────────────────────────────────────────────────────

/// Technology-failure keywords matched against the closure reason. "ti" is
/// matched as a whole word; as a substring it would flag half the vocabulary
/// ("garantia", "notificação", ...).
pub fn is_erro_sistemico(motivo_encerramento: &Option<String>) -> bool {
    let motivo = match motivo_encerramento {
        Some(m) => m.to_lowercase(),
        None => return false,
    };
    if ["erro", "sistêmico", "sistemico", "tecnologia", "sistema"]
        .iter()
        .any(|kw| motivo.contains(kw))
    {
        return true;
    }
    motivo
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == "ti")
}

// ── Outcome mapping ──────────────────────────────────────────────────────────

fn mapear_sentenca(rec: &CaseRecord) -> Sentenca {
    if let Some(s) = &rec.sentenca_orig {
        return match s.trim() {
            "Favorável" | "Favoravel" => Sentenca::Favoravel,
            "Desfavorável" | "Desfavoravel" => Sentenca::Desfavoravel,
            _ => Sentenca::Parcial,
        };
    }
    if let Some(p) = &rec.prognostico {
        return match p.trim() {
            "Incontroverso" => Sentenca::Favoravel,
            "Improvável" | "Remoto" => Sentenca::Desfavoravel,
            _ => Sentenca::Parcial,
        };
    }
    Sentenca::Parcial
}

// ── Median ───────────────────────────────────────────────────────────────────

/// Median with averaged middle pair, matching the conventional definition.
/// Empty input yields 0.0.
pub fn mediana(values: &mut Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

// ── Calculator ───────────────────────────────────────────────────────────────

/// Compute every derived field over the whole table. `hoje` is injected so
/// elapsed-day fields are deterministic under test.
pub fn derive_fields(table: &mut CaseTable, hoje: NaiveDate) {
    // Per-row fields first.
    for rec in table.rows.iter_mut() {
        rec.status = if is_encerrado(&rec.motivo_encerramento) {
            Status::Encerrado
        } else {
            Status::EmTramitacao
        };

        rec.tempo_tramitacao = match rec.data_entrada {
            Some(entrada) => (hoje - entrada).num_days(),
            None => 0,
        };

        // SLA only exists when both dates are recorded. 0.0 here means
        // "unknown", never "closed same day" — means over this field must
        // filter on both dates first.
        rec.sla_real = match (rec.data_entrada, rec.data_encerramento) {
            (Some(entrada), Some(fim)) => ((fim - entrada).num_days().max(0)) as f64,
            _ => 0.0,
        };

        rec.sla_dias = 30;
        rec.prazo_dias = rec.tempo_tramitacao.min(30);

        let area_bruta = rec
            .area_responsavel
            .clone()
            .or_else(|| rec.area_juridica.clone())
            .unwrap_or_else(|| NAO_INFORMADO.to_string());
        rec.area_interna = normalizar_area(&area_bruta);

        rec.reiteracoes = match rec.reiteracoes_orig {
            Some(n) => n.max(0),
            None => (rec.tempo_tramitacao / 30).clamp(0, 20),
        };

        // Financial impact fallback chain: keep a positive mapped value,
        // else the negative-impact column, else the claim value.
        if !rec.impacto_financeiro.is_finite() {
            rec.impacto_financeiro = 0.0;
        }
        if rec.impacto_financeiro <= 0.0 {
            if let Some(neg) = rec.impacto_negativo.filter(|v| *v > 0.0) {
                rec.impacto_financeiro = neg;
            } else if rec.valor_causa > 0.0 {
                rec.impacto_financeiro = rec.valor_causa;
            } else {
                rec.impacto_financeiro = 0.0;
            }
        }

        rec.custo_encerramento = rec.impacto_financeiro * 0.1;
        rec.sentenca = mapear_sentenca(rec);
        rec.tipo_acao = rec.objeto_acao.clone();
        rec.erro_sistemico = is_erro_sistemico(&rec.motivo_encerramento);
    }

    // Repeat-client flag over the whole table. The unknown-name sentinel is
    // not a client and never counts as repeated.
    let mut por_cliente: HashMap<&str, usize> = HashMap::new();
    for rec in table.rows.iter() {
        if rec.nome_cliente != NAO_INFORMADO {
            *por_cliente.entry(rec.nome_cliente.as_str()).or_insert(0) += 1;
        }
    }
    let repetidos: std::collections::HashSet<String> = por_cliente
        .iter()
        .filter(|(_, n)| **n > 1)
        .map(|(nome, _)| nome.to_string())
        .collect();
    for rec in table.rows.iter_mut() {
        rec.reincidencia = repetidos.contains(&rec.nome_cliente);
    }

    // Criticality against the FULL table's medians, fixed at load time.
    // Filtering later never changes these flags.
    let mut impactos: Vec<f64> = table.rows.iter().map(|r| r.impacto_financeiro).collect();
    let mut tempos: Vec<f64> = table
        .rows
        .iter()
        .map(|r| r.tempo_tramitacao as f64)
        .collect();
    let impacto_mediano = mediana(&mut impactos);
    let tempo_mediano = mediana(&mut tempos);
    for rec in table.rows.iter_mut() {
        rec.critico = rec.impacto_financeiro > impacto_mediano * 2.0
            || (rec.tempo_tramitacao as f64) > tempo_mediano * 2.0;
    }

    log::debug!(
        "derive_fields: {} registros, mediana impacto={impacto_mediano:.2}, mediana tempo={tempo_mediano:.1}",
        table.len(),
    );
}
