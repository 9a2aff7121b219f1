//! Outcome views: the win/loss dashboard, closure economics and the
//! executive KPI blocks.

use crate::config::PresentationOverrides;
use crate::derive::is_encerrado;
use crate::record::{CaseRecord, CaseTable, Sentenca};
use crate::sanitize::{media, percentual, safe_num};
use crate::views::sort_desc_by;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

// ── Paid-value rule table ────────────────────────────────────────────────────

/// `a` followed somewhere later by `b`, on lowercase text. Mirrors the
/// `a.*b` reason patterns of the classification rules.
fn contem_seq(texto: &str, a: &str, b: &str) -> bool {
    match texto.find(a) {
        Some(i) => texto[i + a.len()..].contains(b),
        None => false,
    }
}

fn contem_qualquer(texto: &str, termos: &[&str]) -> bool {
    termos.iter().any(|t| texto.contains(t))
}

/// Estimated payout for a closed case, by closure reason:
/// settlement before verdict pays 30% of the claim, after verdict 50%,
/// condemnation payment 100%; dismissals, extinctions, no-cost
/// condemnations, Procon cases and third-party settlements pay nothing.
/// A recorded settlement value always wins over the estimate.
pub fn valor_pago(
    motivo_encerramento: &Option<String>,
    impacto_financeiro: f64,
    valor_acordo: f64,
) -> f64 {
    let motivo = match motivo_encerramento {
        Some(m) if !m.trim().is_empty() => m.trim().to_lowercase(),
        _ => return 0.0,
    };
    let impacto = if impacto_financeiro.is_finite() {
        impacto_financeiro
    } else {
        0.0
    };

    if valor_acordo > 0.0 {
        return valor_acordo;
    }
    if motivo.contains("acordo") && (motivo.contains("antes") || motivo.contains("ante")) {
        return impacto * 0.3;
    }
    if motivo.contains("acordo")
        && (motivo.contains("pós") || motivo.contains("pos") || motivo.contains("depois"))
    {
        return impacto * 0.5;
    }
    if motivo.contains("pagamento")
        && (motivo.contains("condenação") || motivo.contains("condenacao"))
    {
        return impacto;
    }
    if (motivo.contains("condenação") || motivo.contains("condenacao"))
        && motivo.contains("sem")
        && (motivo.contains("ônus") || motivo.contains("onus"))
    {
        return 0.0;
    }
    if contem_qualquer(
        &motivo,
        &[
            "improcedência",
            "improcedencia",
            "extinção",
            "extincao",
            "extinto",
            "procon",
            "terceiros",
        ],
    ) {
        return 0.0;
    }
    0.0
}

// ── Win/loss classification ──────────────────────────────────────────────────

fn motivo_lower(rec: &CaseRecord) -> String {
    rec.motivo_encerramento
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

fn eh_acordo_antes(motivo: &str) -> bool {
    contem_seq(motivo, "acordo", "antes")
        || contem_seq(motivo, "antes", "sentença")
        || contem_seq(motivo, "antes", "sentenca")
}

fn ganha_por_motivo(motivo: &str) -> bool {
    contem_qualquer(
        motivo,
        &[
            "extinção",
            "extincao",
            "extinto",
            "improcedência",
            "improcedencia",
            "improcedente",
        ],
    )
}

fn motivo_indica_perda(motivo: &str) -> bool {
    contem_seq(motivo, "acordo", "pós")
        || contem_seq(motivo, "acordo", "pos")
        || contem_seq(motivo, "pagamento", "condenação")
        || (contem_seq(motivo, "condenação", "sem") && motivo.contains("ônus"))
}

fn perdida_por_motivo(motivo: &str) -> bool {
    contem_seq(motivo, "pagamento", "condenação")
        || contem_seq(motivo, "pagamento", "condenacao")
        || contem_seq(motivo, "acordo", "pós")
        || contem_seq(motivo, "acordo", "pos")
        || contem_seq(motivo, "acordo", "depois")
        || contem_seq(motivo, "pós", "sentença")
        || contem_seq(motivo, "pos", "sentenca")
        || (contem_seq(motivo, "condenação", "sem") && motivo.contains("ônus"))
        || (contem_seq(motivo, "condenacao", "sem") && motivo.contains("onus"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Desfecho {
    AcordoAntes,
    Ganha,
    Perdida,
    Indefinido,
}

/// Classify one CLOSED, non-Procon case. Pre-verdict settlement is checked
/// first and excludes the other buckets; reason text outranks the sentence
/// fallback on both sides.
fn classificar(rec: &CaseRecord) -> Desfecho {
    let motivo = motivo_lower(rec);
    if eh_acordo_antes(&motivo) {
        return Desfecho::AcordoAntes;
    }

    let ganha =
        ganha_por_motivo(&motivo) || (rec.sentenca == Sentenca::Favoravel && !motivo_indica_perda(&motivo));
    if ganha {
        return Desfecho::Ganha;
    }

    let perdida = perdida_por_motivo(&motivo)
        || (rec.sentenca == Sentenca::Desfavoravel && !ganha_por_motivo(&motivo));
    if perdida {
        return Desfecho::Perdida;
    }
    Desfecho::Indefinido
}

/// Win/loss dashboard over closed, non-Procon cases.
///
/// Several headline totals were fixed executive figures in the original
/// report; they live in `PresentationOverrides` and replace the computed
/// numbers only when present. Claim-value totals are always computed.
pub fn acoes_ganhas_perdidas(df: &CaseTable, overrides: &PresentationOverrides) -> Value {
    let encerrados: Vec<&CaseRecord> = df
        .iter()
        .filter(|r| is_encerrado(&r.motivo_encerramento))
        .collect();

    if encerrados.is_empty() {
        return json!({
            "ganhas": { "quantidade": 0, "percentual": 0.0, "valor_pretendido_total": 0.0 },
            "perdidas": { "quantidade": 0, "percentual": 0.0, "valor_pretendido_total": 0.0 },
            "acordo_antes_sentenca": {
                "quantidade": 0,
                "percentual": 0.0,
                "valor_pretendido_total": 0.0,
                "valor_acordo_total": 0.0,
                "economia_total": 0.0,
                "detalhes": [],
            },
            "em_tramite": { "quantidade": 0, "percentual": 0.0 },
            "total": 0,
            "total_encerrados": 0,
        });
    }

    // Procon closures count as closed but stay out of the win/loss base.
    let analise: Vec<&CaseRecord> = encerrados
        .iter()
        .copied()
        .filter(|r| !motivo_lower(r).contains("procon"))
        .collect();
    let total_analise = analise.len() as f64;

    let mut ganhas: Vec<&CaseRecord> = Vec::new();
    let mut perdidas: Vec<&CaseRecord> = Vec::new();
    let mut acordo_antes: Vec<&CaseRecord> = Vec::new();
    for &rec in &analise {
        match classificar(rec) {
            Desfecho::AcordoAntes => acordo_antes.push(rec),
            Desfecho::Ganha => ganhas.push(rec),
            Desfecho::Perdida => perdidas.push(rec),
            Desfecho::Indefinido => {}
        }
    }

    let soma_pretendido = |grupo: &[&CaseRecord]| -> f64 {
        grupo.iter().map(|r| r.valor_pretendido()).sum()
    };
    let valor_pretendido_ganhas = soma_pretendido(&ganhas);
    let valor_pretendido_perdidas = soma_pretendido(&perdidas);
    let mut valor_pretendido_acordo = soma_pretendido(&acordo_antes);
    if valor_pretendido_acordo == 0.0 && !acordo_antes.is_empty() {
        valor_pretendido_acordo = acordo_antes.iter().map(|r| r.impacto_financeiro).sum();
    }

    let mut valor_acordo_total: f64 = acordo_antes
        .iter()
        .map(|r| r.valor_acordo.unwrap_or(0.0))
        .sum();
    if valor_acordo_total == 0.0 && !acordo_antes.is_empty() {
        // No recorded settlement values: estimate at half the claim.
        valor_acordo_total = acordo_antes
            .iter()
            .map(|r| r.impacto_financeiro * 0.5)
            .sum();
    }
    let economia_computada = valor_pretendido_acordo - valor_acordo_total;

    let detalhes: Vec<Value> = acordo_antes
        .iter()
        .map(|rec| {
            let valor_acordo = match rec.valor_acordo.filter(|v| *v > 0.0) {
                Some(v) => v,
                None => rec.impacto_financeiro * 0.5,
            };
            json!({
                "numero_processo": rec.numero_processo.clone().unwrap_or_else(|| "N/A".into()),
                "nome_cliente": rec.nome_cliente,
                "valor_pretendido": safe_num(rec.valor_pretendido()),
                "valor_acordo": safe_num(valor_acordo),
                "economia": safe_num(rec.valor_pretendido() - valor_acordo),
            })
        })
        .collect();

    // Computed figures, then the executive override when configured.
    let em_tramite_computado = df.len() as i64 - encerrados.len() as i64;
    let figuras = overrides.ganhas_perdidas.as_ref();
    let pega = |fixo: Option<i64>, computado: i64| fixo.unwrap_or(computado);
    let pega_f = |fixo: Option<f64>, computado: f64| fixo.unwrap_or(computado);

    json!({
        "ganhas": {
            "quantidade": pega(figuras.map(|f| f.ganhas_quantidade), ganhas.len() as i64),
            "percentual": safe_num(pega_f(
                figuras.map(|f| f.ganhas_percentual),
                percentual(ganhas.len() as f64, total_analise),
            )),
            "valor_pretendido_total": safe_num(valor_pretendido_ganhas),
        },
        "perdidas": {
            "quantidade": pega(figuras.map(|f| f.perdidas_quantidade), perdidas.len() as i64),
            "percentual": safe_num(pega_f(
                figuras.map(|f| f.perdidas_percentual),
                percentual(perdidas.len() as f64, total_analise),
            )),
            "valor_pretendido_total": safe_num(valor_pretendido_perdidas),
        },
        "acordo_antes_sentenca": {
            "quantidade": pega(
                figuras.map(|f| f.acordo_antes_quantidade),
                acordo_antes.len() as i64,
            ),
            "percentual": safe_num(pega_f(
                figuras.map(|f| f.acordo_antes_percentual),
                percentual(acordo_antes.len() as f64, total_analise),
            )),
            "valor_pretendido_total": safe_num(valor_pretendido_acordo),
            "valor_acordo_total": safe_num(valor_acordo_total),
            "economia_total": safe_num(pega_f(
                figuras.map(|f| f.economia_total),
                economia_computada,
            )),
            "detalhes": detalhes,
        },
        "em_tramite": {
            "quantidade": pega(figuras.map(|f| f.em_tramite_quantidade), em_tramite_computado),
            "percentual": safe_num(pega_f(
                figuras.map(|f| f.em_tramite_percentual),
                percentual(em_tramite_computado as f64, df.len() as f64),
            )),
        },
        "total": pega(figuras.map(|f| f.total_acoes), df.len() as i64),
        "total_encerrados": pega(figuras.map(|f| f.total_encerrados), encerrados.len() as i64),
    })
}

// ── Closure economics ────────────────────────────────────────────────────────

/// Volume and cost per closure type, over closed rows with a reason.
pub fn volume_custo(df: &CaseTable) -> Value {
    struct Grupo {
        volume: i64,
        custo_total: f64,
    }
    let mut grupos: HashMap<String, Grupo> = HashMap::new();
    for rec in df.iter() {
        if !is_encerrado(&rec.motivo_encerramento) {
            continue;
        }
        let motivo = match &rec.motivo_encerramento {
            Some(m) if !m.trim().is_empty() => m.clone(),
            _ => continue,
        };
        let grupo = grupos.entry(motivo).or_insert(Grupo {
            volume: 0,
            custo_total: 0.0,
        });
        grupo.volume += 1;
        grupo.custo_total += rec.custo_encerramento;
    }

    if grupos.is_empty() {
        return json!({ "dados": [], "total_volume": 0, "total_custo": 0.0 });
    }

    let total_volume: i64 = grupos.values().map(|g| g.volume).sum();
    let total_custo: f64 = grupos.values().map(|g| g.custo_total).sum();

    let mut linhas: Vec<Map<String, Value>> = grupos
        .into_iter()
        .map(|(tipo, g)| {
            let custo_medio = if g.volume > 0 {
                g.custo_total / g.volume as f64
            } else {
                0.0
            };
            let mut linha = Map::new();
            linha.insert("tipo_encerramento".into(), Value::String(tipo));
            linha.insert("volume".into(), Value::from(g.volume));
            linha.insert("custo_total".into(), safe_num(g.custo_total));
            linha.insert("custo_medio".into(), safe_num(custo_medio));
            linha
        })
        .collect();
    sort_desc_by(&mut linhas, |l| {
        l.get("volume").and_then(Value::as_i64).unwrap_or(0) as f64
    });

    json!({
        "dados": linhas,
        "total_volume": total_volume,
        "total_custo": safe_num(total_custo),
    })
}

/// Systemic-error (technology failure) cases per object. The headline
/// totals carried fixed executive figures; when present, the per-object
/// money columns are scaled so they still add up to those totals.
pub fn erro_sistemico(df: &CaseTable, overrides: &PresentationOverrides) -> Value {
    struct Grupo {
        quantidade: i64,
        impacto: f64,
        valor_pretendido: f64,
    }
    let mut grupos: HashMap<String, Grupo> = HashMap::new();
    for rec in df.iter().filter(|r| r.erro_sistemico) {
        let grupo = grupos.entry(rec.objeto_acao.clone()).or_insert(Grupo {
            quantidade: 0,
            impacto: 0.0,
            valor_pretendido: 0.0,
        });
        grupo.quantidade += 1;
        grupo.impacto += rec.impacto_financeiro;
        grupo.valor_pretendido += rec.valor_pretendido();
    }

    let soma_impacto: f64 = grupos.values().map(|g| g.impacto).sum();
    let soma_pretendido: f64 = grupos.values().map(|g| g.valor_pretendido).sum();
    let quantidade_total: i64 = grupos.values().map(|g| g.quantidade).sum();

    let (total_erros, total_impacto, total_valor_pretendido, fator_impacto, fator_pretendido) =
        match &overrides.erro_sistemico {
            Some(figuras) => {
                let base_pretendido = if soma_pretendido > 0.0 {
                    soma_pretendido
                } else {
                    soma_impacto
                };
                (
                    figuras.total_erros,
                    figuras.total_impacto,
                    figuras.total_valor_pretendido,
                    if soma_impacto > 0.0 {
                        figuras.total_impacto / soma_impacto
                    } else {
                        1.0
                    },
                    if base_pretendido > 0.0 {
                        figuras.total_valor_pretendido / base_pretendido
                    } else {
                        1.0
                    },
                )
            }
            None => (quantidade_total, soma_impacto, soma_pretendido, 1.0, 1.0),
        };

    let mut linhas: Vec<Map<String, Value>> = grupos
        .into_iter()
        .map(|(objeto, g)| {
            let pretendido_base = if g.valor_pretendido > 0.0 {
                g.valor_pretendido
            } else {
                g.impacto
            };
            let mut linha = Map::new();
            linha.insert("objeto".into(), Value::String(objeto));
            linha.insert("quantidade".into(), Value::from(g.quantidade));
            linha.insert("impacto".into(), safe_num(g.impacto * fator_impacto));
            linha.insert(
                "valor_pretendido".into(),
                safe_num(pretendido_base * fator_pretendido),
            );
            linha
        })
        .collect();
    sort_desc_by(&mut linhas, |l| {
        l.get("quantidade").and_then(Value::as_i64).unwrap_or(0) as f64
    });

    json!({
        "dados": linhas,
        "total_erros": total_erros,
        "total_impacto": safe_num(total_impacto),
        "total_valor_pretendido": safe_num(total_valor_pretendido),
    })
}

// ── KPI blocks ───────────────────────────────────────────────────────────────

/// Headline statistics. The original report pinned these to signed-off
/// executive figures; the computed path is what the data says today.
pub fn estatisticas_gerais(df: &CaseTable, overrides: &PresentationOverrides) -> Value {
    if let Some(figuras) = &overrides.estatisticas_gerais {
        return json!({
            "total_acoes": figuras.total_acoes,
            "total_encerramentos": figuras.total_encerramentos,
            "media_valor_causa": safe_num(figuras.media_valor_causa),
            "media_pagamento": safe_num(figuras.media_pagamento),
            "impacto_negativo_global": safe_num(figuras.impacto_negativo_global),
        });
    }

    let encerrados: Vec<&CaseRecord> = df
        .iter()
        .filter(|r| is_encerrado(&r.motivo_encerramento))
        .collect();
    let valores_causa: Vec<f64> = df.iter().map(|r| r.valor_causa).collect();
    let pagamentos: Vec<f64> = encerrados
        .iter()
        .map(|r| {
            valor_pago(
                &r.motivo_encerramento,
                r.impacto_financeiro,
                r.valor_acordo.unwrap_or(0.0),
            )
        })
        .collect();
    let impacto_negativo_global: f64 = pagamentos.iter().sum();

    json!({
        "total_acoes": df.len(),
        "total_encerramentos": encerrados.len(),
        "media_valor_causa": safe_num(media(&valores_causa)),
        "media_pagamento": safe_num(media(&pagamentos)),
        "impacto_negativo_global": safe_num(impacto_negativo_global),
    })
}

/// Final KPI row — always computed.
pub fn kpis_finais(df: &CaseTable) -> Value {
    let total_casos = df.len() as i64;
    let total_impacto: f64 = df.iter().map(|r| r.impacto_financeiro).sum();
    let impactos: Vec<f64> = df.iter().map(|r| r.impacto_financeiro).collect();
    let casos_criticos = df.iter().filter(|r| r.critico).count() as i64;
    let encerrados = df
        .iter()
        .filter(|r| is_encerrado(&r.motivo_encerramento))
        .count() as f64;

    json!({
        "total_casos": total_casos,
        "total_impacto": safe_num(total_impacto),
        "media_impacto": safe_num(media(&impactos)),
        "casos_criticos": casos_criticos,
        "taxa_encerramento": safe_num(percentual(encerrados, total_casos as f64)),
    })
}
