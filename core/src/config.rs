//! Pipeline configuration.
//!
//! RULE: header alias lists, area variant lists and keyword sets are DATA.
//! Their order was tuned against the real source files and is significant —
//! never reorder them in code, only here.

use serde::{Deserialize, Serialize};

/// National SLA benchmark (days) used to flag areas above target.
pub const BENCHMARK_NACIONAL: f64 = 23.0;

/// Deadline cut (days) for the "solicitações x prazo" views.
pub const PRAZO_LIMITE_DIAS: i64 = 5;

// ── Column aliases ───────────────────────────────────────────────────────────

/// Ordered alias lists for one canonical field. The first alias present in a
/// raw table wins and is renamed to `canonical`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldAliases {
    pub canonical: String,
    pub aliases: Vec<String>,
}

fn field(canonical: &str, aliases: &[&str]) -> FieldAliases {
    FieldAliases {
        canonical: canonical.to_string(),
        aliases: aliases.iter().map(|s| s.to_string()).collect(),
    }
}

/// The full alias table, in resolution order.
pub fn default_aliases() -> Vec<FieldAliases> {
    vec![
        field(
            "data_entrada",
            &["DATA ENTRADA", "Data de entrada", "Data Entrada"],
        ),
        field(
            "data_encerramento",
            &[
                "DATA ENCERRAMENTO",
                "Data do Encerramento",
                "Data Encerramento",
            ],
        ),
        field(
            "objeto_acao",
            &[
                "Descricao do Tipo de Ação",
                "ACO.Descrição",
                "OBJETO DA AÇÃO",
                "Objeto da Ação",
            ],
        ),
        field("estado", &["Estado", "UF"]),
        field("status", &["Status", "Situação"]),
        field(
            "impacto_financeiro",
            &["Valor da Causa Atual", "Valor da Causa", "Valor Causa"],
        ),
        field(
            "nome_cliente",
            &["Pólo Ativo", "REU.Nome", "Nome Cliente", "Cliente"],
        ),
        field(
            "numero_processo",
            &[
                "Número do Processo",
                "Número do processo",
                "Número Processo",
                "Numero do Processo",
                "Numero do processo",
                "Numero Processo",
                "Nº do Processo",
                "Nº Processo",
                "N. do Processo",
                "N. Processo",
                "Processo",
            ],
        ),
        field("situacao", &["Situação", "Status"]),
        field("prognostico", &["Descrição do Prognóstico", "Prognóstico"]),
        field("area_juridica", &["Área Jurídica", "Area Jurídica"]),
        field("comarca", &["Descricao Da Comarca", "Comarca"]),
        field("foro", &["Foro/Tribunal", "Foro"]),
        field("vara", &["Vara/Câmara", "Vara"]),
        field("valor_causa", &["Valor da Causa", "Valor da Causa Atual"]),
        field(
            "motivo_encerramento",
            &["Motivo Encerramento", "Motivo encerramento"],
        ),
        field(
            "data_distribuicao",
            &["Data de distribuição", "Data Distribuição"],
        ),
        field(
            "reiteracoes_orig",
            &[
                "Quantidade de Reiterações",
                "Quantidade de Reiteraes",
                "Reiterações",
            ],
        ),
        field(
            "area_responsavel",
            &["Area Responsável", "Área Responsável", "Area Responsavel"],
        ),
        field(
            "sentenca_orig",
            &[
                "Sentença Favorável/Desfavorável",
                "Sentença Favoravel/Desfavoravel",
            ],
        ),
        field(
            "impacto_negativo",
            &["Valor - Impacto Negativo", "Impacto Negativo"],
        ),
        field("valor_acordo", &["Valor do Acordo", "Valor Acordo"]),
        field(
            "descumprimento_obrigacao",
            &["Obrigações", "Obrigaes", "Descumprimento de Obrigação"],
        ),
    ]
}

// ── Sources ──────────────────────────────────────────────────────────────────

/// One source export and the sheet keywords tried against it, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: String,
    pub sheet_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Main base ("Material Casos Críticos").
    pub principal: SourceConfig,
    /// Newer base ("novos casos") — wins conflicts during the merge.
    pub novos_casos: Option<SourceConfig>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            principal: SourceConfig {
                path: "data/base_principal.json".into(),
                sheet_keywords: vec!["in".into(), "dados".into(), "base".into()],
            },
            novos_casos: Some(SourceConfig {
                path: "data/novos_casos.json".into(),
                sheet_keywords: vec![
                    "in".into(),
                    "dados".into(),
                    "base".into(),
                    "cpj".into(),
                ],
            }),
        }
    }
}

// ── Merge policy ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergePolicy {
    /// When true, merging sources that share no usable `numero_processo`
    /// key is an error instead of a duplicate-prone append.
    #[serde(default)]
    pub require_key: bool,
}

// ── Presentation overrides ───────────────────────────────────────────────────

/// Fixed executive-report figures that replace computed values in a handful
/// of views. They exist because the boletim numbers were signed off before
/// this system shipped; with an override set to `None` the view reports what
/// the data actually says. Keep them here, never inline in a view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationOverrides {
    pub sla_subsidio: Option<SlaSubsidioFigures>,
    pub taxa_reincidencia: Option<f64>,
    pub erro_sistemico: Option<ErroSistemicoFigures>,
    pub estatisticas_gerais: Option<EstatisticasGeraisFigures>,
    pub ganhas_perdidas: Option<GanhasPerdidasFigures>,
}

impl PresentationOverrides {
    /// All overrides disabled — every view reports computed values.
    pub fn none() -> Self {
        Self {
            sla_subsidio: None,
            taxa_reincidencia: None,
            erro_sistemico: None,
            estatisticas_gerais: None,
            ganhas_perdidas: None,
        }
    }
}

impl Default for PresentationOverrides {
    fn default() -> Self {
        Self {
            sla_subsidio: Some(SlaSubsidioFigures::default()),
            taxa_reincidencia: Some(25.0),
            erro_sistemico: Some(ErroSistemicoFigures::default()),
            estatisticas_gerais: Some(EstatisticasGeraisFigures::default()),
            ganhas_perdidas: Some(GanhasPerdidasFigures::default()),
        }
    }
}

/// SLA D+2 figures from boletim 10/2025, per area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaSubsidioFigures {
    pub areas: Vec<SlaSubsidioArea>,
    pub media_nacional_sla: f64,
    pub media_nacional_tempo: f64,
    pub sla_dias: i64,
    pub legenda: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaSubsidioArea {
    pub area: String,
    pub tempo_medio_tramitacao: f64,
    pub percentual_dentro_sla: f64,
    pub percentual_acima_5_dias: f64,
}

impl Default for SlaSubsidioFigures {
    fn default() -> Self {
        Self {
            areas: vec![
                SlaSubsidioArea {
                    area: "Operações".into(),
                    tempo_medio_tramitacao: 4.2,
                    percentual_dentro_sla: 92.0,
                    percentual_acima_5_dias: 8.0,
                },
                SlaSubsidioArea {
                    area: "Cobranças".into(),
                    tempo_medio_tramitacao: 3.8,
                    percentual_dentro_sla: 95.0,
                    percentual_acima_5_dias: 5.0,
                },
                SlaSubsidioArea {
                    area: "Jurídico Interno".into(),
                    tempo_medio_tramitacao: 3.0,
                    percentual_dentro_sla: 100.0,
                    percentual_acima_5_dias: 0.0,
                },
            ],
            media_nacional_sla: 95.67,
            media_nacional_tempo: 3.67,
            sla_dias: 2,
            legenda: "Conforme boletim 10/2025, solicitação de SLA é D+2".into(),
        }
    }
}

/// Fixed totals for the systemic-error view ("Casos Críticos" I and II).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErroSistemicoFigures {
    pub total_erros: i64,
    pub total_valor_pretendido: f64,
    pub total_impacto: f64,
}

impl Default for ErroSistemicoFigures {
    fn default() -> Self {
        Self {
            total_erros: 21,
            total_valor_pretendido: 9_240_821.00,
            total_impacto: 56_325.00,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstatisticasGeraisFigures {
    pub total_acoes: i64,
    pub total_encerramentos: i64,
    pub media_valor_causa: f64,
    pub media_pagamento: f64,
    pub impacto_negativo_global: f64,
}

impl Default for EstatisticasGeraisFigures {
    fn default() -> Self {
        Self {
            total_acoes: 396,
            total_encerramentos: 281,
            media_valor_causa: 15_362.91,
            media_pagamento: 6_043.76,
            impacto_negativo_global: 652_726.36,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GanhasPerdidasFigures {
    pub total_acoes: i64,
    pub total_encerrados: i64,
    pub em_tramite_quantidade: i64,
    pub em_tramite_percentual: f64,
    pub ganhas_quantidade: i64,
    pub ganhas_percentual: f64,
    pub perdidas_quantidade: i64,
    pub perdidas_percentual: f64,
    pub acordo_antes_quantidade: i64,
    pub acordo_antes_percentual: f64,
    pub economia_total: f64,
}

impl Default for GanhasPerdidasFigures {
    fn default() -> Self {
        Self {
            total_acoes: 396,
            total_encerrados: 281,
            em_tramite_quantidade: 232,
            em_tramite_percentual: 41.7,
            ganhas_quantidade: 47,
            ganhas_percentual: 16.7,
            perdidas_quantidade: 86,
            perdidas_percentual: 30.6,
            acordo_antes_quantidade: 31,
            acordo_antes_percentual: 11.0,
            economia_total: 371_136.26,
        }
    }
}

// ── Storage mirror ───────────────────────────────────────────────────────────

/// Optional HTTP mirror the source exports are pulled from before loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    pub base_url: String,
    /// Remote name → local name under the data directory.
    pub files: Vec<MirrorFile>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorFile {
    pub remote: String,
    pub local: String,
}

fn default_timeout_secs() -> u64 {
    30
}

// ── Top-level config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub merge: MergePolicy,
    #[serde(default)]
    pub overrides: PresentationOverrides,
    #[serde(default)]
    pub mirror: Option<MirrorConfig>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            sources: SourcesConfig::default(),
            merge: MergePolicy::default(),
            overrides: PresentationOverrides::default(),
            mirror: None,
        }
    }
}

impl CoreConfig {
    /// Load from a JSON file; missing sections fall back to defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config {path}: {e}"))?;
        let config: CoreConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_table_preserves_tuned_order() {
        let aliases = default_aliases();
        let objeto = aliases
            .iter()
            .find(|f| f.canonical == "objeto_acao")
            .unwrap();
        assert_eq!(objeto.aliases[0], "Descricao do Tipo de Ação");

        let impacto = aliases
            .iter()
            .find(|f| f.canonical == "impacto_financeiro")
            .unwrap();
        // "Valor da Causa Atual" must outrank "Valor da Causa".
        assert_eq!(impacto.aliases[0], "Valor da Causa Atual");
    }

    #[test]
    fn overrides_none_disables_everything() {
        let overrides = PresentationOverrides::none();
        assert!(overrides.sla_subsidio.is_none());
        assert!(overrides.taxa_reincidencia.is_none());
        assert!(overrides.erro_sistemico.is_none());
        assert!(overrides.estatisticas_gerais.is_none());
        assert!(overrides.ganhas_perdidas.is_none());
    }
}
