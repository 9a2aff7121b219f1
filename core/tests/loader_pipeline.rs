use chrono::NaiveDate;
use contencioso_core::config::{CoreConfig, SourceConfig, SourcesConfig};
use contencioso_core::loader::build_table;
use contencioso_core::record::Status;
use std::fs;
use std::path::PathBuf;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn hoje() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("contencioso-loader-{name}"));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn config_for(dir_has_novos: bool) -> CoreConfig {
    CoreConfig {
        sources: SourcesConfig {
            principal: SourceConfig {
                path: "principal.json".into(),
                sheet_keywords: vec!["in".into(), "dados".into(), "base".into()],
            },
            novos_casos: if dir_has_novos {
                Some(SourceConfig {
                    path: "novos.json".into(),
                    sheet_keywords: vec!["cpj".into(), "dados".into()],
                })
            } else {
                None
            },
        },
        ..CoreConfig::default()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Full pipeline over two workbook exports: sheet selection by keyword,
/// alias resolution, keyed merge with the newer base winning, derived
/// fields recomputed over the merged rows.
#[test]
fn two_sources_merge_end_to_end() {
    let dir = temp_dir("merge");
    fs::write(
        dir.join("principal.json"),
        r#"{
            "Resumo": [],
            "Base Completa": [
                {"Número do Processo": "1", "Estado": "SP",
                 "OBJETO DA AÇÃO": "Cobrança Indevida",
                 "DATA ENTRADA": "2024-01-10",
                 "Valor da Causa Atual": 1000.0},
                {"Número do Processo": "2", "Estado": "RJ",
                 "OBJETO DA AÇÃO": "Dano Moral",
                 "DATA ENTRADA": "2024-02-01",
                 "Valor da Causa Atual": 2000.0}
            ]
        }"#,
    )
    .unwrap();
    fs::write(
        dir.join("novos.json"),
        r#"{
            "Planilha CPJ": [
                {"Número do Processo": "2",
                 "Motivo Encerramento": "Extinção",
                 "DATA ENCERRAMENTO": "2024-05-01"},
                {"Número do Processo": "3", "Estado": "BA",
                 "OBJETO DA AÇÃO": "Cobrança Indevida",
                 "DATA ENTRADA": "2025-01-05",
                 "Valor da Causa Atual": 500.0}
            ]
        }"#,
    )
    .unwrap();

    let (table, report) = build_table(&config_for(true), &dir, hoje()).unwrap();

    assert_eq!(report.sheet_principal.as_deref(), Some("Base Completa"));
    assert_eq!(report.sheet_novos.as_deref(), Some("Planilha CPJ"));
    assert_eq!(table.len(), 3);

    let merge = report.merge.expect("merge report present");
    assert_eq!(merge.em_ambos, 1);
    assert_eq!(merge.apenas_principal, 1);
    assert_eq!(merge.apenas_novos, 1);

    // Case 2 kept its RJ state from the principal base and gained the
    // closure from the newer base; the post-merge derive closed it.
    let caso2 = table
        .iter()
        .find(|r| r.numero_processo.as_deref() == Some("2"))
        .unwrap();
    assert_eq!(caso2.estado, "RJ");
    assert_eq!(caso2.status, Status::Encerrado);
    assert_eq!(caso2.sla_real, 90.0);

    let _ = fs::remove_dir_all(&dir);
}

/// Missing sources are not fatal: the pipeline publishes an empty table
/// and records what was absent.
#[test]
fn missing_sources_degrade_to_empty_table() {
    let dir = temp_dir("missing");

    let (table, report) = build_table(&config_for(true), &dir, hoje()).unwrap();

    assert!(table.is_empty());
    assert_eq!(report.fontes_ausentes.len(), 2);
    assert_eq!(report.registros_finais, 0);

    let _ = fs::remove_dir_all(&dir);
}

/// With only the principal base present the pipeline skips the merge.
#[test]
fn single_source_skips_merge() {
    let dir = temp_dir("single");
    fs::write(
        dir.join("principal.json"),
        r#"[{"Estado": "SP", "OBJETO DA AÇÃO": "Cobrança", "DATA ENTRADA": "2024-01-01"}]"#,
    )
    .unwrap();

    let (table, report) = build_table(&config_for(false), &dir, hoje()).unwrap();

    assert_eq!(table.len(), 1);
    assert!(report.merge.is_none());
    assert_eq!(table.rows[0].objeto_acao, "Cobrança");

    let _ = fs::remove_dir_all(&dir);
}
