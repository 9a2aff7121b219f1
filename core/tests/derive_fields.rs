use chrono::NaiveDate;
use contencioso_core::derive::{derive_fields, is_encerrado};
use contencioso_core::record::{CaseRecord, CaseTable, Sentenca, Status};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn hoje() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
}

fn data(ano: i32, mes: u32, dia: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(ano, mes, dia).unwrap()
}

fn rec() -> CaseRecord {
    CaseRecord::default()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Running the calculator twice must not change anything — the loader runs
/// it before and after the merge.
#[test]
fn derive_fields_is_idempotent() {
    let mut table = CaseTable::new(vec![
        CaseRecord {
            nome_cliente: "Maria".into(),
            data_entrada: Some(data(2024, 1, 1)),
            data_encerramento: Some(data(2024, 3, 1)),
            motivo_encerramento: Some("Extinção".into()),
            impacto_financeiro: 1000.0,
            ..rec()
        },
        CaseRecord {
            nome_cliente: "Maria".into(),
            data_entrada: Some(data(2024, 2, 1)),
            ..rec()
        },
        CaseRecord {
            nome_cliente: "João".into(),
            impacto_financeiro: 50_000.0,
            ..rec()
        },
    ]);

    derive_fields(&mut table, hoje());
    let once = serde_json::to_value(&table).unwrap();
    derive_fields(&mut table, hoje());
    let twice = serde_json::to_value(&table).unwrap();
    assert_eq!(once, twice, "derive_fields must be idempotent");
}

/// Status always agrees with `is_encerrado` — the closure rule has exactly
/// one implementation.
#[test]
fn status_is_consistent_with_is_encerrado() {
    let motivos = [
        None,
        Some("".to_string()),
        Some("Ativo".to_string()),
        Some("Fase de Recurso".to_string()),
        Some("Sem sentença".to_string()),
        Some("Pagamento de condenação".to_string()),
        Some("Extinção".to_string()),
        Some("Acordo antes da sentença".to_string()),
    ];
    let mut table = CaseTable::new(
        motivos
            .iter()
            .map(|m| CaseRecord {
                motivo_encerramento: m.clone(),
                ..rec()
            })
            .collect(),
    );
    derive_fields(&mut table, hoje());

    for row in table.iter() {
        let fechado = is_encerrado(&row.motivo_encerramento);
        assert_eq!(
            row.status == Status::Encerrado,
            fechado,
            "status diverged for motivo {:?}",
            row.motivo_encerramento,
        );
    }
    // "Fase de Recurso" stays open despite the non-empty reason text.
    assert_eq!(table.rows[3].status, Status::EmTramitacao);
}

/// SLA is only real when both dates exist; a missing date yields 0.0 and a
/// negative interval is floored at zero.
#[test]
fn sla_real_needs_both_dates() {
    let mut table = CaseTable::new(vec![
        CaseRecord {
            data_entrada: Some(data(2024, 1, 1)),
            data_encerramento: Some(data(2024, 1, 31)),
            ..rec()
        },
        CaseRecord {
            data_entrada: Some(data(2024, 1, 1)),
            ..rec()
        },
        CaseRecord {
            data_entrada: Some(data(2024, 2, 1)),
            data_encerramento: Some(data(2024, 1, 1)),
            ..rec()
        },
    ]);
    derive_fields(&mut table, hoje());

    assert_eq!(table.rows[0].sla_real, 30.0);
    assert_eq!(table.rows[1].sla_real, 0.0);
    assert_eq!(table.rows[2].sla_real, 0.0, "negative interval clamps to 0");
}

/// Criticality uses the full-table medians: impact 100000 vs median 10000
/// flags, 15000 on the same table does not.
#[test]
fn critico_uses_global_medians() {
    let impactos = [5_000.0, 10_000.0, 10_000.0, 15_000.0, 100_000.0];
    let mut table = CaseTable::new(
        impactos
            .iter()
            .map(|v| CaseRecord {
                impacto_financeiro: *v,
                data_entrada: Some(data(2025, 6, 1)),
                ..rec()
            })
            .collect(),
    );
    derive_fields(&mut table, hoje());

    // Median impact is 10000; every row has the same elapsed time so the
    // time criterion never fires.
    assert!(table.rows[4].critico, "100000 > 2x10000 must flag");
    assert!(!table.rows[3].critico, "15000 <= 2x10000 must not flag");
    assert!(!table.rows[0].critico);
}

/// A client on three rows is a repeat client on all three; a single-row
/// client is not; the unknown-name sentinel never is.
#[test]
fn reincidencia_counts_rows_per_client() {
    let nomes = ["Maria", "Maria", "Maria", "José", "Não Informado", "Não Informado"];
    let mut table = CaseTable::new(
        nomes
            .iter()
            .map(|n| CaseRecord {
                nome_cliente: n.to_string(),
                ..rec()
            })
            .collect(),
    );
    derive_fields(&mut table, hoje());

    assert!(table.rows[0].reincidencia);
    assert!(table.rows[1].reincidencia);
    assert!(table.rows[2].reincidencia);
    assert!(!table.rows[3].reincidencia, "single-row client");
    assert!(!table.rows[4].reincidencia, "unknown names are not a client");
}

/// Impact falls back along the documented chain: mapped value, negative
/// impact, claim value.
#[test]
fn impacto_fallback_chain() {
    let mut table = CaseTable::new(vec![
        CaseRecord {
            impacto_financeiro: 300.0,
            impacto_negativo: Some(900.0),
            valor_causa: 500.0,
            ..rec()
        },
        CaseRecord {
            impacto_financeiro: 0.0,
            impacto_negativo: Some(900.0),
            valor_causa: 500.0,
            ..rec()
        },
        CaseRecord {
            impacto_financeiro: 0.0,
            valor_causa: 500.0,
            ..rec()
        },
        CaseRecord {
            impacto_financeiro: 0.0,
            ..rec()
        },
    ]);
    derive_fields(&mut table, hoje());

    assert_eq!(table.rows[0].impacto_financeiro, 300.0);
    assert_eq!(table.rows[1].impacto_financeiro, 900.0);
    assert_eq!(table.rows[2].impacto_financeiro, 500.0);
    assert_eq!(table.rows[3].impacto_financeiro, 0.0);
}

/// Outcome mapping: source column first (with spelling variants), then the
/// prognosis mapping, then Parcial.
#[test]
fn sentenca_mapping_priority() {
    let mut table = CaseTable::new(vec![
        CaseRecord {
            sentenca_orig: Some("Favoravel".into()),
            prognostico: Some("Remoto".into()),
            ..rec()
        },
        CaseRecord {
            sentenca_orig: Some("Sem Sentença".into()),
            ..rec()
        },
        CaseRecord {
            prognostico: Some("Incontroverso".into()),
            ..rec()
        },
        CaseRecord {
            prognostico: Some("Remoto".into()),
            ..rec()
        },
        CaseRecord { ..rec() },
    ]);
    derive_fields(&mut table, hoje());

    assert_eq!(table.rows[0].sentenca, Sentenca::Favoravel);
    assert_eq!(table.rows[1].sentenca, Sentenca::Parcial);
    assert_eq!(table.rows[2].sentenca, Sentenca::Favoravel);
    assert_eq!(table.rows[3].sentenca, Sentenca::Desfavoravel);
    assert_eq!(table.rows[4].sentenca, Sentenca::Parcial);
}

/// Estimated repeat-request count: elapsed months capped at 20, overridden
/// by the source column when present.
#[test]
fn reiteracoes_estimate_and_cap() {
    let mut table = CaseTable::new(vec![
        CaseRecord {
            data_entrada: Some(data(2025, 3, 2)), // 120 days before hoje()
            ..rec()
        },
        CaseRecord {
            data_entrada: Some(data(2020, 1, 1)), // years ago: capped
            ..rec()
        },
        CaseRecord {
            data_entrada: Some(data(2020, 1, 1)),
            reiteracoes_orig: Some(7),
            ..rec()
        },
    ]);
    derive_fields(&mut table, hoje());

    assert_eq!(table.rows[0].reiteracoes, 4);
    assert_eq!(table.rows[1].reiteracoes, 20, "estimate caps at 20");
    assert_eq!(table.rows[2].reiteracoes, 7, "source column wins");
}
