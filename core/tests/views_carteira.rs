use chrono::NaiveDate;
use contencioso_core::derive::derive_fields;
use contencioso_core::filter::{apply_filters, GlobalFilters};
use contencioso_core::record::{CaseRecord, CaseTable};
use contencioso_core::views::carteira::{evolucao, saldo};
use contencioso_core::views::sla::sla_por_area;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn hoje() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
}

fn data(ano: i32, mes: u32, dia: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(ano, mes, dia)
}

fn pronto(mut table: CaseTable) -> CaseTable {
    derive_fields(&mut table, hoje());
    table
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Global balance splits the table into open and closed.
#[test]
fn saldo_splits_open_and_closed() {
    let table = pronto(CaseTable::new(vec![
        CaseRecord {
            impacto_financeiro: 100.0,
            ..CaseRecord::default()
        },
        CaseRecord {
            impacto_financeiro: 40.0,
            motivo_encerramento: Some("Extinção".into()),
            ..CaseRecord::default()
        },
        CaseRecord {
            impacto_financeiro: 60.0,
            motivo_encerramento: Some("Ativo".into()), // open keyword
            ..CaseRecord::default()
        },
    ]));

    let resultado = saldo(&table);
    assert_eq!(resultado["entradas"], 2);
    assert_eq!(resultado["encerrados"], 1);
    assert_eq!(resultado["saldo"], 1);
    assert_eq!(resultado["impacto_entradas"], 160.0);
    assert_eq!(resultado["impacto_encerrados"], 40.0);
}

/// Evolution outer-joins intake months and closure months; a month present
/// on one side only is zero-filled on the other, and periods sort
/// chronologically.
#[test]
fn evolucao_unions_periods_with_zero_fill() {
    let table = pronto(CaseTable::new(vec![
        CaseRecord {
            data_entrada: data(2024, 1, 15),
            ..CaseRecord::default()
        },
        CaseRecord {
            data_entrada: data(2024, 1, 20),
            ..CaseRecord::default()
        },
        CaseRecord {
            data_entrada: data(2023, 12, 1),
            data_encerramento: data(2024, 3, 10),
            motivo_encerramento: Some("Extinção".into()),
            ..CaseRecord::default()
        },
    ]));

    let resultado = evolucao(&table);
    let dados = resultado["dados"].as_array().unwrap();
    let periodos: Vec<&str> = dados
        .iter()
        .map(|d| d["periodo"].as_str().unwrap())
        .collect();
    assert_eq!(periodos, vec!["2023-12", "2024-01", "2024-03"]);

    assert_eq!(dados[1]["entradas"], 2);
    assert_eq!(dados[1]["encerramentos"], 0, "closure-free month zero-fills");
    assert_eq!(dados[2]["entradas"], 0);
    assert_eq!(dados[2]["encerramentos"], 1);
    assert_eq!(resultado["total_periodos"], 3);
}

/// The SLA mean excludes rows with a missing date instead of dragging the
/// mean down with placeholder zeros; an area with no closed cases reports
/// 0.0 rather than failing.
#[test]
fn sla_mean_excludes_missing_dates() {
    let table = pronto(CaseTable::new(vec![
        CaseRecord {
            area_responsavel: Some("Operações".into()),
            data_entrada: data(2024, 1, 1),
            data_encerramento: data(2024, 1, 11),
            ..CaseRecord::default()
        },
        CaseRecord {
            area_responsavel: Some("Operações".into()),
            data_entrada: data(2024, 1, 1), // still open: must not count
            ..CaseRecord::default()
        },
        CaseRecord {
            area_responsavel: Some("Cobranças".into()),
            data_entrada: data(2024, 1, 1), // area with zero closed cases
            ..CaseRecord::default()
        },
    ]));

    let resultado = sla_por_area(&table);
    let dados = resultado["dados"].as_array().unwrap();

    let operacoes = dados
        .iter()
        .find(|d| d["area"] == "Operações")
        .expect("Operações ausente");
    assert_eq!(operacoes["media_dias"], 10.0, "mean over closed rows only");
    assert_eq!(operacoes["quantidade"], 2);

    let cobrancas = dados
        .iter()
        .find(|d| d["area"] == "Cobranças")
        .expect("Cobranças ausente");
    assert_eq!(cobrancas["media_dias"], 0.0);
    assert_eq!(cobrancas["acima_da_meta"], false);
}

/// Criticality is fixed at load time: filtering the table afterwards never
/// changes the flags, even though the filtered subset has different
/// medians.
#[test]
fn critico_flags_stable_under_filters() {
    let mut rows = Vec::new();
    for i in 0..5 {
        rows.push(CaseRecord {
            estado: "SP".into(),
            impacto_financeiro: 1_000.0 * (i + 1) as f64,
            ..CaseRecord::default()
        });
    }
    // The outlier lives in RJ.
    rows.push(CaseRecord {
        estado: "RJ".into(),
        impacto_financeiro: 1_000_000.0,
        ..CaseRecord::default()
    });
    let table = pronto(CaseTable::new(rows));

    let flags_before: Vec<bool> = table.iter().map(|r| r.critico).collect();
    assert!(flags_before[5], "outlier must be flagged at load");

    let filtrado = apply_filters(&table, &GlobalFilters::uf("RJ"));
    assert_eq!(filtrado.len(), 1);
    assert!(
        filtrado.rows[0].critico,
        "flag computed at load survives any later filter"
    );
}
