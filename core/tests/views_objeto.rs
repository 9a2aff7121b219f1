use chrono::NaiveDate;
use contencioso_core::derive::derive_fields;
use contencioso_core::filter::{apply_filters, GlobalFilters};
use contencioso_core::record::{CaseRecord, CaseTable};
use contencioso_core::views::objeto::{
    encerrados_por_objeto, entradas_por_objeto, pareto_impacto, resumo_saldo,
};
use serde_json::Value;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn hoje() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
}

fn data(ano: i32, mes: u32, dia: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(ano, mes, dia)
}

fn caso(objeto: &str, estado: &str) -> CaseRecord {
    CaseRecord {
        objeto_acao: objeto.to_string(),
        estado: estado.to_string(),
        ..CaseRecord::default()
    }
}

fn pronto(mut table: CaseTable) -> CaseTable {
    derive_fields(&mut table, hoje());
    table
}

fn linha<'a>(dados: &'a Value, objeto: &str) -> &'a Value {
    dados["dados"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["objeto_acao"] == objeto)
        .unwrap_or_else(|| panic!("objeto {objeto} ausente do resultado"))
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The concrete two-row scenario: one 2024 intake still open, one 2023
/// intake closed in 2024 with a condemnation payment.
#[test]
fn entradas_and_encerrados_pivot_scenario() {
    let table = pronto(CaseTable::new(vec![
        CaseRecord {
            data_entrada: data(2024, 5, 10),
            ..caso("Objeto A", "SP")
        },
        CaseRecord {
            data_entrada: data(2023, 2, 1),
            data_encerramento: data(2024, 8, 20),
            motivo_encerramento: Some("Pagamento de condenação".into()),
            ..caso("Objeto A", "SP")
        },
    ]));
    let objetos = table.objetos();

    let entradas = entradas_por_objeto(&table, &objetos);
    let l = linha(&entradas, "Objeto A");
    assert_eq!(l["2023"], 1);
    assert_eq!(l["2024"], 1);
    assert_eq!(l["Total"], 2);
    assert_eq!(entradas["total"], 2);

    let encerrados = encerrados_por_objeto(&table, &objetos);
    let l = linha(&encerrados, "Objeto A");
    assert_eq!(l["2024"], 1);
    assert_eq!(l["Total"], 1);
    assert_eq!(encerrados["total"], 1);
}

/// Pivot completeness: after filtering to SP, the RJ-only object still
/// appears with zero counts because the row universe is the unfiltered
/// table.
#[test]
fn pivot_rows_are_stable_across_filters() {
    let table = pronto(CaseTable::new(vec![
        CaseRecord {
            data_entrada: data(2024, 1, 1),
            ..caso("Objeto A", "SP")
        },
        CaseRecord {
            data_entrada: data(2024, 1, 1),
            ..caso("Objeto B", "RJ")
        },
    ]));
    let universo = table.objetos();

    let filtrado = apply_filters(&table, &GlobalFilters::uf("SP"));
    let entradas = entradas_por_objeto(&filtrado, &universo);

    let b = linha(&entradas, "Objeto B");
    assert_eq!(b["Total"], 0, "filtered-out object must appear zeroed");
    let a = linha(&entradas, "Objeto A");
    assert_eq!(a["Total"], 1);
}

/// A reason that matches the open-keyword set is not a closure, even with a
/// closure date recorded.
#[test]
fn open_keywords_are_not_closures() {
    let table = pronto(CaseTable::new(vec![CaseRecord {
        data_entrada: data(2024, 1, 1),
        data_encerramento: data(2024, 6, 1),
        motivo_encerramento: Some("Fase de Recurso".into()),
        ..caso("Objeto A", "SP")
    }]));
    let objetos = table.objetos();

    let encerrados = encerrados_por_objeto(&table, &objetos);
    assert_eq!(encerrados["total"], 0);
}

/// Per-object balance clamps at zero even when closures outnumber intakes
/// (a closure without an intake date never counts).
#[test]
fn saldo_por_objeto_never_negative() {
    let table = pronto(CaseTable::new(vec![
        // Two closed intakes, one open intake.
        CaseRecord {
            data_entrada: data(2024, 1, 1),
            motivo_encerramento: Some("Extinção".into()),
            ..caso("Objeto A", "SP")
        },
        CaseRecord {
            data_entrada: data(2024, 2, 1),
            motivo_encerramento: Some("Improcedência".into()),
            ..caso("Objeto A", "SP")
        },
        CaseRecord {
            data_entrada: data(2024, 3, 1),
            ..caso("Objeto A", "SP")
        },
        // Closed row with no intake date: ignored entirely by the balance.
        CaseRecord {
            motivo_encerramento: Some("Extinção".into()),
            ..caso("Objeto B", "SP")
        },
    ]));

    let saldo = resumo_saldo(&table);
    let a = linha(&saldo, "Objeto A");
    assert_eq!(a["qtd_entradas"], 3);
    assert_eq!(a["qtd_encerramentos"], 2);
    assert_eq!(a["saldo"], 1);

    let b = linha(&saldo, "Objeto B");
    assert_eq!(b["qtd_entradas"], 0);
    assert_eq!(b["qtd_encerramentos"], 0);
    assert_eq!(b["saldo"], 0, "balance is floored at zero");
}

/// Pareto: descending contribution with a cumulative share reaching 100%.
#[test]
fn pareto_cumulative_share() {
    let table = pronto(CaseTable::new(vec![
        CaseRecord {
            impacto_financeiro: 600.0,
            ..caso("Objeto A", "SP")
        },
        CaseRecord {
            impacto_financeiro: 300.0,
            ..caso("Objeto B", "SP")
        },
        CaseRecord {
            impacto_financeiro: 100.0,
            ..caso("Objeto C", "SP")
        },
    ]));

    let pareto = pareto_impacto(&table);
    let dados = pareto["dados"].as_array().unwrap();
    assert_eq!(dados[0]["objeto_acao"], "Objeto A");
    assert_eq!(dados[0]["percentual_acumulado"], 60.0);
    assert_eq!(dados[1]["percentual_acumulado"], 90.0);
    assert_eq!(dados[2]["percentual_acumulado"], 100.0);
    assert_eq!(dados[2]["acumulado"], 1000.0);
}
