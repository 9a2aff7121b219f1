use chrono::NaiveDate;
use contencioso_core::derive::derive_fields;
use contencioso_core::record::{CaseRecord, CaseTable};
use contencioso_core::views::generic::totais_por_coluna;
use serde_json::json;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn pronto(mut table: CaseTable) -> CaseTable {
    derive_fields(&mut table, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    table
}

fn caso(objeto: &str, sentenca_orig: &str) -> CaseRecord {
    CaseRecord {
        objeto_acao: objeto.to_string(),
        sentenca_orig: Some(sentenca_orig.to_string()),
        ..CaseRecord::default()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Plain value counts over a canonical column, descending.
#[test]
fn counts_single_column() {
    let table = pronto(CaseTable::new(vec![
        caso("A", "Favorável"),
        caso("A", "Favorável"),
        caso("B", "Desfavorável"),
    ]));

    let resultado = totais_por_coluna(&table, "sentenca", None);
    assert_eq!(resultado["total_geral"], 3);
    let dados = resultado["dados"].as_array().unwrap();
    assert_eq!(dados[0]["sentenca"], "Favorável");
    assert_eq!(dados[0]["quantidade"], 2);
    assert!(resultado.get("erro").is_none());
}

/// Pivot by a second column.
#[test]
fn pivots_by_group_column() {
    let table = pronto(CaseTable::new(vec![
        caso("A", "Favorável"),
        caso("A", "Desfavorável"),
        caso("B", "Favorável"),
    ]));

    let resultado = totais_por_coluna(&table, "sentenca", Some("objeto_acao"));
    let dados = resultado["dados"].as_array().unwrap();
    let linha_a = dados
        .iter()
        .find(|d| d["objeto_acao"] == "A")
        .expect("grupo A presente");
    assert_eq!(linha_a["Favorável"], 1);
    assert_eq!(linha_a["Desfavorável"], 1);
}

/// An unknown column is an error RESULT with the empty shape, never a
/// panic or an exception.
#[test]
fn unknown_column_yields_error_shape() {
    let table = pronto(CaseTable::new(vec![caso("A", "Favorável")]));

    let resultado = totais_por_coluna(&table, "coluna_fantasma", None);
    assert_eq!(resultado["dados"], json!([]));
    assert_eq!(resultado["total_geral"], 0);
    assert_eq!(
        resultado["erro"],
        "Coluna \"coluna_fantasma\" não encontrada"
    );

    let resultado = totais_por_coluna(&table, "sentenca", Some("outra_fantasma"));
    assert!(resultado.get("erro").is_some());
}

/// Extra (unmapped) source columns are reachable too.
#[test]
fn extras_are_queryable() {
    let mut com_extra = caso("A", "Favorável");
    com_extra.extras.insert("Comarca Origem".into(), json!("Campinas"));
    let table = pronto(CaseTable::new(vec![com_extra, caso("B", "Parcial")]));

    let resultado = totais_por_coluna(&table, "Comarca Origem", None);
    assert_eq!(resultado["total_geral"], 1);
    let dados = resultado["dados"].as_array().unwrap();
    assert_eq!(dados[0]["Comarca Origem"], "Campinas");
    assert_eq!(dados[0]["quantidade"], 1);
}
