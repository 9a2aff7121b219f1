use contencioso_core::config::MergePolicy;
use contencioso_core::merge::merge;
use contencioso_core::record::{CaseRecord, CaseTable};
use serde_json::json;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn rec(numero: Option<&str>) -> CaseRecord {
    CaseRecord {
        numero_processo: numero.map(str::to_string),
        ..CaseRecord::default()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The §8-style scenario: secondary null/sentinel cells never overwrite the
/// primary, and a column unique to the secondary is kept.
#[test]
fn keyed_merge_fills_gaps_without_clobbering() {
    let principal = CaseTable::new(vec![CaseRecord {
        estado: "SP".into(),
        ..rec(Some("1"))
    }]);
    let mut novo = rec(Some("1"));
    novo.extras
        .insert("cidade".into(), json!("Campinas"));
    let novos = CaseTable::new(vec![novo]);

    let (merged, report) = merge(principal, novos, &MergePolicy::default()).unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged.rows[0].estado, "SP");
    assert_eq!(merged.rows[0].extras.get("cidade"), Some(&json!("Campinas")));
    assert!(report.com_chave);
    assert_eq!(report.em_ambos, 1);
}

/// The newer source wins conflicts when it has a real value.
#[test]
fn newer_source_wins_informative_conflicts() {
    let principal = CaseTable::new(vec![CaseRecord {
        estado: "SP".into(),
        motivo_encerramento: None,
        ..rec(Some("7"))
    }]);
    let novos = CaseTable::new(vec![CaseRecord {
        estado: "RJ".into(),
        motivo_encerramento: Some("Extinção".into()),
        ..rec(Some("7"))
    }]);

    let (merged, _) = merge(principal, novos, &MergePolicy::default()).unwrap();
    assert_eq!(merged.rows[0].estado, "RJ");
    assert_eq!(
        merged.rows[0].motivo_encerramento.as_deref(),
        Some("Extinção")
    );
}

/// Unmatched rows from both sides are carried through and counted.
#[test]
fn outer_join_keeps_rows_from_both_sides() {
    let principal = CaseTable::new(vec![rec(Some("1")), rec(Some("2"))]);
    let novos = CaseTable::new(vec![rec(Some("2")), rec(Some("3")), rec(Some("4"))]);

    let (merged, report) = merge(principal, novos, &MergePolicy::default()).unwrap();

    assert_eq!(merged.len(), 4);
    assert_eq!(report.apenas_principal, 1);
    assert_eq!(report.apenas_novos, 2);
    assert_eq!(report.em_ambos, 1);
    assert_eq!(report.total, 4);
}

/// No shared key: append over the column union, newer rows first, no
/// dedup attempted.
#[test]
fn keyless_merge_appends_without_dedup() {
    let principal = CaseTable::new(vec![
        CaseRecord {
            estado: "SP".into(),
            ..rec(None)
        },
        CaseRecord {
            estado: "SP".into(),
            ..rec(None)
        },
    ]);
    let novos = CaseTable::new(vec![CaseRecord {
        estado: "SP".into(),
        ..rec(None)
    }]);

    let (merged, report) = merge(principal, novos, &MergePolicy::default()).unwrap();

    assert_eq!(merged.len(), 3, "identical rows are kept, not deduplicated");
    assert!(!report.com_chave);
    assert_eq!(report.apenas_novos, 1);
    assert_eq!(report.apenas_principal, 2);
}

/// Empty inputs short-circuit.
#[test]
fn empty_inputs_return_the_other_side() {
    let principal = CaseTable::new(vec![rec(Some("1"))]);
    let (merged, _) = merge(principal.clone(), CaseTable::default(), &MergePolicy::default())
        .unwrap();
    assert_eq!(merged.len(), 1);

    let (merged, _) = merge(CaseTable::default(), principal, &MergePolicy::default()).unwrap();
    assert_eq!(merged.len(), 1);

    let (merged, report) =
        merge(CaseTable::default(), CaseTable::default(), &MergePolicy::default()).unwrap();
    assert!(merged.is_empty());
    assert_eq!(report.total, 0);
}
