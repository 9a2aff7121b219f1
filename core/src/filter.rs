//! Global filter layer applied before any aggregation.

use crate::record::CaseTable;

/// Optional equality filters carried on every dashboard request.
#[derive(Debug, Clone, Default)]
pub struct GlobalFilters {
    /// Two-letter state code; blank means no state filter.
    pub uf: Option<String>,
    /// Exact action-object label; blank means no object filter.
    pub objeto: Option<String>,
}

impl GlobalFilters {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn uf(uf: &str) -> Self {
        Self {
            uf: Some(uf.to_string()),
            objeto: None,
        }
    }
}

/// Apply the filters, returning a filtered copy. The input table is never
/// mutated — it is a shared snapshot.
pub fn apply_filters(table: &CaseTable, filters: &GlobalFilters) -> CaseTable {
    let uf = filters
        .uf
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase);
    let objeto = filters
        .objeto
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    if uf.is_none() && objeto.is_none() {
        return table.clone();
    }

    let rows = table
        .iter()
        .filter(|rec| {
            if let Some(uf) = &uf {
                if rec.estado.trim().to_uppercase() != *uf {
                    return false;
                }
            }
            if let Some(objeto) = objeto {
                if rec.objeto_acao != objeto {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect();

    CaseTable::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CaseRecord;

    fn rec(estado: &str, objeto: &str) -> CaseRecord {
        CaseRecord {
            estado: estado.to_string(),
            objeto_acao: objeto.to_string(),
            ..CaseRecord::default()
        }
    }

    #[test]
    fn blank_filters_are_a_noop() {
        let table = CaseTable::new(vec![rec("SP", "Cobrança"), rec("RJ", "Dano Moral")]);
        let filters = GlobalFilters {
            uf: Some("  ".into()),
            objeto: Some(String::new()),
        };
        assert_eq!(apply_filters(&table, &filters).len(), 2);
    }

    #[test]
    fn uf_matches_case_insensitively_and_objeto_exactly() {
        let table = CaseTable::new(vec![rec("SP", "Cobrança"), rec("RJ", "Dano Moral")]);

        let filters = GlobalFilters {
            uf: Some("sp".into()),
            objeto: None,
        };
        let filtered = apply_filters(&table, &filters);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.rows[0].estado, "SP");

        let filters = GlobalFilters {
            uf: None,
            objeto: Some(" Dano Moral ".into()),
        };
        let filtered = apply_filters(&table, &filters);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.rows[0].objeto_acao, "Dano Moral");

        // Input untouched.
        assert_eq!(table.len(), 2);
    }
}
