//! Table store — owns the canonical table and its lifecycle.
//!
//! RULE: views never hold the store, only snapshots taken from it. The
//! store is built once at startup and injected into the request layer; no
//! module-level global.
//!
//! Readers take `Arc` snapshots, so a reload can never change a table an
//! in-flight aggregation is looking at. Reloads are serialized and swap the
//! reference atomically; a reload that fails leaves the previous table
//! published.

use crate::error::CoreResult;
use crate::record::CaseTable;
use std::sync::{Arc, Mutex, RwLock};

type Builder = dyn Fn() -> CoreResult<CaseTable> + Send + Sync;

pub struct TableStore {
    table: RwLock<Arc<CaseTable>>,
    reload_gate: Mutex<()>,
    builder: Box<Builder>,
}

impl TableStore {
    /// Build the initial table and publish it. A failing first build logs
    /// and publishes the empty table — the service comes up degraded rather
    /// than not at all.
    pub fn initialize<F>(builder: F) -> Self
    where
        F: Fn() -> CoreResult<CaseTable> + Send + Sync + 'static,
    {
        let initial = match builder() {
            Ok(table) => table,
            Err(e) => {
                log::error!("store: carga inicial falhou ({e}), publicando tabela vazia");
                CaseTable::default()
            }
        };
        Self {
            table: RwLock::new(Arc::new(initial)),
            reload_gate: Mutex::new(()),
            builder: Box::new(builder),
        }
    }

    /// Immutable snapshot of the current table. Cheap — clones the `Arc`,
    /// not the rows.
    pub fn snapshot(&self) -> Arc<CaseTable> {
        self.table
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Rebuild from the sources and swap atomically. Only one reload runs
    /// at a time; on failure the previous table stays published and the
    /// error is returned.
    pub fn reload(&self) -> CoreResult<usize> {
        let _gate = self
            .reload_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let fresh = (self.builder)()?;
        let count = fresh.len();

        let mut slot = self
            .table
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Arc::new(fresh);

        log::info!("store: tabela recarregada com {count} registros");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CaseRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn table_with(n: usize) -> CaseTable {
        CaseTable::new(vec![CaseRecord::default(); n])
    }

    #[test]
    fn snapshot_survives_reload() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_builder = calls.clone();
        let store = TableStore::initialize(move || -> CoreResult<CaseTable> {
            let n = calls_in_builder.fetch_add(1, Ordering::SeqCst);
            Ok(table_with(n + 1))
        });

        let before = store.snapshot();
        assert_eq!(before.len(), 1);

        store.reload().unwrap();
        // The old snapshot is untouched; new snapshots see the new table.
        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn failed_reload_keeps_previous_table() {
        let fail = Arc::new(AtomicUsize::new(0));
        let fail_in_builder = fail.clone();
        let store = TableStore::initialize(move || -> CoreResult<CaseTable> {
            if fail_in_builder.load(Ordering::SeqCst) == 0 {
                Ok(table_with(3))
            } else {
                Err(crate::error::CoreError::SourceMissing {
                    path: "data/base.json".into(),
                })
            }
        });

        assert_eq!(store.snapshot().len(), 3);
        fail.store(1, Ordering::SeqCst);
        assert!(store.reload().is_err());
        assert_eq!(store.snapshot().len(), 3);
    }
}
