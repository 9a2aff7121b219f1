//! Load pipeline — builds the canonical table from the configured sources.
//!
//! Pipeline: read principal → resolve → derive, read novos casos → resolve
//! → derive, merge (newer source wins), derive again over the merged table.
//! A missing or unreadable source degrades to an empty table so downstream
//! code never sees a missing column; it is logged, never fatal.

use crate::config::{CoreConfig, SourceConfig};
use crate::derive::derive_fields;
use crate::error::{CoreError, CoreResult};
use crate::merge::{merge, MergeReport};
use crate::record::CaseTable;
use crate::resolver::resolve;
use crate::source::{select_sheet, JsonWorkbook, TableSource};
use crate::storage::download_data_files;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub registros_principal: usize,
    pub registros_novos: usize,
    pub registros_finais: usize,
    pub fontes_ausentes: Vec<String>,
    pub sheet_principal: Option<String>,
    pub sheet_novos: Option<String>,
    pub merge: Option<MergeReport>,
}

/// Build the canonical table. `hoje` anchors elapsed-day fields.
pub fn build_table(
    config: &CoreConfig,
    data_dir: &Path,
    hoje: NaiveDate,
) -> CoreResult<(CaseTable, LoadReport)> {
    if let Some(mirror) = &config.mirror {
        let report = download_data_files(mirror, data_dir);
        if !report.all_ok() {
            log::warn!(
                "loader: espelho de storage com falhas ({:?}), seguindo com arquivos locais",
                report.erros,
            );
        }
    }

    let mut report = LoadReport::default();

    let principal = read_source(&config.sources.principal, data_dir, hoje, &mut report.sheet_principal)
        .unwrap_or_else(|e| {
            log::warn!("loader: base principal indisponível: {e}");
            report.fontes_ausentes.push(config.sources.principal.path.clone());
            CaseTable::default()
        });
    report.registros_principal = principal.len();

    let novos = match &config.sources.novos_casos {
        Some(source) => read_source(source, data_dir, hoje, &mut report.sheet_novos)
            .unwrap_or_else(|e| {
                log::warn!("loader: base de novos casos indisponível: {e}");
                report.fontes_ausentes.push(source.path.clone());
                CaseTable::default()
            }),
        None => CaseTable::default(),
    };
    report.registros_novos = novos.len();

    let mut table = if !principal.is_empty() && !novos.is_empty() {
        log::info!(
            "loader: mesclando bases ({} + {} registros)",
            principal.len(),
            novos.len(),
        );
        let (merged, merge_report) = merge(principal, novos, &config.merge)?;
        report.merge = Some(merge_report);
        merged
    } else if !principal.is_empty() {
        principal
    } else if !novos.is_empty() {
        novos
    } else {
        log::warn!("loader: nenhuma base encontrada, publicando tabela vazia");
        CaseTable::default()
    };

    // Second derive pass: merged rows carry fields from both sources, and
    // table-level flags (reincidência, crítico) must see the final row set.
    derive_fields(&mut table, hoje);

    report.registros_finais = table.len();
    log::info!(
        "loader: tabela canônica pronta com {} registros",
        report.registros_finais,
    );

    Ok((table, report))
}

fn read_source(
    source: &SourceConfig,
    data_dir: &Path,
    hoje: NaiveDate,
    picked_sheet: &mut Option<String>,
) -> CoreResult<CaseTable> {
    let path = data_dir.join(&source.path);
    let workbook = JsonWorkbook::open(&path)?;

    let sheet = select_sheet(&workbook, &source.sheet_keywords).ok_or_else(|| {
        CoreError::SheetNotFound {
            sheet: format!("{} (nenhuma sheet no arquivo)", source.path),
        }
    })?;
    *picked_sheet = Some(sheet.clone());

    let raw = workbook.read_sheet(&sheet)?;
    log::info!(
        "loader: {} registros lidos de '{}' sheet '{sheet}'",
        raw.nrows(),
        source.path,
    );

    let mut table = resolve(&raw, &crate::config::default_aliases());
    derive_fields(&mut table, hoje);
    Ok(table)
}
