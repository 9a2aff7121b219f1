//! Optional download of source exports from an external object-store mirror.
//!
//! Keeps sensitive spreadsheets out of the repository: on startup the
//! configured files are pulled over HTTP into the data directory, with a
//! bounded timeout. A file already present locally is never re-downloaded,
//! and every failure degrades to whatever local copy exists — the mirror is
//! an optimization, not a dependency.

use crate::config::MirrorConfig;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadReport {
    pub baixados: Vec<String>,
    pub ja_existentes: Vec<String>,
    pub erros: Vec<String>,
}

impl DownloadReport {
    pub fn all_ok(&self) -> bool {
        self.erros.is_empty()
    }
}

/// Fetch every configured file that is not already cached locally. Never
/// returns an error: failures are collected in the report and logged.
pub fn download_data_files(config: &MirrorConfig, data_dir: &Path) -> DownloadReport {
    let mut report = DownloadReport::default();

    let client = match reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            log::error!("storage: falha ao criar cliente HTTP: {e}");
            report.erros.push(e.to_string());
            return report;
        }
    };

    for file in &config.files {
        let local_path = data_dir.join(&file.local);
        if local_path.exists() {
            log::info!("storage: {} já existe localmente, pulando", file.local);
            report.ja_existentes.push(file.local.clone());
            continue;
        }

        let url = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            file.remote.trim_start_matches('/')
        );
        match fetch(&client, &url, &local_path) {
            Ok(()) => {
                log::info!("storage: baixado {url} -> {}", local_path.display());
                report.baixados.push(file.local.clone());
            }
            Err(e) => {
                log::warn!("storage: falha ao baixar {url}: {e} (usando arquivo local se houver)");
                report.erros.push(format!("{}: {e}", file.local));
            }
        }
    }

    report
}

fn fetch(client: &reqwest::blocking::Client, url: &str, local_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = local_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let response = client.get(url).send()?.error_for_status()?;
    let bytes = response.bytes()?;
    if bytes.is_empty() {
        anyhow::bail!("resposta vazia");
    }
    fs::write(local_path, &bytes)?;
    Ok(())
}
