//! painel-runner: headless driver for the litigation-portfolio core.
//!
//! Usage:
//!   painel-runner --data-dir ./data --view saldo
//!   painel-runner --data-dir ./data --view entradas-por-objeto --uf SP
//!   painel-runner --data-dir ./data --all
//!
//! Builds the canonical table exactly like the service does at startup,
//! applies the optional filters and prints the requested view as JSON on
//! stdout.

use anyhow::Result;
use chrono::Local;
use contencioso_core::{
    config::CoreConfig,
    filter::{apply_filters, GlobalFilters},
    loader::build_table,
    store::TableStore,
    views,
};
use serde_json::Value;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = arg_value(&args, "--data-dir").unwrap_or_else(|| "./data".to_string());
    let config_path = arg_value(&args, "--config");
    let view = arg_value(&args, "--view");
    let coluna = arg_value(&args, "--coluna");
    let agrupar_por = arg_value(&args, "--agrupar-por");
    let all = args.iter().any(|a| a == "--all");
    let filters = GlobalFilters {
        uf: arg_value(&args, "--uf"),
        objeto: arg_value(&args, "--objeto"),
    };

    let config = match &config_path {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };

    let dir = PathBuf::from(&data_dir);
    let loader_config = config.clone();
    let loader_dir = dir.clone();
    let store = TableStore::initialize(move || {
        let hoje = Local::now().date_naive();
        let (table, report) = build_table(&loader_config, &loader_dir, hoje)?;
        log::info!(
            "runner: {} registros ({} principal, {} novos)",
            report.registros_finais,
            report.registros_principal,
            report.registros_novos,
        );
        Ok(table)
    });

    let snapshot = store.snapshot();
    let todos_objetos = snapshot.objetos();
    let df = apply_filters(&snapshot, &filters);

    let nomes = [
        "entradas-por-objeto",
        "encerrados-por-objeto",
        "saldo",
        "saldo-por-objeto",
        "evolucao",
        "mapa-nacional",
        "objeto-por-estado",
        "tempo-medio",
        "casos-impacto",
        "sla-area",
        "sla-subsidio-por-area",
        "areas-responsaveis",
        "solicitacoes-prazo",
        "solicitacoes-prazo-por-area",
        "volume-custo",
        "reiteracoes",
        "pareto",
        "casos-criticos",
        "sentencas",
        "sentencas-por-area",
        "sentencas-por-objeto",
        "reincidencia",
        "reincidencia-por-cliente",
        "tipos-acoes-2025",
        "erro-sistemico",
        "maior-reiteracao",
        "kpis-finais",
        "analise-correlacao",
        "casos-objetos-por-uf",
        "prejuizo-por-uf",
        "estatisticas-gerais",
        "acoes-ganhas-perdidas",
        "agregado-por-objeto",
        "totais-por-coluna",
    ];

    let avaliar = |nome: &str| -> Option<Value> {
        let overrides = &config.overrides;
        let value = match nome {
            "entradas-por-objeto" => views::objeto::entradas_por_objeto(&df, &todos_objetos),
            "encerrados-por-objeto" => views::objeto::encerrados_por_objeto(&df, &todos_objetos),
            "saldo" => views::carteira::saldo(&df),
            "saldo-por-objeto" => views::objeto::resumo_saldo(&df),
            "evolucao" => views::carteira::evolucao(&df),
            "mapa-nacional" => views::estado::mapa_nacional(&df),
            "objeto-por-estado" => views::objeto::objeto_por_estado(&df),
            "tempo-medio" => views::carteira::tempo_medio(&df),
            "casos-impacto" => views::objeto::casos_impacto(&df),
            "sla-area" => views::sla::sla_por_area(&df),
            "sla-subsidio-por-area" => views::sla::sla_subsidio_por_area(&df, overrides),
            "areas-responsaveis" => views::sla::areas_responsaveis(&df),
            "solicitacoes-prazo" => views::carteira::solicitacoes_prazo(&df),
            "solicitacoes-prazo-por-area" => views::carteira::solicitacoes_prazo_por_area(&df),
            "volume-custo" => views::resultado::volume_custo(&df),
            "reiteracoes" => views::objeto::reiteracoes_por_objeto(&df),
            "pareto" => views::objeto::pareto_impacto(&df),
            "casos-criticos" => views::critico::casos_criticos(&df, 20),
            "sentencas" => views::sentenca::sentencas(&df),
            "sentencas-por-area" => views::sentenca::sentencas_por_area(&df),
            "sentencas-por-objeto" => views::objeto::sentencas_por_objeto(&df),
            "reincidencia" => views::cliente::reincidencia(&df),
            "reincidencia-por-cliente" => {
                views::cliente::reincidencia_por_cliente(&df, 100, overrides)
            }
            "tipos-acoes-2025" => views::objeto::tipos_acoes_2025(&df),
            "erro-sistemico" => views::resultado::erro_sistemico(&df, overrides),
            "maior-reiteracao" => views::objeto::maior_reiteracao(&df),
            "kpis-finais" => views::resultado::kpis_finais(&df),
            "analise-correlacao" => {
                views::estado::analise_correlacao(&df, filters.objeto.as_deref())
            }
            "casos-objetos-por-uf" => views::estado::casos_objetos_por_uf(&df),
            "prejuizo-por-uf" => views::estado::prejuizo_por_uf(&df),
            "estatisticas-gerais" => views::resultado::estatisticas_gerais(&df, overrides),
            "acoes-ganhas-perdidas" => views::resultado::acoes_ganhas_perdidas(&df, overrides),
            "agregado-por-objeto" => views::carteira::agregado_por_objeto(&df),
            "totais-por-coluna" => views::generic::totais_por_coluna(
                &df,
                coluna.as_deref().unwrap_or("sentenca"),
                agrupar_por.as_deref(),
            ),
            _ => return None,
        };
        Some(value)
    };

    if all {
        let mut saida = serde_json::Map::new();
        for nome in nomes {
            if let Some(value) = avaliar(nome) {
                saida.insert(nome.to_string(), value);
            }
        }
        println!("{}", serde_json::to_string_pretty(&Value::Object(saida))?);
        return Ok(());
    }

    match view.as_deref() {
        Some(nome) => match avaliar(nome) {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => {
                eprintln!("View desconhecida: {nome}");
                eprintln!("Views disponíveis: {}", nomes.join(", "));
                std::process::exit(1);
            }
        },
        None => {
            println!("painel-runner — núcleo do dashboard de contencioso");
            println!("  registros carregados: {}", snapshot.len());
            println!("  registros após filtro: {}", df.len());
            println!();
            println!("Use --view <nome> ou --all. Views disponíveis:");
            for nome in nomes {
                println!("  {nome}");
            }
        }
    }

    Ok(())
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
}
