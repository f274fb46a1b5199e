//! Hoover binary: loads configuration and the cryptonym dictionary, picks a
//! search backend, and serves the message API.

mod cli;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use hoover_api::auth::resolve_token;
use hoover_api::{start_server, AppState};
use hoover_chat::{GreetedSet, JsonFileLoader, TurnHandler, TurnSettings, VocabularyIndex};
use hoover_core::config::{expand_home, SearchBackendKind};
use hoover_core::{HooverConfig, HooverError};
use hoover_search::{CognitiveSearchClient, LocalIndex, SearchBackend};

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Load before tracing starts so the configured level applies.
    let config_path = args.resolve_config_path();
    let loaded = HooverConfig::load_if_present(&config_path);

    let level = args
        .resolve_log_level()
        .or_else(|| loaded.as_ref().ok().map(|c| c.general.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .init();

    tracing::info!("Starting Hoover v{}", env!("CARGO_PKG_VERSION"));

    let result = match loaded {
        Ok(config) => run(&args, config).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::error!(error = %e, "Hoover failed to start");
        return Err(e.into());
    }
    Ok(())
}

async fn run(args: &CliArgs, mut config: HooverConfig) -> Result<(), HooverError> {
    args.apply_overrides(&mut config);
    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;

    let data_dir = expand_home(&config.general.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let vocabulary_path = expand_home(&config.chat.vocabulary_path);
    let vocabulary = VocabularyIndex::load(&JsonFileLoader::new(vocabulary_path))?;

    let backend = build_backend(&config, args.import.as_deref())?;
    tracing::info!(backend = backend.name(), "Search backend ready");

    let greeted = Arc::new(GreetedSet::with_seed(config.chat.pre_greeted.clone()));
    let handler = TurnHandler::new(
        Arc::new(vocabulary),
        backend,
        greeted,
        TurnSettings::from_config(&config),
    );

    let token = resolve_token(&config);
    start_server(AppState::new(config, handler, token)).await
}

fn build_backend(
    config: &HooverConfig,
    import: Option<&Path>,
) -> Result<Arc<dyn SearchBackend>, HooverError> {
    match config.search.backend {
        SearchBackendKind::Cognitive => {
            if import.is_some() {
                tracing::warn!("--import only applies to the local backend; ignoring");
            }
            let client = CognitiveSearchClient::new(&config.search)?;
            tracing::info!(url = %client.search_url(), "Using hosted search");
            Ok(Arc::new(client))
        }
        SearchBackendKind::Local => {
            let path = config.local_index_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let index = LocalIndex::open(&path)?;
            if let Some(file) = import {
                index.import_jsonl(file)?;
            }
            tracing::info!(
                path = %path.display(),
                documents = index.count()?,
                "Using local index"
            );
            Ok(Arc::new(index))
        }
    }
}
