use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::Arc;

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod interview;
pub mod llm;

use config::{AppConfig, StoreBackend};
use database::{DocumentStore, MemoryStore, PostgresStore};
use interview::InterviewEngine;
use llm::OpenAIClient;

/// Build the document store selected by configuration.
pub async fn build_store(config: &AppConfig) -> error::Result<Arc<dyn DocumentStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            let store = match &config.store.seed_path {
                Some(path) => {
                    info!("📂 Seeding in-memory store from {}", path.display());
                    MemoryStore::seeded_from(path)?
                }
                None => {
                    warn!("In-memory store has no seed file; candidates must be added before use");
                    MemoryStore::new()
                }
            };
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let store = PostgresStore::connect(&config.database).await?;
            store.initialize_schema().await?;
            Ok(Arc::new(store))
        }
    }
}

fn log_configuration(config: &AppConfig) {
    info!("Server: {}:{}", config.server.host, config.server.port);
    info!("LLM: {} via {}", config.llm.model, config.llm.base_url);
    info!("Generation timeout: {:?}", config.llm.timeout());
    match config.store.backend {
        StoreBackend::Memory => info!("Store: memory"),
        StoreBackend::Postgres => info!(
            "Store: postgres at {}:{}/{}",
            config.database.host, config.database.port, config.database.dbname
        ),
    }
}

/// Load configuration, wire the engine and serve the HTTP API until shutdown.
pub async fn run() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    log_configuration(&config);

    let generator = OpenAIClient::from_config(&config.llm).context("Failed to create LLM client")?;
    let store = build_store(&config).await.context("Failed to open document store")?;
    let engine = web::Data::new(InterviewEngine::new(
        store,
        Arc::new(generator),
        config.llm.timeout(),
    ));

    let bind = config.bind_address();
    info!("🚀 Rupadi interviewer listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(engine.clone())
            .wrap(middleware::Logger::default())
            .configure(api::configure)
    })
    .bind(bind)
    .context("Failed to bind HTTP listener")?
    .run()
    .await
    .context("HTTP server stopped with an error")?;

    info!("Server shut down");
    Ok(())
}
