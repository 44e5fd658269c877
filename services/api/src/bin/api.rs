//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{load_word_list, CompletionSummaryAdapter, DbAdapter, HttpDictionaryAdapter},
    config::Config,
    error::ApiError,
    scheduler::{WordScheduler, WordSchedulerConfig},
    web::{self, rest::ApiDoc, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::Router;
use saily_core::WordOfTheDay;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_adapter = Arc::new(DbAdapter::connect(&config.database_url, 5).await?);
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let mut openai_config = OpenAIConfig::new();
    match config.llm_api_key.as_ref() {
        Some(key) => openai_config = openai_config.with_api_key(key),
        None => warn!("LLM_API_KEY is not set; summary requests will likely be rejected"),
    }
    if let Some(base) = config.llm_api_base.as_ref() {
        openai_config = openai_config.with_api_base(base);
    }
    let summarizer = Arc::new(CompletionSummaryAdapter::new(
        Client::with_config(openai_config),
        config.summary_model.clone(),
    ));

    // --- 4. Start the Word of the Day Scheduler ---
    let mut scheduler = if config.enable_word_scheduler {
        let dictionary = Arc::new(HttpDictionaryAdapter::new(
            reqwest::Client::new(),
            &config.dictionary_api_url,
        )?);
        let words = load_word_list(&config.word_list_path).await?;
        info!(
            words = words.len(),
            schedule = %config.word_schedule,
            time_zone = %config.time_zone,
            "Word list loaded"
        );
        let job = Arc::new(WordOfTheDay::new(db_adapter.clone(), dictionary, words));
        let mut scheduler = WordScheduler::new(
            WordSchedulerConfig::new(config.word_schedule.clone(), config.time_zone),
            job,
        )
        .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        info!("Word of the day scheduler disabled");
        None
    };

    // --- 5. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::with_database(
        db_adapter,
        summarizer,
        config.clone(),
    ));

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(web::router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.stop().await?;
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for the shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
