//! services/api/src/bin/word_of_the_day.rs
//!
//! Runs the word of the day job once and exits. Useful for backfilling a day
//! the scheduler missed or for triggering the job from an external cron.

use api_lib::{
    adapters::{load_word_list, DbAdapter, HttpDictionaryAdapter},
    config::Config,
    error::ApiError,
};
use saily_core::{WordOfTheDay, WordOfTheDayOutcome};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_adapter = Arc::new(DbAdapter::connect(&config.database_url, 1).await?);
    db_adapter.run_migrations().await?;

    let dictionary = Arc::new(HttpDictionaryAdapter::new(
        reqwest::Client::new(),
        &config.dictionary_api_url,
    )?);
    let words = load_word_list(&config.word_list_path).await?;

    match WordOfTheDay::new(db_adapter, dictionary, words).run().await {
        WordOfTheDayOutcome::Persisted(record) => info!(
            word = %record.word,
            index = record.cursor.dataset_index,
            cycle = record.cursor.cycle,
            "Stored word of the day"
        ),
        WordOfTheDayOutcome::NoDefinition { tried } => {
            warn!(?tried, "No definition found, nothing stored")
        }
        WordOfTheDayOutcome::Failed(reason) => {
            error!("Word of the day failed: {}", reason);
            return Err(ApiError::Internal(reason));
        }
    }
    Ok(())
}
