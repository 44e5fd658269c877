//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use chrono_tz::Tz;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub llm_api_key: Option<String>,
    pub llm_api_base: Option<String>,
    pub summary_model: String,
    pub dictionary_api_url: String,
    pub word_list_path: PathBuf,
    pub word_schedule: String,
    pub time_zone: Tz,
    pub enable_word_scheduler: bool,
    pub cors_origin: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Load Server and Database Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Outbound API Settings ---
        let llm_api_key = lookup("LLM_API_KEY");
        let llm_api_base = lookup("LLM_API_BASE");
        let summary_model = var_or("SUMMARY_MODEL", "meta-llama/Meta-Llama-3-8B-Instruct");
        let dictionary_api_url = var_or(
            "DICTIONARY_API_URL",
            "https://api.dictionaryapi.dev/api/v2/entries/en",
        );

        // --- Load Word of the Day Settings ---
        let word_list_path = PathBuf::from(var_or("WORD_LIST_PATH", "./assets/words.txt"));
        let word_schedule = var_or("WORD_SCHEDULE", "0 0 0 * * *");

        let time_zone_str = var_or("TIME_ZONE", "America/New_York");
        let time_zone = time_zone_str
            .parse::<Tz>()
            .map_err(|e| ConfigError::InvalidValue("TIME_ZONE".to_string(), e.to_string()))?;

        let enable_word_scheduler = match var_or("ENABLE_WORD_SCHEDULER", "true")
            .to_ascii_lowercase()
            .as_str()
        {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "ENABLE_WORD_SCHEDULER".to_string(),
                    format!("'{}' is not a boolean", other),
                ))
            }
        };

        let cors_origin = lookup("CORS_ORIGIN");

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            llm_api_key,
            llm_api_base,
            summary_model,
            dictionary_api_url,
            word_list_path,
            word_schedule,
            time_zone,
            enable_word_scheduler,
            cors_origin,
        })
    }
}
