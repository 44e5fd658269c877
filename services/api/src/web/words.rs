//! services/api/src/web/words.rs
//!
//! Read access to the word of the day.

use crate::web::rest::port_error;
use crate::web::state::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use saily_core::domain::WordRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct WordResponse {
    pub word: String,
    /// Definition payload as returned by the dictionary.
    #[schema(value_type = Object)]
    pub details: Value,
    pub dataset_index: usize,
    /// Number of times the word list wrapped before this word was picked.
    pub cycle: i64,
    pub created_at: DateTime<Utc>,
}

impl From<WordRecord> for WordResponse {
    fn from(record: WordRecord) -> Self {
        Self {
            word: record.word,
            details: record.details,
            dataset_index: record.cursor.dataset_index,
            cycle: record.cursor.cycle,
            created_at: record.created_at,
        }
    }
}

/// The most recently stored word of the day.
#[utoipa::path(
    get,
    path = "/word-of-the-day",
    responses(
        (status = 200, description = "Latest word", body = WordResponse),
        (status = 404, description = "No word stored yet")
    )
)]
pub async fn latest_word_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<WordResponse>, (StatusCode, String)> {
    let record = app_state
        .words
        .latest_word()
        .await
        .map_err(|e| port_error("read word of the day", e))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "No word of the day yet".to_string()))?;
    Ok(Json(record.into()))
}
