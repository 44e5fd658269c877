//! services/api/src/web/summarize.rs
//!
//! The stateless task summarization relay.

use crate::web::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
pub const INVALID_TASKS: &str = "Invalid tasks format. Please send an array of tasks.";
pub const SUMMARY_FAILED: &str = "Failed to summarize tasks.";

/// Request body of the relay.
#[derive(Deserialize, ToSchema)]
pub struct SummarizeRequest {
    pub tasks: Vec<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SummarizeResponse {
    pub summary: String,
}

/// Pulls the task strings out of a raw body, `None` if the shape is wrong.
fn parse_tasks(body: &[u8]) -> Option<Vec<String>> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("tasks")?
        .as_array()?
        .iter()
        .map(|task| task.as_str().map(str::to_string))
        .collect()
}

/// Summarize a list of task descriptions.
///
/// Accepts only POST. The body must be `{ "tasks": [string] }`.
#[utoipa::path(
    post,
    path = "/summarize",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Summary generated", body = SummarizeResponse),
        (status = 400, description = "The tasks field is missing or not an array of strings"),
        (status = 405, description = "Any method other than POST"),
        (status = 500, description = "The text generation API failed")
    )
)]
pub async fn summarize_tasks_handler(
    method: Method,
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SummarizeResponse>, (StatusCode, String)> {
    if method != Method::POST {
        return Err((StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED.to_string()));
    }

    let tasks =
        parse_tasks(&body).ok_or_else(|| (StatusCode::BAD_REQUEST, INVALID_TASKS.to_string()))?;

    match app_state.summarizer.summarize_tasks(&tasks).await {
        Ok(summary) => Ok(Json(SummarizeResponse { summary })),
        Err(e) => {
            error!("Error during text generation call: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, SUMMARY_FAILED.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_string_arrays_only() {
        assert_eq!(
            parse_tasks(br#"{"tasks": ["a", "b"]}"#),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(parse_tasks(br#"{"tasks": []}"#), Some(vec![]));
        assert_eq!(parse_tasks(br#"{"tasks": "a"}"#), None);
        assert_eq!(parse_tasks(br#"{"tasks": ["a", 1]}"#), None);
        assert_eq!(parse_tasks(br#"{"other": []}"#), None);
        assert_eq!(parse_tasks(b"not json"), None);
        assert_eq!(parse_tasks(b""), None);
    }
}
