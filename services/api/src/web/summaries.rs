//! services/api/src/web/summaries.rs
//!
//! Handlers for the history of AI summaries.

use crate::web::middleware::UserId;
use crate::web::rest::{bad_request, port_error};
use crate::web::state::AppState;
use crate::web::summarize::SUMMARY_FAILED;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, NaiveDate, Utc};
use saily_core::domain::{AiSummary, DayRange};
use saily_core::history::{range_label, task_lines};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct SaveSummaryRequest {
    pub summary: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct GenerateSummaryRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub summary: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub range_label: String,
}

impl From<AiSummary> for SummaryResponse {
    fn from(summary: AiSummary) -> Self {
        Self {
            id: summary.id,
            created_at: summary.created_at,
            summary: summary.summary,
            start_date: summary.range.start,
            end_date: summary.range.end,
            range_label: summary.range_label,
        }
    }
}

fn day_range(start: NaiveDate, end: NaiveDate) -> Result<DayRange, (StatusCode, String)> {
    DayRange::new(start, end).ok_or_else(|| bad_request("start_date must not be after end_date"))
}

async fn store(
    app_state: &AppState,
    owner_id: String,
    summary: String,
    range: DayRange,
) -> Result<AiSummary, (StatusCode, String)> {
    let record = AiSummary {
        id: Uuid::new_v4(),
        owner_id,
        created_at: Utc::now(),
        summary,
        range_label: range_label(&range),
        range,
    };
    app_state
        .summaries
        .save_summary(&record)
        .await
        .map_err(|e| port_error("save summary", e))?;
    Ok(record)
}

/// List stored summaries, newest first.
#[utoipa::path(
    get,
    path = "/summaries",
    params(("x-user-id" = String, Header, description = "The id of the user.")),
    responses((status = 200, description = "Stored summaries", body = [SummaryResponse]))
)]
pub async fn list_summaries_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<Vec<SummaryResponse>>, (StatusCode, String)> {
    let summaries = app_state
        .summaries
        .list_summaries(&user_id)
        .await
        .map_err(|e| port_error("list summaries", e))?;
    Ok(Json(summaries.into_iter().map(SummaryResponse::from).collect()))
}

/// Store a summary produced elsewhere (e.g. by `/summarize`).
#[utoipa::path(
    post,
    path = "/summaries",
    request_body = SaveSummaryRequest,
    params(("x-user-id" = String, Header, description = "The id of the user.")),
    responses(
        (status = 201, description = "Summary stored", body = SummaryResponse),
        (status = 400, description = "Empty summary or inverted range")
    )
)]
pub async fn save_summary_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(req): Json<SaveSummaryRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let range = day_range(req.start_date, req.end_date)?;
    if req.summary.trim().is_empty() {
        return Err(bad_request("summary must not be empty"));
    }
    let record = store(&app_state, user_id, req.summary, range).await?;
    Ok((StatusCode::CREATED, Json(SummaryResponse::from(record))))
}

/// Summarize the sessions logged in a range of days and store the result.
#[utoipa::path(
    post,
    path = "/summaries/generate",
    request_body = GenerateSummaryRequest,
    params(("x-user-id" = String, Header, description = "The id of the user.")),
    responses(
        (status = 201, description = "Summary generated and stored", body = SummaryResponse),
        (status = 400, description = "Inverted range or nothing logged in it"),
        (status = 500, description = "The text generation API failed")
    )
)]
pub async fn generate_summary_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(req): Json<GenerateSummaryRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let range = day_range(req.start_date, req.end_date)?;

    let entries = app_state
        .times
        .list_time_entries_in_range(&user_id, range)
        .await
        .map_err(|e| port_error("list times", e))?;
    if entries.is_empty() {
        return Err(bad_request("No tasks logged in this range"));
    }
    let groups = app_state
        .groups
        .list_groups(&user_id)
        .await
        .map_err(|e| port_error("list groups", e))?;

    let tasks = task_lines(&entries, &groups);
    let summary = app_state
        .summarizer
        .summarize_tasks(&tasks)
        .await
        .map_err(|e| {
            error!("Error during text generation call: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, SUMMARY_FAILED.to_string())
        })?;

    let record = store(&app_state, user_id, summary, range).await?;
    info!(summary_id = %record.id, tasks = tasks.len(), "Stored generated summary");
    Ok((StatusCode::CREATED, Json(SummaryResponse::from(record))))
}

/// Delete a stored summary.
#[utoipa::path(
    delete,
    path = "/summaries/{id}",
    params(
        ("id" = Uuid, Path, description = "The summary id."),
        ("x-user-id" = String, Header, description = "The id of the user.")
    ),
    responses(
        (status = 204, description = "Summary deleted"),
        (status = 404, description = "No such summary for this user")
    )
)]
pub async fn delete_summary_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    app_state
        .summaries
        .delete_summary(&user_id, id)
        .await
        .map_err(|e| port_error("delete summary", e))?;
    Ok(StatusCode::NO_CONTENT)
}
