//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the helpers shared
//! by every REST handler.

use axum::http::StatusCode;
use saily_core::ports::PortError;
use tracing::error;
use utoipa::OpenApi;

use crate::web::{groups, history, settings, summaries, summarize, times, words};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        summarize::summarize_tasks_handler,
        words::latest_word_handler,
        groups::list_groups_handler,
        groups::create_group_handler,
        groups::deactivate_group_handler,
        groups::reactivate_group_handler,
        times::list_day_handler,
        times::list_range_handler,
        times::start_time_handler,
        times::edit_time_handler,
        times::end_time_handler,
        times::delete_time_handler,
        settings::get_settings_handler,
        settings::write_settings_handler,
        settings::update_settings_handler,
        summaries::list_summaries_handler,
        summaries::save_summary_handler,
        summaries::generate_summary_handler,
        summaries::delete_summary_handler,
        history::history_handler,
    ),
    components(
        schemas(
            summarize::SummarizeRequest,
            summarize::SummarizeResponse,
            words::WordResponse,
            groups::CreateGroupRequest,
            groups::CreatedResponse,
            groups::GroupResponse,
            times::StartTimeRequest,
            times::EditTimeRequest,
            times::EndTimeRequest,
            times::TimeEntryResponse,
            settings::ThemeRequest,
            settings::SettingsResponse,
            summaries::SaveSummaryRequest,
            summaries::GenerateSummaryRequest,
            summaries::SummaryResponse,
            history::DayTotalsResponse,
            history::GroupTotalResponse,
        )
    ),
    tags(
        (name = "Saily API", description = "Time tracking, summaries and the word of the day.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Helpers
//=========================================================================================

/// Maps a port failure to a response. Unexpected failures are logged and
/// reported with a fixed message naming the failed `action`.
pub(crate) fn port_error(action: &str, e: PortError) -> (StatusCode, String) {
    match e {
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        PortError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(_) => {
            error!("Failed to {}: {:?}", action, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {}", action),
            )
        }
    }
}

pub(crate) fn bad_request(message: impl Into<String>) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, message.into())
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health_handler() -> &'static str {
    "ok"
}
