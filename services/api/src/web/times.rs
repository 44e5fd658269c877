//! services/api/src/web/times.rs
//!
//! Handlers for logged work sessions.

use crate::web::middleware::UserId;
use crate::web::rest::{bad_request, port_error};
use crate::web::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, NaiveDate, Utc};
use saily_core::domain::{DayRange, Stamp, TimeEntry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::groups::CreatedResponse;

//=========================================================================================
// Payloads
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DayQuery {
    /// Day to list, `YYYY-MM-DD`. Defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    /// First day, inclusive.
    pub start: NaiveDate,
    /// Last day, inclusive.
    pub end: NaiveDate,
}

impl RangeQuery {
    pub(crate) fn to_range(&self) -> Result<DayRange, (StatusCode, String)> {
        DayRange::new(self.start, self.end).ok_or_else(|| bad_request("start must not be after end"))
    }
}

#[derive(Deserialize, ToSchema)]
pub struct StartTimeRequest {
    pub group_id: Uuid,
    /// The day the session is filed under. Without `start_time` the session
    /// starts at the current local time on this day; with it, it must be the
    /// local day of `start_time`.
    pub date: Option<NaiveDate>,
    /// Defaults to now, or to the current local time on `date`.
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize, ToSchema)]
pub struct EditTimeRequest {
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct EndTimeRequest {
    pub date: Option<NaiveDate>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TimeEntryResponse {
    pub id: Uuid,
    pub group_id: Uuid,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub start_date: Option<NaiveDate>,
    pub end_time: Option<DateTime<Utc>>,
    pub end_date: Option<NaiveDate>,
    pub duration_minutes: i64,
}

impl From<TimeEntry> for TimeEntryResponse {
    fn from(entry: TimeEntry) -> Self {
        Self {
            id: entry.id,
            group_id: entry.group_id,
            duration_minutes: entry.duration(None).num_minutes(),
            start_time: entry.start.at,
            start_date: entry.start.day.to_date(),
            end_time: entry.end.map(|e| e.at),
            end_date: entry.end.and_then(|e| e.day.to_date()),
            description: entry.description,
        }
    }
}

/// Resolves the caller's optional day and instant into a stamp whose day is
/// always the local day of its instant.
///
/// A day without an instant takes the current local time of day on that day.
/// A day with an instant must be that instant's local day.
fn stamp(
    app_state: &AppState,
    date: Option<NaiveDate>,
    at: Option<DateTime<Utc>>,
) -> Result<Stamp, (StatusCode, String)> {
    let zone = app_state.time_zone();
    match (date, at) {
        (Some(date), Some(at)) => Stamp::checked_on_day(date, at, &zone).ok_or_else(|| {
            bad_request(format!("{} is not on {} in {}", at.to_rfc3339(), date, zone))
        }),
        (Some(date), None) => Stamp::on_day_at_time_of(date, Utc::now(), &zone)
            .ok_or_else(|| bad_request(format!("No local time exists on {}", date))),
        (None, at) => Ok(Stamp::in_zone(at.unwrap_or_else(Utc::now), &zone)),
    }
}

fn to_responses(entries: Vec<TimeEntry>) -> Json<Vec<TimeEntryResponse>> {
    Json(entries.into_iter().map(TimeEntryResponse::from).collect())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// List the sessions started on one day, sorted by start time.
#[utoipa::path(
    get,
    path = "/times",
    params(DayQuery, ("x-user-id" = String, Header, description = "The id of the user.")),
    responses((status = 200, description = "Sessions of the day", body = [TimeEntryResponse]))
)]
pub async fn list_day_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Vec<TimeEntryResponse>>, (StatusCode, String)> {
    let day = query.date.unwrap_or_else(|| app_state.today());
    let entries = app_state
        .times
        .list_time_entries_for_day(&user_id, day)
        .await
        .map_err(|e| port_error("list times", e))?;
    Ok(to_responses(entries))
}

/// List the sessions started within an inclusive range of days, sorted by start time.
#[utoipa::path(
    get,
    path = "/times/range",
    params(RangeQuery, ("x-user-id" = String, Header, description = "The id of the user.")),
    responses(
        (status = 200, description = "Sessions in range", body = [TimeEntryResponse]),
        (status = 400, description = "start is after end")
    )
)]
pub async fn list_range_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<TimeEntryResponse>>, (StatusCode, String)> {
    let range = query.to_range()?;
    let entries = app_state
        .times
        .list_time_entries_in_range(&user_id, range)
        .await
        .map_err(|e| port_error("list times", e))?;
    Ok(to_responses(entries))
}

/// Start a new session.
#[utoipa::path(
    post,
    path = "/times",
    request_body = StartTimeRequest,
    params(("x-user-id" = String, Header, description = "The id of the user.")),
    responses(
        (status = 201, description = "Session started", body = CreatedResponse),
        (status = 400, description = "date is not the local day of start_time"),
        (status = 404, description = "No such group for this user")
    )
)]
pub async fn start_time_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(req): Json<StartTimeRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let start = stamp(&app_state, req.date, req.start_time)?;
    let id = app_state
        .times
        .create_time_entry(&user_id, req.group_id, start)
        .await
        .map_err(|e| port_error("start time", e))?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Replace the description and time range of a session.
#[utoipa::path(
    put,
    path = "/times/{id}",
    request_body = EditTimeRequest,
    params(
        ("id" = Uuid, Path, description = "The session id."),
        ("x-user-id" = String, Header, description = "The id of the user.")
    ),
    responses(
        (status = 204, description = "Session updated"),
        (status = 400, description = "End precedes start"),
        (status = 404, description = "No such session for this user")
    )
)]
pub async fn edit_time_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditTimeRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    if matches!(req.end_time, Some(end) if end < req.start_time) {
        return Err(bad_request("end_time must not precede start_time"));
    }

    let zone = app_state.time_zone();
    let start = Stamp::in_zone(req.start_time, &zone);
    let end = req.end_time.map(|end| Stamp::in_zone(end, &zone));
    app_state
        .times
        .update_time_entry(&user_id, id, &req.description, start, end)
        .await
        .map_err(|e| port_error("edit time", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Close a running session.
#[utoipa::path(
    post,
    path = "/times/{id}/end",
    request_body = EndTimeRequest,
    params(
        ("id" = Uuid, Path, description = "The session id."),
        ("x-user-id" = String, Header, description = "The id of the user.")
    ),
    responses(
        (status = 204, description = "Session ended"),
        (status = 400, description = "End precedes start, or date is not the local day of end_time"),
        (status = 404, description = "No such session for this user")
    )
)]
pub async fn end_time_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, String)> {
    // The body is optional; an empty one ends the session now.
    let req: EndTimeRequest = if body.is_empty() {
        EndTimeRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| bad_request(format!("Invalid body: {}", e)))?
    };
    let end = stamp(&app_state, req.date, req.end_time)?;
    app_state
        .times
        .end_time_entry(&user_id, id, end)
        .await
        .map_err(|e| port_error("end time", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a session.
#[utoipa::path(
    delete,
    path = "/times/{id}",
    params(
        ("id" = Uuid, Path, description = "The session id."),
        ("x-user-id" = String, Header, description = "The id of the user.")
    ),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "No such session for this user")
    )
)]
pub async fn delete_time_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    app_state
        .times
        .delete_time_entry(&user_id, id)
        .await
        .map_err(|e| port_error("delete time", e))?;
    Ok(StatusCode::NO_CONTENT)
}
