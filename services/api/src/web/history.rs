//! services/api/src/web/history.rs
//!
//! Aggregated per-day, per-group history.

use crate::web::middleware::UserId;
use crate::web::rest::port_error;
use crate::web::state::AppState;
use crate::web::times::RangeQuery;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use chrono::{NaiveDate, Utc};
use saily_core::history::{daily_totals, DayTotals, GroupTotal};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct GroupTotalResponse {
    pub group_id: Uuid,
    pub group_name: String,
    pub entries: usize,
    pub total_minutes: i64,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DayTotalsResponse {
    pub day: NaiveDate,
    pub total_minutes: i64,
    pub groups: Vec<GroupTotalResponse>,
}

impl From<GroupTotal> for GroupTotalResponse {
    fn from(total: GroupTotal) -> Self {
        Self {
            group_id: total.group_id,
            group_name: total.group_name,
            entries: total.entries,
            total_minutes: total.total.num_minutes(),
        }
    }
}

impl From<DayTotals> for DayTotalsResponse {
    fn from(totals: DayTotals) -> Self {
        Self {
            day: totals.day,
            total_minutes: totals.total.num_minutes(),
            groups: totals.groups.into_iter().map(Into::into).collect(),
        }
    }
}

/// Time spent per day and group within an inclusive range. Running sessions
/// count up to now.
#[utoipa::path(
    get,
    path = "/history",
    params(RangeQuery, ("x-user-id" = String, Header, description = "The id of the user.")),
    responses(
        (status = 200, description = "Daily totals, days ascending", body = [DayTotalsResponse]),
        (status = 400, description = "start is after end")
    )
)]
pub async fn history_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<DayTotalsResponse>>, (StatusCode, String)> {
    let range = query.to_range()?;

    let entries = app_state
        .times
        .list_time_entries_in_range(&user_id, range)
        .await
        .map_err(|e| port_error("list times", e))?;
    let groups = app_state
        .groups
        .list_groups(&user_id)
        .await
        .map_err(|e| port_error("list groups", e))?;

    let totals = daily_totals(&entries, &groups, Some(Utc::now()));
    Ok(Json(totals.into_iter().map(Into::into).collect()))
}
