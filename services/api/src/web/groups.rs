//! services/api/src/web/groups.rs
//!
//! Handlers for the groups time is logged against.

use crate::web::middleware::UserId;
use crate::web::rest::{bad_request, port_error};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use saily_core::domain::Group;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
}

/// The id of a freshly created record.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub active: bool,
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            active: group.is_active(),
            name: group.name,
            created_at: group.created_at,
            deactivated_at: group.deactivated_at,
        }
    }
}

/// List the caller's groups, sorted by name.
#[utoipa::path(
    get,
    path = "/groups",
    responses(
        (status = 200, description = "Groups of the user", body = [GroupResponse]),
        (status = 401, description = "Missing x-user-id header")
    ),
    params(("x-user-id" = String, Header, description = "The id of the user."))
)]
pub async fn list_groups_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<Vec<GroupResponse>>, (StatusCode, String)> {
    let groups = app_state
        .groups
        .list_groups(&user_id)
        .await
        .map_err(|e| port_error("list groups", e))?;
    Ok(Json(groups.into_iter().map(GroupResponse::from).collect()))
}

/// Create a new, active group.
#[utoipa::path(
    post,
    path = "/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = CreatedResponse),
        (status = 400, description = "Blank name")
    ),
    params(("x-user-id" = String, Header, description = "The id of the user."))
)]
pub async fn create_group_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(bad_request("Group name must not be empty"));
    }

    let id = app_state
        .groups
        .create_group(&user_id, name, Utc::now())
        .await
        .map_err(|e| port_error("create group", e))?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Soft-delete a group.
#[utoipa::path(
    post,
    path = "/groups/{id}/deactivate",
    responses(
        (status = 204, description = "Group deactivated"),
        (status = 404, description = "No such group for this user")
    ),
    params(
        ("id" = Uuid, Path, description = "The group id."),
        ("x-user-id" = String, Header, description = "The id of the user.")
    )
)]
pub async fn deactivate_group_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    app_state
        .groups
        .deactivate_group(&user_id, id, Utc::now())
        .await
        .map_err(|e| port_error("deactivate group", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Undo a soft-delete.
#[utoipa::path(
    post,
    path = "/groups/{id}/reactivate",
    responses(
        (status = 204, description = "Group reactivated"),
        (status = 404, description = "No such group for this user")
    ),
    params(
        ("id" = Uuid, Path, description = "The group id."),
        ("x-user-id" = String, Header, description = "The id of the user.")
    )
)]
pub async fn reactivate_group_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    app_state
        .groups
        .reactivate_group(&user_id, id)
        .await
        .map_err(|e| port_error("reactivate group", e))?;
    Ok(StatusCode::NO_CONTENT)
}
