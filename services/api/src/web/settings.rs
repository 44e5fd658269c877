//! services/api/src/web/settings.rs
//!
//! Handlers for per-user settings.

use crate::web::middleware::UserId;
use crate::web::rest::{bad_request, port_error};
use crate::web::state::AppState;
use axum::{extract::State, http::StatusCode, response::Json, Extension};
use saily_core::domain::{Theme, UserSettings};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ThemeRequest {
    /// `light`, `dark` or `system`.
    pub theme: String,
}

impl ThemeRequest {
    fn parse(&self) -> Result<Theme, (StatusCode, String)> {
        self.theme.parse::<Theme>().map_err(bad_request)
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SettingsResponse {
    pub user_id: String,
    pub theme: String,
}

impl From<UserSettings> for SettingsResponse {
    fn from(settings: UserSettings) -> Self {
        Self {
            user_id: settings.owner_id,
            theme: settings.theme.to_string(),
        }
    }
}

/// Read the caller's settings.
#[utoipa::path(
    get,
    path = "/settings",
    params(("x-user-id" = String, Header, description = "The id of the user.")),
    responses(
        (status = 200, description = "Current settings", body = SettingsResponse),
        (status = 404, description = "No settings stored yet")
    )
)]
pub async fn get_settings_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<SettingsResponse>, (StatusCode, String)> {
    let settings = app_state
        .settings
        .get_settings(&user_id)
        .await
        .map_err(|e| port_error("read settings", e))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "No settings stored".to_string()))?;
    Ok(Json(settings.into()))
}

/// Create the caller's settings, replacing any existing record.
#[utoipa::path(
    post,
    path = "/settings",
    request_body = ThemeRequest,
    params(("x-user-id" = String, Header, description = "The id of the user.")),
    responses(
        (status = 200, description = "Settings written", body = SettingsResponse),
        (status = 400, description = "Unknown theme")
    )
)]
pub async fn write_settings_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(req): Json<ThemeRequest>,
) -> Result<Json<SettingsResponse>, (StatusCode, String)> {
    let theme = req.parse()?;
    app_state
        .settings
        .write_settings(&user_id, theme)
        .await
        .map_err(|e| port_error("write settings", e))?;
    Ok(Json(SettingsResponse {
        user_id,
        theme: theme.to_string(),
    }))
}

/// Change the theme of existing settings.
#[utoipa::path(
    patch,
    path = "/settings",
    request_body = ThemeRequest,
    params(("x-user-id" = String, Header, description = "The id of the user.")),
    responses(
        (status = 200, description = "Settings updated", body = SettingsResponse),
        (status = 400, description = "Unknown theme"),
        (status = 404, description = "No settings stored yet")
    )
)]
pub async fn update_settings_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(req): Json<ThemeRequest>,
) -> Result<Json<SettingsResponse>, (StatusCode, String)> {
    let theme = req.parse()?;
    app_state
        .settings
        .update_theme(&user_id, theme)
        .await
        .map_err(|e| port_error("update settings", e))?;
    Ok(Json(SettingsResponse {
        user_id,
        theme: theme.to_string(),
    }))
}
