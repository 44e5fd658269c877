//! services/api/src/web/middleware.rs
//!
//! Owner identification for protected routes.

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};

/// Header carrying the id of the user the request acts for.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The owner id extracted by [`require_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

/// Middleware that reads the owner id from the `x-user-id` header.
///
/// If present, inserts a [`UserId`] into request extensions for handlers to use.
/// If missing or blank, returns 401 Unauthorized.
pub async fn require_user(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    req.extensions_mut().insert(UserId(user_id));

    Ok(next.run(req).await)
}
