pub mod groups;
pub mod history;
pub mod middleware;
pub mod rest;
pub mod settings;
pub mod state;
pub mod summaries;
pub mod summarize;
pub mod times;
pub mod words;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{any, delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

pub use middleware::require_user;
pub use state::AppState;

/// Builds the API router. Routes under the owner header check are nested
/// behind [`require_user`]; the rest are public.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = cors_layer(app_state.config.cors_origin.as_deref());

    // Public routes (no owner required)
    let public_routes = Router::new()
        .route("/health", get(rest::health_handler))
        .route("/summarize", any(summarize::summarize_tasks_handler))
        .route("/word-of-the-day", get(words::latest_word_handler));

    // Protected routes (owner header required)
    let protected_routes = Router::new()
        .route(
            "/groups",
            get(groups::list_groups_handler).post(groups::create_group_handler),
        )
        .route(
            "/groups/{id}/deactivate",
            post(groups::deactivate_group_handler),
        )
        .route(
            "/groups/{id}/reactivate",
            post(groups::reactivate_group_handler),
        )
        .route(
            "/times",
            get(times::list_day_handler).post(times::start_time_handler),
        )
        .route("/times/range", get(times::list_range_handler))
        .route(
            "/times/{id}",
            put(times::edit_time_handler).delete(times::delete_time_handler),
        )
        .route("/times/{id}/end", post(times::end_time_handler))
        .route(
            "/settings",
            get(settings::get_settings_handler)
                .post(settings::write_settings_handler)
                .patch(settings::update_settings_handler),
        )
        .route(
            "/summaries",
            get(summaries::list_summaries_handler).post(summaries::save_summary_handler),
        )
        .route(
            "/summaries/generate",
            post(summaries::generate_summary_handler),
        )
        .route(
            "/summaries/{id}",
            delete(summaries::delete_summary_handler),
        )
        .route("/history", get(history::history_handler))
        .layer(axum_middleware::from_fn(require_user));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state)
}

/// CORS for browser clients. A configured origin is allowed with credentials;
/// without one the request origin is mirrored.
pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static(middleware::USER_ID_HEADER),
        ]);

    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        Some(Err(e)) => {
            warn!("Ignoring invalid CORS_ORIGIN: {}", e);
            base.allow_origin(AllowOrigin::mirror_request())
        }
        None => base.allow_origin(AllowOrigin::mirror_request()),
    }
}
