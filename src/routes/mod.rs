pub mod admin;
pub mod directory;
pub mod health;
pub mod streams;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::AppState;

/// Error half of every handler result: status plus `{ success: false, error }`
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(serde_json::json!({ "success": false, "error": message })),
    )
}

/// Error with the underlying cause attached as `details`
pub fn api_error_details(status: StatusCode, message: &str, details: impl ToString) -> ApiError {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "error": message,
            "details": details.to_string(),
        })),
    )
}

/// All API routes, without middleware
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(health::root))
        .route("/api", get(health::api_index))
        .route("/api/health", get(health::api_health))
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/ready", get(health::ready))
        .route("/live", get(health::live))
        // Reference directory
        .route("/api/countries", get(directory::list_countries))
        .route("/api/categories", get(directory::list_categories))
        .route("/api/channels", get(directory::list_channels))
        .route("/api/channels/search", get(directory::search_channels))
        .route(
            "/api/channels/country-name",
            get(directory::channels_by_country_name),
        )
        .route(
            "/api/channels/country/:code",
            get(directory::channels_by_country),
        )
        .route(
            "/api/channels/category/:id",
            get(directory::channels_by_category),
        )
        .route("/api/channels/:id", get(directory::get_channel))
        .route("/api/channels/:id/feeds", get(directory::channel_feeds))
        // Parsed playlist streams
        .route("/api/streams", get(streams::list_streams))
        .route("/api/streams/search", get(streams::search_streams))
        .route("/api/streams/countries", get(streams::stream_countries))
        .route("/api/streams/categories", get(streams::stream_categories))
        .route("/api/streams/:id", get(streams::get_stream))
        // Admin endpoints (protected by ADMIN_KEY)
        .route("/api/admin/streams/reload", post(admin::reload_streams))
        .route("/api/admin/stats", get(admin::get_stats))
        .with_state(state)
}
