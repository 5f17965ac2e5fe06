use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;

use crate::db;
use crate::AppState;

/// Root endpoint - basic status
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "World TV",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "runtime": "rust",
        "store": state.store.backend(),
    }))
}

/// GET /api/health
pub async fn api_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "World TV API is running",
    }))
}

/// GET /api - endpoint index
pub async fn api_index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let endpoint = |method: &str, path: &str, description: &str| {
        serde_json::json!({ "method": method, "path": path, "description": description })
    };

    Json(serde_json::json!({
        "name": "World TV API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "REST API for browsing and streaming TV channels worldwide",
        "baseUrl": format!("http://localhost:{}", state.config.port),
        "pagination": {
            "page": "Page number, 1-based (default: 1)",
            "limit": format!(
                "Results per page (default: {}, max: {})",
                state.config.default_page_size, state.config.max_page_size
            ),
        },
        "endpoints": {
            "health": endpoint("GET", "/api/health", "Check if API is running"),
            "countries": endpoint("GET", "/api/countries", "All countries, ordered by name"),
            "categories": endpoint("GET", "/api/categories", "All channel categories, ordered by name"),
            "channels": endpoint("GET", "/api/channels", "Paginated channels; filters: country, category, q"),
            "searchChannels": endpoint("GET", "/api/channels/search", "Search channels by name or alternative names (q)"),
            "channelsByCountry": endpoint("GET", "/api/channels/country/:code", "Channels of a country code"),
            "channelsByCountryName": endpoint("GET", "/api/channels/country-name", "Channels of a country name (name)"),
            "channelsByCategory": endpoint("GET", "/api/channels/category/:id", "Channels of a category"),
            "channelById": endpoint("GET", "/api/channels/:id", "Channel details with feeds"),
            "channelFeeds": endpoint("GET", "/api/channels/:id/feeds", "Feeds of a channel"),
            "streams": endpoint("GET", "/api/streams", "Parsed playlist streams; filters: country, category, q"),
            "searchStreams": endpoint("GET", "/api/streams/search", "Search parsed streams (q)"),
            "streamCountries": endpoint("GET", "/api/streams/countries", "Distinct stream country codes"),
            "streamCategories": endpoint("GET", "/api/streams/categories", "Distinct stream categories"),
            "streamById": endpoint("GET", "/api/streams/:id", "Single parsed stream"),
            "reloadStreams": endpoint("POST", "/api/admin/streams/reload", "Clear and re-ingest the playlist (key)"),
            "stats": endpoint("GET", "/api/admin/stats", "Store and directory counts (key)"),
        },
    }))
}

/// Store stats
#[derive(Serialize)]
struct StoreStats {
    backend: &'static str,
    channels: Option<usize>,
}

/// Reference directory stats
#[derive(Serialize)]
struct DirectoryStats {
    channels: usize,
    countries: usize,
    categories: usize,
}

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    uptime: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sqlite: Option<bool>,
    store: StoreStats,
    directory: DirectoryStats,
}

async fn database_ok(state: &AppState) -> bool {
    match &state.pool {
        Some(pool) => db::health_check(pool).await,
        None => true,
    }
}

/// GET /health - Advanced health check
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();

    let sqlite_ok = database_ok(&state).await;
    let channels = state.store.count().await.ok();

    // Store is critical; an empty directory only degrades the API
    let status = if !sqlite_ok || channels.is_none() {
        "unhealthy"
    } else if state.directory.is_empty() {
        "degraded"
    } else {
        "ok"
    };

    Json(HealthResponse {
        status: status.to_string(),
        uptime,
        sqlite: state.pool.as_ref().map(|_| sqlite_ok),
        store: StoreStats {
            backend: state.store.backend(),
            channels,
        },
        directory: DirectoryStats {
            channels: state.directory.channel_count(),
            countries: state.directory.countries().len(),
            categories: state.directory.categories().len(),
        },
    })
}

/// GET /metrics - Prometheus metrics
pub async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                b"Internal Server Error".to_vec(),
            )
        }
    }
}

/// Readiness probe (for Kubernetes)
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if !database_ok(&state).await {
        return (StatusCode::SERVICE_UNAVAILABLE, "not ready - sqlite unavailable");
    }

    match state.store.has_channels().await {
        Ok(true) => (StatusCode::OK, "ready"),
        // Serving works with an empty store, streams just come back empty
        Ok(false) => (StatusCode::OK, "ready (no streams loaded)"),
        Err(e) => {
            tracing::error!("Readiness store check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "not ready - store unavailable")
        }
    }
}

/// Liveness probe (for Kubernetes)
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}
