//! Parsed playlist endpoints (`/api/streams/...`), served from the channel store

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use super::{api_error, api_error_details, ApiError};
use crate::models::{CollectionResponse, ListQuery, ListResponse};
use crate::services::metrics;
use crate::services::query::ChannelFilter;
use crate::services::store::{query_store, StoreError};
use crate::AppState;

fn store_error(message: &str, e: StoreError) -> ApiError {
    tracing::error!("{}: {}", message, e);
    api_error_details(StatusCode::INTERNAL_SERVER_ERROR, message, e)
}

/// GET /api/streams?page&limit&country&category&q
pub async fn list_streams(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request = query.page_request(state.config.default_page_size, state.config.max_page_size);
    let filter = query.filter();
    let backend = state.store.backend();

    metrics::record_query(backend);
    let page = query_store(state.store.as_ref(), &filter, request)
        .await
        .map_err(|e| store_error("Failed to fetch streams from database", e))?;

    let filters = json!({
        "country": filter.country_value(),
        "category": filter.category_value(),
        "q": filter.search_value(),
    });

    Ok(Json(
        ListResponse::from(page)
            .with("source", backend)
            .with("filters", filters),
    ))
}

/// GET /api/streams/search?q=
pub async fn search_streams(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let q = match query.q.as_deref() {
        Some(q) if !q.trim().is_empty() => q.to_string(),
        _ => return Err(api_error(StatusCode::BAD_REQUEST, "Search query is required")),
    };

    let request = query.page_request(state.config.default_page_size, state.config.max_page_size);
    let backend = state.store.backend();

    metrics::record_query(backend);
    let page = query_store(
        state.store.as_ref(),
        &ChannelFilter::new().search(Some(&q)),
        request,
    )
    .await
    .map_err(|e| store_error("Failed to search streams", e))?;

    Ok(Json(
        ListResponse::from(page)
            .with("source", backend)
            .with("query", q),
    ))
}

/// GET /api/streams/countries - distinct country codes of parsed streams
pub async fn stream_countries(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let countries = state
        .store
        .countries()
        .await
        .map_err(|e| store_error("Failed to fetch stream countries", e))?;

    Ok(Json(CollectionResponse::new(countries)))
}

/// GET /api/streams/categories - distinct categories of parsed streams
pub async fn stream_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .store
        .categories()
        .await
        .map_err(|e| store_error("Failed to fetch stream categories", e))?;

    Ok(Json(CollectionResponse::new(categories)))
}

/// GET /api/streams/:id
pub async fn get_stream(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let stream = state
        .store
        .get_by_id(&id)
        .await
        .map_err(|e| store_error("Failed to fetch stream", e))?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Stream not found"))?;

    Ok(Json(json!({ "success": true, "data": stream })))
}
