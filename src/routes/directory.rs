//! Reference directory endpoints (`/api/countries`, `/api/categories`, `/api/channels/...`)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::{api_error, ApiError};
use crate::models::{
    CollectionResponse, CountryNameQuery, DirectoryChannel, DirectoryChannelDetail, ListQuery,
    ListResponse,
};
use crate::services::metrics;
use crate::services::query::{ChannelFilter, Page, PageRequest};
use crate::AppState;

fn page_request(state: &AppState, query: &ListQuery) -> PageRequest {
    query.page_request(state.config.default_page_size, state.config.max_page_size)
}

fn run(
    state: &AppState,
    filter: &ChannelFilter,
    request: PageRequest,
) -> ListResponse<DirectoryChannel> {
    metrics::record_query("directory");
    ListResponse::from(state.directory.query(filter, request))
}

/// GET /api/countries
pub async fn list_countries(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(CollectionResponse::new(state.directory.countries().to_vec()))
}

/// GET /api/categories
pub async fn list_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(CollectionResponse::new(state.directory.categories().to_vec()))
}

/// GET /api/channels?page&limit&country&category&q
pub async fn list_channels(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let request = page_request(&state, &query);
    Json(run(&state, &query.filter(), request))
}

/// GET /api/channels/search?q=
pub async fn search_channels(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let q = match query.q.as_deref() {
        Some(q) if !q.trim().is_empty() => q.to_string(),
        _ => return Err(api_error(StatusCode::BAD_REQUEST, "Search query is required")),
    };

    let request = page_request(&state, &query);
    let filter = ChannelFilter::new().search(Some(&q));
    Ok(Json(run(&state, &filter, request).with("query", q)))
}

/// GET /api/channels/country/:code
pub async fn channels_by_country(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let request = page_request(&state, &query);
    let filter = ChannelFilter::new().country(Some(&code));

    let country_name = state
        .directory
        .country_by_code(&code)
        .map(|c| Value::from(c.name.clone()))
        .unwrap_or(Value::Null);

    Json(
        run(&state, &filter, request)
            .with("countryCode", code)
            .with("countryName", country_name),
    )
}

/// GET /api/channels/country-name?name=
///
/// Unknown country names answer with an empty page.
pub async fn channels_by_country_name(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryNameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let name = match query.name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => return Err(api_error(StatusCode::BAD_REQUEST, "Country name is required")),
    };

    let request = PageRequest::from_params(
        query.page.as_deref(),
        query.limit.as_deref(),
        state.config.default_page_size,
    )
    .with_max_limit(state.config.max_page_size);

    let country_code = state
        .directory
        .country_by_name(&name)
        .map(|c| c.code.clone());

    let response = match &country_code {
        Some(code) => run(&state, &ChannelFilter::new().country(Some(code)), request),
        None => ListResponse::from(Page::from_sorted(Vec::new(), request)),
    };

    let code = country_code.map(Value::from).unwrap_or(Value::Null);
    Ok(Json(response.with("countryName", name).with("countryCode", code)))
}

/// GET /api/channels/category/:id
pub async fn channels_by_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let request = page_request(&state, &query);
    let filter = ChannelFilter::new().category(Some(&id));

    let category_name = state
        .directory
        .category_by_id(&id)
        .map(|c| Value::from(c.name.clone()))
        .unwrap_or(Value::Null);

    Json(
        run(&state, &filter, request)
            .with("categoryId", id)
            .with("categoryName", category_name),
    )
}

/// GET /api/channels/:id - channel details with feeds
pub async fn get_channel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let channel = state
        .directory
        .channel_by_id(&id)
        .cloned()
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Channel not found"))?;

    let detail = DirectoryChannelDetail {
        feeds: state.directory.feeds_by_channel(&id),
        channel,
    };

    Ok(Json(json!({ "success": true, "data": detail })))
}

/// GET /api/channels/:id/feeds
pub async fn channel_feeds(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let feeds = state.directory.feeds_by_channel(&id);

    Json(json!({
        "success": true,
        "channelId": id,
        "count": feeds.len(),
        "data": feeds,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get, test_state};
    use crate::routes::router;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_countries_and_categories() {
        let app = router(test_state().await);

        let (status, body) = get(app.clone(), "/api/countries").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);
        assert_eq!(body["data"][0]["code"], "FR");

        let (_, body) = get(app, "/api/categories").await;
        assert_eq!(body["data"][0]["id"], "general");
    }

    #[tokio::test]
    async fn test_list_channels_paginates_and_filters() {
        let app = router(test_state().await);

        let (status, body) = get(app.clone(), "/api/channels?page=2&limit=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 4);
        assert_eq!(body["pagination"]["pages"], 2);
        assert_eq!(body["pagination"]["hasMore"], false);
        assert_eq!(body["count"], 1);

        let (_, body) = get(app.clone(), "/api/channels?country=us&category=news").await;
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["data"][0]["id"], "cnn.us");

        // Garbage paging falls back to defaults
        let (status, body) = get(app, "/api/channels?page=abc&limit=-4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["page"], 1);
        assert_eq!(body["pagination"]["limit"], 50);
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let app = router(test_state().await);

        let (status, body) = get(app.clone(), "/api/channels/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = get(app, "/api/channels/search?q=bbc1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "bbc1");
        assert_eq!(body["data"][0]["id"], "bbc.uk");
    }

    #[tokio::test]
    async fn test_country_and_category_routes() {
        let app = router(test_state().await);

        let (_, body) = get(app.clone(), "/api/channels/country/us").await;
        assert_eq!(body["countryCode"], "us");
        assert_eq!(body["countryName"], "United States");
        assert_eq!(body["pagination"]["total"], 3);

        let (_, body) = get(app.clone(), "/api/channels/country-name?name=United%20Kingdom").await;
        assert_eq!(body["countryCode"], "GB");
        assert_eq!(body["data"][0]["id"], "bbc.uk");

        let (status, body) = get(app.clone(), "/api/channels/country-name?name=Atlantis").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["countryCode"], serde_json::Value::Null);
        assert_eq!(body["pagination"]["total"], 0);

        let (status, _) = get(app.clone(), "/api/channels/country-name").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = get(app, "/api/channels/category/news").await;
        assert_eq!(body["categoryName"], "News");
        assert_eq!(body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn test_channel_detail_and_feeds() {
        let app = router(test_state().await);

        let (status, body) = get(app.clone(), "/api/channels/bbc.uk").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "BBC One");
        assert_eq!(body["data"]["feeds"].as_array().unwrap().len(), 2);

        let (status, body) = get(app.clone(), "/api/channels/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Channel not found");

        let (_, body) = get(app, "/api/channels/cnn.us/feeds").await;
        assert_eq!(body["channelId"], "cnn.us");
        assert_eq!(body["count"], 1);
    }
}
