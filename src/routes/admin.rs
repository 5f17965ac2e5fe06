//! Admin/Management endpoints for the channel store

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::{api_error, api_error_details, ApiError};
use crate::models::AdminQuery;
use crate::services::ingest::{self, IngestError};
use crate::services::store::StoreError;
use crate::AppState;

/// Response for the reload operation
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub success: bool,
    pub message: String,
    pub source: String,
    pub parsed: usize,
    pub skipped: usize,
    pub stored: usize,
}

/// Stats response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub success: bool,
    pub store: StoreCounts,
    pub directory: DirectoryCounts,
    pub generated_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCounts {
    pub backend: &'static str,
    pub channels: usize,
    pub countries: usize,
    pub categories: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryCounts {
    pub channels: usize,
    pub countries: usize,
    pub categories: usize,
}

/// Validate admin key
fn validate_admin_key(state: &AppState, provided_key: Option<&str>) -> Result<(), ApiError> {
    match provided_key {
        Some(key) if key == state.config.admin_key => Ok(()),
        _ => Err(api_error(
            StatusCode::UNAUTHORIZED,
            "Invalid or missing admin key",
        )),
    }
}

/// POST /api/admin/streams/reload - Clear the store and ingest the playlist again
pub async fn reload_streams(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminQuery>,
) -> Result<impl IntoResponse, ApiError> {
    validate_admin_key(&state, query.key.as_deref())?;

    let outcome = ingest::reload(state.store.as_ref(), &state.http, &state.playlist_source)
        .await
        .map_err(|e| {
            tracing::error!("Admin: playlist reload failed: {}", e);
            let status = match &e {
                IngestError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                IngestError::Fetch { .. } | IngestError::HttpStatus { .. } => StatusCode::BAD_GATEWAY,
                IngestError::MissingSource(_) | IngestError::Io { .. } => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            };
            api_error_details(status, "Failed to reload playlist", e)
        })?;

    tracing::info!(
        "Admin: Reloaded {} streams ({} parsed, {} skipped) from {}",
        outcome.stored,
        outcome.parsed,
        outcome.skipped,
        state.playlist_source
    );

    Ok(Json(ReloadResponse {
        success: true,
        message: format!("Reloaded {} streams", outcome.stored),
        source: state.playlist_source.to_string(),
        parsed: outcome.parsed,
        skipped: outcome.skipped,
        stored: outcome.stored,
    }))
}

/// GET /api/admin/stats - Store and directory counts
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminQuery>,
) -> Result<impl IntoResponse, ApiError> {
    validate_admin_key(&state, query.key.as_deref())?;

    let store = state.store.as_ref();
    let counts = async {
        Ok::<_, StoreError>(StoreCounts {
            backend: store.backend(),
            channels: store.count().await?,
            countries: store.countries().await?.len(),
            categories: store.categories().await?.len(),
        })
    }
    .await
    .map_err(|e| {
        tracing::error!("Failed to get store stats: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
    })?;

    Ok(Json(StatsResponse {
        success: true,
        store: counts,
        directory: DirectoryCounts {
            channels: state.directory.channel_count(),
            countries: state.directory.countries().len(),
            categories: state.directory.categories().len(),
        },
        generated_at: chrono::Utc::now().to_rfc3339(),
    }))
}
