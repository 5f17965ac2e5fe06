mod config;
mod db;
mod models;
mod routes;
mod services;

use anyhow::Context;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, StoreBackend};
use crate::db::{create_pool, run_migrations};
use crate::services::{
    ingest::{build_http_client, ingest_if_empty, PlaylistSource},
    reference_data::ReferenceSnapshot,
    store::{ChannelStore, MemoryChannelStore, SqliteChannelStore},
};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    /// Present only for the SQLite backend
    pub pool: Option<SqlitePool>,
    pub store: Arc<dyn ChannelStore>,
    pub directory: Arc<ReferenceSnapshot>,
    pub http: reqwest::Client,
    pub playlist_source: PlaylistSource,
    pub start_time: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "world_tv=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting World TV v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app_env);

    // Channel store
    let (pool, store) = match config.store_backend {
        StoreBackend::Sqlite => {
            let pool = create_pool(&config)
                .await
                .context("failed to open SQLite database")?;
            run_migrations(&pool)
                .await
                .context("failed to run database migrations")?;
            let store: Arc<dyn ChannelStore> = Arc::new(SqliteChannelStore::new(pool.clone()));
            (Some(pool), store)
        }
        StoreBackend::Memory => {
            let store: Arc<dyn ChannelStore> = Arc::new(MemoryChannelStore::new());
            (None, store)
        }
    };
    tracing::info!("Channel store ready: {}", config.store_backend.as_str());

    let http = build_http_client(&config.user_agent, config.fetch_timeout_ms)
        .context("failed to create HTTP client")?;

    // Load the playlist once; an existing store is left as is
    let playlist_source = PlaylistSource::parse(&config.playlist_source);
    if let Err(e) = ingest_if_empty(store.as_ref(), &http, &playlist_source).await {
        tracing::warn!("Playlist ingest failed, streams will be empty: {}", e);
    }

    // Reference directory (blocking CSV reads)
    let reference_dir = PathBuf::from(&config.reference_data_dir);
    let directory = tokio::task::spawn_blocking(move || ReferenceSnapshot::load(&reference_dir))
        .await
        .context("reference data loader panicked")?
        .unwrap_or_else(|e| {
            tracing::warn!("Reference data unavailable, directory endpoints will be empty: {}", e);
            ReferenceSnapshot::empty()
        });

    let static_dir = config.static_dir.clone();

    // Build application state
    let state = Arc::new(AppState {
        config,
        pool,
        store,
        directory: Arc::new(directory),
        http,
        playlist_source,
        start_time: Instant::now(),
    });

    // Build router
    let mut app = routes::router(state);

    // Pre-built SPA, with index.html for client-side routes
    if let Some(dir) = static_dir {
        tracing::info!("Serving static files from {}", dir);
        let index = PathBuf::from(&dir).join("index.html");
        app = app.fallback_service(ServeDir::new(&dir).fallback(ServeFile::new(index)));
    }

    let app = app
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down server...");
}
