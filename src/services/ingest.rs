//! Playlist ingestion: read the source, parse it, load it into a store

use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::models::ChannelRecord;
use crate::services::m3u_parser::parse_playlist_with_stats;
use crate::services::metrics;
use crate::services::store::{ChannelStore, StoreError};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("playlist file not found: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("failed to read playlist {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch playlist {url}: {source}")]
    Fetch {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("playlist {url} returned HTTP {status}")]
    HttpStatus { url: Url, status: reqwest::StatusCode },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where the playlist text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistSource {
    File(PathBuf),
    Remote(Url),
}

impl PlaylistSource {
    /// `http(s)://` values are remote, anything else is a local path
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            _ => Self::File(PathBuf::from(raw)),
        }
    }
}

impl fmt::Display for PlaylistSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Counts reported by one ingest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Records produced by the parser, duplicates included
    pub parsed: usize,
    /// Entries the parser dropped
    pub skipped: usize,
    /// Records written to the store
    pub stored: usize,
}

/// HTTP client for remote playlists
pub fn build_http_client(user_agent: &str, timeout_ms: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_millis(timeout_ms))
        .gzip(true)
        .build()
}

/// Read the whole playlist text
pub async fn read_source(client: &Client, source: &PlaylistSource) -> Result<String, IngestError> {
    match source {
        PlaylistSource::File(path) => match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(IngestError::MissingSource(path.clone()))
            }
            Err(source) => Err(IngestError::Io {
                path: path.clone(),
                source,
            }),
        },
        PlaylistSource::Remote(url) => {
            let fetch_err = |source| IngestError::Fetch {
                url: url.clone(),
                source,
            };

            let resp = client.get(url.clone()).send().await.map_err(fetch_err)?;
            let status = resp.status();
            if !status.is_success() {
                return Err(IngestError::HttpStatus {
                    url: url.clone(),
                    status,
                });
            }

            resp.text().await.map_err(fetch_err)
        }
    }
}

/// Parse `text` and hand the records to `load`, recording metrics
async fn ingest_text<F, Fut>(text: &str, load: F) -> Result<(IngestOutcome, bool), IngestError>
where
    F: FnOnce(Vec<ChannelRecord>) -> Fut,
    Fut: std::future::Future<Output = Result<Option<usize>, StoreError>>,
{
    let parsed = parse_playlist_with_stats(text);
    let parsed_count = parsed.channels.len();
    let skipped = parsed.skipped;
    metrics::record_parse(parsed_count, skipped);

    if skipped > 0 {
        tracing::warn!("Skipped {} malformed playlist entries", skipped);
    }

    let stored = load(parsed.channels).await?;
    Ok((
        IngestOutcome {
            parsed: parsed_count,
            skipped,
            stored: stored.unwrap_or(0),
        },
        stored.is_some(),
    ))
}

/// Load the playlist into `store` unless it already holds channels
///
/// Returns `None` when the store was already populated; the source is not
/// read in that case.
pub async fn ingest_if_empty(
    store: &dyn ChannelStore,
    client: &Client,
    source: &PlaylistSource,
) -> Result<Option<IngestOutcome>, IngestError> {
    if store.has_channels().await? {
        tracing::info!(
            backend = store.backend(),
            "Channel store already populated, skipping playlist ingest"
        );
        return Ok(None);
    }

    let text = read_source(client, source).await?;
    let (outcome, loaded) = ingest_text(&text, |channels| async move {
        store.store_if_empty(&channels).await
    })
    .await?;

    if !loaded {
        return Ok(None);
    }

    tracing::info!(
        backend = store.backend(),
        parsed = outcome.parsed,
        skipped = outcome.skipped,
        stored = outcome.stored,
        "Playlist ingested from {}",
        source
    );

    Ok(Some(outcome))
}

/// Replace the store contents with a fresh read of the playlist
///
/// The source is read and parsed first, then swapped in by a single
/// `store_all`. A failed read or write leaves the previous contents in place.
pub async fn reload(
    store: &dyn ChannelStore,
    client: &Client,
    source: &PlaylistSource,
) -> Result<IngestOutcome, IngestError> {
    let text = read_source(client, source).await?;

    let (outcome, _) = ingest_text(&text, |channels| async move {
        store.store_all(&channels).await.map(Some)
    })
    .await?;

    tracing::info!(
        backend = store.backend(),
        parsed = outcome.parsed,
        skipped = outcome.skipped,
        stored = outcome.stored,
        "Playlist reloaded from {}",
        source
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::memory_pool;
    use crate::services::store::{MemoryChannelStore, SqliteChannelStore};
    use axum::{http::StatusCode, routing::get, Router};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PLAYLIST: &str = "#EXTM3U\n#EXTM3U x-tvg-url=\"\"\n\n\
#EXTINF:-1 tvg-id=\"abc.us@720p\" tvg-logo=\"http://logo/abc.png\" group-title=\"News\",ABC News\n\
http://streams/abc.m3u8\n\
#EXTINF:-1 tvg-id=\"bbc.uk\" tvg-logo=\"\" group-title=\"General\",BBC One\n\
http://streams/bbc.m3u8\n\
#EXTINF:-1 broken entry\n\
http://streams/broken.m3u8\n";

    fn client() -> Client {
        build_http_client("VLC/3.0.20 LibVLC/3.0.20", 5_000).unwrap()
    }

    fn playlist_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    /// Serve `/index.m3u` on an ephemeral port
    async fn serve_playlist() -> Url {
        let app = Router::new()
            .route("/index.m3u", get(|| async { PLAYLIST }))
            .route("/gone.m3u", get(|| async { (StatusCode::NOT_FOUND, "gone") }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{}/", addr)).unwrap()
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            PlaylistSource::parse("data/streams/index.m3u"),
            PlaylistSource::File(PathBuf::from("data/streams/index.m3u"))
        );
        assert!(matches!(
            PlaylistSource::parse("https://iptv-org.github.io/iptv/index.m3u"),
            PlaylistSource::Remote(_)
        ));
        assert!(matches!(
            PlaylistSource::parse("ftp://host/list.m3u"),
            PlaylistSource::File(_)
        ));
    }

    #[tokio::test]
    async fn test_ingest_if_empty_from_file() {
        let file = playlist_file(PLAYLIST);
        let source = PlaylistSource::File(file.path().to_path_buf());
        let store = MemoryChannelStore::new();

        let outcome = ingest_if_empty(&store, &client(), &source).await.unwrap().unwrap();
        assert_eq!(
            outcome,
            IngestOutcome {
                parsed: 2,
                skipped: 1,
                stored: 2
            }
        );

        // Second run leaves the store alone
        assert!(ingest_if_empty(&store, &client(), &source).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 2);

        let abc = store.get_by_id("abc.us@720p").await.unwrap().unwrap();
        assert_eq!(abc.country_code, "us");
        assert_eq!(abc.quality, "720p");
    }

    #[tokio::test]
    async fn test_missing_file_stores_nothing() {
        let store = MemoryChannelStore::new();
        let source = PlaylistSource::File(PathBuf::from("/nonexistent/index.m3u"));

        let err = ingest_if_empty(&store, &client(), &source).await.unwrap_err();
        assert!(matches!(err, IngestError::MissingSource(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reload_replaces_contents() {
        let store = MemoryChannelStore::new();
        let first = playlist_file(PLAYLIST);
        ingest_if_empty(&store, &client(), &PlaylistSource::File(first.path().to_path_buf()))
            .await
            .unwrap();

        let second = playlist_file(
            "H1\nH2\nH3\n#EXTINF:-1 tvg-id=\"cnn.us\" tvg-logo=\"\" group-title=\"News\",CNN\nhttp://cnn\n",
        );
        let outcome = reload(&store, &client(), &PlaylistSource::File(second.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(outcome.stored, 1);
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.get_by_id("cnn.us").await.unwrap().is_some());

        // Failed read keeps what is there
        let missing = PlaylistSource::File(PathBuf::from("/nonexistent/index.m3u"));
        assert!(reload(&store, &client(), &missing).await.is_err());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reload_write_failure_keeps_contents() {
        let pool = memory_pool().await;
        let store = SqliteChannelStore::new(pool.clone());
        let first = playlist_file(PLAYLIST);
        ingest_if_empty(&store, &client(), &PlaylistSource::File(first.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 2);

        sqlx::query(
            "CREATE TRIGGER reject_insert BEFORE INSERT ON channels \
             BEGIN SELECT RAISE(ABORT, 'read only'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let second = playlist_file(
            "H1\nH2\nH3\n#EXTINF:-1 tvg-id=\"cnn.us\" tvg-logo=\"\" group-title=\"News\",CNN\nhttp://cnn\n",
        );
        let err = reload(&store, &client(), &PlaylistSource::File(second.path().to_path_buf()))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Store(StoreError::Database(_))));

        assert_eq!(store.count().await.unwrap(), 2);
        assert!(store.get_by_id("abc.us@720p").await.unwrap().is_some());
        assert!(store.get_by_id("cnn.us").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remote_source() {
        let base = serve_playlist().await;
        let store = MemoryChannelStore::new();

        let source = PlaylistSource::Remote(base.join("index.m3u").unwrap());
        let outcome = ingest_if_empty(&store, &client(), &source).await.unwrap().unwrap();
        assert_eq!(outcome.stored, 2);

        let gone = PlaylistSource::Remote(base.join("gone.m3u").unwrap());
        match read_source(&client(), &gone).await {
            Err(IngestError::HttpStatus { status, .. }) => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND)
            }
            other => panic!("expected HTTP status error, got {:?}", other.map(|t| t.len())),
        }
    }
}
