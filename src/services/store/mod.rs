//! Channel storage
//!
//! [`ChannelStore`] is the storage capability the query engine runs against.
//! Two backends implement it with the same observable behaviour:
//!
//! - [`MemoryChannelStore`]: a vector behind a tokio `RwLock`
//! - [`SqliteChannelStore`]: the `channels` table through sqlx
//!
//! Every listing a store returns is ordered by display name (case-insensitive,
//! ties in source order), so callers never depend on the backend.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ChannelRecord;
use crate::services::query::{run_query, ChannelFilter, Page, PageRequest};

pub use memory::MemoryChannelStore;
pub use sqlite::SqliteChannelStore;

/// Storage errors, propagated to callers untouched
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid categories column for channel {id}: {source}")]
    Categories {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Persistent or in-memory collection of parsed channels
#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// Backend name for logs and API responses
    fn backend(&self) -> &'static str;

    /// Replace the contents with `channels`, ignoring duplicate ids
    ///
    /// Returns how many channels were stored.
    async fn store_all(&self, channels: &[ChannelRecord]) -> Result<usize, StoreError>;

    /// Remove every channel, returning how many were removed
    async fn clear(&self) -> Result<usize, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    async fn has_channels(&self) -> Result<bool, StoreError> {
        Ok(self.count().await? > 0)
    }

    /// Bulk load only when the store is empty
    ///
    /// Returns `None` when the store already held channels; nothing is
    /// written in that case.
    async fn store_if_empty(&self, channels: &[ChannelRecord]) -> Result<Option<usize>, StoreError> {
        if self.has_channels().await? {
            return Ok(None);
        }
        self.store_all(channels).await.map(Some)
    }

    /// All channels ordered by name, optionally windowed
    async fn get_all(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<ChannelRecord>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<ChannelRecord>, StoreError>;

    /// Channels of a country (case-insensitive), ordered by name
    async fn find_by_country(&self, country_code: &str) -> Result<Vec<ChannelRecord>, StoreError>;

    /// Channels matching a free-text query, ordered by name
    async fn search(&self, query: &str) -> Result<Vec<ChannelRecord>, StoreError>;

    /// Distinct non-empty country codes, sorted
    async fn countries(&self) -> Result<Vec<String>, StoreError>;

    /// Distinct non-empty categories, sorted
    async fn categories(&self) -> Result<Vec<String>, StoreError>;
}

/// Window an already ordered listing
pub(crate) fn window<T>(items: Vec<T>, limit: Option<usize>, offset: Option<usize>) -> Vec<T> {
    let offset = offset.unwrap_or(0);
    match limit {
        Some(limit) => items.into_iter().skip(offset).take(limit).collect(),
        None => items.into_iter().skip(offset).collect(),
    }
}

/// Run a filtered, paginated query against a store
///
/// The most selective predicate is pushed down to the store to fetch
/// candidates; the full filter, ordering and pagination then run in the
/// shared engine.
pub async fn query_store(
    store: &dyn ChannelStore,
    filter: &ChannelFilter,
    request: PageRequest,
) -> Result<Page<ChannelRecord>, StoreError> {
    let candidates = if let Some(country) = filter.country_value() {
        store.find_by_country(country).await?
    } else if let Some(search) = filter.search_value() {
        store.search(search).await?
    } else {
        store.get_all(None, None).await?
    };

    Ok(run_query(&candidates, filter, request))
}
