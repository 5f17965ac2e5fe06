//! In-memory channel store

use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use tokio::sync::RwLock;

use super::{window, ChannelStore, StoreError};
use crate::models::ChannelRecord;
use crate::services::query::{sort_by_name, ChannelFilter};

/// Channel store backed by a vector kept in source order
#[derive(Default)]
pub struct MemoryChannelStore {
    channels: RwLock<Vec<ChannelRecord>>,
}

impl MemoryChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the channels matching `filter`, ordered by name
    async fn select(&self, filter: &ChannelFilter) -> Vec<ChannelRecord> {
        let channels = self.channels.read().await;
        let mut selected: Vec<ChannelRecord> = channels
            .iter()
            .filter(|c| filter.matches(*c))
            .cloned()
            .collect();
        sort_by_name(&mut selected);
        selected
    }
}

#[async_trait]
impl ChannelStore for MemoryChannelStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn store_all(&self, channels: &[ChannelRecord]) -> Result<usize, StoreError> {
        let mut seen = HashSet::with_capacity(channels.len());
        let unique: Vec<ChannelRecord> = channels
            .iter()
            .filter(|c| seen.insert(c.id.as_str()))
            .cloned()
            .collect();

        let stored = unique.len();
        *self.channels.write().await = unique;
        Ok(stored)
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        let mut channels = self.channels.write().await;
        let removed = channels.len();
        channels.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.channels.read().await.len())
    }

    async fn get_all(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<ChannelRecord>, StoreError> {
        let all = self.select(&ChannelFilter::new()).await;
        Ok(window(all, limit, offset))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<ChannelRecord>, StoreError> {
        let channels = self.channels.read().await;
        Ok(channels.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_country(&self, country_code: &str) -> Result<Vec<ChannelRecord>, StoreError> {
        let wanted = country_code.to_lowercase();
        let channels = self.channels.read().await;
        let mut selected: Vec<ChannelRecord> = channels
            .iter()
            .filter(|c| c.country_code.to_lowercase() == wanted)
            .cloned()
            .collect();
        sort_by_name(&mut selected);
        Ok(selected)
    }

    async fn search(&self, query: &str) -> Result<Vec<ChannelRecord>, StoreError> {
        Ok(self.select(&ChannelFilter::new().search(Some(query))).await)
    }

    async fn countries(&self) -> Result<Vec<String>, StoreError> {
        let channels = self.channels.read().await;
        let codes: BTreeSet<&str> = channels
            .iter()
            .map(|c| c.country_code.as_str())
            .filter(|code| !code.is_empty())
            .collect();
        Ok(codes.into_iter().map(str::to_string).collect())
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let channels = self.channels.read().await;
        let categories: BTreeSet<&str> = channels
            .iter()
            .flat_map(|c| c.categories.iter().map(String::as_str))
            .filter(|category| !category.is_empty())
            .collect();
        Ok(categories.into_iter().map(str::to_string).collect())
    }
}
