//! SQLite-backed channel store
//!
//! SQL narrows the candidates (country, LIKE search); the exact
//! case-insensitive predicate and the name ordering are applied in Rust so
//! results match the in-memory store byte for byte.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::BTreeSet;

use super::{window, ChannelStore, StoreError};
use crate::db::models::decode_categories;
use crate::db::{ChannelRow, NewChannel};
use crate::db::repository::channels;
use crate::models::ChannelRecord;
use crate::services::query::{sort_by_name, ChannelFilter};

/// Channel store on the `channels` table
#[derive(Clone)]
pub struct SqliteChannelStore {
    pool: SqlitePool,
}

impl SqliteChannelStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn into_records(rows: Vec<ChannelRow>) -> Result<Vec<ChannelRecord>, StoreError> {
    rows.into_iter().map(into_record).collect()
}

fn into_record(row: ChannelRow) -> Result<ChannelRecord, StoreError> {
    let id = row.tvg_id.clone();
    row.into_record()
        .map_err(|source| StoreError::Categories { id, source })
}

/// Keep the rows `keep` accepts and order them by name
fn refine(
    rows: Vec<ChannelRow>,
    keep: impl Fn(&ChannelRecord) -> bool,
) -> Result<Vec<ChannelRecord>, StoreError> {
    let mut records: Vec<ChannelRecord> = into_records(rows)?
        .into_iter()
        .filter(|c| keep(c))
        .collect();
    sort_by_name(&mut records);
    Ok(records)
}

#[async_trait]
impl ChannelStore for SqliteChannelStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn store_all(&self, records: &[ChannelRecord]) -> Result<usize, StoreError> {
        let rows = records
            .iter()
            .map(|record| {
                NewChannel::from_record(record).map_err(|source| StoreError::Categories {
                    id: record.id.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let inserted = channels::replace_all(&self.pool, &rows).await?;
        let skipped = rows.len() as u64 - inserted;
        if skipped > 0 {
            tracing::debug!("Skipped {} duplicate channel ids", skipped);
        }

        Ok(inserted as usize)
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        Ok(channels::delete_all(&self.pool).await? as usize)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(channels::count(&self.pool).await? as usize)
    }

    async fn get_all(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<ChannelRecord>, StoreError> {
        let rows = channels::get_all(&self.pool).await?;
        let all = refine(rows, |_| true)?;
        Ok(window(all, limit, offset))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<ChannelRecord>, StoreError> {
        channels::get_by_tvg_id(&self.pool, id)
            .await?
            .map(into_record)
            .transpose()
    }

    async fn find_by_country(&self, country_code: &str) -> Result<Vec<ChannelRecord>, StoreError> {
        // NOCASE only folds ASCII; other codes are matched in Rust on the full table
        let rows = if country_code.is_ascii() {
            channels::find_by_country(&self.pool, country_code).await?
        } else {
            channels::get_all(&self.pool).await?
        };

        let wanted = country_code.to_lowercase();
        refine(rows, |c| c.country_code.to_lowercase() == wanted)
    }

    async fn search(&self, query: &str) -> Result<Vec<ChannelRecord>, StoreError> {
        let rows = if query.is_ascii() {
            channels::search(&self.pool, query).await?
        } else {
            channels::get_all(&self.pool).await?
        };

        let filter = ChannelFilter::new().search(Some(query));
        refine(rows, |c| filter.matches(c))
    }

    async fn countries(&self) -> Result<Vec<String>, StoreError> {
        Ok(channels::distinct_countries(&self.pool).await?)
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let columns = channels::distinct_category_columns(&self.pool).await?;
        let categories: BTreeSet<String> = columns
            .iter()
            .flat_map(|raw| decode_categories(raw))
            .filter(|category| !category.is_empty())
            .collect();
        Ok(categories.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::memory_pool;
    use crate::services::store::tests as shared;

    async fn store() -> SqliteChannelStore {
        SqliteChannelStore::new(memory_pool().await)
    }

    #[tokio::test]
    async fn test_round_trip() {
        shared::round_trip_preserves_fields(&store().await).await;
    }

    #[tokio::test]
    async fn test_store_if_empty() {
        shared::store_if_empty_is_idempotent(&store().await).await;
    }

    #[tokio::test]
    async fn test_duplicates() {
        shared::duplicates_keep_first(&store().await).await;
    }

    #[tokio::test]
    async fn test_ordering() {
        shared::listings_are_name_ordered(&store().await).await;
    }

    #[tokio::test]
    async fn test_query_store() {
        shared::query_store_paginates(&store().await).await;
    }

    #[tokio::test]
    async fn test_non_ascii_search_matches_memory_semantics() {
        let store = store().await;
        let records = vec![
            shared::record("a.fr", "ÉCOLE TV", "fr", "Kids"),
            shared::record("b.fr", "Other", "fr", "Kids"),
        ];
        store.store_all(&records).await.unwrap();

        let hits = store.search("école").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a.fr");
    }

    #[tokio::test]
    async fn test_non_ascii_text_folding_to_ascii() {
        let store = store().await;
        // KELVIN SIGN lowercases to an ASCII 'k'
        let records = vec![
            shared::record("k.kr", "\u{212A}BS World", "\u{212A}R", "General"),
            shared::record("a.us", "Alpha", "us", "News"),
        ];
        store.store_all(&records).await.unwrap();

        let hits = store.search("kbs").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "k.kr");

        let kr = store.find_by_country("KR").await.unwrap();
        assert_eq!(kr.len(), 1);
        assert_eq!(kr[0].id, "k.kr");

        let us = store.find_by_country("us").await.unwrap();
        assert_eq!(us.len(), 1);
        assert_eq!(us[0].id, "a.us");
    }
}
