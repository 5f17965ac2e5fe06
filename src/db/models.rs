//! Database row types for SQLite
//!
//! These types map directly to rows of the `channels` table and convert
//! to and from the domain record in models/channel.rs

use sqlx::FromRow;

use crate::models::ChannelRecord;

/// Channel row from database
#[derive(Debug, Clone, FromRow)]
pub struct ChannelRow {
    /// Insertion order, which is playlist source order
    pub row_id: i64,
    pub tvg_id: String,
    pub tvg_logo: Option<String>,
    pub group_title: String,
    pub name: String,
    pub country_code: String,
    pub quality: String,
    pub url: String,
    pub http_referrer: Option<String>,
    pub http_user_agent: Option<String>,
    /// JSON array of category strings
    pub categories: String,
}

impl ChannelRow {
    /// Convert to the domain record, decoding the categories column
    pub fn into_record(self) -> Result<ChannelRecord, serde_json::Error> {
        let categories: Vec<String> = serde_json::from_str(&self.categories)?;

        Ok(ChannelRecord {
            id: self.tvg_id,
            display_name: self.name,
            logo_url: self.tvg_logo,
            group_label: self.group_title,
            categories,
            country_code: self.country_code,
            quality: self.quality,
            stream_url: self.url,
            http_referrer: self.http_referrer,
            http_user_agent: self.http_user_agent,
        })
    }
}

/// Channel ready for insertion
#[derive(Debug, Clone)]
pub struct NewChannel {
    pub tvg_id: String,
    pub tvg_logo: Option<String>,
    pub group_title: String,
    pub name: String,
    pub country_code: String,
    pub quality: String,
    pub url: String,
    pub http_referrer: Option<String>,
    pub http_user_agent: Option<String>,
    pub categories: String,
}

impl NewChannel {
    pub fn from_record(record: &ChannelRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            tvg_id: record.id.clone(),
            tvg_logo: record.logo_url.clone(),
            group_title: record.group_label.clone(),
            name: record.display_name.clone(),
            country_code: record.country_code.clone(),
            quality: record.quality.clone(),
            url: record.stream_url.clone(),
            http_referrer: record.http_referrer.clone(),
            http_user_agent: record.http_user_agent.clone(),
            categories: serde_json::to_string(&record.categories)?,
        })
    }
}

/// Decode the JSON categories column, treating unreadable values as empty
pub fn decode_categories(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}
