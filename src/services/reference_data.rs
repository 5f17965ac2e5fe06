//! Read-only reference directory loaded from CSV tables
//!
//! The directory ships as four CSV files (`channels.csv`, `countries.csv`,
//! `categories.csv`, `feeds.csv`). They are read once at start-up into a
//! [`ReferenceSnapshot`] that handlers share through `AppState`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{CategoryRecord, CountryRecord, DirectoryChannel, FeedRecord};
use crate::services::query::{compare_names, run_query, ChannelFilter, Page, PageRequest};

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("reference table not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Deserialize)]
struct ChannelRow {
    id: String,
    name: String,
    #[serde(default)]
    alt_names: String,
    #[serde(default)]
    network: String,
    #[serde(default)]
    owners: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    categories: String,
    #[serde(default)]
    is_nsfw: String,
    #[serde(default)]
    launched: String,
    #[serde(default)]
    closed: String,
    #[serde(default)]
    replaced_by: String,
    #[serde(default)]
    website: String,
}

impl From<ChannelRow> for DirectoryChannel {
    fn from(row: ChannelRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            alt_names: parse_list(&row.alt_names),
            network: non_empty(row.network),
            owners: parse_list(&row.owners),
            country: row.country,
            categories: parse_list(&row.categories),
            is_nsfw: row.is_nsfw == "TRUE",
            launched: non_empty(row.launched),
            closed: non_empty(row.closed),
            replaced_by: non_empty(row.replaced_by),
            website: non_empty(row.website),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CountryRow {
    code: String,
    name: String,
    #[serde(default)]
    languages: String,
    #[serde(default)]
    flag: String,
}

impl From<CountryRow> for CountryRecord {
    fn from(row: CountryRow) -> Self {
        Self {
            code: row.code,
            name: row.name,
            languages: parse_list(&row.languages),
            flag: row.flag,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CategoryRow {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

impl From<CategoryRow> for CategoryRecord {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeedRow {
    channel: String,
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    alt_names: String,
    #[serde(default)]
    is_main: String,
    #[serde(default)]
    broadcast_area: String,
    #[serde(default)]
    timezones: String,
    #[serde(default)]
    languages: String,
    #[serde(default)]
    format: String,
}

impl From<FeedRow> for FeedRecord {
    fn from(row: FeedRow) -> Self {
        Self {
            channel: row.channel,
            id: row.id,
            name: row.name,
            alt_names: parse_list(&row.alt_names),
            is_main: row.is_main == "TRUE",
            broadcast_area: parse_list(&row.broadcast_area),
            timezones: parse_list(&row.timezones),
            languages: parse_list(&row.languages),
            format: non_empty(row.format),
        }
    }
}

/// Split a `;`-separated CSV cell, dropping blank items
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .filter(|item| !item.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn read_table<R, T>(dir: &Path, file: &str) -> Result<Vec<T>, ReferenceError>
where
    R: DeserializeOwned,
    T: From<R>,
{
    let path = dir.join(file);
    if !path.is_file() {
        return Err(ReferenceError::MissingFile(path));
    }

    let csv_err = |source| ReferenceError::Csv {
        path: path.clone(),
        source,
    };

    let mut reader = csv::Reader::from_path(&path).map_err(csv_err)?;
    reader
        .deserialize::<R>()
        .map(|row| row.map(T::from).map_err(csv_err))
        .collect()
}

/// Immutable in-memory copy of the reference directory
#[derive(Debug, Clone, Default)]
pub struct ReferenceSnapshot {
    channels: Vec<DirectoryChannel>,
    countries: Vec<CountryRecord>,
    categories: Vec<CategoryRecord>,
    feeds: Vec<FeedRecord>,
}

impl ReferenceSnapshot {
    /// Snapshot with no data, used when the CSV tables are unavailable
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load all four tables from `dir`
    ///
    /// Blocking; call it from `spawn_blocking` inside the runtime.
    pub fn load(dir: &Path) -> Result<Self, ReferenceError> {
        let snapshot = Self::from_parts(
            read_table::<ChannelRow, _>(dir, "channels.csv")?,
            read_table::<CountryRow, _>(dir, "countries.csv")?,
            read_table::<CategoryRow, _>(dir, "categories.csv")?,
            read_table::<FeedRow, _>(dir, "feeds.csv")?,
        );

        tracing::info!(
            channels = snapshot.channels.len(),
            countries = snapshot.countries.len(),
            categories = snapshot.categories.len(),
            feeds = snapshot.feeds.len(),
            "Reference data loaded from {}",
            dir.display()
        );

        Ok(snapshot)
    }

    /// Build a snapshot from already decoded records
    pub fn from_parts(
        channels: Vec<DirectoryChannel>,
        mut countries: Vec<CountryRecord>,
        mut categories: Vec<CategoryRecord>,
        feeds: Vec<FeedRecord>,
    ) -> Self {
        countries.sort_by(|a, b| compare_names(&a.name, &b.name));
        categories.sort_by(|a, b| compare_names(&a.name, &b.name));

        Self {
            channels,
            countries,
            categories,
            feeds,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Countries ordered by name
    pub fn countries(&self) -> &[CountryRecord] {
        &self.countries
    }

    /// Categories ordered by name
    pub fn categories(&self) -> &[CategoryRecord] {
        &self.categories
    }

    pub fn channel_by_id(&self, id: &str) -> Option<&DirectoryChannel> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn feeds_by_channel(&self, channel_id: &str) -> Vec<FeedRecord> {
        self.feeds
            .iter()
            .filter(|f| f.channel == channel_id)
            .cloned()
            .collect()
    }

    pub fn country_by_code(&self, code: &str) -> Option<&CountryRecord> {
        self.countries
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }

    pub fn country_by_name(&self, name: &str) -> Option<&CountryRecord> {
        let wanted = name.to_lowercase();
        self.countries
            .iter()
            .find(|c| c.name.to_lowercase() == wanted)
    }

    pub fn category_by_id(&self, id: &str) -> Option<&CategoryRecord> {
        self.categories
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(id))
    }

    /// Filter, order and paginate the directory channels
    pub fn query(&self, filter: &ChannelFilter, request: PageRequest) -> Page<DirectoryChannel> {
        run_query(&self.channels, filter, request)
    }
}
