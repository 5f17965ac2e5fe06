//! Reference directory records loaded from the CSV tables.

use serde::{Deserialize, Serialize};

/// Country reference row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub code: String,
    pub name: String,
    pub languages: Vec<String>,
    pub flag: String,
}

/// Category reference row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Channel as described by the reference directory (not a playable stream)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryChannel {
    pub id: String,
    pub name: String,
    pub alt_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    pub owners: Vec<String>,
    pub country: String,
    pub categories: Vec<String>,
    pub is_nsfw: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launched: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Alternative feed of a directory channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub channel: String,
    pub id: String,
    pub name: String,
    pub alt_names: Vec<String>,
    pub is_main: bool,
    pub broadcast_area: Vec<String>,
    pub timezones: Vec<String>,
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Directory channel together with its feeds, for the detail endpoint
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryChannelDetail {
    #[serde(flatten)]
    pub channel: DirectoryChannel,
    pub feeds: Vec<FeedRecord>,
}
