use serde::{Deserialize, Serialize};

/// Single parsed playlist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    /// Raw `tvg-id` attribute, used as the storage key
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// Raw `group-title` attribute
    pub group_label: String,
    pub categories: Vec<String>,
    pub country_code: String,
    pub quality: String,
    pub stream_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_user_agent: Option<String>,
}
