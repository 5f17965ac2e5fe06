//! Request and response shapes of the REST API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::services::query::{ChannelFilter, Page, PageRequest};

/// Pagination block of list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
    pub has_more: bool,
}

impl<T> From<&Page<T>> for Pagination {
    fn from(page: &Page<T>) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            total: page.total,
            pages: page.page_count,
            has_more: page.has_more(),
        }
    }
}

/// Paginated list envelope: `{ success, ..meta, pagination, count, data }`
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    /// Endpoint specific fields echoed next to the list (query, filters, ...)
    #[serde(flatten)]
    pub meta: Map<String, Value>,
    pub pagination: Pagination,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }
}

impl<T: Serialize> From<Page<T>> for ListResponse<T> {
    fn from(page: Page<T>) -> Self {
        let pagination = Pagination::from(&page);
        Self {
            success: true,
            meta: Map::new(),
            pagination,
            count: page.items.len(),
            data: page.items,
        }
    }
}

/// Unpaginated collection envelope: `{ success, count, data }`
#[derive(Debug, Serialize)]
pub struct CollectionResponse<T: Serialize> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T: Serialize> CollectionResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Query parameters accepted by every list endpoint
///
/// Values stay raw strings so malformed numbers are coerced instead of
/// rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

impl ListQuery {
    /// Coerced page request, `limit` clamped to `max_limit`
    pub fn page_request(&self, default_limit: usize, max_limit: usize) -> PageRequest {
        PageRequest::from_params(self.page.as_deref(), self.limit.as_deref(), default_limit)
            .with_max_limit(max_limit)
    }

    pub fn filter(&self) -> ChannelFilter {
        ChannelFilter::new()
            .country(self.country.as_deref())
            .category(self.category.as_deref())
            .search(self.q.as_deref())
    }
}

/// Query parameters of `/api/channels/country-name`
#[derive(Debug, Default, Deserialize)]
pub struct CountryNameQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

/// Query params for admin operations
#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    pub key: Option<String>,
}
