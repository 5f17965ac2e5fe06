//! Filtering, ordering and pagination shared by every channel listing
//!
//! Both the reference directory and the parsed playlist store answer the same
//! query shapes (list all, by country, by category, free-text search). They are
//! implemented once here over the [`Listing`] trait.

use serde::Serialize;
use std::cmp::Ordering;

use crate::models::{ChannelRecord, DirectoryChannel};

/// Default page size when the caller does not provide a usable one
pub const DEFAULT_LIMIT: usize = 50;

/// Fields the query engine needs from a listed channel
pub trait Listing {
    fn display_name(&self) -> &str;

    fn country_code(&self) -> &str;

    fn categories(&self) -> &[String];

    /// Free-text match; `needle` is already lowercased and non-empty
    fn matches_text(&self, needle: &str) -> bool;
}

impl Listing for ChannelRecord {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn country_code(&self) -> &str {
        &self.country_code
    }

    fn categories(&self) -> &[String] {
        &self.categories
    }

    fn matches_text(&self, needle: &str) -> bool {
        contains_lowercase(&self.display_name, needle)
            || contains_lowercase(&self.group_label, needle)
            || self.categories.iter().any(|c| contains_lowercase(c, needle))
    }
}

impl Listing for DirectoryChannel {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn country_code(&self) -> &str {
        &self.country
    }

    fn categories(&self) -> &[String] {
        &self.categories
    }

    fn matches_text(&self, needle: &str) -> bool {
        contains_lowercase(&self.name, needle)
            || self.alt_names.iter().any(|alt| contains_lowercase(alt, needle))
    }
}

fn contains_lowercase(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Ordering used by every listing: display name, case-insensitive.
///
/// Callers sort with a stable sort so equal names keep source order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Stable in-place sort of listings by display name
pub fn sort_by_name<T: Listing>(items: &mut [T]) {
    items.sort_by(|a, b| compare_names(a.display_name(), b.display_name()));
}

/// Filter predicates, combined with logical AND
///
/// An empty (or whitespace-only) value disables its predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFilter {
    country: Option<String>,
    category: Option<String>,
    search: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.to_string())
}

impl ChannelFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn country(mut self, code: Option<&str>) -> Self {
        self.country = non_empty(code);
        self
    }

    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = non_empty(category);
        self
    }

    pub fn search(mut self, query: Option<&str>) -> Self {
        self.search = non_empty(query);
        self
    }

    pub fn country_value(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn category_value(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn search_value(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Build a reusable matcher with the comparison keys lowercased once
    fn matcher(&self) -> Matcher {
        Matcher {
            country: self.country.as_deref().map(str::to_lowercase),
            category: self.category.as_deref().map(str::to_lowercase),
            search: self.search.as_deref().map(str::to_lowercase),
        }
    }

    pub fn matches<T: Listing>(&self, item: &T) -> bool {
        self.matcher().matches(item)
    }
}

struct Matcher {
    country: Option<String>,
    category: Option<String>,
    search: Option<String>,
}

impl Matcher {
    fn matches<T: Listing>(&self, item: &T) -> bool {
        if let Some(ref country) = self.country {
            if item.country_code().to_lowercase() != *country {
                return false;
            }
        }

        if let Some(ref category) = self.category {
            let hit = item
                .categories()
                .iter()
                .any(|c| c.to_lowercase() == *category);
            if !hit {
                return false;
            }
        }

        if let Some(ref needle) = self.search {
            if !item.matches_text(needle) {
                return false;
            }
        }

        true
    }
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Leading integer of a string, the way JavaScript's `parseInt` reads it
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Overflowing values saturate; they are clamped or rejected later anyway
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

fn coerce_positive(raw: Option<&str>, default: usize) -> usize {
    match raw.and_then(parse_leading_int) {
        Some(n) if n >= 1 => usize::try_from(n).unwrap_or(usize::MAX),
        _ => default,
    }
}

impl PageRequest {
    /// Page request from already-typed values; values below 1 fall back to defaults
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page
            .filter(|p| *p >= 1)
            .and_then(|p| usize::try_from(p).ok())
            .unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(DEFAULT_LIMIT);
        Self { page, limit }
    }

    /// Page request from raw query-string values
    ///
    /// Non-numeric or out-of-range values are coerced to the defaults
    /// (page 1, `default_limit`), never rejected.
    pub fn from_params(page: Option<&str>, limit: Option<&str>, default_limit: usize) -> Self {
        let default_limit = default_limit.max(1);
        Self {
            page: coerce_positive(page, 1),
            limit: coerce_positive(limit, default_limit),
        }
    }

    pub fn with_max_limit(mut self, max_limit: usize) -> Self {
        self.limit = self.limit.min(max_limit.max(1));
        self
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// One page of results plus the totals needed to navigate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub page_count: usize,
}

impl<T> Page<T> {
    /// Slice an already filtered and ordered result set
    pub fn from_sorted(matches: Vec<T>, request: PageRequest) -> Self {
        let total = matches.len();
        let items: Vec<T> = matches
            .into_iter()
            .skip(request.offset())
            .take(request.limit)
            .collect();

        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            page_count: total.div_ceil(request.limit),
        }
    }

    pub fn has_more(&self) -> bool {
        self.page.saturating_sub(1).saturating_mul(self.limit) + self.items.len() < self.total
    }
}

/// Filter, order by name and paginate a collection of listings
pub fn run_query<'a, T, I>(records: I, filter: &ChannelFilter, request: PageRequest) -> Page<T>
where
    T: Listing + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let matcher = filter.matcher();
    let mut matches: Vec<T> = records
        .into_iter()
        .filter(|item| matcher.matches(*item))
        .cloned()
        .collect();

    sort_by_name(&mut matches);
    Page::from_sorted(matches, request)
}
