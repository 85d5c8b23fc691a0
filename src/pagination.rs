//! This modules defines the common functionality for paging data.

use serde::{Deserialize, Serialize};

use crate::filter::FilterModel;

/// The config for pagination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl PaginationConfig {
    /// Resolve the requested page and page size against the defaults and limits.
    ///
    /// Pages are 1-indexed, so a page number of zero is treated as the first page.
    /// The page size is clamped to `1..=max_page_size`.
    pub fn resolve(&self, page_number: Option<u64>, page_size: Option<u64>) -> Page {
        let number = page_number.unwrap_or(self.default_page).max(1);
        let size = page_size
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1));

        Page { number, size }
    }
}

/// A resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// The 1-indexed page number.
    pub number: u64,
    /// The maximum number of items on the page.
    pub size: u64,
}

impl Page {
    /// The number of items before this page.
    pub fn offset(&self) -> u64 {
        self.number.saturating_sub(1).saturating_mul(self.size)
    }
}

/// The number of pages needed to show `item_count` items, `page_size` at a time.
pub fn page_count(item_count: u64, page_size: u64) -> u64 {
    item_count.div_ceil(page_size.max(1))
}

/// A request for one page of items that match a set of filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteredRequest {
    /// The 1-indexed page to return.
    #[serde(default)]
    pub page_number: Option<u64>,
    /// How many items to return per page.
    #[serde(default)]
    pub page_size: Option<u64>,
    /// The filters that every returned item must match.
    #[serde(default)]
    pub filters: Vec<FilterModel>,
}
