//! Page and facet wire types exchanged with the data-source collaborators.

use serde::{Deserialize, Serialize};

use super::filters::{Facet, FilterSnapshot};
use super::item::Item;

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// One page request: `{page, page_size, ...activeFilters}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Requested page length, always > 0.
    pub page_size: u32,
    /// Filters active when the request was dispatched.
    pub filters: FilterSnapshot,
}

/// One page response: `{data, total}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    /// Items on this page.
    #[serde(default)]
    pub data: Vec<Item>,
    /// Total matching items across all pages, when the server reports it.
    #[serde(default)]
    pub total: u64,
}

impl PageResponse {
    /// Last-page rule: a short page means nothing follows it.
    pub fn is_last_page(&self, page_size: u32) -> bool {
        self.data.len() < page_size as usize
    }
}

/// Raw facet response: `{items: [{name|id, count}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FacetResponse {
    /// Facet values, zero counts included.
    #[serde(default)]
    pub items: Vec<Facet>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_page_is_last() {
        let resp: PageResponse =
            serde_json::from_str(r#"{"data":[{"id":1},{"id":2}],"total":2}"#).unwrap();
        assert!(resp.is_last_page(12));
        assert!(!resp.is_last_page(2));
    }

    #[test]
    fn missing_fields_default() {
        let resp: PageResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.data.is_empty());
        assert_eq!(resp.total, 0);
    }
}
