//! Pagination types shared by every list endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One page of a server-side paginated collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn single(results: Vec<T>) -> Self {
        Self {
            count: results.len() as u64,
            next: None,
            previous: None,
            results,
        }
    }
}

/// Wire shape of a list response: either paginated or a bare array.
///
/// Some endpoints are served without a paginator; both shapes normalize into
/// a [`Page`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paged(Page<T>),
    Plain(Vec<T>),
}

impl<T> From<Listing<T>> for Page<T> {
    fn from(value: Listing<T>) -> Self {
        match value {
            Listing::Paged(page) => page,
            Listing::Plain(results) => Page::single(results),
        }
    }
}

/// Client-side pagination cursor, mutated only by a successful list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub total_count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub current_page: u32,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            total_count: 0,
            next: None,
            previous: None,
            current_page: 1,
        }
    }
}

impl PageCursor {
    pub fn from_page<T>(page: &Page<T>, params: &ListParams) -> Self {
        Self {
            total_count: page.count,
            next: page.next.clone(),
            previous: page.previous.clone(),
            current_page: params.current_page(),
        }
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

/// Query parameters for list requests (page, search, ordering, filters).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn ordering(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = Some(ordering.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Page number the cursor reports for this request (1 when unspecified).
    pub fn current_page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    /// Query pairs with absent and empty values stripped.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();

        if let Some(page) = self.page.filter(|p| *p > 0) {
            query.push(("page".to_string(), page.to_string()));
        }

        for (key, value) in [("search", &self.search), ("ordering", &self.ordering)] {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                query.push((key.to_string(), value.to_string()));
            }
        }

        for (key, value) in &self.filters {
            let value = value.trim();
            if !key.is_empty() && !value.is_empty() {
                query.push((key.clone(), value.to_string()));
            }
        }

        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_params_produce_no_query() {
        assert!(ListParams::new().to_query().is_empty());
        assert_eq!(ListParams::new().current_page(), 1);
    }

    #[test]
    fn strips_empty_values() {
        let params = ListParams::new()
            .page(2)
            .search("   ")
            .ordering("-fecha_alta")
            .filter("estado", "")
            .filter("marca", "HP");

        assert_eq!(
            params.to_query(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("ordering".to_string(), "-fecha_alta".to_string()),
                ("marca".to_string(), "HP".to_string()),
            ]
        );
    }

    #[test]
    fn bare_array_normalizes_into_single_page() {
        let listing: Listing<u32> = serde_json::from_str("[1, 2, 3]").unwrap();
        let page: Page<u32> = listing.into();
        assert_eq!(page.count, 3);
        assert!(page.next.is_none());
        assert_eq!(page.results, vec![1, 2, 3]);
    }

    #[test]
    fn cursor_tracks_requested_page() {
        let page: Page<u32> = serde_json::from_str(
            r#"{"count": 45, "next": "http://x/api/activos/?page=3", "previous": "http://x/api/activos/", "results": []}"#,
        )
        .unwrap();
        let cursor = PageCursor::from_page(&page, &ListParams::new().page(2));
        assert_eq!(cursor.total_count, 45);
        assert_eq!(cursor.current_page, 2);
        assert!(cursor.has_next());
        assert!(cursor.has_previous());
    }

    proptest! {
        /// Property: no query pair ever carries an empty value.
        #[test]
        fn query_never_contains_empty_values(
            page in proptest::option::of(0u32..50),
            search in proptest::option::of("[ a-z]{0,6}"),
            filters in proptest::collection::btree_map("[a-z]{0,4}", "[ a-z]{0,4}", 0..4),
        ) {
            let params = ListParams { page, search, ordering: None, filters };
            for (key, value) in params.to_query() {
                prop_assert!(!key.is_empty());
                prop_assert!(!value.trim().is_empty());
            }
        }
    }
}
