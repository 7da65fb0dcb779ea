use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical, serializable representation of one list view's intent.
/// Used by the client SDK both as the request payload and as the cache key
/// for the list executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    pub search_term: String,
    pub search_term_keys: Vec<String>,
    /// Equality filters, keyed by field name. BTreeMap so that the
    /// serialized form (and therefore the cache key) is stable.
    pub filters: BTreeMap<String, String>,
    pub order: Vec<OrderTerm>,
    pub page_number: u32,
    pub page_size: u32,
    pub relations: Vec<String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            search_term_keys: vec![],
            filters: BTreeMap::new(),
            order: vec![OrderTerm { id: "created_at".to_string(), desc: true }],
            page_number: 0,
            page_size: DEFAULT_PAGE_SIZE as u32,
            relations: vec![],
        }
    }
}

impl QueryOptions {
    /// Stable serialization used to coalesce identical list requests.
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Flatten into HTTP query pairs for the collection endpoint.
    /// Pagination math: `offset = pageNumber * pageSize`.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("limit".to_string(), self.page_size.to_string()),
            ("offset".to_string(), (self.page_number as u64 * self.page_size as u64).to_string()),
        ];
        if !self.order.is_empty() {
            pairs.push(("order".to_string(), serde_json::to_string(&self.order).unwrap_or_default()));
        }
        if !self.search_term.is_empty() {
            pairs.push(("searchTerm".to_string(), self.search_term.clone()));
            pairs.push((
                "searchTermKeys".to_string(),
                serde_json::to_string(&self.search_term_keys).unwrap_or_default(),
            ));
        }
        if !self.relations.is_empty() {
            pairs.push(("relations".to_string(), serde_json::to_string(&self.relations).unwrap_or_default()));
        }
        for (field, value) in &self.filters {
            pairs.push((field.clone(), value.clone()));
        }
        pairs
    }
}

/// One sort instruction as the SDK serializes it: `{"id": "name", "desc": true}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTerm {
    pub id: String,
    pub desc: bool,
}

/// Uniform paginated response envelope.
/// `total_count` always reflects the full filtered set, not the returned page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(rename = "totalCount")]
    pub total_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Case-insensitive "any of these keys contains the term" filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub term: String,
    pub keys: Vec<String>,
}

/// Engine-facing filter specification: equality conditions ANDed with an
/// optional search disjunction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub equals: Vec<(String, String)>,
    pub search: Option<SearchFilter>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.equals.is_empty() && self.search.is_none()
    }
}

/// Translated collection query, ready for the persistence engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineQuery {
    pub filter: FilterSpec,
    pub order: Vec<OrderSpec>,
    pub take: i64,
    pub skip: i64,
    pub relations: Vec<String>,
}

/// Generated SQL plus its positional parameters, bound in order.
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}

/// Client-side fail-safe page size for list views; the server takes its
/// fallback from `ApiConfig::default_page_size`.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_stable_for_equal_options() {
        let mut a = QueryOptions::default();
        a.filters.insert("symbol".into(), "BTC".into());
        a.filters.insert("name".into(), "Bitcoin".into());

        let mut b = QueryOptions::default();
        b.filters.insert("name".into(), "Bitcoin".into());
        b.filters.insert("symbol".into(), "BTC".into());

        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn cache_key_changes_with_page() {
        let a = QueryOptions::default();
        let mut b = a.clone();
        b.page_number = 3;
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn query_pairs_compute_offset_from_page() {
        let mut options = QueryOptions::default();
        options.page_number = 2;
        options.page_size = 20;
        let pairs = options.to_query_pairs();
        assert!(pairs.contains(&("limit".to_string(), "20".to_string())));
        assert!(pairs.contains(&("offset".to_string(), "40".to_string())));
    }

    #[test]
    fn default_options_order_by_created_at_descending() {
        let pairs = QueryOptions::default().to_query_pairs();
        let order = pairs.iter().find(|(k, _)| k == "order").map(|(_, v)| v.as_str());
        assert_eq!(order, Some(r#"[{"id":"created_at","desc":true}]"#));
    }

    #[test]
    fn query_pairs_omit_empty_search() {
        let options = QueryOptions::default();
        let pairs = options.to_query_pairs();
        assert!(!pairs.iter().any(|(k, _)| k == "searchTerm"));
    }
}
