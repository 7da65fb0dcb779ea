use std::collections::BTreeMap;

use crate::query::{OrderTerm, QueryOptions, DEFAULT_PAGE_SIZE};

/// Holds the canonical query options for one list view. Mutations that
/// change which rows match (search term, filters, page size) reset the page
/// back to the first; reordering does not.
#[derive(Debug, Clone)]
pub struct ListParams {
    options: QueryOptions,
}

impl ListParams {
    pub fn new(initial: QueryOptions) -> Self {
        Self { options: initial }
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.options.search_term = term.into();
        self.options.page_number = 0;
    }

    pub fn set_filters(&mut self, filters: BTreeMap<String, String>) {
        self.options.filters = filters;
        self.options.page_number = 0;
    }

    pub fn set_order(&mut self, order: Vec<OrderTerm>) {
        self.options.order = order;
    }

    pub fn set_page_number(&mut self, page_number: u32) {
        self.options.page_number = page_number;
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.options.page_size = page_size;
        self.options.page_number = 0;
    }

    /// Lenient coercion for free-form page inputs: anything unparseable
    /// becomes page 0.
    pub fn set_page_number_raw(&mut self, raw: &str) {
        self.set_page_number(raw.trim().parse().unwrap_or(0));
    }

    /// Unparseable page sizes fall back to the default.
    pub fn set_page_size_raw(&mut self, raw: &str) {
        self.set_page_size(raw.trim().parse().unwrap_or(DEFAULT_PAGE_SIZE as u32));
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self::new(QueryOptions::default())
    }
}
