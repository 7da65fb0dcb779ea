//! Client SDK: the query-parameter normalizer, the list request executor,
//! and the HTTP wrapper over the entity endpoints.

pub mod executor;
pub mod params;
pub mod sdk;

use std::sync::Arc;

use thiserror::Error;

use crate::query::QueryOptions;

pub use executor::{ListExecutor, ListFetch, ListSnapshot};
pub use params::ListParams;
pub use sdk::{EntityClient, EntityListFetch};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// One list view: the normalizer and the executor composed so that every
/// mutation recomputes the cache key synchronously before the fetch is
/// issued. Two rapid mutations therefore collapse to the latest key.
pub struct ListController<T> {
    params: ListParams,
    executor: ListExecutor<T>,
}

impl<T: Clone + Send + 'static> ListController<T> {
    pub fn new(fetch: Arc<dyn ListFetch<T>>, initial: QueryOptions) -> Self {
        let controller = Self { params: ListParams::new(initial), executor: ListExecutor::new(fetch) };
        controller.executor.query(controller.params.options());
        controller
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.params.set_search_term(term);
        self.executor.query(self.params.options());
    }

    pub fn set_filters(&mut self, filters: std::collections::BTreeMap<String, String>) {
        self.params.set_filters(filters);
        self.executor.query(self.params.options());
    }

    pub fn set_order(&mut self, order: Vec<crate::query::OrderTerm>) {
        self.params.set_order(order);
        self.executor.query(self.params.options());
    }

    pub fn set_page_number(&mut self, page_number: u32) {
        self.params.set_page_number(page_number);
        self.executor.query(self.params.options());
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.params.set_page_size(page_size);
        self.executor.query(self.params.options());
    }

    pub fn refetch(&self) {
        self.executor.refetch();
    }

    pub fn options(&self) -> &QueryOptions {
        self.params.options()
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        self.executor.snapshot()
    }
}
