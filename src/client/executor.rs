use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::ClientError;
use crate::query::{Page, QueryOptions};

/// Entity-specific fetch function the executor drives.
#[async_trait]
pub trait ListFetch<T>: Send + Sync {
    async fn fetch(&self, options: &QueryOptions) -> Result<Page<T>, ClientError>;
}

/// What one list view renders from.
#[derive(Debug, Clone)]
pub struct ListSnapshot<T> {
    pub data: Option<Page<T>>,
    pub error: Option<String>,
    pub is_loading: bool,
}

struct ExecutorState<T> {
    key: Option<String>,
    options: Option<QueryOptions>,
    generation: u64,
    data: Option<Page<T>>,
    error: Option<String>,
    is_loading: bool,
}

impl<T> Default for ExecutorState<T> {
    fn default() -> Self {
        Self { key: None, options: None, generation: 0, data: None, error: None, is_loading: false }
    }
}

/// Drives list fetches keyed by the canonical query options.
///
/// Identical keys coalesce into the existing in-flight fetch. When keys
/// differ, the newest request wins: a superseded in-flight fetch is not
/// aborted, its result is simply ignored once a newer generation is active,
/// so stale responses can never overwrite newer state.
pub struct ListExecutor<T> {
    fetch: Arc<dyn ListFetch<T>>,
    state: Arc<Mutex<ExecutorState<T>>>,
}

impl<T: Clone + Send + 'static> ListExecutor<T> {
    pub fn new(fetch: Arc<dyn ListFetch<T>>) -> Self {
        Self { fetch, state: Arc::new(Mutex::new(ExecutorState::default())) }
    }

    /// Recompute the cache key and start a fetch if it changed. The key
    /// comparison happens synchronously, before any network activity.
    pub fn query(&self, options: &QueryOptions) {
        let key = options.cache_key();
        let mut state = self.lock();
        if state.key.as_deref() == Some(key.as_str()) {
            return;
        }
        self.start(&mut state, key, options.clone());
    }

    /// Re-run the current query even though the key is unchanged.
    pub fn refetch(&self) {
        let mut state = self.lock();
        if let (Some(key), Some(options)) = (state.key.clone(), state.options.clone()) {
            self.start(&mut state, key, options);
        }
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        let state = self.lock();
        ListSnapshot { data: state.data.clone(), error: state.error.clone(), is_loading: state.is_loading }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ExecutorState<T>> {
        self.state.lock().expect("list executor state lock poisoned")
    }

    fn start(&self, state: &mut ExecutorState<T>, key: String, options: QueryOptions) {
        state.generation += 1;
        state.key = Some(key);
        state.options = Some(options.clone());
        state.is_loading = true;

        let generation = state.generation;
        let fetch = self.fetch.clone();
        let shared = self.state.clone();
        tokio::spawn(async move {
            let result = fetch.fetch(&options).await;
            let mut state = shared.lock().expect("list executor state lock poisoned");
            if state.generation != generation {
                // Superseded while in flight; drop the stale result.
                return;
            }
            match result {
                Ok(page) => {
                    state.data = Some(page);
                    state.error = None;
                }
                Err(err) => {
                    state.error = Some(err.to_string());
                }
            }
            state.is_loading = false;
        });
    }
}
