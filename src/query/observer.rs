//! Per-consumer view of one query whose key can change over time

use super::cache::{QueryCache, QueryFn, QueryState, Subscription};
use super::key::QueryKey;
use std::sync::Arc;

/// Follows the query for its current key and, with `keep_previous_data`,
/// keeps showing the last key's data while the new key has none yet.
///
/// Holding an observer marks its current key as observed in the cache, so
/// invalidations refetch it in the background.
pub struct QueryObserver<T> {
    cache: QueryCache<T>,
    key: QueryKey,
    keep_previous_data: bool,
    subscription: Subscription<T>,
    last_data: Option<Arc<T>>,
}

impl<T: Send + Sync + 'static> QueryObserver<T> {
    pub fn new(cache: QueryCache<T>, key: QueryKey, keep_previous_data: bool) -> Self {
        let subscription = cache.subscribe(&key);
        Self {
            cache,
            key,
            keep_previous_data,
            subscription,
            last_data: None,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn cache(&self) -> &QueryCache<T> {
        &self.cache
    }

    /// Switch to `key`. No fetch happens until [`fetch`](Self::fetch).
    pub fn set_key(&mut self, key: QueryKey) {
        if key == self.key {
            return;
        }
        if let Some(data) = self.cache.get(&self.key) {
            self.last_data = Some(data);
        }
        self.subscription = self.cache.subscribe(&key);
        self.key = key;
    }

    /// Fetch (or serve) the current key
    pub async fn fetch(&mut self, fetcher: QueryFn<T>) -> QueryState<T> {
        let key = self.subscription.key().clone();
        let state = self.cache.fetch_or_serve(&key, fetcher).await;
        self.resolve(state)
    }

    /// Current state without fetching
    pub fn current(&mut self) -> QueryState<T> {
        let state = self.cache.state(&self.key);
        self.resolve(state)
    }

    fn resolve(&mut self, mut state: QueryState<T>) -> QueryState<T> {
        match &state.data {
            Some(data) => self.last_data = Some(Arc::clone(data)),
            None if self.keep_previous_data => {
                if let Some(previous) = &self.last_data {
                    state.data = Some(Arc::clone(previous));
                    state.is_placeholder = true;
                }
            }
            None => {}
        }
        state
    }
}
