//! Key-addressed query cache
//!
//! A process-wide store of fetched results, addressed by [`QueryKey`]. The
//! cache is an explicit handle (cheap to clone) that every consumer receives
//! by injection; tests create a fresh one each.
//!
//! ## Guarantees
//!
//! - **Freshness**: an entry younger than `stale_time` that was not
//!   invalidated is served without calling the fetcher.
//! - **Deduplication**: concurrent fetches of one key share a single
//!   underlying request (`futures::Shared`).
//! - **Last-committed-write-wins**: each key remembers which request is
//!   current. A response from a superseded request is dropped.
//! - **Stale-while-error**: a failed fetch keeps the last good data and only
//!   records the error.
//! - **Invalidation**: `invalidate` marks matching entries stale and spawns a
//!   refetch for every matching key that currently has a [`Subscription`].
//!   It never blocks the caller.
//!
//! Storage is a `moka` cache with idle expiry (`gc_time`). Bookkeeping for
//! in-flight requests and observers sits behind a `std::sync::Mutex` that is
//! never held across an `.await`.

use super::events::{CacheEvent, CacheEventBus, CacheEventKind};
use super::key::{QueryFilter, QueryKey};
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Fetch function stored with an observed query so invalidation can rerun it
pub type QueryFn<T> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync>;

/// Wrap an async closure into a [`QueryFn`]
pub fn query_fn<T, F, Fut>(f: F) -> QueryFn<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Error recorded on a cache entry after a failed fetch.
///
/// Cloneable so it can be shared between every caller awaiting the same
/// deduplicated request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for QueryError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{:#}", err))
    }
}

/// Tuning knobs for a [`QueryCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// How long fetched data counts as fresh
    pub stale_time: Duration,
    /// How long an entry survives without being read
    pub gc_time: Duration,
    /// Upper bound on stored entries
    pub max_entries: u64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(60),
            gc_time: Duration::from_secs(300),
            max_entries: 256,
        }
    }
}

/// Lifecycle status of a query, from its consumer's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No data and no error yet
    Pending,
    /// Data is available (possibly stale, possibly with a newer error)
    Success,
    /// The last fetch failed and there is no data to fall back on
    Error,
}

/// Snapshot of one query as seen by a consumer
#[derive(Debug)]
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    pub status: QueryStatus,
    pub error: Option<QueryError>,
    pub is_fetching: bool,
    pub is_stale: bool,
    /// `data` belongs to a different key (kept while this key loads)
    pub is_placeholder: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            status: self.status,
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            is_stale: self.is_stale,
            is_placeholder: self.is_placeholder,
            updated_at: self.updated_at,
        }
    }
}

impl<T> QueryState<T> {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Serializable snapshot of every successful entry, for seeding a cache
/// before first paint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DehydratedState<T> {
    pub queries: Vec<DehydratedQuery<T>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DehydratedQuery<T> {
    pub key: QueryKey,
    pub data: T,
    pub fetched_at: DateTime<Utc>,
}

// ============================================================================
// Internals
// ============================================================================

struct Entry<T> {
    data: Option<Arc<T>>,
    /// Monotonic timestamp used for freshness
    updated_at: Option<Instant>,
    /// Wall-clock timestamp used for hydration
    fetched_at: Option<DateTime<Utc>>,
    invalidated: bool,
    error: Option<QueryError>,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            data: None,
            updated_at: None,
            fetched_at: None,
            invalidated: false,
            error: None,
        }
    }
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            updated_at: self.updated_at,
            fetched_at: self.fetched_at,
            invalidated: self.invalidated,
            error: self.error.clone(),
        }
    }
}

impl<T> Entry<T> {
    fn store(&mut self, data: Arc<T>, updated_at: Instant, fetched_at: DateTime<Utc>) {
        self.data = Some(data);
        self.updated_at = Some(updated_at);
        self.fetched_at = Some(fetched_at);
        self.invalidated = false;
        self.error = None;
    }
}

type FetchOutput<T> = Result<Arc<T>, QueryError>;
type SharedFetch<T> = Shared<BoxFuture<'static, FetchOutput<T>>>;

struct InFlight<T> {
    request_id: u64,
    future: SharedFetch<T>,
    /// Invalidated while pending; the response is stored already stale
    invalidated: bool,
}

struct Registry<T> {
    in_flight: HashMap<QueryKey, InFlight<T>>,
    /// Fetchers of observed keys only
    query_fns: HashMap<QueryKey, QueryFn<T>>,
    observers: HashMap<QueryKey, usize>,
    next_request_id: u64,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            in_flight: HashMap::new(),
            query_fns: HashMap::new(),
            observers: HashMap::new(),
            next_request_id: 0,
        }
    }
}

struct Inner<T> {
    entries: moka::sync::Cache<QueryKey, Entry<T>>,
    /// Guards in-flight bookkeeping and every read-modify-write of `entries`
    registry: Mutex<Registry<T>>,
    events: CacheEventBus,
    options: CacheOptions,
}

impl<T> Inner<T> {
    fn registry(&self) -> MutexGuard<'_, Registry<T>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send + Sync + 'static> Inner<T> {
    /// Record the outcome of request `request_id`, unless a newer request
    /// for the same key has taken over.
    fn complete(&self, key: &QueryKey, request_id: u64, result: &FetchOutput<T>) {
        let kind = {
            let mut registry = self.registry();
            let invalidated = match registry.in_flight.get(key) {
                Some(current) if current.request_id == request_id => {
                    let invalidated = current.invalidated;
                    registry.in_flight.remove(key);
                    invalidated
                }
                _ => {
                    warn!(key = %key, request_id, "Dropping superseded fetch response");
                    return;
                }
            };

            let mut entry = self.entries.get(key).unwrap_or_default();
            let kind = match result {
                Ok(data) => {
                    entry.store(Arc::clone(data), Instant::now(), Utc::now());
                    entry.invalidated = invalidated;
                    CacheEventKind::Updated
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Query fetch failed, keeping previous data");
                    entry.error = Some(e.clone());
                    CacheEventKind::Failed
                }
            };
            self.entries.insert(key.clone(), entry);
            kind
        };
        self.events.emit(key, kind);
    }
}

// ============================================================================
// Public handle
// ============================================================================

/// Shared query cache handle. Clones refer to the same store.
///
/// # Example
///
/// ```rust
/// use notehub::query::{query_fn, QueryCache, QueryKey, QueryStatus};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let cache: QueryCache<Vec<String>> = QueryCache::default();
/// let calls = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&calls);
/// let fetcher = query_fn(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
///     async { Ok(vec!["Groceries".to_string()]) }
/// });
///
/// let key = QueryKey::notes("", 1);
/// let state = cache.fetch_or_serve(&key, fetcher.clone()).await;
/// assert_eq!(state.status, QueryStatus::Success);
///
/// // Fresh entry: served without another call
/// cache.fetch_or_serve(&key, fetcher).await;
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// # });
/// ```
pub struct QueryCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub fn new(options: CacheOptions) -> Self {
        let entries = moka::sync::Cache::builder()
            .max_capacity(options.max_entries)
            .time_to_idle(options.gc_time)
            .build();
        Self {
            inner: Arc::new(Inner {
                entries,
                registry: Mutex::new(Registry::default()),
                events: CacheEventBus::default(),
                options,
            }),
        }
    }

    pub fn options(&self) -> CacheOptions {
        self.inner.options
    }

    /// Receive a [`CacheEvent`] for every change
    pub fn events(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Cached data for `key`, fresh or not
    pub fn get(&self, key: &QueryKey) -> Option<Arc<T>> {
        self.inner.entries.get(key).and_then(|entry| entry.data)
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.inner.entries.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current state of `key` without triggering a fetch
    pub fn state(&self, key: &QueryKey) -> QueryState<T> {
        let is_fetching = self.inner.registry().in_flight.contains_key(key);
        let entry = self.inner.entries.get(key).unwrap_or_default();
        let is_stale = !self.is_fresh(&entry);
        let status = match (&entry.data, &entry.error) {
            (Some(_), _) => QueryStatus::Success,
            (None, Some(_)) => QueryStatus::Error,
            (None, None) => QueryStatus::Pending,
        };
        QueryState {
            data: entry.data,
            status,
            error: entry.error,
            is_fetching,
            is_stale,
            is_placeholder: false,
            updated_at: entry.fetched_at,
        }
    }

    /// Serve `key` from the cache if fresh, otherwise fetch it (joining an
    /// in-flight request for the same key if there is one).
    ///
    /// Never fails: a fetch error is reported through the returned state.
    pub async fn fetch_or_serve(&self, key: &QueryKey, fetcher: QueryFn<T>) -> QueryState<T> {
        {
            let mut registry = self.inner.registry();
            if registry.observers.contains_key(key) {
                registry.query_fns.insert(key.clone(), Arc::clone(&fetcher));
            }
        }

        if let Some(entry) = self.inner.entries.get(key) {
            if self.is_fresh(&entry) {
                debug!(key = %key, "Query cache hit");
                return self.state(key);
            }
        }

        let fetch = self.start_or_join(key, fetcher, false);
        if let Err(e) = fetch.await {
            debug!(key = %key, error = %e, "fetch_or_serve completed with error");
        }
        self.state(key)
    }

    /// Warm `key` without caring about the result
    pub async fn prefetch(&self, key: &QueryKey, fetcher: QueryFn<T>) {
        let _ = self.fetch_or_serve(key, fetcher).await;
    }

    /// Store `data` for `key` as if it had just been fetched
    pub fn set_data(&self, key: &QueryKey, data: T) {
        {
            let _registry = self.inner.registry();
            let mut entry = self.inner.entries.get(key).unwrap_or_default();
            entry.store(Arc::new(data), Instant::now(), Utc::now());
            self.inner.entries.insert(key.clone(), entry);
        }
        self.inner.events.emit(key, CacheEventKind::Updated);
    }

    /// Mark every entry matching `filter` stale and refetch the observed ones
    /// in the background. Requests already in flight for matching keys land
    /// stale. Returns the number of entries marked.
    pub fn invalidate(&self, filter: &QueryFilter) -> usize {
        let (marked, refetch) = {
            let mut registry = self.inner.registry();
            for (_, pending) in registry
                .in_flight
                .iter_mut()
                .filter(|(key, _)| filter.matches(key))
            {
                pending.invalidated = true;
            }
            let marked: Vec<QueryKey> = self
                .inner
                .entries
                .iter()
                .filter(|(key, _)| filter.matches(key))
                .map(|(key, _)| (*key).clone())
                .collect();
            for key in &marked {
                if let Some(mut entry) = self.inner.entries.get(key) {
                    entry.invalidated = true;
                    self.inner.entries.insert(key.clone(), entry);
                }
            }
            let refetch: Vec<(QueryKey, QueryFn<T>)> = registry
                .observers
                .keys()
                .filter(|key| filter.matches(key))
                .filter_map(|key| {
                    registry
                        .query_fns
                        .get(key)
                        .map(|f| (key.clone(), Arc::clone(f)))
                })
                .collect();
            (marked, refetch)
        };

        for key in &marked {
            self.inner.events.emit(key, CacheEventKind::Invalidated);
        }
        debug!(
            filter = ?filter,
            marked = marked.len(),
            refetching = refetch.len(),
            "Queries invalidated"
        );

        if !refetch.is_empty() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    for (key, fetcher) in refetch {
                        let fetch = self.start_or_join(&key, fetcher, true);
                        handle.spawn(async move {
                            let _ = fetch.await;
                        });
                    }
                }
                Err(_) => {
                    debug!("No async runtime, observed queries will refetch on next read");
                }
            }
        }

        marked.len()
    }

    /// Drop every entry matching `filter`. Pending responses for those keys
    /// are discarded when they arrive.
    pub fn remove(&self, filter: &QueryFilter) -> usize {
        let removed: Vec<QueryKey> = {
            let mut registry = self.inner.registry();
            let removed: Vec<QueryKey> = self
                .inner
                .entries
                .iter()
                .filter(|(key, _)| filter.matches(key))
                .map(|(key, _)| (*key).clone())
                .collect();
            for key in &removed {
                self.inner.entries.invalidate(key);
            }
            registry.in_flight.retain(|key, _| !filter.matches(key));
            removed
        };
        for key in &removed {
            self.inner.events.emit(key, CacheEventKind::Removed);
        }
        removed.len()
    }

    pub fn clear(&self) {
        self.remove(&QueryFilter::All);
    }

    /// Mark `key` as observed until the returned guard is dropped
    pub fn subscribe(&self, key: &QueryKey) -> Subscription<T> {
        *self
            .inner
            .registry()
            .observers
            .entry(key.clone())
            .or_insert(0) += 1;
        Subscription {
            inner: Arc::clone(&self.inner),
            key: key.clone(),
        }
    }

    pub fn observer_count(&self, key: &QueryKey) -> usize {
        self.inner
            .registry()
            .observers
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    fn is_fresh(&self, entry: &Entry<T>) -> bool {
        entry.data.is_some()
            && !entry.invalidated
            && entry
                .updated_at
                .is_some_and(|at| at.elapsed() < self.inner.options.stale_time)
    }

    /// Join the in-flight request for `key`, or start a new one. A request
    /// invalidated while pending is never joined. With `supersede`, always
    /// start a new request and make it the current one.
    fn start_or_join(&self, key: &QueryKey, fetcher: QueryFn<T>, supersede: bool) -> SharedFetch<T> {
        let mut registry = self.inner.registry();
        if !supersede {
            if let Some(current) = registry.in_flight.get(key).filter(|c| !c.invalidated) {
                debug!(key = %key, request_id = current.request_id, "Joining in-flight fetch");
                return current.future.clone();
            }
        }

        registry.next_request_id += 1;
        let request_id = registry.next_request_id;
        let inner: Weak<Inner<T>> = Arc::downgrade(&self.inner);
        let fetch_key = key.clone();
        let future = async move {
            let result = fetcher().await.map(Arc::new).map_err(QueryError::from);
            if let Some(inner) = inner.upgrade() {
                inner.complete(&fetch_key, request_id, &result);
            }
            result
        }
        .boxed()
        .shared();

        registry.in_flight.insert(
            key.clone(),
            InFlight {
                request_id,
                future: future.clone(),
                invalidated: false,
            },
        );
        debug!(key = %key, request_id, supersede, "Fetch started");
        future
    }
}

impl<T: Clone + Send + Sync + 'static> QueryCache<T> {
    /// Snapshot every entry that holds data
    pub fn dehydrate(&self) -> DehydratedState<T> {
        let queries = self
            .inner
            .entries
            .iter()
            .filter_map(|(key, entry)| match (entry.data, entry.fetched_at) {
                (Some(data), Some(fetched_at)) => Some(DehydratedQuery {
                    key: (*key).clone(),
                    data: (*data).clone(),
                    fetched_at,
                }),
                _ => None,
            })
            .collect();
        DehydratedState { queries }
    }

    /// Seed the cache from a snapshot. Entries already holding newer data are
    /// left alone. Returns the number of entries written.
    pub fn hydrate(&self, state: DehydratedState<T>) -> usize {
        let mut written = Vec::new();
        {
            let _registry = self.inner.registry();
            for query in state.queries {
                let mut entry = self.inner.entries.get(&query.key).unwrap_or_default();
                if entry.fetched_at.is_some_and(|at| at >= query.fetched_at) {
                    continue;
                }
                let age = (Utc::now() - query.fetched_at)
                    .to_std()
                    .unwrap_or(Duration::ZERO);
                let now = Instant::now();
                let updated_at = now.checked_sub(age).unwrap_or(now);
                entry.store(Arc::new(query.data), updated_at, query.fetched_at);
                self.inner.entries.insert(query.key.clone(), entry);
                written.push(query.key);
            }
        }
        for key in &written {
            self.inner.events.emit(key, CacheEventKind::Updated);
        }
        debug!(count = written.len(), "Query cache hydrated");
        written.len()
    }
}

/// RAII guard marking a key as observed. Observed keys are refetched when
/// invalidated.
pub struct Subscription<T> {
    inner: Arc<Inner<T>>,
    key: QueryKey,
}

impl<T> Subscription<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        let mut registry = self.inner.registry();
        let remaining = match registry.observers.get_mut(&self.key) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => return,
        };
        if remaining == 0 {
            registry.observers.remove(&self.key);
            registry.query_fns.remove(&self.key);
        }
    }
}
