//! Client-side query cache
//!
//! ## Modules
//!
//! - [`key`]: `QueryKey` (kind, search, page) and `QueryFilter`
//! - [`cache`]: `QueryCache`: freshness, deduplication, invalidation, hydration
//! - [`observer`]: `QueryObserver`: follows a changing key, keeps previous data
//! - [`events`]: `CacheEvent` broadcast for re-rendering hosts

pub mod cache;
pub mod events;
pub mod key;
pub mod observer;

pub use cache::{
    query_fn, CacheOptions, DehydratedQuery, DehydratedState, QueryCache, QueryError, QueryFn,
    QueryState, QueryStatus, Subscription,
};
pub use events::{CacheEvent, CacheEventBus, CacheEventKind};
pub use key::{EntityKind, QueryFilter, QueryKey};
pub use observer::QueryObserver;
