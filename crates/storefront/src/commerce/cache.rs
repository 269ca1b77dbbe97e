//! Catalog response caching.
//!
//! Catalog reads are cached by a composite key of resource + identifying
//! parameters (the full [`ProductFilters`] set for listings, the handle for
//! details). Lookups go through `moka`'s `try_get_with`, which coalesces
//! concurrent loads: any number of simultaneous requests for the same key
//! result in exactly one backend fetch. Failed loads are not cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use super::ApiError;

/// Maximum cached entries per catalog resource.
const CACHE_CAPACITY: u64 = 1000;

/// Build a TTL-bounded catalog cache.
///
/// The TTL is short (60 seconds by default at the call sites) because the
/// catalog carries live inventory counts; staleness is tolerated only until
/// the next fetch cycle.
pub fn build<K, V>(ttl: Duration) -> Cache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .max_capacity(CACHE_CAPACITY)
        .time_to_live(ttl)
        .build()
}

/// Unwrap an error shared between coalesced callers.
///
/// `try_get_with` hands every waiter the same `Arc`-wrapped load error;
/// clone it out so callers see a plain [`ApiError`].
pub fn shared_error(err: &Arc<ApiError>) -> ApiError {
    err.as_ref().clone()
}
