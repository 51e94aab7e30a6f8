//! Keyed lookup cache with in-flight deduplication.
//!
//! Built for slow, rarely changing lookups such as asset transfer-server
//! info: the first caller for a key starts the fetch, concurrent callers for
//! the same key await that same fetch, and a successful result is kept for
//! the lifetime of the cache. Failures are not cached, so the next caller
//! retries.
//!
//! There is no eviction. The key space is the set of assets a user holds,
//! which stays small. The owner decides the lifetime by deciding how long to
//! keep the cache around.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use tracing::trace;

use crate::transaction::types::Asset;

type InFlight<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

pub struct LookupCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    resolved: DashMap<String, V>,
    in_flight: DashMap<String, InFlight<V, E>>,
}

impl<V, E> LookupCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            resolved: DashMap::new(),
            in_flight: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.resolved.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: &str, value: V) {
        self.resolved.insert(key.to_string(), value);
    }

    pub fn invalidate(&self, key: &str) {
        self.resolved.remove(key);
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Number of fetches currently running.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Cached value for `key`, or the result of `fetch`.
    ///
    /// `fetch` is only called when no value is cached and no fetch for
    /// `key` is running already.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        // The entry guard must be gone before the await below.
        let lookup = match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                trace!(key, "joining in-flight lookup");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let lookup = fetch().boxed().shared();
                entry.insert(lookup.clone());
                lookup
            }
        };

        let result = lookup.clone().await;
        if let Ok(value) = &result {
            self.resolved.insert(key.to_string(), value.clone());
        }
        self.in_flight
            .remove_if(key, |_, running| running.ptr_eq(&lookup));
        result
    }
}

impl<V, E> Default for LookupCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Cache key for per-asset lookups: `<issuer><code>:<testnet|>`.
pub fn asset_cache_key(asset: &Asset, testnet: bool) -> String {
    format!(
        "{}{}:{}",
        asset.issuer().unwrap_or_default(),
        asset.code(),
        if testnet { "testnet" } else { "" }
    )
}

/// Key for a batch lookup of several assets at once.
pub fn batch_cache_key(assets: &[Asset], testnet: bool) -> String {
    assets
        .iter()
        .map(|asset| asset_cache_key(asset, testnet))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn concurrent_lookups_share_one_fetch() {
        let cache: LookupCache<String, String> = LookupCache::new();
        let fetches = Arc::new(AtomicUsize::new(0));

        let fetch = || {
            let fetches = Arc::clone(&fetches);
            async move {
                fetches.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, String>("https://transfer.example".to_string())
            }
        };

        let (a, b) = tokio::join!(cache.get_or_fetch("k", fetch), cache.get_or_fetch("k", fetch));
        assert_eq!(a.unwrap(), "https://transfer.example");
        assert_eq!(b.unwrap(), "https://transfer.example");
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(cache.pending(), 0);

        // Served from the resolved map from now on.
        cache.get_or_fetch("k", fetch).await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_retried() {
        let cache: LookupCache<u32, String> = LookupCache::new();
        let err = cache
            .get_or_fetch("k", || async { Err::<u32, _>("down".to_string()) })
            .await;
        assert_eq!(err, Err("down".to_string()));
        assert!(cache.is_empty());

        let ok = cache.get_or_fetch("k", || async { Ok::<_, String>(7) }).await;
        assert_eq!(ok, Ok(7));
        assert_eq!(cache.get("k"), Some(7));

        cache.invalidate("k");
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn asset_keys() {
        let eurt = Asset::credit("EURT", "Issuer");
        assert_eq!(asset_cache_key(&eurt, true), "IssuerEURT:testnet");
        assert_eq!(asset_cache_key(&eurt, false), "IssuerEURT:");
        assert_eq!(asset_cache_key(&Asset::Native, false), "native:");
        assert_eq!(
            batch_cache_key(&[eurt, Asset::Native], true),
            "IssuerEURT:testnet,native:testnet"
        );
    }
}
