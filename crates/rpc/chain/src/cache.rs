//! Block-number keyed LRU caches for derived block data.
//!
//! Leaders, signer sets and rendered staking-transaction lists are expensive
//! to compute but never change once a block is final, so each is cached by
//! block number. Entries are only ever inserted or evicted, never updated.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;

use alloy_primitives::Address;
use chainview_rpc_types::StakingTransactions;
use lru::LruCache;
use parking_lot::Mutex;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;
use tracing::debug;

use crate::signers::SignerData;

/// Default number of entries per cache.
pub const DEFAULT_CACHE_SIZE: usize = 2048;

/// Capacity of each derived-data cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub leader_cache_size: usize,
    pub signer_cache_size: usize,
    pub staking_tx_cache_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            leader_cache_size: DEFAULT_CACHE_SIZE,
            signer_cache_size: DEFAULT_CACHE_SIZE,
            staking_tx_cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct CacheLabels {
    pub cache: String,
}

/// Hit/miss counters, labeled by cache name.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    pub hits: Family<CacheLabels, Counter>,
    pub misses: Family<CacheLabels, Counter>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, cache: &str, hit: bool) {
        let labels = CacheLabels {
            cache: cache.to_string(),
        };
        if hit {
            self.hits.get_or_create(&labels).inc();
        } else {
            self.misses.get_or_create(&labels).inc();
        }
    }

    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "chainview_cache_hits",
            "Derived-data cache hits",
            self.hits.clone(),
        );
        registry.register(
            "chainview_cache_misses",
            "Derived-data cache misses",
            self.misses.clone(),
        );
    }
}

/// A bounded fetch-or-compute cache keyed by block number.
///
/// Concurrent misses on the same key may each run the computation; the first
/// value stored wins and later ones are discarded. The lock is never held
/// while computing.
pub struct DerivedCache<V> {
    name: &'static str,
    entries: Mutex<LruCache<u64, V>>,
    metrics: CacheMetrics,
}

impl<V: Clone> DerivedCache<V> {
    pub fn new(name: &'static str, capacity: usize, metrics: CacheMetrics) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            name,
            entries: Mutex::new(LruCache::new(capacity)),
            metrics,
        }
    }

    fn lookup(&self, key: u64) -> Option<V> {
        let found = self.entries.lock().get(&key).cloned();
        self.metrics.record(self.name, found.is_some());
        found
    }

    fn store(&self, key: u64, value: V) -> V {
        self.entries.lock().get_or_insert(key, || value).clone()
    }

    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// A failed computation is returned as-is and leaves the cache untouched.
    pub fn get_or_try_insert_with<F, E>(&self, key: u64, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.lookup(key) {
            return Ok(value);
        }
        debug!(cache = self.name, key, "cache miss");
        let value = f()?;
        Ok(self.store(key, value))
    }

    /// Async variant of [`get_or_try_insert_with`](Self::get_or_try_insert_with).
    pub async fn get_or_try_insert_with_async<F, Fut, E>(&self, key: u64, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.lookup(key) {
            return Ok(value);
        }
        debug!(cache = self.name, key, "cache miss");
        let value = f().await?;
        Ok(self.store(key, value))
    }

    /// Peek without touching recency or metrics.
    pub fn contains(&self, key: u64) -> bool {
        self.entries.lock().contains(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// The three derived-data caches owned by one query service.
pub struct BlockDataCache {
    pub leaders: DerivedCache<Address>,
    pub signers: DerivedCache<Arc<SignerData>>,
    pub staking_transactions: DerivedCache<Arc<StakingTransactions>>,
}

impl BlockDataCache {
    pub fn new(config: CacheConfig, metrics: CacheMetrics) -> Self {
        Self {
            leaders: DerivedCache::new("leader", config.leader_cache_size, metrics.clone()),
            signers: DerivedCache::new("signers", config.signer_cache_size, metrics.clone()),
            staking_transactions: DerivedCache::new(
                "staking_transactions",
                config.staking_tx_cache_size,
                metrics,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counted(cache: &DerivedCache<u64>, key: u64, calls: &Cell<u32>) -> Result<u64, String> {
        cache.get_or_try_insert_with(key, || {
            calls.set(calls.get() + 1);
            Ok(key * 10)
        })
    }

    #[test]
    fn test_hit_skips_compute() {
        let cache = DerivedCache::new("test", 4, CacheMetrics::new());
        let calls = Cell::new(0);

        assert_eq!(counted(&cache, 1, &calls), Ok(10));
        assert_eq!(counted(&cache, 1, &calls), Ok(10));
        assert_eq!(calls.get(), 1);
        assert!(cache.contains(1));
    }

    #[test]
    fn test_failure_not_cached() {
        let cache: DerivedCache<u64> = DerivedCache::new("test", 4, CacheMetrics::new());

        let err: Result<u64, &str> = cache.get_or_try_insert_with(7, || Err("upstream down"));
        assert_eq!(err, Err("upstream down"));
        assert!(!cache.contains(7));

        let ok: Result<u64, &str> = cache.get_or_try_insert_with(7, || Ok(70));
        assert_eq!(ok, Ok(70));
        assert!(cache.contains(7));
    }

    #[test]
    fn test_lru_eviction() {
        let cache = DerivedCache::new("test", 2, CacheMetrics::new());
        let calls = Cell::new(0);

        counted(&cache, 1, &calls).unwrap();
        counted(&cache, 2, &calls).unwrap();
        // Touch 1 so 2 becomes least recently used.
        counted(&cache, 1, &calls).unwrap();
        counted(&cache, 3, &calls).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(1));
        assert!(!cache.contains(2));
        assert!(cache.contains(3));
    }

    #[test]
    fn test_first_stored_value_wins() {
        let cache = DerivedCache::new("test", 4, CacheMetrics::new());
        // A racing computation that lands second is discarded.
        assert_eq!(cache.store(5, 1u64), 1);
        assert_eq!(cache.store(5, 2u64), 1);
    }

    #[test]
    fn test_metrics_record_hits_and_misses() {
        let metrics = CacheMetrics::new();
        let cache = DerivedCache::new("leader", 4, metrics.clone());
        let calls = Cell::new(0);

        counted(&cache, 1, &calls).unwrap();
        counted(&cache, 1, &calls).unwrap();
        counted(&cache, 1, &calls).unwrap();

        let labels = CacheLabels {
            cache: "leader".into(),
        };
        assert_eq!(metrics.hits.get_or_create(&labels).get(), 2);
        assert_eq!(metrics.misses.get_or_create(&labels).get(), 1);
    }

    #[tokio::test]
    async fn test_async_compute_and_hit() {
        let cache = DerivedCache::new("test", 4, CacheMetrics::new());
        let first: Result<u64, String> = cache
            .get_or_try_insert_with_async(9, || async { Ok(90) })
            .await;
        assert_eq!(first, Ok(90));
        let second: Result<u64, String> = cache
            .get_or_try_insert_with_async(9, || async { Err("must not run".to_string()) })
            .await;
        assert_eq!(second, Ok(90));
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let cache = DerivedCache::new("test", 0, CacheMetrics::new());
        let calls = Cell::new(0);
        counted(&cache, 1, &calls).unwrap();
        assert_eq!(cache.len(), 1);
    }
}
