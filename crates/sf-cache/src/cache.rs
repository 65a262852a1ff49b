//! Request cache with in-flight deduplication, built on moka
//!
//! One [`RequestCache`] guards one endpoint family. Per call:
//! - `force` skips both the cache and in-flight reuse, fetches, and overwrites the entry
//! - a fresh entry is returned without a fetch
//! - concurrent callers for the same key share a single fetch
//! - otherwise a new fetch runs and, on success, populates the entry
//!
//! Failures are never cached; the in-flight slot is released so the next
//! call retries cleanly.
//!
//! Entries are stored under a generation-tagged slot. Invalidation bumps the
//! generation, so a fetch that was already running when the cache was
//! invalidated stores into a slot no later lookup reads.

use crate::key::CacheKey;
use moka::future::Cache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Whether the caller wants cached data or a forced refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Bypass cache and in-flight reuse
    pub force: bool,
}

impl FetchOptions {
    /// Cached read (the default)
    #[inline]
    #[must_use]
    pub fn cached() -> Self {
        Self { force: false }
    }

    /// Forced refresh
    #[inline]
    #[must_use]
    pub fn forced() -> Self {
        Self { force: true }
    }
}

/// How the fetcher is being invoked; lets it tag forced refreshes on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Cache miss
    Cached,
    /// Caller asked for a forced refresh
    Forced,
}

impl FetchMode {
    /// Whether this fetch is a forced refresh
    #[inline]
    #[must_use]
    pub fn is_forced(self) -> bool {
        matches!(self, FetchMode::Forced)
    }
}

/// TTL and capacity for one cache family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Freshness window in milliseconds
    pub ttl_ms: u64,
    /// Maximum number of keys kept
    pub max_capacity: u64,
}

impl CacheSettings {
    /// Settings with the given TTL and default capacity
    #[inline]
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
            ..Self::default()
        }
    }

    /// With max capacity
    #[inline]
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// TTL as a duration
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_ms: 30_000,
            max_capacity: 1_000,
        }
    }
}

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of live entries
    pub entry_count: u64,
    /// Calls to [`RequestCache::get`]
    pub lookups: u64,
    /// Calls answered from a fresh entry
    pub hits: u64,
    /// Fetches started on a miss
    pub fetches: u64,
    /// Fetches started by a forced refresh
    pub forced_fetches: u64,
}

#[derive(Debug, Default)]
struct Counters {
    lookups: AtomicU64,
    hits: AtomicU64,
    fetches: AtomicU64,
    forced_fetches: AtomicU64,
}

/// Storage key: the caller's key plus the generations it was read under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Slot {
    family_generation: u64,
    key_generation: u64,
    key: CacheKey,
}

/// Short-TTL cache guarding one endpoint family
///
/// Cloning shares the underlying storage.
#[derive(Clone)]
pub struct RequestCache<V> {
    family: &'static str,
    settings: CacheSettings,
    inner: Cache<Slot, V>,
    counters: Arc<Counters>,
    generation: Arc<AtomicU64>,
    // only keys invalidated individually since the last family invalidation
    key_generations: Arc<Mutex<HashMap<CacheKey, u64>>>,
}

impl<V> RequestCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache for `family`
    #[must_use]
    pub fn new(family: &'static str, settings: CacheSettings) -> Self {
        let inner = Cache::builder()
            .name(family)
            .max_capacity(settings.max_capacity)
            .time_to_live(settings.ttl())
            .build();
        Self {
            family,
            settings,
            inner,
            counters: Arc::new(Counters::default()),
            generation: Arc::new(AtomicU64::new(0)),
            key_generations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Family name
    #[inline]
    #[must_use]
    pub fn family(&self) -> &'static str {
        self.family
    }

    /// Configured settings
    #[inline]
    #[must_use]
    pub fn settings(&self) -> CacheSettings {
        self.settings
    }

    /// Get the value for `key`, fetching it when needed
    ///
    /// `fetch` is invoked at most once per call, and only when this call is
    /// the one that must reach the network.
    ///
    /// # Errors
    /// Whatever `fetch` returns; concurrent callers coalesced onto a failing
    /// fetch all receive a clone of its error.
    pub async fn get<E, F, Fut>(
        &self,
        key: CacheKey,
        options: FetchOptions,
        fetch: F,
    ) -> Result<V, E>
    where
        E: Clone + Send + Sync + 'static,
        F: FnOnce(FetchMode) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.counters.lookups.fetch_add(1, Ordering::Relaxed);
        let slot = self.slot(&key);

        if options.force {
            self.counters.forced_fetches.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(family = self.family, %key, "forced refresh");
            let value = fetch(FetchMode::Forced).await.map_err(|err| {
                tracing::warn!(family = self.family, %key, "forced refresh failed");
                err
            })?;
            self.inner.insert(slot, value.clone()).await;
            return Ok(value);
        }

        if let Some(value) = self.inner.get(&slot).await {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(family = self.family, %key, "cache hit");
            return Ok(value);
        }

        let counters = Arc::clone(&self.counters);
        let family = self.family;
        self.inner
            .try_get_with(slot, async move {
                counters.fetches.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(family, %key, "cache miss, fetching");
                fetch(FetchMode::Cached).await
            })
            .await
            .map_err(|err: Arc<E>| {
                tracing::warn!(family = self.family, "fetch failed, not cached");
                E::clone(&err)
            })
    }

    /// Peek at a fresh entry without fetching
    #[inline]
    pub async fn peek(&self, key: &CacheKey) -> Option<V> {
        self.inner.get(&self.slot(key)).await
    }

    /// Drop every entry of this family
    ///
    /// Fetches already in flight still complete for their callers, but their
    /// results are not visible to later lookups.
    pub fn invalidate(&self) {
        tracing::debug!(family = self.family, "invalidating cache family");
        let mut key_generations = self.key_generations.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        key_generations.clear();
        self.inner.invalidate_all();
    }

    /// Drop a single entry, including a fetch for it that is still in flight
    pub async fn invalidate_key(&self, key: &CacheKey) {
        let stale = {
            let mut key_generations = self.key_generations.lock();
            let stale = Slot {
                family_generation: self.generation.load(Ordering::Acquire),
                key_generation: key_generations.get(key).copied().unwrap_or(0),
                key: key.clone(),
            };
            key_generations.insert(key.clone(), stale.key_generation + 1);
            stale
        };
        self.inner.invalidate(&stale).await;
    }

    fn slot(&self, key: &CacheKey) -> Slot {
        let key_generations = self.key_generations.lock();
        Slot {
            family_generation: self.generation.load(Ordering::Acquire),
            key_generation: key_generations.get(key).copied().unwrap_or(0),
            key: key.clone(),
        }
    }

    /// Current statistics
    pub async fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks().await;
        CacheStats {
            entry_count: self.inner.entry_count(),
            lookups: self.counters.lookups.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            forced_fetches: self.counters.forced_fetches.load(Ordering::Relaxed),
        }
    }
}

impl<V> std::fmt::Debug for RequestCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCache")
            .field("family", &self.family)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
