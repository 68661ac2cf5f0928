//! Local tier: an in-process decision cache backed by moka.
//!
//! Bounded by entry count, every entry carries its own TTL. Safe for
//! concurrent get/insert/evict from many requests.

use async_trait::async_trait;
use moka::Expiry;
use moka::sync::Cache;
use ragdecide_core::{CacheError, CacheTier, ClassificationResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Clone)]
struct CachedDecision {
    result: ClassificationResult,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with.
struct PerEntryTtl;

impl Expiry<String, CachedDecision> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedDecision,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedDecision,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process decision cache.
pub struct LocalCache {
    cache: Cache<String, CachedDecision>,
    default_ttl: Duration,
}

impl LocalCache {
    /// Create a cache holding at most `max_entries` decisions.
    pub fn new(max_entries: u64, default_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache, default_ttl }
    }

    /// Number of entries currently in the cache (approximate until
    /// pending maintenance has run).
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invalidate all entries.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Run pending eviction and expiry work now.
    pub fn run_maintenance(&self) {
        self.cache.run_pending_tasks();
    }

    /// Evict expired and over-capacity entries on a fixed interval,
    /// independently of request traffic. Stops once the cache is dropped.
    pub fn spawn_janitor(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let Some(cache) = weak.upgrade() else { break };
                cache.run_maintenance();
            }
        })
    }
}

#[async_trait]
impl CacheTier for LocalCache {
    fn name(&self) -> &str {
        "local"
    }

    fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    async fn lookup(&self, key: &str) -> Option<ClassificationResult> {
        self.cache.get(key).map(|entry| entry.result)
    }

    async fn store(
        &self,
        key: &str,
        result: &ClassificationResult,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.cache.insert(
            key.to_string(),
            CachedDecision { result: result.clone(), ttl },
        );
        debug!(key, ttl_ms = ttl.as_millis() as u64, "Local cache write");
        Ok(())
    }
}
