//! Cache traits: where prior decisions are stored and found again.
//!
//! Two levels of abstraction:
//! - [`CacheBackend`]: a raw key/value store with expiry (Redis, in-process map).
//! - [`CacheTier`]: a store of [`ClassificationResult`]s keyed by normalized query.

use crate::error::CacheError;
use crate::result::ClassificationResult;
use async_trait::async_trait;
use std::time::Duration;

/// A shared key/value store holding opaque bytes with a time-to-live.
///
/// Implementations: Redis, in-process map (for testing and single-node use).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// The backend name (e.g., "redis", "in_memory").
    fn name(&self) -> &str;

    /// Fetch a value. `Ok(None)` on a miss.
    async fn get(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, CacheError>;

    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> std::result::Result<(), CacheError>;

    /// Remove a value. Returns whether something was removed.
    async fn delete(&self, key: &str) -> std::result::Result<bool, CacheError>;
}

/// A cache of classification decisions.
///
/// Lookups never fail: any fault is reported as a miss.
#[async_trait]
pub trait CacheTier: Send + Sync {
    /// Tier name for logs (e.g., "local", "distributed").
    fn name(&self) -> &str;

    /// Whether the tier can currently serve traffic.
    fn is_available(&self) -> bool {
        true
    }

    /// The default time-to-live for entries written to this tier.
    fn default_ttl(&self) -> Duration;

    /// Find a prior decision by normalized key.
    async fn lookup(&self, key: &str) -> Option<ClassificationResult>;

    /// Persist a decision under a normalized key.
    async fn store(
        &self,
        key: &str,
        result: &ClassificationResult,
        ttl: Duration,
    ) -> std::result::Result<(), CacheError>;
}
