//! Distributed tier: decisions shared across instances through a
//! [`CacheBackend`].
//!
//! Every backend call is bounded by a short timeout. Timeouts and errors
//! degrade to a miss (reads) or a dropped write, and mark the tier
//! unavailable for a cool-down period so callers fall back to the local tier.

use crate::key::KEY_PREFIX;
use async_trait::async_trait;
use ragdecide_core::{CacheBackend, CacheError, CacheTier, ClassificationResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default key prefix for shared deployments.
pub const DEFAULT_KEY_PREFIX: &str = "rag:classifier:cache:";

/// Default bound on a single backend call.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(50);

/// Default cool-down after a backend fault.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(10);

/// Decision cache over a shared key/value backend.
pub struct DistributedCache {
    backend: Arc<dyn CacheBackend>,
    key_prefix: String,
    default_ttl: Duration,
    op_timeout: Duration,
    retry_after: Duration,
    epoch: Instant,
    /// Milliseconds since `epoch` until which the tier is considered down.
    /// Zero means healthy.
    unhealthy_until: AtomicU64,
}

impl DistributedCache {
    pub fn new(backend: Arc<dyn CacheBackend>, default_ttl: Duration) -> Self {
        Self {
            backend,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            default_ttl,
            op_timeout: DEFAULT_OP_TIMEOUT,
            retry_after: DEFAULT_RETRY_AFTER,
            epoch: Instant::now(),
            unhealthy_until: AtomicU64::new(0),
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Remove a cached decision.
    pub async fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        let full_key = self.full_key(key);
        let outcome = self.bounded(self.backend.delete(&full_key)).await;
        self.observe(&outcome);
        outcome
    }

    /// The backend key: this tier's prefix replaces the local one.
    fn full_key(&self, key: &str) -> String {
        let digest = key.strip_prefix(KEY_PREFIX).unwrap_or(key);
        format!("{}{}", self.key_prefix, digest)
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn mark_unhealthy(&self) {
        let until = self.now_ms() + self.retry_after.as_millis() as u64;
        self.unhealthy_until.store(until.max(1), Ordering::Relaxed);
    }

    fn observe<T>(&self, outcome: &Result<T, CacheError>) {
        match outcome {
            Ok(_) => self.unhealthy_until.store(0, Ordering::Relaxed),
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    error = %e,
                    retry_after_ms = self.retry_after.as_millis() as u64,
                    "Distributed cache fault, falling back to local tier"
                );
                self.mark_unhealthy();
            }
        }
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, CacheError>
    where
        F: std::future::Future<Output = Result<T, CacheError>>,
    {
        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout {
                timeout_ms: self.op_timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait]
impl CacheTier for DistributedCache {
    fn name(&self) -> &str {
        "distributed"
    }

    fn is_available(&self) -> bool {
        let until = self.unhealthy_until.load(Ordering::Relaxed);
        until == 0 || self.now_ms() >= until
    }

    fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    async fn lookup(&self, key: &str) -> Option<ClassificationResult> {
        let full_key = self.full_key(key);
        let outcome = self.bounded(self.backend.get(&full_key)).await;
        self.observe(&outcome);

        let bytes = outcome.ok()??;
        match serde_json::from_slice::<ClassificationResult>(&bytes) {
            Ok(result) => Some(result),
            Err(e) => {
                debug!(key = %full_key, error = %e, "Undecodable cache entry, treating as miss");
                None
            }
        }
    }

    async fn store(
        &self,
        key: &str,
        result: &ClassificationResult,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let full_key = self.full_key(key);
        let payload = serde_json::to_vec(result)?;
        let outcome = self.bounded(self.backend.set(&full_key, payload, ttl)).await;
        self.observe(&outcome);
        if outcome.is_ok() {
            debug!(key = %full_key, ttl_ms = ttl.as_millis() as u64, "Distributed cache write");
        }
        outcome
    }
}
