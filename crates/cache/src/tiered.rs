//! Tier selection: distributed when configured and healthy, local otherwise.

use crate::distributed::DistributedCache;
use crate::local::LocalCache;
use async_trait::async_trait;
use ragdecide_core::{CacheError, CacheTier, ClassificationResult};
use std::sync::Arc;
use std::time::Duration;

/// Routes each operation to exactly one tier.
///
/// The two tiers are never consulted for the same operation, so a decision
/// written while the distributed tier is down lives only in the local tier.
pub struct TieredCache {
    local: Arc<LocalCache>,
    distributed: Option<Arc<DistributedCache>>,
}

impl TieredCache {
    pub fn new(local: Arc<LocalCache>, distributed: Option<Arc<DistributedCache>>) -> Self {
        Self { local, distributed }
    }

    /// A cache with only the local tier.
    pub fn local_only(local: Arc<LocalCache>) -> Self {
        Self::new(local, None)
    }

    pub fn local(&self) -> &Arc<LocalCache> {
        &self.local
    }

    pub fn distributed(&self) -> Option<&Arc<DistributedCache>> {
        self.distributed.as_ref()
    }

    /// The tier serving the next operation.
    pub fn active(&self) -> &dyn CacheTier {
        match &self.distributed {
            Some(distributed) if distributed.is_available() => distributed.as_ref(),
            _ => self.local.as_ref(),
        }
    }
}

#[async_trait]
impl CacheTier for TieredCache {
    fn name(&self) -> &str {
        self.active().name()
    }

    fn default_ttl(&self) -> Duration {
        self.active().default_ttl()
    }

    async fn lookup(&self, key: &str) -> Option<ClassificationResult> {
        self.active().lookup(key).await
    }

    async fn store(
        &self,
        key: &str,
        result: &ClassificationResult,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.active().store(key, result, ttl).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryKv;
    use ragdecide_core::CacheBackend;

    struct DownBackend;

    #[async_trait]
    impl CacheBackend for DownBackend {
        fn name(&self) -> &str {
            "down"
        }
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
        async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
    }

    fn local() -> Arc<LocalCache> {
        Arc::new(LocalCache::new(100, Duration::from_secs(300)))
    }

    fn decision() -> ClassificationResult {
        ClassificationResult::retrieve(0.95, "contains domain keywords", "force_retrieval")
    }

    #[tokio::test]
    async fn local_only_uses_local() {
        let cache = TieredCache::local_only(local());
        assert_eq!(cache.name(), "local");
        cache.store("k", &decision(), Duration::from_secs(60)).await.unwrap();
        assert!(cache.local().lookup("k").await.is_some());
    }

    #[tokio::test]
    async fn healthy_distributed_is_preferred() {
        let distributed = Arc::new(DistributedCache::new(
            Arc::new(InMemoryKv::new()),
            Duration::from_secs(600),
        ));
        let cache = TieredCache::new(local(), Some(distributed.clone()));
        assert_eq!(cache.name(), "distributed");
        assert_eq!(cache.default_ttl(), Duration::from_secs(600));

        cache.store("k", &decision(), Duration::from_secs(60)).await.unwrap();
        assert!(distributed.lookup("k").await.is_some());
        assert!(cache.local().lookup("k").await.is_none());
    }

    #[tokio::test]
    async fn unhealthy_distributed_falls_back_to_local() {
        let distributed = Arc::new(DistributedCache::new(
            Arc::new(DownBackend),
            Duration::from_secs(600),
        ));
        let cache = TieredCache::new(local(), Some(distributed));

        // First lookup hits the broken backend and trips the cool-down.
        assert!(cache.lookup("k").await.is_none());
        assert_eq!(cache.name(), "local");

        cache.store("k", &decision(), Duration::from_secs(60)).await.unwrap();
        assert!(cache.lookup("k").await.is_some());
    }
}
