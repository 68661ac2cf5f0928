//! The cache as a chain strategy: first in line, answers from prior decisions.

use crate::key::cache_key;
use async_trait::async_trait;
use ragdecide_core::strategy::priority;
use ragdecide_core::{CacheTier, ClassificationResult, ConversationMemory, Strategy, StrategyError};
use std::sync::Arc;
use tracing::debug;

/// Strategy name reported for cache lookups.
pub const CACHE_STRATEGY_NAME: &str = "CacheLayer";

/// Looks the normalized query up in a cache tier.
///
/// Hits come back with `cache_hit = true` and the original producer's
/// `strategy_name`, so callers can tell which rule first decided.
pub struct CacheLayerStrategy {
    tier: Arc<dyn CacheTier>,
    enabled: bool,
}

impl CacheLayerStrategy {
    pub fn new(tier: Arc<dyn CacheTier>) -> Self {
        Self { tier, enabled: true }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn tier(&self) -> &Arc<dyn CacheTier> {
        &self.tier
    }
}

#[async_trait]
impl Strategy for CacheLayerStrategy {
    fn name(&self) -> &str {
        CACHE_STRATEGY_NAME
    }

    fn priority(&self) -> i32 {
        priority::CACHE
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn matches(
        &self,
        _query: &str,
        _memory: Option<&dyn ConversationMemory>,
    ) -> Result<bool, StrategyError> {
        Ok(self.tier.is_available())
    }

    async fn classify(
        &self,
        query: &str,
        _memory: Option<&dyn ConversationMemory>,
    ) -> Result<Option<ClassificationResult>, StrategyError> {
        let key = cache_key(query);
        let hit = self.tier.lookup(&key).await.map(ClassificationResult::into_cache_hit);
        debug!(tier = self.tier.name(), hit = hit.is_some(), "Cache lookup");
        Ok(hit)
    }
}
