//! Catch-all strategy: always matches, so an enabled fallback guarantees
//! the chain ends with a decision.

use async_trait::async_trait;
use ragdecide_core::strategy::priority;
use ragdecide_core::{ClassificationResult, ConversationMemory, Strategy, StrategyError};

/// Strategy name reported by the fallback.
pub const FALLBACK_NAME: &str = "Fallback";

/// Confidence of a fallback decision: low enough to stay out of the cache.
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

pub struct FallbackStrategy {
    default_retrieval: bool,
    enabled: bool,
}

impl FallbackStrategy {
    pub fn new(default_retrieval: bool) -> Self {
        Self {
            default_retrieval,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for FallbackStrategy {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl Strategy for FallbackStrategy {
    fn name(&self) -> &str {
        FALLBACK_NAME
    }

    fn priority(&self) -> i32 {
        priority::FALLBACK
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn matches(
        &self,
        _query: &str,
        _memory: Option<&dyn ConversationMemory>,
    ) -> Result<bool, StrategyError> {
        Ok(true)
    }

    async fn classify(
        &self,
        _query: &str,
        _memory: Option<&dyn ConversationMemory>,
    ) -> Result<Option<ClassificationResult>, StrategyError> {
        Ok(Some(ClassificationResult::new(
            self.default_retrieval,
            FALLBACK_CONFIDENCE,
            "no rule matched, using default policy",
            FALLBACK_NAME,
        )))
    }
}
