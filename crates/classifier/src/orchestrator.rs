//! The public entry point: one decision per query, always.

use crate::chain::{ChainExecutor, panic_message};
use futures::FutureExt;
use ragdecide_cache::cache_key;
use ragdecide_core::{CacheTier, ClassificationResult, ConversationMemory, Error};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Default deadline for a whole classification.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Default minimum confidence for a decision to be cached.
pub const DEFAULT_CACHE_MIN_CONFIDENCE: f64 = 0.8;

/// Runs the chain under a deadline and caches confident decisions.
///
/// [`classify`](Self::classify) never fails: errors, panics and timeouts
/// become the `ErrorFallback` decision, which favors retrieval. When the
/// chain matches nothing the explicit `NoStrategyMatched` decision is
/// returned instead.
pub struct Orchestrator {
    chain: Arc<dyn ChainExecutor>,
    cache: Option<Arc<dyn CacheTier>>,
    timeout: Duration,
    cache_min_confidence: f64,
    default_retrieval: bool,
}

impl Orchestrator {
    pub fn new(chain: Arc<dyn ChainExecutor>) -> Self {
        Self {
            chain,
            cache: None,
            timeout: DEFAULT_TIMEOUT,
            cache_min_confidence: DEFAULT_CACHE_MIN_CONFIDENCE,
            default_retrieval: true,
        }
    }

    /// Write confident decisions to `tier`.
    pub fn with_cache(mut self, tier: Arc<dyn CacheTier>) -> Self {
        self.cache = Some(tier);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_min_confidence(mut self, min_confidence: f64) -> Self {
        self.cache_min_confidence = min_confidence;
        self
    }

    /// Decision used when no strategy matched.
    pub fn with_default_retrieval(mut self, default_retrieval: bool) -> Self {
        self.default_retrieval = default_retrieval;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Classify a query.
    pub async fn classify(
        &self,
        query: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> ClassificationResult {
        let started = Instant::now();
        let run = AssertUnwindSafe(self.chain.execute(query, memory)).catch_unwind();

        match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(Ok(Some(mut result)))) => {
                result.backfill_cost_time(started.elapsed());
                self.store_if_confident(query, &result);
                result
            }
            Ok(Ok(Ok(None))) => {
                warn!(query, "No strategy matched, returning default decision");
                let mut result = ClassificationResult::no_strategy_matched(self.default_retrieval);
                result.cost_time = Some(started.elapsed());
                result
            }
            Ok(Ok(Err(e))) => {
                error!(query, error = %e, "Classification failed");
                ClassificationResult::error_fallback(e, started.elapsed())
            }
            Ok(Err(payload)) => {
                let e = Error::Internal(format!(
                    "classification panicked: {}",
                    panic_message(payload.as_ref())
                ));
                error!(query, error = %e, "Classification panicked");
                ClassificationResult::error_fallback(e, started.elapsed())
            }
            Err(_) => {
                let e = Error::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                };
                error!(query, error = %e, "Classification timed out");
                ClassificationResult::error_fallback(e, started.elapsed())
            }
        }
    }

    /// Persist the decision in the background if it passes the cache gate.
    fn store_if_confident(&self, query: &str, result: &ClassificationResult) {
        let Some(tier) = &self.cache else {
            return;
        };
        if !result.is_cacheable(self.cache_min_confidence) {
            return;
        }

        let tier = Arc::clone(tier);
        let key = cache_key(query);
        let result = result.clone();
        tokio::spawn(async move {
            let ttl = tier.default_ttl();
            match tier.store(&key, &result, ttl).await {
                Ok(()) => debug!(
                    tier = tier.name(),
                    strategy = %result.strategy_name,
                    "Decision cached"
                ),
                Err(e) => warn!(tier = tier.name(), error = %e, "Cache write dropped"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragdecide_core::result::{ERROR_FALLBACK, NO_STRATEGY_MATCHED};
    use ragdecide_core::{CacheError, Result};
    use std::sync::Mutex;

    enum Script {
        Return(Option<ClassificationResult>),
        Fail,
        Panic,
        Hang,
    }

    struct ScriptedChain {
        script: Script,
    }

    impl ScriptedChain {
        fn arc(script: Script) -> Arc<dyn ChainExecutor> {
            Arc::new(Self { script })
        }
    }

    #[async_trait]
    impl ChainExecutor for ScriptedChain {
        async fn execute(
            &self,
            _query: &str,
            _memory: Option<&dyn ConversationMemory>,
        ) -> Result<Option<ClassificationResult>> {
            // Guarantees a measurable elapsed time.
            tokio::time::sleep(Duration::from_millis(1)).await;
            match &self.script {
                Script::Return(result) => Ok(result.clone()),
                Script::Fail => Err(Error::Internal("rule store unreachable".into())),
                Script::Panic => panic!("chain exploded"),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(None)
                }
            }
        }
    }

    #[derive(Default)]
    enum StoreOutcome {
        #[default]
        Accept,
        Fail,
        Stall,
    }

    /// A cache tier that records write attempts.
    #[derive(Default)]
    struct RecordingTier {
        stores: Mutex<Vec<String>>,
        outcome: StoreOutcome,
    }

    impl RecordingTier {
        fn with_outcome(outcome: StoreOutcome) -> Self {
            Self {
                outcome,
                ..Self::default()
            }
        }

        fn store_count(&self) -> usize {
            self.stores.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CacheTier for RecordingTier {
        fn name(&self) -> &str {
            "recording"
        }
        fn default_ttl(&self) -> Duration {
            Duration::from_secs(60)
        }
        async fn lookup(&self, _key: &str) -> Option<ClassificationResult> {
            None
        }
        async fn store(
            &self,
            key: &str,
            _result: &ClassificationResult,
            _ttl: Duration,
        ) -> std::result::Result<(), CacheError> {
            self.stores.lock().unwrap().push(key.to_string());
            match self.outcome {
                StoreOutcome::Accept => Ok(()),
                StoreOutcome::Fail => Err(CacheError::Backend("write rejected".into())),
                StoreOutcome::Stall => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(())
                }
            }
        }
    }

    fn decided(confidence: f64) -> ClassificationResult {
        ClassificationResult::retrieve(confidence, "test", "rule")
    }

    async fn stores_for(result: ClassificationResult) -> usize {
        let tier = Arc::new(RecordingTier::default());
        let orchestrator = Orchestrator::new(ScriptedChain::arc(Script::Return(Some(result))))
            .with_cache(tier.clone());
        orchestrator.classify("query", None).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        tier.store_count()
    }

    #[tokio::test]
    async fn confidence_at_threshold_is_stored_once() {
        assert_eq!(stores_for(decided(0.8)).await, 1);
    }

    #[tokio::test]
    async fn confidence_below_threshold_is_not_stored() {
        assert_eq!(stores_for(decided(0.79)).await, 0);
    }

    #[tokio::test]
    async fn cache_hits_are_not_stored_again() {
        assert_eq!(stores_for(decided(1.0).into_cache_hit()).await, 0);
    }

    #[tokio::test]
    async fn failed_store_leaves_result_untouched() {
        let tier = Arc::new(RecordingTier::with_outcome(StoreOutcome::Fail));
        let orchestrator =
            Orchestrator::new(ScriptedChain::arc(Script::Return(Some(decided(0.9)))))
                .with_cache(tier.clone());

        let result = orchestrator.classify("query", None).await;
        assert_eq!(result.strategy_name, "rule");
        assert_eq!(result.confidence, 0.9);
        assert!(result.need_retrieval);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(tier.store_count(), 1);
    }

    #[tokio::test]
    async fn stalled_store_does_not_delay_result() {
        let tier = Arc::new(RecordingTier::with_outcome(StoreOutcome::Stall));
        let orchestrator =
            Orchestrator::new(ScriptedChain::arc(Script::Return(Some(decided(0.9)))))
                .with_cache(tier.clone());

        let started = std::time::Instant::now();
        let result = orchestrator.classify("query", None).await;
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(result.strategy_name, "rule");
        assert!(result.cost_time.is_some());
    }

    #[tokio::test]
    async fn stored_under_normalized_key() {
        let tier = Arc::new(RecordingTier::default());
        let orchestrator =
            Orchestrator::new(ScriptedChain::arc(Script::Return(Some(decided(0.9)))))
                .with_cache(tier.clone());
        orchestrator.classify("  Query ", None).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(tier.stores.lock().unwrap()[0], cache_key("query"));
    }

    #[tokio::test]
    async fn result_gets_cost_time() {
        let orchestrator =
            Orchestrator::new(ScriptedChain::arc(Script::Return(Some(decided(0.5)))));
        let result = orchestrator.classify("query", None).await;
        assert!(result.cost_time.is_some());
    }

    #[tokio::test]
    async fn chain_error_yields_error_fallback() {
        let orchestrator = Orchestrator::new(ScriptedChain::arc(Script::Fail));
        let result = orchestrator.classify("query", None).await;
        assert!(result.need_retrieval);
        assert_eq!(result.confidence, 0.3);
        assert_eq!(result.strategy_name, ERROR_FALLBACK);
        assert!(result.reason.starts_with("classification failed: "));
        assert!(result.reason.contains("rule store unreachable"));
        assert!(result.cost_time.unwrap() > Duration::ZERO);
    }

    #[tokio::test]
    async fn chain_panic_yields_error_fallback() {
        let orchestrator = Orchestrator::new(ScriptedChain::arc(Script::Panic));
        let result = orchestrator.classify("query", None).await;
        assert_eq!(result.strategy_name, ERROR_FALLBACK);
        assert!(result.reason.contains("chain exploded"));
        assert!(result.cost_time.unwrap() > Duration::ZERO);
    }

    #[tokio::test]
    async fn deadline_yields_error_fallback() {
        let orchestrator = Orchestrator::new(ScriptedChain::arc(Script::Hang))
            .with_timeout(Duration::from_millis(30));
        let result = orchestrator.classify("query", None).await;
        assert_eq!(result.strategy_name, ERROR_FALLBACK);
        assert!(result.reason.contains("timed out after 30ms"));
        assert!(result.cost_time.unwrap() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn no_match_is_explicit_and_not_cached() {
        let tier = Arc::new(RecordingTier::default());
        let orchestrator = Orchestrator::new(ScriptedChain::arc(Script::Return(None)))
            .with_cache(tier.clone())
            .with_cache_min_confidence(0.0)
            .with_default_retrieval(false);
        let result = orchestrator.classify("query", None).await;
        assert_eq!(result.strategy_name, NO_STRATEGY_MATCHED);
        assert!(!result.need_retrieval);
        assert_eq!(result.confidence, 0.0);
        assert!(result.cost_time.is_some());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(tier.store_count(), 0);
    }
}
