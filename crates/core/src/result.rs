//! The decision value produced by every classification path.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Strategy name used for the blank-query short circuit.
pub const EMPTY_QUERY: &str = "EmptyQuery";

/// Strategy name used when the orchestrator swallows a failure or timeout.
pub const ERROR_FALLBACK: &str = "ErrorFallback";

/// Strategy name used when no strategy produced a decision.
pub const NO_STRATEGY_MATCHED: &str = "NoStrategyMatched";

/// Confidence attached to the fail-safe decision.
pub const ERROR_FALLBACK_CONFIDENCE: f64 = 0.3;

/// Whether a downstream generation step must retrieve documents first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Whether downstream RAG must run.
    pub need_retrieval: bool,

    /// Caller-facing trust level, always within `[0.0, 1.0]`.
    pub confidence: f64,

    /// Human-readable explanation. Diagnostic only.
    pub reason: String,

    /// The strategy (or rule) that produced this decision, or a sentinel.
    pub strategy_name: String,

    /// True only when the decision was served from a cache tier.
    #[serde(default)]
    pub cache_hit: bool,

    /// Time spent producing the decision. Back-filled once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_time: Option<Duration>,
}

impl ClassificationResult {
    /// Build a fully-populated decision. Confidence is clamped into `[0, 1]`;
    /// a NaN confidence collapses to `0.0`.
    pub fn new(
        need_retrieval: bool,
        confidence: f64,
        reason: impl Into<String>,
        strategy_name: impl Into<String>,
    ) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            need_retrieval,
            confidence,
            reason: reason.into(),
            strategy_name: strategy_name.into(),
            cache_hit: false,
            cost_time: None,
        }
    }

    /// A decision that asks for retrieval.
    pub fn retrieve(confidence: f64, reason: impl Into<String>, strategy: impl Into<String>) -> Self {
        Self::new(true, confidence, reason, strategy)
    }

    /// A decision that skips retrieval.
    pub fn skip(confidence: f64, reason: impl Into<String>, strategy: impl Into<String>) -> Self {
        Self::new(false, confidence, reason, strategy)
    }

    /// The blank-query sentinel.
    pub fn empty_query() -> Self {
        Self::skip(0.0, "query is empty", EMPTY_QUERY)
    }

    /// The fail-safe decision returned when classification failed or timed out.
    pub fn error_fallback(cause: impl std::fmt::Display, elapsed: Duration) -> Self {
        let mut result = Self::retrieve(
            ERROR_FALLBACK_CONFIDENCE,
            format!("classification failed: {cause}"),
            ERROR_FALLBACK,
        );
        result.cost_time = Some(elapsed);
        result
    }

    /// The explicit decision returned when the chain was exhausted.
    pub fn no_strategy_matched(default_retrieval: bool) -> Self {
        Self::new(default_retrieval, 0.0, "no strategy matched", NO_STRATEGY_MATCHED)
    }

    /// Mark this decision as served from cache.
    pub fn into_cache_hit(mut self) -> Self {
        self.cache_hit = true;
        self.cost_time = None;
        self
    }

    /// Set `cost_time` unless it is already populated. Returns whether it was set.
    pub fn backfill_cost_time(&mut self, elapsed: Duration) -> bool {
        if self.cost_time.is_some() {
            return false;
        }
        self.cost_time = Some(elapsed);
        true
    }

    /// Whether this decision may be written to a cache tier.
    pub fn is_cacheable(&self, min_confidence: f64) -> bool {
        !self.cache_hit && self.confidence >= min_confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(ClassificationResult::retrieve(1.7, "r", "s").confidence, 1.0);
        assert_eq!(ClassificationResult::retrieve(-0.2, "r", "s").confidence, 0.0);
        assert_eq!(ClassificationResult::retrieve(f64::NAN, "r", "s").confidence, 0.0);
    }

    #[test]
    fn cost_time_is_set_once() {
        let mut result = ClassificationResult::skip(0.9, "chat", "casual_chat");
        assert!(result.backfill_cost_time(Duration::from_millis(3)));
        assert!(!result.backfill_cost_time(Duration::from_millis(40)));
        assert_eq!(result.cost_time, Some(Duration::from_millis(3)));
    }

    #[test]
    fn empty_query_sentinel() {
        let result = ClassificationResult::empty_query();
        assert!(!result.need_retrieval);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.strategy_name, EMPTY_QUERY);
        assert_eq!(result.reason, "query is empty");
    }

    #[test]
    fn error_fallback_shape() {
        let result = ClassificationResult::error_fallback("boom", Duration::from_millis(2));
        assert!(result.need_retrieval);
        assert_eq!(result.confidence, ERROR_FALLBACK_CONFIDENCE);
        assert_eq!(result.strategy_name, ERROR_FALLBACK);
        assert_eq!(result.reason, "classification failed: boom");
        assert_eq!(result.cost_time, Some(Duration::from_millis(2)));
    }

    #[test]
    fn cacheability_gate() {
        let at_threshold = ClassificationResult::retrieve(0.8, "r", "s");
        assert!(at_threshold.is_cacheable(0.8));
        assert!(!ClassificationResult::retrieve(0.79, "r", "s").is_cacheable(0.8));
        assert!(!at_threshold.into_cache_hit().is_cacheable(0.8));
    }

    #[test]
    fn cache_hit_clears_cost_time() {
        let mut result = ClassificationResult::retrieve(0.95, "domain", "force_retrieval");
        result.backfill_cost_time(Duration::from_millis(9));
        let hit = result.into_cache_hit();
        assert!(hit.cache_hit);
        assert_eq!(hit.cost_time, None);
        assert_eq!(hit.strategy_name, "force_retrieval");
    }

    #[test]
    fn serialization_omits_unset_cost_time() {
        let result = ClassificationResult::skip(0.9, "chat", "casual_chat");
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("cost_time"));
        let back: ClassificationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
