//! Strategy chain: ordered, short-circuiting, fault-isolating.

use async_trait::async_trait;
use futures::FutureExt;
use ragdecide_core::{
    ClassificationResult, ConversationMemory, Result, StrategyError, StrategyRef, is_blank,
};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Anything that can run a classification pass end to end.
///
/// The orchestrator depends on this rather than on [`ClassificationChain`]
/// directly, so alternative executors can be plugged in.
#[async_trait]
pub trait ChainExecutor: Send + Sync {
    /// Produce a decision, or `None` when nothing matched.
    async fn execute(
        &self,
        query: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> Result<Option<ClassificationResult>>;
}

/// Strategies sorted ascending by priority, immutable after construction.
#[derive(Clone)]
pub struct ClassificationChain {
    strategies: Arc<[StrategyRef]>,
}

impl ClassificationChain {
    /// Assemble a chain. Disabled strategies are left out; equal priorities
    /// keep registration order.
    pub fn new(strategies: impl IntoIterator<Item = StrategyRef>) -> Self {
        let mut strategies: Vec<StrategyRef> = strategies
            .into_iter()
            .filter(|s| {
                if !s.enabled() {
                    debug!(strategy = %s.name(), "Strategy disabled, not added to chain");
                }
                s.enabled()
            })
            .collect();
        strategies.sort_by_key(|s| s.priority());

        let order: Vec<&str> = strategies.iter().map(|s| s.name()).collect();
        info!(count = strategies.len(), order = ?order, "Classification chain assembled");

        Self {
            strategies: strategies.into(),
        }
    }

    /// Strategies in evaluation order.
    pub fn strategies(&self) -> &[StrategyRef] {
        &self.strategies
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run strategies until one produces a decision.
    ///
    /// Blank queries short-circuit to the `EmptyQuery` decision. Errors and
    /// panics from a strategy are logged and the strategy is skipped.
    /// Returns `None` when every strategy passed.
    pub async fn run(
        &self,
        query: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> Option<ClassificationResult> {
        let started = Instant::now();

        if is_blank(query) {
            let mut result = ClassificationResult::empty_query();
            result.backfill_cost_time(started.elapsed());
            return Some(result);
        }

        for strategy in self.strategies.iter() {
            let name = strategy.name();

            let matched = std::panic::catch_unwind(AssertUnwindSafe(|| {
                strategy.matches(query, memory)
            }));
            match matched {
                Ok(Ok(true)) => {}
                Ok(Ok(false)) => continue,
                Ok(Err(e)) => {
                    warn!(strategy = %name, error = %e, "Strategy match check failed, skipping");
                    continue;
                }
                Err(payload) => {
                    let e = panicked(name, payload);
                    warn!(strategy = %name, error = %e, "Strategy panicked in match check, skipping");
                    continue;
                }
            }

            let outcome = AssertUnwindSafe(strategy.classify(query, memory))
                .catch_unwind()
                .await;
            match outcome {
                Ok(Ok(Some(mut result))) => {
                    result.backfill_cost_time(started.elapsed());
                    debug!(
                        strategy = %name,
                        decided_by = %result.strategy_name,
                        need_retrieval = result.need_retrieval,
                        confidence = result.confidence,
                        cache_hit = result.cache_hit,
                        "Strategy produced a decision"
                    );
                    return Some(result);
                }
                Ok(Ok(None)) => {
                    debug!(strategy = %name, "Strategy matched but produced no decision");
                }
                Ok(Err(e)) => {
                    warn!(strategy = %name, error = %e, "Strategy failed to classify, skipping");
                }
                Err(payload) => {
                    let e = panicked(name, payload);
                    warn!(strategy = %name, error = %e, "Strategy panicked while classifying, skipping");
                }
            }
        }

        debug!(strategies = self.strategies.len(), "No strategy produced a decision");
        None
    }
}

#[async_trait]
impl ChainExecutor for ClassificationChain {
    async fn execute(
        &self,
        query: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> Result<Option<ClassificationResult>> {
        Ok(self.run(query, memory).await)
    }
}

fn panicked(strategy: &str, payload: Box<dyn Any + Send>) -> StrategyError {
    StrategyError::Panicked {
        strategy: strategy.to_string(),
        message: panic_message(payload.as_ref()),
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragdecide_core::Strategy;
    use ragdecide_core::result::EMPTY_QUERY;
    use std::sync::Mutex;

    #[derive(Clone, Copy)]
    enum Behavior {
        Decide,
        NoMatch,
        MatchError,
        MatchPanic,
        ClassifyError,
        ClassifyPanic,
        ClassifyNone,
    }

    /// Scriptable strategy that counts its calls.
    struct MockStrategy {
        name: String,
        priority: i32,
        enabled: bool,
        behavior: Behavior,
        match_calls: Mutex<usize>,
        classify_calls: Mutex<usize>,
    }

    impl MockStrategy {
        fn new(name: &str, priority: i32, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name: name.into(),
                priority,
                enabled: true,
                behavior,
                match_calls: Mutex::new(0),
                classify_calls: Mutex::new(0),
            })
        }

        fn disabled(name: &str, priority: i32) -> Arc<Self> {
            Arc::new(Self {
                name: name.into(),
                priority,
                enabled: false,
                behavior: Behavior::Decide,
                match_calls: Mutex::new(0),
                classify_calls: Mutex::new(0),
            })
        }

        fn match_calls(&self) -> usize {
            *self.match_calls.lock().unwrap()
        }

        fn classify_calls(&self) -> usize {
            *self.classify_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Strategy for MockStrategy {
        fn name(&self) -> &str {
            &self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn enabled(&self) -> bool {
            self.enabled
        }

        fn matches(
            &self,
            _query: &str,
            _memory: Option<&dyn ConversationMemory>,
        ) -> std::result::Result<bool, StrategyError> {
            *self.match_calls.lock().unwrap() += 1;
            match self.behavior {
                Behavior::NoMatch => Ok(false),
                Behavior::MatchError => Err(StrategyError::MatchFailed {
                    strategy: self.name.clone(),
                    reason: "boom".into(),
                }),
                Behavior::MatchPanic => panic!("matches exploded"),
                _ => Ok(true),
            }
        }

        async fn classify(
            &self,
            _query: &str,
            _memory: Option<&dyn ConversationMemory>,
        ) -> std::result::Result<Option<ClassificationResult>, StrategyError> {
            *self.classify_calls.lock().unwrap() += 1;
            match self.behavior {
                Behavior::ClassifyError => Err(StrategyError::ClassifyFailed {
                    strategy: self.name.clone(),
                    reason: "boom".into(),
                }),
                Behavior::ClassifyPanic => panic!("classify exploded"),
                Behavior::ClassifyNone => Ok(None),
                _ => Ok(Some(ClassificationResult::retrieve(0.9, "mock", self.name.clone()))),
            }
        }
    }

    fn chain(strategies: Vec<Arc<MockStrategy>>) -> ClassificationChain {
        ClassificationChain::new(strategies.into_iter().map(|s| s as StrategyRef))
    }

    #[tokio::test]
    async fn blank_query_bypasses_strategies() {
        let a = MockStrategy::new("a", 1, Behavior::Decide);
        let chain = chain(vec![a.clone()]);
        for query in ["", "   ", "\t\n "] {
            let result = chain.run(query, None).await.unwrap();
            assert_eq!(result.strategy_name, EMPTY_QUERY);
            assert!(!result.need_retrieval);
            assert_eq!(result.confidence, 0.0);
            assert_eq!(result.reason, "query is empty");
            assert!(result.cost_time.is_some());
        }
        assert_eq!(a.match_calls(), 0);
    }

    #[tokio::test]
    async fn non_matching_strategy_is_not_classified() {
        let a = MockStrategy::new("a", 1, Behavior::NoMatch);
        let b = MockStrategy::new("b", 2, Behavior::Decide);
        let chain = chain(vec![b.clone(), a.clone()]);

        let result = chain.run("query", None).await.unwrap();
        assert_eq!(result.strategy_name, "b");
        assert!(result.cost_time.is_some());
        assert_eq!(a.match_calls(), 1);
        assert_eq!(a.classify_calls(), 0);
        assert_eq!(b.classify_calls(), 1);
    }

    #[tokio::test]
    async fn first_decision_short_circuits() {
        let a = MockStrategy::new("a", 1, Behavior::Decide);
        let b = MockStrategy::new("b", 2, Behavior::Decide);
        let chain = chain(vec![a.clone(), b.clone()]);

        assert_eq!(chain.run("query", None).await.unwrap().strategy_name, "a");
        assert_eq!(b.match_calls(), 0);
    }

    #[tokio::test]
    async fn faulty_strategies_are_skipped() {
        for behavior in [
            Behavior::MatchError,
            Behavior::MatchPanic,
            Behavior::ClassifyError,
            Behavior::ClassifyPanic,
            Behavior::ClassifyNone,
        ] {
            let bad = MockStrategy::new("bad", 1, behavior);
            let good = MockStrategy::new("good", 2, Behavior::Decide);
            let chain = chain(vec![bad, good.clone()]);

            let result = chain.run("query", None).await.unwrap();
            assert_eq!(result.strategy_name, "good");
            assert_eq!(good.classify_calls(), 1);
        }
    }

    #[tokio::test]
    async fn exhausted_chain_is_none() {
        let a = MockStrategy::new("a", 1, Behavior::NoMatch);
        let b = MockStrategy::new("b", 2, Behavior::ClassifyNone);
        let chain = chain(vec![a, b]);
        assert!(chain.run("query", None).await.is_none());
        assert!(chain.execute("query", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn disabled_strategies_excluded_at_assembly() {
        let off = MockStrategy::disabled("off", 0);
        let on = MockStrategy::new("on", 5, Behavior::Decide);
        let chain = chain(vec![off.clone(), on]);

        assert_eq!(chain.len(), 1);
        assert_eq!(chain.run("query", None).await.unwrap().strategy_name, "on");
        assert_eq!(off.match_calls(), 0);
    }

    #[tokio::test]
    async fn ties_keep_registration_order() {
        let first = MockStrategy::new("first", 3, Behavior::Decide);
        let second = MockStrategy::new("second", 3, Behavior::Decide);
        let early = MockStrategy::new("early", -1, Behavior::NoMatch);
        let chain = chain(vec![first, second, early]);

        let names: Vec<&str> = chain.strategies().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["early", "first", "second"]);
        assert_eq!(chain.run("query", None).await.unwrap().strategy_name, "first");
    }

    #[tokio::test]
    async fn preset_cost_time_is_kept() {
        struct Timed;

        #[async_trait]
        impl Strategy for Timed {
            fn name(&self) -> &str {
                "timed"
            }
            fn priority(&self) -> i32 {
                0
            }
            fn matches(
                &self,
                _query: &str,
                _memory: Option<&dyn ConversationMemory>,
            ) -> std::result::Result<bool, StrategyError> {
                Ok(true)
            }
            async fn classify(
                &self,
                _query: &str,
                _memory: Option<&dyn ConversationMemory>,
            ) -> std::result::Result<Option<ClassificationResult>, StrategyError> {
                let mut result = ClassificationResult::skip(0.9, "preset", "timed");
                result.cost_time = Some(std::time::Duration::from_secs(42));
                Ok(Some(result))
            }
        }

        let chain = ClassificationChain::new([Arc::new(Timed) as StrategyRef]);
        let result = chain.run("query", None).await.unwrap();
        assert_eq!(result.cost_time, Some(std::time::Duration::from_secs(42)));
    }

    #[test]
    fn panic_message_extracts_text() {
        let payload: Box<dyn Any + Send> = Box::new("static text");
        assert_eq!(panic_message(payload.as_ref()), "static text");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned text"));
        assert_eq!(panic_message(payload.as_ref()), "owned text");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
