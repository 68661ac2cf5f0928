//! Strategy trait: a single pluggable decision rule.
//!
//! Strategies are assembled into a chain once at startup and evaluated in
//! ascending priority order. The first strategy that both matches and
//! produces a decision wins.
//!
//! Implementations: cache lookup, rule engine, fallback, plus anything a
//! caller registers.

use crate::error::StrategyError;
use crate::memory::ConversationMemory;
use crate::result::ClassificationResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Well-known priorities for the built-in strategies.
pub mod priority {
    /// Cache lookup always runs first.
    pub const CACHE: i32 = i32::MIN;
    /// The configurable rule engine.
    pub const RULES: i32 = 10;
    /// The catch-all fallback always runs last.
    pub const FALLBACK: i32 = i32::MAX;
}

/// The core Strategy trait.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Unique, stable identifier used in logs and results.
    fn name(&self) -> &str;

    /// Lower values are evaluated earlier.
    fn priority(&self) -> i32;

    /// Disabled strategies are excluded when the chain is assembled.
    fn enabled(&self) -> bool {
        true
    }

    /// Cheap, side-effect-free predicate.
    fn matches(
        &self,
        query: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> std::result::Result<bool, StrategyError>;

    /// Produce a decision. `Ok(None)` means "matched, but no decision".
    async fn classify(
        &self,
        query: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> std::result::Result<Option<ClassificationResult>, StrategyError>;
}

/// Shared handle to a strategy.
pub type StrategyRef = Arc<dyn Strategy>;
