//! Rule engine: the first-match strategy over configured rules.
//!
//! The engine is built once from a list of [`RuleDefinition`]s and is
//! read-only afterwards; reloading means building a new engine.

use crate::model::{RuleDefinition, RuleSet};
use crate::parser::{Condition, EvalContext};
use async_trait::async_trait;
use ragdecide_core::strategy::priority;
use ragdecide_core::{
    ClassificationResult, ConversationMemory, Strategy, StrategyError, normalize_query,
};
use tracing::{debug, info, warn};

/// Strategy name of the rule engine itself.
pub const RULE_ENGINE_NAME: &str = "RuleEngine";

struct CompiledRule {
    definition: RuleDefinition,
    condition: Condition,
}

/// Evaluates enabled rules in ascending priority and stops at the first match.
///
/// Thread-safe without locking: the compiled rules never change.
pub struct RuleEngine {
    rules: Vec<CompiledRule>,
    enabled: bool,
    priority: i32,
}

impl RuleEngine {
    /// Compile the given rules.
    ///
    /// Disabled rules are dropped. Rules that fail validation are skipped
    /// with a warning so one bad rule cannot take the others down.
    pub fn new(definitions: Vec<RuleDefinition>) -> Self {
        let total = definitions.len();
        let mut rules: Vec<CompiledRule> = definitions
            .into_iter()
            .filter(|rule| rule.enabled)
            .filter_map(|rule| {
                if let Err(e) = rule.validate() {
                    warn!(rule = %rule.name, error = %e, "Skipping invalid rule");
                    return None;
                }
                // validate() already parsed the expression once.
                let condition = crate::parse_expression(&rule.expression).ok()?;
                Some(CompiledRule { definition: rule, condition })
            })
            .collect();

        // Stable: equal priorities keep declaration order.
        rules.sort_by_key(|r| r.definition.priority);

        for pair in rules.windows(2) {
            if pair[0].definition.priority == pair[1].definition.priority {
                warn!(
                    first = %pair[0].definition.name,
                    second = %pair[1].definition.name,
                    priority = pair[0].definition.priority,
                    "Rules share a priority, declaration order decides"
                );
            }
        }

        info!(loaded = rules.len(), declared = total, "Rule engine initialized");
        for rule in &rules {
            debug!(
                rule = %rule.definition.name,
                priority = rule.definition.priority,
                expression = %rule.definition.expression,
                "Rule loaded"
            );
        }

        Self {
            rules,
            enabled: true,
            priority: priority::RULES,
        }
    }

    /// Compile the rules of a [`RuleSet`].
    pub fn from_set(set: RuleSet) -> Self {
        Self::new(set.rules)
    }

    /// An engine over the built-in default rules.
    pub fn with_defaults() -> Self {
        Self::new(crate::default_rules())
    }

    /// Toggle the strategy on or off.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Override the chain priority of the engine.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Loaded rules in evaluation order.
    pub fn rules(&self) -> Vec<&RuleDefinition> {
        self.rules.iter().map(|r| &r.definition).collect()
    }

    /// Number of loaded rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply the first rule whose expression holds, if any.
    pub fn evaluate(
        &self,
        query: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> Option<ClassificationResult> {
        let normalized = normalize_query(query);
        let ctx = EvalContext::new(&normalized, query, memory);

        for rule in &self.rules {
            if rule.condition.evaluate(&ctx) {
                let result = rule.definition.action.apply(&rule.definition.name);
                debug!(
                    rule = %rule.definition.name,
                    need_retrieval = result.need_retrieval,
                    confidence = result.confidence,
                    "Rule matched"
                );
                return Some(result);
            }
        }

        debug!("No rule matched");
        None
    }
}

#[async_trait]
impl Strategy for RuleEngine {
    fn name(&self) -> &str {
        RULE_ENGINE_NAME
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
    ) -> Result<bool, StrategyError> {
        Ok(!self.rules.is_empty())
    }

    async fn classify(
        &self,
        query: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> Result<Option<ClassificationResult>, StrategyError> {
        Ok(self.evaluate(query, memory))
    }
}
