//! Switch between the orchestrated chain and the legacy keyword classifier.

use crate::legacy::KeywordClassifier;
use crate::orchestrator::Orchestrator;
use ragdecide_core::result::NO_STRATEGY_MATCHED;
use ragdecide_core::{ClassificationResult, ConversationMemory};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which path produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    Hybrid,
    Legacy,
}

/// A decision together with how it was reached.
#[derive(Debug, Clone, Serialize)]
pub struct HybridDecision {
    pub need_retrieval: bool,
    pub classifier: ClassifierKind,
    /// Full result when the orchestrated path ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ClassificationResult>,
    /// Legacy answer, present in compare mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_need_retrieval: Option<bool>,
}

impl HybridDecision {
    /// Whether both paths agreed. `None` outside compare mode.
    pub fn paths_agree(&self) -> Option<bool> {
        self.legacy_need_retrieval
            .map(|legacy| legacy == self.need_retrieval)
    }
}

pub struct HybridClassifier {
    orchestrator: Arc<Orchestrator>,
    legacy: KeywordClassifier,
    hybrid_enabled: bool,
    compare_mode: bool,
}

impl HybridClassifier {
    pub fn new(orchestrator: Arc<Orchestrator>, legacy: KeywordClassifier) -> Self {
        Self {
            orchestrator,
            legacy,
            hybrid_enabled: true,
            compare_mode: false,
        }
    }

    pub fn with_hybrid_enabled(mut self, enabled: bool) -> Self {
        self.hybrid_enabled = enabled;
        self
    }

    /// Also evaluate the legacy path and log disagreements. Never changes
    /// the returned decision.
    pub fn with_compare_mode(mut self, compare_mode: bool) -> Self {
        self.compare_mode = compare_mode;
        self
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    /// Whether `query` needs retrieval, by whichever path is active.
    pub async fn needs_retrieval(
        &self,
        query: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> bool {
        self.decide(query, memory).await.need_retrieval
    }

    /// The orchestrated decision, or `None` while the hybrid path is off.
    pub async fn classify(
        &self,
        query: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> Option<ClassificationResult> {
        if !self.hybrid_enabled {
            return None;
        }
        Some(self.orchestrator.classify(query, memory).await)
    }

    /// Decide and report which path answered.
    ///
    /// When the orchestrated chain matches nothing the legacy classifier
    /// answers instead.
    pub async fn decide(
        &self,
        query: &str,
        memory: Option<&dyn ConversationMemory>,
    ) -> HybridDecision {
        if !self.hybrid_enabled {
            debug!("Hybrid classification disabled, using legacy classifier");
            return HybridDecision {
                need_retrieval: self.legacy.needs_retrieval(query),
                classifier: ClassifierKind::Legacy,
                result: None,
                legacy_need_retrieval: None,
            };
        }

        let (result, legacy) = if self.compare_mode {
            let (result, legacy) = tokio::join!(self.orchestrator.classify(query, memory), async {
                self.legacy.needs_retrieval(query)
            });
            (result, Some(legacy))
        } else {
            (self.orchestrator.classify(query, memory).await, None)
        };

        if result.strategy_name == NO_STRATEGY_MATCHED {
            debug!(query, "No strategy matched, deferring to legacy classifier");
            let need_retrieval = legacy.unwrap_or_else(|| self.legacy.needs_retrieval(query));
            return HybridDecision {
                need_retrieval,
                classifier: ClassifierKind::Legacy,
                result: Some(result),
                legacy_need_retrieval: legacy,
            };
        }

        let decision = HybridDecision {
            need_retrieval: result.need_retrieval,
            classifier: ClassifierKind::Hybrid,
            result: Some(result),
            legacy_need_retrieval: legacy,
        };
        if legacy.is_some() {
            log_comparison(query, &decision);
        }
        decision
    }
}

fn log_comparison(query: &str, decision: &HybridDecision) {
    let Some(result) = &decision.result else {
        return;
    };
    let legacy = decision.legacy_need_retrieval.unwrap_or(decision.need_retrieval);
    let agree = legacy == decision.need_retrieval;

    info!(
        query,
        legacy,
        hybrid = decision.need_retrieval,
        agree,
        strategy = %result.strategy_name,
        confidence = result.confidence,
        "Compare mode"
    );
    if !agree {
        warn!(
            query,
            legacy,
            hybrid = decision.need_retrieval,
            strategy = %result.strategy_name,
            reason = %result.reason,
            "Compare mode: legacy and hybrid decisions differ"
        );
    }
}
