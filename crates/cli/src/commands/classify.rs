//! `ragdecide classify`: Classify a single query.

use ragdecide_classifier::{HybridClassifier, HybridDecision, KeywordClassifier, orchestrator_from_config};
use ragdecide_core::{ConversationMemory, ConversationSnapshot, Turn};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub async fn run(
    config_path: Option<&Path>,
    query: &str,
    history: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let memory = history.map(load_history).transpose()?;
    if let Some(memory) = &memory {
        debug!(turns = memory.message_count(), "Loaded conversation history");
    }

    let orchestrator = orchestrator_from_config(&config).await?;
    let classifier = HybridClassifier::new(Arc::new(orchestrator), KeywordClassifier::new(&config.legacy))
        .with_hybrid_enabled(config.hybrid.enabled)
        .with_compare_mode(config.compare_mode);

    let decision = classifier
        .decide(query, memory.as_ref().map(|m| m as &dyn ConversationMemory))
        .await;
    info!(
        need_retrieval = decision.need_retrieval,
        classifier = ?decision.classifier,
        "Query classified"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        print!("{}", render(&decision));
    }
    Ok(())
}

/// Read a conversation from JSON: either a bare list of turns or an
/// object with a `turns` field.
pub fn load_history(path: &Path) -> Result<ConversationSnapshot, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read history file {}: {e}", path.display()))?;

    if let Ok(turns) = serde_json::from_str::<Vec<Turn>>(&content) {
        return Ok(ConversationSnapshot::new(turns));
    }
    let snapshot: ConversationSnapshot = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid history file {}: {e}", path.display()))?;
    Ok(snapshot)
}

fn render(decision: &HybridDecision) -> String {
    let mut out = format!(
        "need_retrieval: {}\nclassifier:     {:?}\n",
        decision.need_retrieval, decision.classifier
    );
    if let Some(result) = &decision.result {
        out.push_str(&format!("strategy:       {}\n", result.strategy_name));
        out.push_str(&format!("confidence:     {:.2}\n", result.confidence));
        out.push_str(&format!("reason:         {}\n", result.reason));
        out.push_str(&format!("cache_hit:      {}\n", result.cache_hit));
        if let Some(cost) = result.cost_time {
            out.push_str(&format!("cost:           {:.3}ms\n", cost.as_secs_f64() * 1000.0));
        }
    }
    if let Some(agree) = decision.paths_agree() {
        out.push_str(&format!("legacy_agrees:  {agree}\n"));
    }
    out
}
