//! `ragdecide rules`: Inspect the retrieval rules.

use ragdecide_classifier::builder::rule_definition;
use ragdecide_config::ClassifierConfig;
use ragdecide_rules::{RuleDefinition, RuleEngine, default_rules};
use std::path::Path;
use tracing::warn;

/// List rules in evaluation order.
pub async fn list(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let (definitions, source) = configured_rules(&config)?;

    if !config.rule.enabled {
        println!("Rule engine is disabled (rule.enabled = false).\n");
    }

    let engine = RuleEngine::new(definitions.clone());
    println!(
        "Retrieval rules ({source}, {} of {} loaded):\n",
        engine.len(),
        definitions.len()
    );
    for (i, rule) in engine.rules().iter().enumerate() {
        println!(
            "  {}. {} (priority: {}, effect: {}, confidence: {:.2})",
            i + 1,
            rule.name,
            rule.priority,
            rule.action.effect,
            rule.action.confidence
        );
        if !rule.description.is_empty() {
            println!("     {}", rule.description);
        }
        println!("     expression: {}", rule.expression);
    }

    let skipped: Vec<&RuleDefinition> = definitions.iter().filter(|d| !d.enabled).collect();
    for rule in skipped {
        println!("  [OFF] {}", rule.name);
    }
    Ok(())
}

/// Validate every configured rule. Fails if any rule is invalid.
pub async fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let (definitions, source) = configured_rules(&config)?;

    let problems = problems(&definitions);
    if problems.is_empty() {
        println!("All {} rules are valid ({source}).", definitions.len());
        return Ok(());
    }

    for problem in &problems {
        warn!(problem = %problem, "Invalid rule");
        eprintln!("  {problem}");
    }
    Err(format!("{} of {} rules are invalid", problems.len(), definitions.len()).into())
}

/// Rules from configuration, or the built-in defaults when none are set.
fn configured_rules(
    config: &ClassifierConfig,
) -> Result<(Vec<RuleDefinition>, &'static str), Box<dyn std::error::Error>> {
    if config.rule.rules.is_empty() {
        return Ok((default_rules(), "built-in defaults"));
    }
    let definitions = config
        .rule
        .rules
        .iter()
        .map(rule_definition)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((definitions, "configured"))
}

fn problems(definitions: &[RuleDefinition]) -> Vec<String> {
    definitions
        .iter()
        .filter_map(|rule| rule.validate().err().map(|e| e.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragdecide_rules::RuleAction;

    #[test]
    fn defaults_used_when_none_configured() {
        let (rules, source) = configured_rules(&ClassifierConfig::default()).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(source, "built-in defaults");
        assert!(problems(&rules).is_empty());
    }

    #[test]
    fn invalid_rules_are_reported() {
        let rules = vec![
            RuleDefinition::new("ok", 1, r#"query CONTAINS "x""#, RuleAction::skip(0.9, "")),
            RuleDefinition::new("broken", 2, "query BADOP 3", RuleAction::skip(0.9, "")),
        ];
        let problems = problems(&rules);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("broken"));
    }
}
