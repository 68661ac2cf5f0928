//! `ragdecide config`: Configuration management commands.

use ragdecide_classifier::builder::build_rule_engine;
use ragdecide_config::ClassifierConfig;
use std::path::{Path, PathBuf};

pub async fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration at {}...", resolve(config_path).display());

    let config = match super::load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("   Config error: {e}");
            return Err(e.into());
        }
    };
    println!("   Config parsed successfully");

    let warnings = warnings(&config);
    if warnings.is_empty() {
        println!("   All checks passed");
    } else {
        println!();
        for w in &warnings {
            println!("   Warning: {w}");
        }
    }

    println!();
    println!("   Hybrid:        {}", on_off(config.hybrid.enabled));
    println!("   Compare mode:  {}", on_off(config.compare_mode));
    println!(
        "   Cache:         {} (max {}, {} min)",
        on_off(config.cache.enabled),
        config.cache.max_size,
        config.cache.expire_minutes
    );
    println!(
        "   Distributed:   {} ({})",
        on_off(config.cache.distributed.enabled),
        config.cache.distributed.backend
    );
    println!(
        "   Rules:         {} ({} configured)",
        on_off(config.rule.enabled),
        config.rule.rules.len()
    );
    println!(
        "   Fallback:      {} (default retrieval: {})",
        on_off(config.fallback.enabled),
        config.fallback.default_retrieval
    );
    println!("   Timeout:       {}ms", config.orchestrator.timeout_ms);

    Ok(())
}

pub async fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", resolve(config_path).display());
    Ok(())
}

fn resolve(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(ClassifierConfig::config_path)
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// Settings that load fine but probably do not do what was meant.
fn warnings(config: &ClassifierConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.fallback.enabled {
        warnings.push(
            "Fallback disabled: unmatched queries get the NoStrategyMatched decision".to_string(),
        );
    }

    if config.cache.distributed.enabled
        && config.cache.distributed.backend == "redis"
        && config.cache.distributed.url.is_none()
    {
        warnings.push("Distributed cache enabled without cache.distributed.url".to_string());
    }

    if config.compare_mode && !config.hybrid.enabled {
        warnings.push("compare_mode has no effect while hybrid.enabled = false".to_string());
    }

    match build_rule_engine(&config.rule) {
        Ok(engine) => {
            let declared = config.rule.rules.iter().filter(|r| r.enabled).count();
            if declared > engine.len() {
                warnings.push(format!(
                    "{} rule(s) failed validation and will be skipped (see `ragdecide rules validate`)",
                    declared - engine.len()
                ));
            }
        }
        Err(e) => warnings.push(e.to_string()),
    }

    warnings
}
