//! Configuration loading, validation, and management for ragdecide.
//!
//! Loads configuration from `~/.ragdecide/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.ragdecide/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Also run the legacy path and log disagreements
    #[serde(default)]
    pub compare_mode: bool,

    /// Route decisions through the strategy chain instead of the legacy path
    #[serde(default)]
    pub hybrid: HybridConfig,

    /// Decision caching
    #[serde(default)]
    pub cache: CacheConfig,

    /// Rule engine
    #[serde(default)]
    pub rule: RuleEngineConfig,

    /// Catch-all strategy
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Deadline and cache gate for a whole classification
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Keyword classifier used when the hybrid path is off
    #[serde(default)]
    pub legacy: LegacyConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HybridConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// Cache settings. The local tier is always available when caching is on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of decisions in the local tier
    #[serde(default = "default_max_size")]
    pub max_size: u64,

    /// Entry lifetime in minutes
    #[serde(default = "default_expire_minutes")]
    pub expire_minutes: u64,

    /// How often the local tier evicts expired entries, in seconds
    #[serde(default = "default_janitor_interval_secs")]
    pub janitor_interval_secs: u64,

    #[serde(default)]
    pub distributed: DistributedCacheConfig,
}

fn default_true() -> bool {
    true
}

fn default_max_size() -> u64 {
    1000
}

fn default_expire_minutes() -> u64 {
    5
}

/// Longest accepted entry lifetime: 30 days.
pub const MAX_EXPIRE_MINUTES: u64 = 30 * 24 * 60;

fn default_janitor_interval_secs() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size: default_max_size(),
            expire_minutes: default_expire_minutes(),
            janitor_interval_secs: default_janitor_interval_secs(),
            distributed: DistributedCacheConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Local entry lifetime.
    pub fn ttl(&self) -> Duration {
        minutes(self.expire_minutes)
    }

    pub fn janitor_interval(&self) -> Duration {
        Duration::from_secs(self.janitor_interval_secs)
    }

    /// Distributed entry lifetime, falling back to the local one.
    pub fn distributed_ttl(&self) -> Duration {
        self.distributed
            .expire_minutes
            .map(minutes)
            .unwrap_or_else(|| self.ttl())
    }
}

fn minutes(m: u64) -> Duration {
    Duration::from_secs(m.saturating_mul(60))
}

/// Shared cache tier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributedCacheConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Backend: "redis" or "memory"
    #[serde(default = "default_distributed_backend")]
    pub backend: String,

    /// Connection URL (e.g. `redis://127.0.0.1/`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Bound on a single backend call, in milliseconds
    #[serde(default = "default_distributed_timeout_ms")]
    pub timeout_ms: u64,

    /// How long the tier stays bypassed after a fault, in seconds
    #[serde(default = "default_retry_after_secs")]
    pub retry_after_secs: u64,

    /// Entry lifetime in minutes; `cache.expire_minutes` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_minutes: Option<u64>,
}

fn default_distributed_backend() -> String {
    "redis".into()
}

fn default_key_prefix() -> String {
    "rag:classifier:cache:".into()
}

fn default_distributed_timeout_ms() -> u64 {
    50
}

fn default_retry_after_secs() -> u64 {
    10
}

impl Default for DistributedCacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: default_distributed_backend(),
            url: None,
            key_prefix: default_key_prefix(),
            timeout_ms: default_distributed_timeout_ms(),
            retry_after_secs: default_retry_after_secs(),
            expire_minutes: None,
        }
    }
}

impl DistributedCacheConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_after(&self) -> Duration {
        Duration::from_secs(self.retry_after_secs)
    }
}

/// Rule engine settings. An empty rule list selects the built-in rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEngineConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl Default for RuleEngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: vec![],
        }
    }
}

/// Configuration for a single retrieval rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Unique name for this rule
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Priority (lower = evaluated first)
    #[serde(default)]
    pub priority: i32,

    /// Condition expression (e.g. `query CONTAINS_ANY ["hello", "thanks"]`)
    pub expression: String,

    /// Decision to return when the expression holds
    pub action: RuleActionConfig,

    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleActionConfig {
    /// "retrieve" or "skip_retrieval"
    pub effect: String,

    pub confidence: f64,

    #[serde(default)]
    pub reason: String,
}

/// Valid values of [`RuleActionConfig::effect`].
pub const RULE_EFFECTS: &[&str] = &["retrieve", "skip_retrieval"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Decision returned when nothing else matched
    #[serde(default = "default_true")]
    pub default_retrieval: bool,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_retrieval: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Deadline for one classification, in milliseconds
    #[serde(default = "default_orchestrator_timeout_ms")]
    pub timeout_ms: u64,

    /// Decisions below this confidence are never cached
    #[serde(default = "default_cache_min_confidence")]
    pub cache_min_confidence: f64,
}

fn default_orchestrator_timeout_ms() -> u64 {
    2000
}

fn default_cache_min_confidence() -> f64 {
    0.8
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_orchestrator_timeout_ms(),
            cache_min_confidence: default_cache_min_confidence(),
        }
    }
}

impl OrchestratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Keyword lists of the legacy classifier. Matching is case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyConfig {
    /// Any of these forces retrieval
    #[serde(default = "default_force_retrieval_keywords")]
    pub force_retrieval_keywords: Vec<String>,

    /// Any of these marks small talk, which skips retrieval
    #[serde(default = "default_skip_retrieval_keywords")]
    pub skip_retrieval_keywords: Vec<String>,

    /// Decision when no keyword matched
    #[serde(default = "default_true")]
    pub default_retrieval: bool,
}

fn default_force_retrieval_keywords() -> Vec<String> {
    [
        "疾病", "症状", "诊断", "治疗", "疫苗", "感染", "炎症", "手术", "药物",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_skip_retrieval_keywords() -> Vec<String> {
    ["你好", "谢谢", "再见", "哈哈"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            force_retrieval_keywords: default_force_retrieval_keywords(),
            skip_retrieval_keywords: default_skip_retrieval_keywords(),
            default_retrieval: true,
        }
    }
}

impl ClassifierConfig {
    /// Load configuration from the default path (~/.ragdecide/config.toml).
    ///
    /// Environment variables override the file:
    /// - `RAGDECIDE_HYBRID_ENABLED`
    /// - `RAGDECIDE_COMPARE_MODE`
    /// - `RAGDECIDE_CACHE_URL` (also enables the distributed tier)
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides read through `lookup` (normally the process environment).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("RAGDECIDE_HYBRID_ENABLED") {
            self.hybrid.enabled = parse_flag("RAGDECIDE_HYBRID_ENABLED", &value)?;
        }

        if let Some(value) = lookup("RAGDECIDE_COMPARE_MODE") {
            self.compare_mode = parse_flag("RAGDECIDE_COMPARE_MODE", &value)?;
        }

        if let Some(url) = lookup("RAGDECIDE_CACHE_URL").filter(|u| !u.trim().is_empty()) {
            self.cache.distributed.url = Some(url);
            self.cache.distributed.enabled = true;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ragdecide")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.orchestrator.cache_min_confidence;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ValidationError(
                "orchestrator.cache_min_confidence must be between 0.0 and 1.0".into(),
            ));
        }

        if self.orchestrator.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "orchestrator.timeout_ms must be > 0".into(),
            ));
        }

        if self.cache.enabled {
            if self.cache.max_size == 0 {
                return Err(ConfigError::ValidationError(
                    "cache.max_size must be > 0".into(),
                ));
            }
            if !(1..=MAX_EXPIRE_MINUTES).contains(&self.cache.expire_minutes) {
                return Err(ConfigError::ValidationError(format!(
                    "cache.expire_minutes must be between 1 and {MAX_EXPIRE_MINUTES}"
                )));
            }
            if self.cache.janitor_interval_secs == 0 {
                return Err(ConfigError::ValidationError(
                    "cache.janitor_interval_secs must be > 0".into(),
                ));
            }
        }

        let distributed = &self.cache.distributed;
        if distributed.enabled {
            if distributed.timeout_ms == 0 {
                return Err(ConfigError::ValidationError(
                    "cache.distributed.timeout_ms must be > 0".into(),
                ));
            }
            if distributed
                .expire_minutes
                .is_some_and(|m| !(1..=MAX_EXPIRE_MINUTES).contains(&m))
            {
                return Err(ConfigError::ValidationError(format!(
                    "cache.distributed.expire_minutes must be between 1 and {MAX_EXPIRE_MINUTES}"
                )));
            }
            if !matches!(distributed.backend.as_str(), "redis" | "memory") {
                return Err(ConfigError::ValidationError(format!(
                    "cache.distributed.backend must be \"redis\" or \"memory\", got \"{}\"",
                    distributed.backend
                )));
            }
        }

        for rule in &self.rule.rules {
            if !RULE_EFFECTS.contains(&rule.action.effect.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "rule '{}': unknown effect \"{}\" (expected one of {:?})",
                    rule.name, rule.action.effect, RULE_EFFECTS
                )));
            }
            if !(0.0..=1.0).contains(&rule.action.confidence) {
                return Err(ConfigError::ValidationError(format!(
                    "rule '{}': confidence must be between 0.0 and 1.0",
                    rule.name
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::ValidationError(format!(
            "{name} must be a boolean, got \"{other}\""
        ))),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
