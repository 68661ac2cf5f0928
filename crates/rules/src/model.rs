//! Rule data model: the types operators write in configuration.

use ragdecide_core::ClassificationResult;
use serde::{Deserialize, Serialize};

/// A set of rules loaded from configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    /// All rules, in declaration order.
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rules from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, crate::RuleError> {
        let set: RuleSet = toml::from_str(toml_str)?;
        set.validate()?;
        Ok(set)
    }

    /// Load rules from a TOML file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, crate::RuleError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Add a rule to the set.
    pub fn add(&mut self, rule: RuleDefinition) {
        self.rules.push(rule);
    }

    /// Validate all rules in the set.
    pub fn validate(&self) -> Result<(), crate::RuleError> {
        for rule in &self.rules {
            rule.validate()?;
        }
        Ok(())
    }

    /// Number of enabled rules.
    pub fn active_count(&self) -> usize {
        self.rules.iter().filter(|r| r.enabled).count()
    }
}

/// A single declarative predicate/action pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Unique name; becomes the `strategy_name` of decisions it produces.
    pub name: String,

    /// Lower values are evaluated first. Ties keep declaration order.
    #[serde(default)]
    pub priority: i32,

    /// Predicate over the normalized query and conversation memory.
    pub expression: String,

    /// Effect applied when the expression holds.
    pub action: RuleAction,

    /// Whether this rule is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Human-readable description of what the rule recognizes.
    #[serde(default)]
    pub description: String,
}

fn default_true() -> bool {
    true
}

impl RuleDefinition {
    pub fn new(
        name: impl Into<String>,
        priority: i32,
        expression: impl Into<String>,
        action: RuleAction,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            expression: expression.into(),
            action,
            enabled: true,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Validate that the rule is well-formed.
    pub fn validate(&self) -> Result<(), crate::RuleError> {
        if self.name.trim().is_empty() {
            return Err(crate::RuleError::InvalidRule {
                name: "(empty)".into(),
                reason: "rule name cannot be empty".into(),
            });
        }
        if self.expression.trim().is_empty() {
            return Err(crate::RuleError::InvalidRule {
                name: self.name.clone(),
                reason: "rule expression cannot be empty".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.action.confidence) {
            return Err(crate::RuleError::InvalidRule {
                name: self.name.clone(),
                reason: format!(
                    "action confidence {} is outside [0.0, 1.0]",
                    self.action.confidence
                ),
            });
        }
        crate::parse_expression(&self.expression).map_err(|e| {
            crate::RuleError::ExpressionParseError {
                name: self.name.clone(),
                detail: e,
            }
        })?;
        Ok(())
    }
}

/// What happens to the decision when a rule's expression holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleEffect {
    /// Downstream generation must retrieve documents first.
    Retrieve,
    /// Downstream generation can answer directly.
    SkipRetrieval,
}

impl std::str::FromStr for RuleEffect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "retrieve" => Ok(Self::Retrieve),
            "skip_retrieval" => Ok(Self::SkipRetrieval),
            other => Err(format!(
                "unknown effect \"{other}\", expected \"retrieve\" or \"skip_retrieval\""
            )),
        }
    }
}

impl std::fmt::Display for RuleEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retrieve => write!(f, "retrieve"),
            Self::SkipRetrieval => write!(f, "skip_retrieval"),
        }
    }
}

/// A structured action: an effect plus the confidence and reason to report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    pub effect: RuleEffect,
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
}

impl RuleAction {
    pub fn retrieve(confidence: f64, reason: impl Into<String>) -> Self {
        Self { effect: RuleEffect::Retrieve, confidence, reason: reason.into() }
    }

    pub fn skip(confidence: f64, reason: impl Into<String>) -> Self {
        Self { effect: RuleEffect::SkipRetrieval, confidence, reason: reason.into() }
    }

    /// Build the decision this action describes, attributed to `rule_name`.
    pub fn apply(&self, rule_name: &str) -> ClassificationResult {
        let reason = if self.reason.is_empty() {
            format!("rule '{rule_name}' matched")
        } else {
            self.reason.clone()
        };
        ClassificationResult::new(
            self.effect == RuleEffect::Retrieve,
            self.confidence,
            reason,
            rule_name,
        )
    }
}
