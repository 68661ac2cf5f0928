//! Retrieval rules: declarative, priority-ordered decisions.
//!
//! Rules let operators decide "retrieve" or "skip retrieval" for whole
//! families of queries through TOML config, without a code change:
//!
//! - "Greetings and thanks never need documents"
//! - "Anything mentioning a disease, symptom or drug must retrieve"
//! - "Follow-ups in a long conversation about treatment must retrieve"
//!
//! # Evaluation
//!
//! ```text
//! ┌─────────────┐    ┌──────────────┐    first true     ┌──────────────────┐
//! │  normalized  │───▶│ rules sorted │──── expression ──▶│ action → result  │
//! │    query     │    │ by priority  │                   │ strategy = rule  │
//! └─────────────┘    └──────────────┘                   └──────────────────┘
//! ```
//!
//! Exactly one rule explains each rule-sourced decision: evaluation stops at
//! the first matching rule.
//!
//! # Example Rule
//!
//! ```toml
//! [[rules]]
//! name = "force_retrieval"
//! priority = 2
//! description = "Domain terms always need the knowledge base"
//! expression = 'query CONTAINS_ANY ["symptom", "vaccine", "疫苗"]'
//! action = { effect = "retrieve", confidence = 0.95, reason = "contains domain keywords" }
//! ```

mod defaults;
mod engine;
mod model;
mod parser;

pub use defaults::default_rules;
pub use engine::{RULE_ENGINE_NAME, RuleEngine};
pub use model::{RuleAction, RuleDefinition, RuleEffect, RuleSet};
pub use parser::{Condition, EvalContext, parse_expression};

/// Re-export for convenience.
pub type RuleResult<T> = std::result::Result<T, RuleError>;

/// Errors from the rule subsystem.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },

    #[error("expression parse error in rule '{name}': {detail}")]
    ExpressionParseError { name: String, detail: String },

    #[error("rule file error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}
