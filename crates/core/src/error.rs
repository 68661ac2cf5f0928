//! Error types for the ragdecide domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. None of these ever leave
//! the orchestrator: they are logged and converted into decisions.

use thiserror::Error;

/// The top-level error type for all ragdecide operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Strategy errors ---
    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    // --- Cache errors ---
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Deadline ---
    #[error("Classification timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum StrategyError {
    #[error("match check failed in {strategy}: {reason}")]
    MatchFailed { strategy: String, reason: String },

    #[error("classification failed in {strategy}: {reason}")]
    ClassifyFailed { strategy: String, reason: String },

    #[error("strategy {strategy} panicked: {message}")]
    Panicked { strategy: String, message: String },
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Cache operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Cache tier unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_error_displays_correctly() {
        let err = Error::Strategy(StrategyError::ClassifyFailed {
            strategy: "RuleEngine".into(),
            reason: "bad predicate".into(),
        });
        assert!(err.to_string().contains("RuleEngine"));
        assert!(err.to_string().contains("bad predicate"));
    }

    #[test]
    fn cache_timeout_displays_millis() {
        let err = Error::Cache(CacheError::Timeout { timeout_ms: 50 });
        assert!(err.to_string().contains("50ms"));
    }
}
