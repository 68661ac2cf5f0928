//! Keyword classifier predating the strategy chain.
//!
//! Still serves traffic while `hybrid.enabled` is off, and acts as the
//! reference answer in compare mode.

use ragdecide_config::LegacyConfig;
use ragdecide_core::is_blank;
use tracing::debug;

/// Phrases asking for a generic explanation the model can give unaided.
const GENERAL_KNOWLEDGE_PATTERNS: &[&str] = &["什么是", "介绍一下", "简单说", "解释一下"];

/// Substring matcher over three keyword lists.
///
/// Checked in order: small talk skips retrieval, domain terms force it,
/// general-knowledge phrasing skips it, anything else gets the default.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    force_retrieval: Vec<String>,
    skip_retrieval: Vec<String>,
    default_retrieval: bool,
}

impl KeywordClassifier {
    pub fn new(config: &LegacyConfig) -> Self {
        Self {
            force_retrieval: lowercase_all(&config.force_retrieval_keywords),
            skip_retrieval: lowercase_all(&config.skip_retrieval_keywords),
            default_retrieval: config.default_retrieval,
        }
    }

    /// Whether `query` needs retrieval. Blank queries never do.
    pub fn needs_retrieval(&self, query: &str) -> bool {
        if is_blank(query) {
            return false;
        }
        let query = query.to_lowercase();

        if contains_any(&query, &self.skip_retrieval) {
            debug!(query = %query, "Legacy: casual chat, skipping retrieval");
            return false;
        }
        if contains_any(&query, &self.force_retrieval) {
            debug!(query = %query, "Legacy: domain keyword, retrieving");
            return true;
        }
        if GENERAL_KNOWLEDGE_PATTERNS.iter().any(|p| query.contains(p)) {
            debug!(query = %query, "Legacy: general knowledge, skipping retrieval");
            return false;
        }

        debug!(query = %query, default = self.default_retrieval, "Legacy: default policy");
        self.default_retrieval
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(&LegacyConfig::default())
    }
}

fn lowercase_all(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn contains_any(query: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| query.contains(k.as_str()))
}
