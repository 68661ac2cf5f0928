//! Cache keys derived from normalized queries.

use ragdecide_core::normalize_query;
use sha2::{Digest, Sha256};

/// Prefix of every cache key.
pub const KEY_PREFIX: &str = "query_classifier:";

/// Hash the normalized query into a fixed-length key.
///
/// Queries that differ only by casing or whitespace share a key.
pub fn cache_key(query: &str) -> String {
    let digest = Sha256::digest(normalize_query(query).as_bytes());
    format!("{KEY_PREFIX}{digest:x}")
}
