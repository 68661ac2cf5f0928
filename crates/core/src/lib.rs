//! # ragdecide Core
//!
//! Domain types, traits, and error definitions for the ragdecide
//! retrieval-decision engine. This crate does not depend on an async runtime; it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every seam is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping cache tiers and strategies via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod cache;
pub mod error;
pub mod memory;
pub mod query;
pub mod result;
pub mod strategy;

// Re-export key types at crate root for ergonomics
pub use cache::{CacheBackend, CacheTier};
pub use error::{CacheError, Error, Result, StrategyError};
pub use memory::{ConversationMemory, ConversationSnapshot, Role, Turn};
pub use query::{is_blank, normalize_query};
pub use result::ClassificationResult;
pub use strategy::{Strategy, StrategyRef};
