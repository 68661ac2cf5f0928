//! Decision caches for ragdecide.
//!
//! Two interchangeable tiers behind [`CacheTier`](ragdecide_core::CacheTier):
//! - [`LocalCache`]: bounded in-process map with per-entry TTL (moka).
//! - [`DistributedCache`]: a shared [`CacheBackend`](ragdecide_core::CacheBackend)
//!   reached with a short timeout; faults degrade to misses.
//!
//! [`TieredCache`] picks one of them per decision and
//! [`CacheLayerStrategy`] exposes lookups to the chain.

pub mod backend;
pub mod distributed;
pub mod key;
pub mod local;
pub mod strategy;
pub mod tiered;

pub use backend::InMemoryKv;
#[cfg(feature = "redis")]
pub use backend::RedisBackend;
pub use distributed::DistributedCache;
pub use key::{KEY_PREFIX, cache_key};
pub use local::LocalCache;
pub use strategy::{CACHE_STRATEGY_NAME, CacheLayerStrategy};
pub use tiered::TieredCache;
