//! Key/value backends for the distributed tier.

pub mod in_memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use in_memory::InMemoryKv;
#[cfg(feature = "redis")]
pub use self::redis::RedisBackend;
