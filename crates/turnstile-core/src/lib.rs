//! Store client abstraction for turnstile coordination primitives.
//!
//! This crate defines the [`StoreClient`] trait — the minimal set of atomic
//! key-value operations the coordination primitives are built on — together
//! with its implementations:
//!
//! - [`RedisStore`] - a pooled Redis-backed client for production use
//! - [`MemoryStore`] - a deterministic in-memory client for testing
//!
//! All coordination safety is delegated to per-key atomicity of the backing
//! store. The store is the single source of truth; callers never cache state
//! across calls.

pub mod constants;
mod error;
mod memory;
mod redis_store;
mod settings;
mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use settings::RedisSettings;
pub use traits::StoreClient;
