//! Coordination primitives backed by a shared atomic key-value store.
//!
//! This crate provides three primitives that coordinate independent
//! processes through one authoritative store:
//!
//! - [`DistributedLock`] - Named mutual exclusion with a safety lease
//! - [`ExecutionGuard`] - Runs a unit of work under at most one held lock
//! - [`SlidingWindowLimiter`] - Per-key sliding-window admission control
//! - [`MessageQueue`] - Single-consumer FIFO over a named list
//!
//! All primitives are built on the [`turnstile_core::StoreClient`] trait's
//! atomic operations. Correctness depends entirely on the store's per-key
//! atomicity; no lock or window state is ever cached locally between calls.
//!
//! ## Lock Example
//!
//! ```ignore
//! use std::time::Duration;
//! use turnstile_coordination::DistributedLock;
//!
//! let lock = DistributedLock::new(store);
//! if let Some(token) = lock.try_acquire("reindex", Duration::from_secs(30)).await? {
//!     // Critical section; at most one owner_id holds "reindex" at any instant.
//!     lock.release(&token).await?;
//! }
//! ```
//!
//! ## Guard Example
//!
//! ```ignore
//! use turnstile_coordination::ExecutionGuard;
//!
//! let guard = ExecutionGuard::new(store);
//! let report = guard
//!     .run("nightly-report", Duration::from_secs(300), false, None, || async {
//!         build_report().await
//!     })
//!     .await?;
//! ```

mod error;
mod guard;
mod lock;
mod queue;
mod rate_limiter;
mod types;

pub use error::GuardError;
pub use error::LockError;
pub use error::QueueError;
pub use error::RateLimiterError;
pub use guard::ExecutionGuard;
pub use lock::DistributedLock;
pub use lock::LockConfig;
pub use queue::MessageQueue;
pub use rate_limiter::RateLimiterConfig;
pub use rate_limiter::SlidingWindowLimiter;
pub use types::LockToken;
pub use types::now_unix_ms;
