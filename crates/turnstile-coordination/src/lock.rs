//! Distributed mutual-exclusion lock with a safety lease.
//!
//! Acquisition is a single conditional set-if-absent: the lock name becomes a
//! store key holding a fresh owner fingerprint, with the lease as the key's
//! TTL. The store enforces expiry itself, so a crashed holder's lock
//! self-deletes after the lease and unavailability is bounded by
//! `lease_duration` without any liveness detection.
//!
//! Known limitation: the lease is never renewed (no watchdog task). If the
//! protected work can outrun its lease, mutual exclusion is violated for the
//! overrun; choose a lease generously longer than the worst expected
//! critical-section duration.
//!
//! Fairness: blocking acquisition is a poll loop against the store, not a
//! wait queue. Among blocked competitors, any waiter may win any round;
//! there is no FIFO ticketing.

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use snafu::ResultExt;
use tracing::debug;
use tracing::trace;
use turnstile_core::StoreClient;
use turnstile_core::constants::LOCK_POLL_INTERVAL_MS;
use uuid::Uuid;

use crate::error::LockError;
use crate::error::StoreSnafu;
use crate::types::LockToken;

/// Configuration for a lock handle.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// How often blocking acquisition re-attempts the conditional set.
    pub poll_interval: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(LOCK_POLL_INTERVAL_MS),
        }
    }
}

/// Handle for acquiring and releasing named locks against one store.
///
/// An explicit handle, passed to every call site; there is no process-wide
/// lock-manager singleton. The handle holds no lock state of its own: every
/// check goes to the store.
pub struct DistributedLock<S: StoreClient + ?Sized> {
    store: Arc<S>,
    config: LockConfig,
}

impl<S: StoreClient + ?Sized> DistributedLock<S> {
    /// Create a lock handle with the default poll interval.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, LockConfig::default())
    }

    /// Create a lock handle with explicit configuration.
    pub fn with_config(store: Arc<S>, config: LockConfig) -> Self {
        Self { store, config }
    }

    /// Acquire the lock `name` for at most `lease`.
    ///
    /// Returns `Ok(None)` when the lock is held elsewhere and could not be
    /// acquired within the caller's bounds: immediately in non-blocking mode,
    /// or once `blocking_timeout` elapses in blocking mode (an unset timeout
    /// polls indefinitely). An abandoned blocking attempt leaves no state
    /// behind. `Err` is reserved for store failures.
    pub async fn acquire(
        &self,
        name: &str,
        lease: Duration,
        blocking: bool,
        blocking_timeout: Option<Duration>,
    ) -> Result<Option<LockToken>, LockError> {
        let deadline = blocking_timeout.map(|t| Instant::now() + t);

        loop {
            if let Some(token) = self.try_acquire(name, lease).await? {
                return Ok(Some(token));
            }
            if !blocking {
                return Ok(None);
            }
            let wait = match deadline {
                Some(d) => {
                    let now = Instant::now();
                    if now >= d {
                        trace!(name = %name, "blocking acquire timed out");
                        return Ok(None);
                    }
                    // Never sleep past the caller's deadline.
                    self.config.poll_interval.min(d - now)
                }
                None => self.config.poll_interval,
            };
            tokio::time::sleep(wait).await;
        }
    }

    /// Attempt a single non-blocking acquisition of `name`.
    ///
    /// Generates a fresh owner fingerprint and offers it to the store with
    /// the lease as TTL. Returns `Ok(None)` if the name is already held.
    pub async fn try_acquire(&self, name: &str, lease: Duration) -> Result<Option<LockToken>, LockError> {
        let owner_id = Uuid::new_v4().to_string();
        let acquired = self
            .store
            .set_if_absent(name, &owner_id, lease)
            .await
            .context(StoreSnafu {
                operation: "acquire",
                name,
            })?;

        if acquired {
            debug!(name = %name, owner_id = %owner_id, lease_ms = lease.as_millis() as u64, "lock acquired");
            Ok(Some(LockToken::new(name, owner_id, lease)))
        } else {
            trace!(name = %name, "lock contended");
            Ok(None)
        }
    }

    /// Release a previously acquired token.
    ///
    /// Deletes the lock key only if it still holds this token's owner id.
    /// If the lease already expired — and possibly another owner re-acquired
    /// the name — the release is a no-op: it never deletes another owner's
    /// lock, and releasing an expired token is safe and idempotent. Returns
    /// whether this call actually removed the lock.
    pub async fn release(&self, token: &LockToken) -> Result<bool, LockError> {
        let deleted = self
            .store
            .compare_and_delete(token.name(), token.owner_id())
            .await
            .context(StoreSnafu {
                operation: "release",
                name: token.name(),
            })?;

        if deleted {
            debug!(name = %token.name(), "lock released");
        } else {
            debug!(name = %token.name(), "release no-op: lease expired or re-acquired");
        }
        Ok(deleted)
    }
}
