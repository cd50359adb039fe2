//! Scoped execution under a distributed lock.
//!
//! Wraps a unit of work so at most one holder runs a given logical operation
//! at a time, cluster-wide. The lock name is derived deterministically from
//! the operation name, and the lock is released unconditionally on every
//! exit path — normal return or work failure — before the outcome
//! propagates. The work is a first-class async closure, not a decorator, so
//! the release is tied to the scope rather than to interpreter machinery.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::warn;
use turnstile_core::StoreClient;
use turnstile_core::constants::LOCK_KEY_PREFIX;

use crate::error::GuardError;
use crate::lock::DistributedLock;
use crate::lock::LockConfig;

/// Runs work under at most one concurrently held lock per operation name.
pub struct ExecutionGuard<S: StoreClient + ?Sized> {
    lock: DistributedLock<S>,
}

impl<S: StoreClient + ?Sized> ExecutionGuard<S> {
    /// Create a guard with the default lock configuration.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            lock: DistributedLock::new(store),
        }
    }

    /// Create a guard with explicit lock configuration.
    pub fn with_config(store: Arc<S>, config: LockConfig) -> Self {
        Self {
            lock: DistributedLock::with_config(store, config),
        }
    }

    /// Run `work` under the lock for `operation`.
    ///
    /// The lock is held with `max_processing_time` as its lease; the lease is
    /// not renewed, so it must exceed the worst-case runtime of `work` or
    /// mutual exclusion is lost for the overrun.
    ///
    /// Fails with [`GuardError::Busy`] when another holder is active (after
    /// `blocking_timeout` in blocking mode). The work's own error is never
    /// suppressed: the lock is released first and the error propagates as
    /// [`GuardError::Work`]. A release failure after successful work
    /// surfaces as [`GuardError::Lock`]; after failed work it is only
    /// logged, since the work's error takes precedence.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &str,
        max_processing_time: Duration,
        blocking: bool,
        blocking_timeout: Option<Duration>,
        work: F,
    ) -> Result<T, GuardError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let name = format!("{LOCK_KEY_PREFIX}{operation}");
        let token = match self
            .lock
            .acquire(&name, max_processing_time, blocking, blocking_timeout)
            .await
        {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!(operation = %operation, "guarded operation already running elsewhere");
                return Err(GuardError::Busy {
                    operation: operation.to_string(),
                });
            }
            Err(source) => return Err(GuardError::Lock { source }),
        };

        debug!(operation = %operation, "guarded execution started");
        let outcome = work().await;
        let released = self.lock.release(&token).await;

        match outcome {
            Ok(value) => match released {
                Ok(_) => Ok(value),
                Err(source) => Err(GuardError::Lock { source }),
            },
            Err(source) => {
                if let Err(release_error) = released {
                    // The work's error takes precedence over the release failure.
                    warn!(operation = %operation, error = %release_error, "failed to release lock after work error");
                }
                Err(GuardError::Work { source })
            }
        }
    }
}
