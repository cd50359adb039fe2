//! Error types for coordination primitives.
//!
//! Each primitive has its own error kind so callers can tell "resource busy"
//! (normal contention, rejection) apart from "infrastructure failure" (the
//! store is unreachable or misbehaving). Store failures are always wrapped
//! with the operation and key they happened on, and never swallowed.

use std::fmt;

use snafu::Snafu;
use turnstile_core::StoreError;

/// Store failure during lock acquire or release.
///
/// Contention is not an error: an un-acquired lock surfaces as `Ok(None)`
/// from [`DistributedLock::acquire`](crate::DistributedLock::acquire).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LockError {
    /// The store failed while operating on a lock key.
    #[snafu(display("lock {operation} failed for '{name}': {source}"))]
    Store {
        /// Which lock operation failed.
        operation: &'static str,
        /// The lock name.
        name: String,
        /// The underlying store error.
        source: StoreError,
    },
}

/// Error from an admission check.
///
/// A store failure means the admission state is *unknown*, not admitted and
/// not denied; the default posture is fail-closed (the error propagates, the
/// request is not admitted).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RateLimiterError {
    /// The store failed mid-check; admission state cannot be determined.
    #[snafu(display("rate limit {operation} failed for key '{key}': {source}"))]
    StorageUnavailable {
        /// Which step of the admission check failed.
        operation: &'static str,
        /// The logical key being limited.
        key: String,
        /// The underlying store error.
        source: StoreError,
    },

    /// The admission ceiling was reached (normal rejection, not a failure).
    #[snafu(display("rate limit exceeded for key '{key}'"))]
    Exceeded {
        /// The logical key being limited.
        key: String,
    },
}

/// Error from queue publish or consume.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum QueueError {
    /// The store failed while operating on the queue's list.
    #[snafu(display("queue {operation} failed for '{queue}': {source}"))]
    Storage {
        /// Which queue operation failed.
        operation: &'static str,
        /// The queue name.
        queue: String,
        /// The underlying store error.
        source: StoreError,
    },

    /// A payload could not be encoded or decoded.
    #[snafu(display("queue payload serialization failed for '{queue}': {source}"))]
    Serialization {
        /// The queue name.
        queue: String,
        /// The underlying error.
        source: serde_json::Error,
    },
}

/// Error from a guarded execution.
///
/// Discriminates the three ways a guarded call can fail so callers branch on
/// the kind instead of an exception hierarchy: the operation was already
/// running elsewhere, the lock infrastructure broke, or the work itself
/// failed (in which case the lock was still released first).
#[derive(Debug)]
pub enum GuardError<E> {
    /// Another holder is already running this operation.
    Busy {
        /// The contended operation name.
        operation: String,
    },
    /// Store failure while acquiring or releasing the lock.
    Lock {
        /// The underlying lock error.
        source: LockError,
    },
    /// The guarded work failed. The lock was released before propagation.
    Work {
        /// The error the work returned.
        source: E,
    },
}

impl<E> GuardError<E> {
    /// Returns `true` for normal contention (another holder was active).
    pub fn is_busy(&self) -> bool {
        matches!(self, GuardError::Busy { .. })
    }

    /// Returns the work's own error, if that is what failed.
    pub fn into_work(self) -> Option<E> {
        match self {
            GuardError::Work { source } => Some(source),
            _ => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for GuardError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardError::Busy { operation } => {
                write!(f, "operation '{}' is already running under another holder", operation)
            }
            GuardError::Lock { source } => write!(f, "guard lock failure: {}", source),
            GuardError::Work { source } => write!(f, "guarded work failed: {}", source),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for GuardError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GuardError::Busy { .. } => None,
            GuardError::Lock { source } => Some(source),
            GuardError::Work { source } => Some(source),
        }
    }
}
