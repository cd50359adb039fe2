//! Shared types for coordination primitives.

use std::time::Duration;

/// Proof of lock ownership returned by a successful acquisition.
///
/// The owner id is an opaque fingerprint generated fresh at acquisition and
/// stored as the lock key's value. Release compares it against the stored
/// value, so a holder whose lease already expired can never delete a lock
/// that another owner has since acquired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken {
    name: String,
    owner_id: String,
    lease: Duration,
}

impl LockToken {
    pub(crate) fn new(name: impl Into<String>, owner_id: String, lease: Duration) -> Self {
        Self {
            name: name.into(),
            owner_id,
            lease,
        }
    }

    /// The lock name this token was acquired for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ownership fingerprint stored under the lock key.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// The lease the lock was acquired with.
    pub fn lease(&self) -> Duration {
        self.lease
    }
}

/// Get current Unix timestamp in milliseconds.
///
/// Returns 0 if system time is before UNIX epoch (should never happen
/// on properly configured systems, but prevents panics).
#[inline]
pub fn now_unix_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_accessors() {
        let token = LockToken::new("jobs", "owner-1".to_string(), Duration::from_secs(30));
        assert_eq!(token.name(), "jobs");
        assert_eq!(token.owner_id(), "owner-1");
        assert_eq!(token.lease(), Duration::from_secs(30));
    }

    #[test]
    fn test_now_unix_ms_is_recent() {
        // Some time in 2023 or later.
        assert!(now_unix_ms() > 1_600_000_000_000);
    }
}
