//! Shared constants for store clients and coordination primitives.

/// Poll interval for blocking lock acquisition, in milliseconds.
pub const LOCK_POLL_INTERVAL_MS: u64 = 100;

/// Key prefix for locks derived from a logical operation name.
pub const LOCK_KEY_PREFIX: &str = "lock:";

/// Key prefix for rate limiter windows.
pub const RATE_LIMIT_KEY_PREFIX: &str = "rate_limit:";

/// Default queue name when none is given.
pub const DEFAULT_QUEUE_NAME: &str = "main";

/// Slack added to a rate limit window's key TTL, in seconds.
///
/// The window key self-expires after this much inactivity beyond the
/// window itself, so idle keys do not accumulate in the store.
pub const RATE_LIMIT_TTL_SLACK_SECS: u64 = 1;
