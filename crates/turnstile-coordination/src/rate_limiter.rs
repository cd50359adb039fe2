//! Sliding-window rate limiter.
//!
//! Admission control per logical key, backed by a per-key ordered log of
//! request timestamps in the store. Each admitted request adds one entry
//! keyed by a fresh unique id and scored by its timestamp; entries older
//! than the window are pruned on every check and never count toward the
//! ceiling. Unique ids (not timestamps) are the entry keys, so multiple
//! requests within the same timestamp tick never collide.
//!
//! ## Admission is approximate under concurrency
//!
//! A check is a prune, a count, and a conditional insert — three store
//! operations, not one atomic step. Two callers racing on the same key can
//! both observe `count < max_requests` before either inserts, transiently
//! over-admitting by at most the number of concurrent racers. Exact
//! admission is guaranteed only under serialized access per key; callers
//! needing a hard ceiling must run the prune/count/insert sequence as a
//! single atomic script on the store.

use std::sync::Arc;
use std::time::Duration;

use snafu::ResultExt;
use tracing::debug;
use turnstile_core::StoreClient;
use turnstile_core::constants::RATE_LIMIT_KEY_PREFIX;
use turnstile_core::constants::RATE_LIMIT_TTL_SLACK_SECS;
use uuid::Uuid;

use crate::error::ExceededSnafu;
use crate::error::RateLimiterError;
use crate::error::StorageUnavailableSnafu;
use crate::types::now_unix_ms;

/// Configuration for a sliding-window limiter.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Admission ceiling within the window.
    pub max_requests: u64,
    /// Length of the trailing window.
    pub window: Duration,
}

impl RateLimiterConfig {
    /// Create a config admitting `max_requests` per `window`.
    pub fn new(max_requests: u64, window: Duration) -> Self {
        Self { max_requests, window }
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(3),
        }
    }
}

/// Sliding-window admission control per logical key.
pub struct SlidingWindowLimiter<S: StoreClient + ?Sized> {
    store: Arc<S>,
    config: RateLimiterConfig,
}

impl<S: StoreClient + ?Sized> SlidingWindowLimiter<S> {
    /// Create a limiter over the given store.
    pub fn new(store: Arc<S>, config: RateLimiterConfig) -> Self {
        Self { store, config }
    }

    /// Check whether a request for `key` is admitted right now.
    ///
    /// Admitted requests are recorded in the window; rejected ones are not.
    /// A store failure means the admission state is unknown and propagates
    /// as [`RateLimiterError::StorageUnavailable`] — fail-closed, the caller
    /// decides whether to override that posture.
    pub async fn admit(&self, key: &str) -> Result<bool, RateLimiterError> {
        let store_key = format!("{RATE_LIMIT_KEY_PREFIX}{key}");
        let now_ms = now_unix_ms();
        let window_start_ms = now_ms.saturating_sub(self.config.window.as_millis() as u64);

        // Entries at or before the window start are logically expired.
        self.store
            .sorted_remove_range_by_score(&store_key, 0.0, window_start_ms as f64)
            .await
            .context(StorageUnavailableSnafu { operation: "prune", key })?;

        let count = self
            .store
            .sorted_count(&store_key)
            .await
            .context(StorageUnavailableSnafu { operation: "count", key })?;

        if count >= self.config.max_requests {
            debug!(key = %key, count, max_requests = self.config.max_requests, "rate limit rejected");
            return Ok(false);
        }

        let entry_id = Uuid::new_v4().to_string();
        self.store
            .sorted_add(&store_key, &entry_id, now_ms as f64)
            .await
            .context(StorageUnavailableSnafu { operation: "insert", key })?;

        // The whole window self-expires after a little more than the window
        // of inactivity, so idle keys do not linger in the store.
        let ttl = self.config.window + Duration::from_secs(RATE_LIMIT_TTL_SLACK_SECS);
        self.store
            .expire(&store_key, ttl)
            .await
            .context(StorageUnavailableSnafu { operation: "expire", key })?;

        debug!(key = %key, count = count + 1, max_requests = self.config.max_requests, "rate limit admitted");
        Ok(true)
    }

    /// Admit or fail with [`RateLimiterError::Exceeded`].
    ///
    /// Convenience over [`admit`](Self::admit) for call sites that treat
    /// rejection as an error.
    pub async fn enforce(&self, key: &str) -> Result<(), RateLimiterError> {
        if self.admit(key).await? {
            Ok(())
        } else {
            ExceededSnafu { key }.fail()
        }
    }
}
