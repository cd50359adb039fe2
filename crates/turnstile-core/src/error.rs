//! Error types for store clients.

use snafu::Snafu;

/// Errors from a store client.
///
/// Every failure carries the command and key it happened on, so callers can
/// tell *where* the store broke without parsing message strings.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    /// A store command failed.
    #[snafu(display("store command {command} failed for key '{key}': {source}"))]
    Command {
        /// The command that failed.
        command: &'static str,
        /// The key the command was addressed to.
        key: String,
        /// The underlying error.
        source: redis::RedisError,
    },

    /// The connection pool could not be created.
    #[snafu(display("failed to create store connection pool: {source}"))]
    CreatePool {
        /// The underlying error.
        source: deadpool_redis::CreatePoolError,
    },

    /// A connection could not be checked out of the pool.
    #[snafu(display("failed to get store connection from pool: {source}"))]
    Pool {
        /// The underlying error.
        source: deadpool_redis::PoolError,
    },

    /// The key holds a different kind of entry than the operation expects.
    #[snafu(display("wrong entry kind for key '{key}': expected {expected}"))]
    WrongKind {
        /// The key with the mismatched entry.
        key: String,
        /// The entry kind the operation expects.
        expected: &'static str,
    },
}
