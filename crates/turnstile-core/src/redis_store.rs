//! Redis-backed store client.
//!
//! Maps each [`StoreClient`] operation onto a single Redis command, except
//! compare-and-delete which needs a Lua script: Redis has no native
//! conditional DEL, and a GET followed by a DEL would race with lease expiry.
//!
//! Connections come from a `deadpool-redis` pool sized by
//! [`RedisSettings::max_connections`].

use std::time::Duration;

use async_trait::async_trait;
use snafu::ResultExt;
use tracing::debug;

use crate::error::CommandSnafu;
use crate::error::CreatePoolSnafu;
use crate::error::PoolSnafu;
use crate::error::StoreError;
use crate::settings::RedisSettings;
use crate::traits::StoreClient;

/// Delete KEYS[1] only if its value equals ARGV[1].
const COMPARE_AND_DELETE_SCRIPT: &str = r#"
if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("del", KEYS[1])
else
    return 0
end"#;

/// Pooled Redis implementation of [`StoreClient`].
pub struct RedisStore {
    pool: deadpool_redis::Pool,
    compare_and_delete_script: redis::Script,
}

impl RedisStore {
    /// Create a store client from connection settings.
    ///
    /// Builds the connection pool lazily; no connection is opened until the
    /// first operation runs.
    pub fn connect(settings: &RedisSettings) -> Result<Self, StoreError> {
        let url = settings.connection_url();
        let mut config = deadpool_redis::Config::from_url(&url);
        config.pool = Some(deadpool_redis::PoolConfig::new(settings.max_connections as usize));
        let pool = config
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .context(CreatePoolSnafu)?;
        debug!(url = %url, max_connections = settings.max_connections, "created redis store pool");
        Ok(Self {
            pool,
            compare_and_delete_script: redis::Script::new(COMPARE_AND_DELETE_SCRIPT),
        })
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, StoreError> {
        self.pool.get().await.context(PoolSnafu)
    }
}

#[async_trait]
impl StoreClient for RedisStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await
            .context(CommandSnafu { command: "SET", key })?;
        Ok(reply.is_some())
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let deleted: i64 = self
            .compare_and_delete_script
            .key(key)
            .arg(expected)
            .invoke_async(&mut conn)
            .await
            .context(CommandSnafu { command: "EVALSHA", key })?;
        Ok(deleted == 1)
    }

    async fn sorted_remove_range_by_score(&self, key: &str, min: f64, max: f64) -> Result<u64, StoreError> {
        let mut conn = self.connection().await?;
        redis::cmd("ZREMRANGEBYSCORE")
            .arg(key)
            .arg(min)
            .arg(max)
            .query_async(&mut conn)
            .await
            .context(CommandSnafu {
                command: "ZREMRANGEBYSCORE",
                key,
            })
    }

    async fn sorted_count(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.connection().await?;
        redis::cmd("ZCARD")
            .arg(key)
            .query_async(&mut conn)
            .await
            .context(CommandSnafu { command: "ZCARD", key })
    }

    async fn sorted_add(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _added: i64 = redis::cmd("ZADD")
            .arg(key)
            .arg(score)
            .arg(member)
            .query_async(&mut conn)
            .await
            .context(CommandSnafu { command: "ZADD", key })?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let set: i64 = redis::cmd("PEXPIRE")
            .arg(key)
            .arg(ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await
            .context(CommandSnafu { command: "PEXPIRE", key })?;
        Ok(set == 1)
    }

    async fn push_back(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let mut conn = self.connection().await?;
        redis::cmd("RPUSH")
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await
            .context(CommandSnafu { command: "RPUSH", key })
    }

    async fn pop_front(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        redis::cmd("LPOP")
            .arg(key)
            .query_async(&mut conn)
            .await
            .context(CommandSnafu { command: "LPOP", key })
    }
}
