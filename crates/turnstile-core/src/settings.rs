//! Connection settings for the Redis store client.

use serde::Deserialize;

/// Connection parameters for [`RedisStore`](crate::RedisStore).
///
/// Consumed opaquely by the store client; the coordination primitives never
/// inspect these values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Logical database index.
    pub db: i64,
    /// Use the RESP3 wire protocol instead of RESP2.
    pub resp3: bool,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            resp3: false,
            max_connections: 20,
        }
    }
}

impl RedisSettings {
    /// Render the connection URL for these settings.
    pub fn connection_url(&self) -> String {
        let mut url = format!("redis://{}:{}/{}", self.host, self.port, self.db);
        if self.resp3 {
            url.push_str("?protocol=resp3");
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_connection_url() {
        let settings = RedisSettings::default();
        assert_eq!(settings.connection_url(), "redis://localhost:6379/0");
    }

    #[test]
    fn test_resp3_connection_url() {
        let settings = RedisSettings {
            resp3: true,
            db: 2,
            ..Default::default()
        };
        assert_eq!(settings.connection_url(), "redis://localhost:6379/2?protocol=resp3");
    }

    #[test]
    fn test_deserialize_partial() {
        let settings: RedisSettings = serde_json::from_str(r#"{"host": "cache.internal", "db": 1}"#).unwrap();
        assert_eq!(settings.host, "cache.internal");
        assert_eq!(settings.port, 6379);
        assert_eq!(settings.db, 1);
        assert_eq!(settings.max_connections, 20);
    }
}
