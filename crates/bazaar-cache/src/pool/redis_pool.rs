//! Redis pool shared by the event publisher and readiness checks
//!
//! The pool is cheap to clone; every clone hands out connections from the
//! same deadpool instance.

use bazaar_common::RedisConfig;
use deadpool_redis::{Config, Pool, Runtime};

/// Errors from the Redis layer
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
    max_connections: usize,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("max_connections", &self.max_connections)
            .field("available", &self.pool.status().available)
            .finish()
    }
}

/// Host part of a Redis URL, with any credentials stripped
#[must_use]
pub fn redacted_url(url: &str) -> &str {
    url.rsplit_once('@').map_or(url, |(_, host)| host)
}

impl RedisPool {
    /// Build the pool; connections are opened lazily on first use
    pub fn from_config(config: &RedisConfig) -> RedisResult<Self> {
        let max_connections = usize::try_from(config.max_connections.max(1)).unwrap_or(1);

        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?
            .max_size(max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?;

        tracing::info!(url = %redacted_url(&config.url), max_connections, "Redis pool created");

        Ok(Self { pool, max_connections })
    }

    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(RedisPoolError::GetConnection)
    }

    #[must_use]
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Round-trip a PING; used by the API readiness endpoint
    pub async fn ping(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}
