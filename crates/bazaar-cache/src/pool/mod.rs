//! Redis connection pool

mod redis_pool;

pub use redis_pool::{redacted_url, RedisPool, RedisPoolError, RedisResult};
