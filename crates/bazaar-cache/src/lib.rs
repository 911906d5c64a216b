//! # bazaar-cache
//!
//! Redis layer for realtime fanout.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Pub/Sub**: Room events published after commit and consumed by every gateway
//!
//! ## Example
//!
//! ```ignore
//! use bazaar_cache::{Publisher, RedisPool};
//! use bazaar_core::RoomEvent;
//!
//! let pool = RedisPool::from_config(&config.redis)?;
//! let publisher = Publisher::new(pool);
//!
//! // Message events go to `room:{id}`, directory events to `broadcast`
//! publisher.publish_room_event(&RoomEvent::message_deleted(room_id, message_id)).await?;
//! ```

pub mod pool;
pub mod pubsub;

// Re-export pool types
pub use pool::{redacted_url, RedisPool, RedisPoolError, RedisResult};

// Re-export pubsub types
pub use pubsub::{
    channel_for, EventTarget, PubSubChannel, PubSubEvent, Publisher, ReceivedMessage, Subscriber,
    SubscriberBuilder, SubscriberConfig, SubscriberError, SubscriberResult, BROADCAST_CHANNEL,
    ROOM_CHANNEL_PATTERN, ROOM_CHANNEL_PREFIX, USER_CHANNEL_PREFIX,
};
