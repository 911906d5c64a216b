//! Redis Pub/Sub module.
//!
//! Carries committed room events from the API to every gateway instance.

mod channels;
mod publisher;
mod subscriber;

pub use channels::{
    PubSubChannel, BROADCAST_CHANNEL, ROOM_CHANNEL_PATTERN, ROOM_CHANNEL_PREFIX, USER_CHANNEL_PREFIX,
};
pub use publisher::{channel_for, EventTarget, PubSubEvent, Publisher};
pub use subscriber::{
    ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError,
    SubscriberResult,
};
