//! Redis Pub/Sub publisher.
//!
//! Publishes committed room events to Redis for distribution to gateway sessions.

use bazaar_core::RoomEvent;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;

/// Event wrapper for Pub/Sub messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubEvent {
    /// Event type name (e.g., "message:new", "room:updated")
    pub event_type: String,
    /// Event payload
    pub data: Value,
    /// Optional target information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<EventTarget>,
}

/// Target information for event routing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventTarget {
    /// Room the event is scoped to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<Uuid>,
    /// User IDs to exclude from receiving this event
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub exclude_users: Vec<Uuid>,
}

impl PubSubEvent {
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            target: None,
        }
    }

    /// Wrap a room event, targeting its room
    #[must_use]
    pub fn from_room_event(event: &RoomEvent) -> Self {
        Self::new(event.event_type(), event.data()).with_target(EventTarget::room(event.room_id()))
    }

    #[must_use]
    pub fn with_target(mut self, target: EventTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Rebuild the room event, if this wraps one
    #[must_use]
    pub fn to_room_event(&self) -> Option<RoomEvent> {
        let mut tagged = self.data.as_object()?.clone();
        tagged.insert("type".into(), Value::from(self.event_type.as_str()));
        serde_json::from_value(Value::Object(tagged)).ok()
    }

    /// Whether `user_id` is excluded from delivery
    #[must_use]
    pub fn excludes(&self, user_id: Uuid) -> bool {
        self.target
            .as_ref()
            .is_some_and(|t| t.exclude_users.contains(&user_id))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl EventTarget {
    #[must_use]
    pub fn room(room_id: Uuid) -> Self {
        Self {
            room_id: Some(room_id),
            exclude_users: Vec::new(),
        }
    }

    /// Add user to exclude list
    #[must_use]
    pub fn exclude_user(mut self, user_id: Uuid) -> Self {
        self.exclude_users.push(user_id);
        self
    }
}

/// Channel a room event is published on
///
/// Directory events reach every session so room lists stay fresh; message
/// events only reach sessions watching that room.
#[must_use]
pub fn channel_for(event: &RoomEvent) -> PubSubChannel {
    if event.is_directory_event() {
        PubSubChannel::Broadcast
    } else {
        PubSubChannel::Room(event.room_id())
    }
}

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish an event to a channel
    pub async fn publish(&self, channel: &PubSubChannel, event: &PubSubEvent) -> RedisResult<u32> {
        let mut conn = self.pool.get().await?;
        let channel_name = channel.name();
        let payload = event.to_json()?;

        let receivers: u32 = conn.publish(&channel_name, &payload).await?;

        tracing::debug!(
            channel = %channel_name,
            event_type = %event.event_type,
            receivers = receivers,
            "Published event"
        );

        Ok(receivers)
    }

    /// Publish a committed room event on its routed channel
    pub async fn publish_room_event(&self, event: &RoomEvent) -> RedisResult<u32> {
        self.publish(&channel_for(event), &PubSubEvent::from_room_event(event))
            .await
    }

    /// Publish several room events over one connection
    pub async fn publish_room_events(&self, events: &[RoomEvent]) -> RedisResult<u32> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut conn = self.pool.get().await?;
        let mut total_receivers = 0;

        for event in events {
            let payload = PubSubEvent::from_room_event(event).to_json()?;
            let receivers: u32 = conn.publish(channel_for(event).name(), &payload).await?;
            total_receivers += receivers;
        }

        tracing::debug!(
            events = events.len(),
            total_receivers = total_receivers,
            "Published room events"
        );

        Ok(total_receivers)
    }
}
