//! Room events - emitted after a committed write changes a room or its messages
//!
//! These events are used for:
//! - Pushing realtime updates to connected sessions
//! - Letting clients refresh their room list

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::RoomKind;

/// Every event a room can emit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoomEvent {
    // =========================================================================
    // Directory Events
    // =========================================================================
    #[serde(rename = "room:created")]
    RoomCreated(RoomChange),
    #[serde(rename = "room:updated")]
    RoomUpdated(RoomChange),
    #[serde(rename = "room:deleted")]
    RoomDeleted(RoomChange),

    // =========================================================================
    // Message Events
    // =========================================================================
    #[serde(rename = "message:new")]
    MessageNew(MessageChange),
    #[serde(rename = "message:updated")]
    MessageUpdated(MessageChange),
    #[serde(rename = "message:deleted")]
    MessageDeleted(MessageRemoval),
}

impl RoomEvent {
    #[must_use]
    pub fn room_created(room_id: Uuid, kind: RoomKind) -> Self {
        Self::RoomCreated(RoomChange::new(room_id, kind))
    }

    #[must_use]
    pub fn room_updated(room_id: Uuid, kind: RoomKind) -> Self {
        Self::RoomUpdated(RoomChange::new(room_id, kind))
    }

    #[must_use]
    pub fn room_deleted(room_id: Uuid, kind: RoomKind) -> Self {
        Self::RoomDeleted(RoomChange::new(room_id, kind))
    }

    /// `message` is the client-facing message body
    #[must_use]
    pub fn message_new(room_id: Uuid, message_id: Uuid, message: Value) -> Self {
        Self::MessageNew(MessageChange::new(room_id, message_id, message))
    }

    #[must_use]
    pub fn message_updated(room_id: Uuid, message_id: Uuid, message: Value) -> Self {
        Self::MessageUpdated(MessageChange::new(room_id, message_id, message))
    }

    #[must_use]
    pub fn message_deleted(room_id: Uuid, message_id: Uuid) -> Self {
        Self::MessageDeleted(MessageRemoval {
            room_id,
            message_id,
            timestamp: Utc::now(),
        })
    }

    /// Get the event type name
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RoomCreated(_) => "room:created",
            Self::RoomUpdated(_) => "room:updated",
            Self::RoomDeleted(_) => "room:deleted",
            Self::MessageNew(_) => "message:new",
            Self::MessageUpdated(_) => "message:updated",
            Self::MessageDeleted(_) => "message:deleted",
        }
    }

    /// The room this event is scoped to
    #[must_use]
    pub fn room_id(&self) -> Uuid {
        match self {
            Self::RoomCreated(e) | Self::RoomUpdated(e) | Self::RoomDeleted(e) => e.room_id,
            Self::MessageNew(e) | Self::MessageUpdated(e) => e.room_id,
            Self::MessageDeleted(e) => e.room_id,
        }
    }

    /// Get the timestamp of the event
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::RoomCreated(e) | Self::RoomUpdated(e) | Self::RoomDeleted(e) => e.timestamp,
            Self::MessageNew(e) | Self::MessageUpdated(e) => e.timestamp,
            Self::MessageDeleted(e) => e.timestamp,
        }
    }

    /// Directory events change the room list rather than a room's content
    #[must_use]
    pub fn is_directory_event(&self) -> bool {
        matches!(
            self,
            Self::RoomCreated(_) | Self::RoomUpdated(_) | Self::RoomDeleted(_)
        )
    }

    /// Payload without the type tag
    #[must_use]
    pub fn data(&self) -> Value {
        let value = match self {
            Self::RoomCreated(e) | Self::RoomUpdated(e) | Self::RoomDeleted(e) => serde_json::to_value(e),
            Self::MessageNew(e) | Self::MessageUpdated(e) => serde_json::to_value(e),
            Self::MessageDeleted(e) => serde_json::to_value(e),
        };
        value.unwrap_or(Value::Null)
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomChange {
    pub room_id: Uuid,
    pub kind: RoomKind,
    pub timestamp: DateTime<Utc>,
}

impl RoomChange {
    fn new(room_id: Uuid, kind: RoomKind) -> Self {
        Self {
            room_id,
            kind,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageChange {
    pub room_id: Uuid,
    pub message_id: Uuid,
    pub message: Value,
    pub timestamp: DateTime<Utc>,
}

impl MessageChange {
    fn new(room_id: Uuid, message_id: Uuid, message: Value) -> Self {
        Self {
            room_id,
            message_id,
            message,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRemoval {
    pub room_id: Uuid,
    pub message_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_matches_serialized_tag() {
        let room = Uuid::new_v4();
        let events = [
            RoomEvent::room_created(room, RoomKind::Channel),
            RoomEvent::room_updated(room, RoomKind::Group),
            RoomEvent::room_deleted(room, RoomKind::Direct),
            RoomEvent::message_new(room, Uuid::new_v4(), json!({ "text": "hi" })),
            RoomEvent::message_updated(room, Uuid::new_v4(), json!({})),
            RoomEvent::message_deleted(room, Uuid::new_v4()),
        ];

        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["type"], json!(event.event_type()));
            assert_eq!(event.room_id(), room);
        }
    }

    #[test]
    fn test_directory_events() {
        let room = Uuid::new_v4();
        assert!(RoomEvent::room_updated(room, RoomKind::Channel).is_directory_event());
        assert!(!RoomEvent::message_deleted(room, Uuid::new_v4()).is_directory_event());
    }

    #[test]
    fn test_data_has_no_tag() {
        let event = RoomEvent::message_new(Uuid::new_v4(), Uuid::new_v4(), json!({ "text": "hi" }));
        let data = event.data();
        assert!(data.get("type").is_none());
        assert_eq!(data["message"]["text"], json!("hi"));
    }
}
