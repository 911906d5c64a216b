//! Pub/Sub channel definitions.
//!
//! Defines the channel naming conventions for Redis Pub/Sub.

use uuid::Uuid;

/// Channel prefix for events scoped to one room
pub const ROOM_CHANNEL_PREFIX: &str = "room:";
/// Pattern matching every room channel
pub const ROOM_CHANNEL_PATTERN: &str = "room:*";
/// Channel prefix for user-specific events
pub const USER_CHANNEL_PREFIX: &str = "user:";
/// Channel for broadcast events (all connected clients)
pub const BROADCAST_CHANNEL: &str = "broadcast";

/// Pub/Sub channel types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Message events of one room
    Room(Uuid),
    /// Events for a specific user (their live session)
    User(Uuid),
    /// Room directory changes, delivered to every connected client
    Broadcast,
    /// Custom channel name
    Custom(String),
}

impl PubSubChannel {
    #[must_use]
    pub fn room(room_id: Uuid) -> Self {
        Self::Room(room_id)
    }

    #[must_use]
    pub fn user(user_id: Uuid) -> Self {
        Self::User(user_id)
    }

    #[must_use]
    pub fn broadcast() -> Self {
        Self::Broadcast
    }

    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Room(id) => format!("{ROOM_CHANNEL_PREFIX}{id}"),
            Self::User(id) => format!("{USER_CHANNEL_PREFIX}{id}"),
            Self::Broadcast => BROADCAST_CHANNEL.to_string(),
            Self::Custom(name) => name.clone(),
        }
    }

    /// Parse a channel name back to a `PubSubChannel`
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if name == BROADCAST_CHANNEL {
            return Self::Broadcast;
        }

        if let Some(id) = name.strip_prefix(ROOM_CHANNEL_PREFIX).and_then(|s| s.parse().ok()) {
            return Self::Room(id);
        }

        if let Some(id) = name.strip_prefix(USER_CHANNEL_PREFIX).and_then(|s| s.parse().ok()) {
            return Self::User(id);
        }

        Self::Custom(name.to_string())
    }

    /// Room id for room channels
    #[must_use]
    pub fn room_id(&self) -> Option<Uuid> {
        match self {
            Self::Room(id) => Some(*id),
            _ => None,
        }
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
