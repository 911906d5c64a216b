//! Frame payloads
//!
//! The `d` field of each op, in both directions.

use bazaar_core::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `HELLO`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    /// Default heartbeat interval (45 seconds)
    pub const DEFAULT_HEARTBEAT_INTERVAL: u64 = 45_000;

    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

impl Default for HelloPayload {
    fn default() -> Self {
        Self::with_interval(Self::DEFAULT_HEARTBEAT_INTERVAL)
    }
}

/// `IDENTIFY`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Access token, with or without a `Bearer ` prefix
    pub token: String,
}

impl IdentifyPayload {
    #[must_use]
    pub fn bare_token(&self) -> &str {
        let token = self.token.trim();
        token.strip_prefix("Bearer ").unwrap_or(token)
    }
}

/// `READY`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyPayload {
    pub session_id: String,
    pub user_id: Uuid,
    pub role: Role,
}

/// `JOIN_ROOM` and `LEAVE_ROOM`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoomPayload {
    pub room_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_payload() {
        assert_eq!(HelloPayload::default().heartbeat_interval, 45_000);
        assert_eq!(HelloPayload::with_interval(30_000).heartbeat_interval, 30_000);
    }

    #[test]
    fn test_bare_token() {
        let with_prefix = IdentifyPayload { token: "Bearer abc".into() };
        let without = IdentifyPayload { token: " abc ".into() };
        assert_eq!(with_prefix.bare_token(), "abc");
        assert_eq!(without.bare_token(), "abc");
    }
}
