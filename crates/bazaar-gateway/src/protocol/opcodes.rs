//! Gateway operation codes

use serde::{Deserialize, Serialize};

/// Gateway operation codes
///
/// Op codes travel as upper-case names, e.g. `"op": "JOIN_ROOM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpCode {
    /// Sent on connect with the heartbeat interval (server only)
    Hello,
    /// Authenticate the session with a bearer token (client only)
    Identify,
    /// Identify accepted (server only)
    Ready,
    /// Make a room the session's active room (client only)
    JoinRoom,
    /// Drop the active room (client only)
    LeaveRoom,
    /// Keep-alive (client only)
    Heartbeat,
    /// Heartbeat acknowledged (server only)
    HeartbeatAck,
    /// A room event (server only)
    Dispatch,
    /// Identify rejected (server only)
    InvalidSession,
}

impl OpCode {
    /// Check if this op code can be sent by the client
    #[must_use]
    pub const fn is_client_op(self) -> bool {
        matches!(
            self,
            Self::Identify | Self::JoinRoom | Self::LeaveRoom | Self::Heartbeat
        )
    }

    /// Ops a session may send before it has identified
    #[must_use]
    pub const fn allowed_before_identify(self) -> bool {
        matches!(self, Self::Identify | Self::Heartbeat)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hello => "HELLO",
            Self::Identify => "IDENTIFY",
            Self::Ready => "READY",
            Self::JoinRoom => "JOIN_ROOM",
            Self::LeaveRoom => "LEAVE_ROOM",
            Self::Heartbeat => "HEARTBEAT",
            Self::HeartbeatAck => "HEARTBEAT_ACK",
            Self::Dispatch => "DISPATCH",
            Self::InvalidSession => "INVALID_SESSION",
        }
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ops() {
        assert!(OpCode::Identify.is_client_op());
        assert!(OpCode::JoinRoom.is_client_op());
        assert!(OpCode::LeaveRoom.is_client_op());
        assert!(OpCode::Heartbeat.is_client_op());
        assert!(!OpCode::Dispatch.is_client_op());
        assert!(!OpCode::Ready.is_client_op());
        assert!(!OpCode::HeartbeatAck.is_client_op());
    }

    #[test]
    fn test_ops_before_identify() {
        assert!(OpCode::Heartbeat.allowed_before_identify());
        assert!(!OpCode::JoinRoom.allowed_before_identify());
    }

    #[test]
    fn test_opcode_serialization() {
        assert_eq!(serde_json::to_string(&OpCode::JoinRoom).unwrap(), "\"JOIN_ROOM\"");
        assert_eq!(serde_json::to_string(&OpCode::HeartbeatAck).unwrap(), "\"HEARTBEAT_ACK\"");

        let op: OpCode = serde_json::from_str("\"INVALID_SESSION\"").unwrap();
        assert_eq!(op, OpCode::InvalidSession);
        assert!(serde_json::from_str::<OpCode>("\"RESUME\"").is_err());
    }

    #[test]
    fn test_name_matches_wire_form() {
        for op in [OpCode::Hello, OpCode::LeaveRoom, OpCode::Dispatch] {
            assert_eq!(serde_json::to_string(&op).unwrap(), format!("\"{}\"", op.name()));
        }
    }
}
