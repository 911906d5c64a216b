//! Gateway message format
//!
//! Every frame, in both directions, is one of these envelopes.

use super::{HelloPayload, IdentifyPayload, OpCode, ReadyPayload, RoomPayload};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: OpCode,

    /// Event name (only for `DISPATCH`), e.g. `message:new`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Per-session sequence number (only for `DISPATCH`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event data payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayMessage {
    fn bare(op: OpCode, d: Option<Value>) -> Self {
        Self {
            op,
            t: None,
            s: None,
            d,
        }
    }

    // === Server Messages ===

    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            t: Some(event_type.into()),
            s: Some(sequence),
            d: Some(data),
        }
    }

    #[must_use]
    pub fn hello(payload: HelloPayload) -> Self {
        Self::bare(OpCode::Hello, serde_json::to_value(payload).ok())
    }

    #[must_use]
    pub fn ready(payload: &ReadyPayload) -> Self {
        Self::bare(OpCode::Ready, serde_json::to_value(payload).ok())
    }

    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self::bare(OpCode::HeartbeatAck, None)
    }

    #[must_use]
    pub fn invalid_session(reason: &str) -> Self {
        Self::bare(
            OpCode::InvalidSession,
            Some(serde_json::json!({ "reason": reason })),
        )
    }

    // === Parsing Client Messages ===

    fn payload<T: DeserializeOwned>(&self, op: OpCode) -> Option<T> {
        if self.op != op {
            return None;
        }
        self.d.as_ref().and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    pub fn as_identify(&self) -> Option<IdentifyPayload> {
        self.payload(OpCode::Identify)
    }

    /// Room payload of a `JOIN_ROOM` or `LEAVE_ROOM`
    pub fn as_room(&self) -> Option<RoomPayload> {
        match self.op {
            OpCode::JoinRoom | OpCode::LeaveRoom => self.payload(self.op),
            _ => None,
        }
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.t, self.s) {
            (Some(t), Some(s)) => write!(f, "GatewayMessage(op={}, t={t}, s={s})", self.op),
            (Some(t), None) => write!(f, "GatewayMessage(op={}, t={t})", self.op),
            _ => write!(f, "GatewayMessage(op={})", self.op),
        }
    }
}
