//! Op code handlers
//!
//! Handles incoming WebSocket messages based on their operation code.

mod error;
mod heartbeat;
mod identify;
mod rooms;

pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;
pub use identify::IdentifyHandler;
pub use rooms::{RoomHandler, ROOM_JOINED, ROOM_JOIN_DENIED, ROOM_LEFT};

use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage, OpCode};
use crate::server::GatewayState;
use std::sync::Arc;

/// Dispatch incoming client messages to appropriate handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle an incoming client message
    ///
    /// `Ok(Some(code))` asks the caller to close the socket with `code`.
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        if let Some(code) = Self::precheck(connection, message.op) {
            return Ok(Some(code));
        }

        match message.op {
            OpCode::Identify => {
                let payload = message.as_identify().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Identify payload".to_string())
                })?;

                IdentifyHandler::handle(state, connection, payload).await
            }
            OpCode::Heartbeat => HeartbeatHandler::handle(connection),
            OpCode::JoinRoom => {
                let payload = message.as_room().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid JoinRoom payload".to_string())
                })?;

                RoomHandler::join(state, connection, payload).await
            }
            OpCode::LeaveRoom => {
                let payload = message.as_room().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid LeaveRoom payload".to_string())
                })?;

                RoomHandler::leave(state, connection, payload)
            }
            // These ops should never reach here due to is_client_op check
            _ => {
                tracing::error!(op = %message.op, "Unhandled client op code");
                Ok(Some(CloseCode::UnknownOpcode))
            }
        }
    }

    /// Op-level gate applied before any payload is parsed
    fn precheck(connection: &Connection, op: OpCode) -> Option<CloseCode> {
        if !op.is_client_op() {
            tracing::warn!(
                session_id = %connection.session_id(),
                op = %op,
                "Received server-only op code from client"
            );
            return Some(CloseCode::UnknownOpcode);
        }

        if !connection.is_authenticated() && !op.allowed_before_identify() {
            tracing::debug!(
                session_id = %connection.session_id(),
                op = %op,
                "Op sent before Identify"
            );
            return Some(CloseCode::NotAuthenticated);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{Identity, Role};
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn conn() -> Arc<Connection> {
        let (tx, _rx) = mpsc::channel(4);
        Connection::new("s".into(), tx)
    }

    #[test]
    fn test_server_ops_rejected() {
        let c = conn();
        assert_eq!(
            MessageDispatcher::precheck(&c, OpCode::Dispatch),
            Some(CloseCode::UnknownOpcode)
        );
        assert_eq!(
            MessageDispatcher::precheck(&c, OpCode::Ready),
            Some(CloseCode::UnknownOpcode)
        );
    }

    #[test]
    fn test_join_requires_identify() {
        let c = conn();
        assert_eq!(
            MessageDispatcher::precheck(&c, OpCode::JoinRoom),
            Some(CloseCode::NotAuthenticated)
        );
        assert_eq!(MessageDispatcher::precheck(&c, OpCode::Heartbeat), None);
        assert_eq!(MessageDispatcher::precheck(&c, OpCode::Identify), None);

        c.set_identity(Identity::new(Uuid::new_v4(), Role::Client));
        assert_eq!(MessageDispatcher::precheck(&c, OpCode::JoinRoom), None);
        assert_eq!(MessageDispatcher::precheck(&c, OpCode::LeaveRoom), None);
    }
}
