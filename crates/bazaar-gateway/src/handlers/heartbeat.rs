//! Heartbeat handler

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage};

/// Handles heartbeat messages
pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Record liveness and acknowledge
    pub fn handle(connection: &Connection) -> HandlerResult<Option<CloseCode>> {
        connection.record_heartbeat();

        tracing::trace!(
            session_id = %connection.session_id(),
            server_seq = connection.current_sequence(),
            "Heartbeat received"
        );

        if !connection.send(GatewayMessage::heartbeat_ack()) {
            tracing::debug!(session_id = %connection.session_id(), "Heartbeat ACK not queued");
        }

        Ok(None)
    }
}
