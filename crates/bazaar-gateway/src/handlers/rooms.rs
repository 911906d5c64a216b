//! Room subscription handlers

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::{CloseCode, RoomPayload};
use crate::server::GatewayState;
use bazaar_service::AccessService;
use serde_json::json;

/// Event sent when a join is accepted
pub const ROOM_JOINED: &str = "room:joined";

/// Event sent when a join is refused
pub const ROOM_JOIN_DENIED: &str = "room:join_denied";

/// Event sent when a leave is processed
pub const ROOM_LEFT: &str = "room:left";

/// Handles `JOIN_ROOM` and `LEAVE_ROOM`
pub struct RoomHandler;

impl RoomHandler {
    /// Watch a room's message events, leaving whatever room was watched before
    pub async fn join(
        state: &GatewayState,
        connection: &Connection,
        payload: RoomPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let Some(identity) = connection.identity() else {
            return Ok(Some(CloseCode::NotAuthenticated));
        };
        let room_id = payload.room_id;

        let allowed = AccessService::new(state.service_context())
            .can_read(room_id, &identity)
            .await?;

        if !allowed {
            tracing::debug!(
                session_id = %connection.session_id(),
                room_id = %room_id,
                "Join refused"
            );
            connection.dispatch(ROOM_JOIN_DENIED, json!({ "room_id": room_id }));
            return Ok(None);
        }

        let previous = state.registry().join_room(connection, room_id);

        tracing::debug!(
            session_id = %connection.session_id(),
            room_id = %room_id,
            previous = ?previous,
            "Room joined"
        );

        connection.dispatch(ROOM_JOINED, json!({ "room_id": room_id }));

        Ok(None)
    }

    /// Stop watching a room; leaving a room that is not active is a no-op
    pub fn leave(
        state: &GatewayState,
        connection: &Connection,
        payload: RoomPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        if state.registry().leave_room(connection, payload.room_id) {
            connection.dispatch(ROOM_LEFT, json!({ "room_id": payload.room_id }));
        }
        Ok(None)
    }
}
