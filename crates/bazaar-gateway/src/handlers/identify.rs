//! Identify handler

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage, IdentifyPayload, ReadyPayload};
use crate::server::GatewayState;
use std::sync::Arc;

/// Handles Identify messages
pub struct IdentifyHandler;

impl IdentifyHandler {
    /// Authenticate the connection and make it the identity's only session
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: IdentifyPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        if connection.is_authenticated() {
            tracing::warn!(
                session_id = %connection.session_id(),
                "Client sent Identify while already authenticated"
            );
            return Ok(Some(CloseCode::AlreadyAuthenticated));
        }

        let identity = state
            .service_context()
            .jwt_service()
            .authenticate(payload.bare_token())
            .map_err(|e| {
                tracing::debug!(error = %e, "Token validation failed");
                HandlerError::from(e)
            })?;

        // Role in the token may be stale; the stored user decides
        let user = state
            .service_context()
            .user_repo()
            .find_by_id(identity.user_id)
            .await?
            .ok_or_else(|| HandlerError::AuthenticationFailed("User not found".to_string()))?;
        let identity = user.identity();

        state.registry().bind_identity(connection, identity);

        let ready = ReadyPayload {
            session_id: connection.session_id().to_string(),
            user_id: identity.user_id,
            role: identity.role,
        };
        connection.send(GatewayMessage::ready(&ready));

        tracing::info!(
            session_id = %connection.session_id(),
            user_id = %identity.user_id,
            role = %identity.role,
            "Client identified"
        );

        Ok(None)
    }
}
