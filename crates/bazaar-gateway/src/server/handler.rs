//! WebSocket handler
//!
//! Drives one socket: HELLO, then a reader, a writer, and a heartbeat
//! watchdog until any of them ends.

use crate::connection::{Connection, ConnectionState};
use crate::handlers::{HandlerError, MessageDispatcher};
use crate::protocol::{CloseCode, GatewayMessage, HelloPayload};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Channel buffer size for outgoing messages
const MESSAGE_BUFFER_SIZE: usize = 100;

/// How long the writer gets to flush a close frame
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// WebSocket gateway handler
pub async fn gateway_handler(State(state): State<GatewayState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let (tx, mut rx) = mpsc::channel::<GatewayMessage>(MESSAGE_BUFFER_SIZE);
    let connection = state.registry().register(tx);
    let session_id = connection.session_id().to_string();

    tracing::info!(session_id = %session_id, "WebSocket connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();

    let heartbeat_ms = state.config().gateway.heartbeat_interval_ms;
    let hello = GatewayMessage::hello(HelloPayload::with_interval(heartbeat_ms));
    if let Ok(json) = hello.to_json() {
        if ws_sink.send(Message::Text(json)).await.is_err() {
            tracing::warn!(session_id = %session_id, "Failed to send Hello message");
            cleanup_connection(&state, &connection);
            return;
        }
    }

    // Reader: returns the code to close with, or None on a clean client close
    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(close_code) = handle_text_message(&state_recv, &connection_recv, &text).await {
                        return Some(close_code);
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(
                        session_id = %connection_recv.session_id(),
                        "Binary messages not supported"
                    );
                    return Some(CloseCode::DecodeError);
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    tracing::info!(session_id = %connection_recv.session_id(), "Client closed connection");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %connection_recv.session_id(),
                        error = %e,
                        "WebSocket error"
                    );
                    return None;
                }
            }
        }
        None
    });

    // Writer: drains queued frames until a close is requested
    let session_id_send = session_id.clone();
    let mut close_signal = connection.close_signal();
    let mut send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                changed = close_signal.changed() => {
                    let code = if changed.is_ok() { *close_signal.borrow() } else { None };
                    // Frames queued before the close, such as INVALID_SESSION, go first
                    while let Ok(msg) = rx.try_recv() {
                        if let Ok(json) = msg.to_json() {
                            let _ = ws_sink.send(Message::Text(json)).await;
                        }
                    }
                    let frame = code.map(|code| CloseFrame {
                        code: code.as_u16(),
                        reason: code.description().into(),
                    });
                    let _ = ws_sink.send(Message::Close(frame)).await;
                    break;
                }
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    let Ok(json) = msg.to_json() else { continue };
                    if ws_sink.send(Message::Text(json)).await.is_err() {
                        tracing::warn!(
                            session_id = %session_id_send,
                            "Failed to send message to WebSocket"
                        );
                        break;
                    }
                }
            }
        }

        let _ = ws_sink.close().await;
    });

    // Watchdog: times out sessions that stop heartbeating
    let connection_hb = connection.clone();
    let timeout = Duration::from_millis(heartbeat_ms.saturating_mul(2));
    let mut heartbeat_task = tokio::spawn(async move {
        let mut check_interval = interval(Duration::from_millis((heartbeat_ms / 2).max(1)));

        loop {
            check_interval.tick().await;

            let time_since = connection_hb.time_since_heartbeat();
            if time_since > timeout {
                tracing::warn!(
                    session_id = %connection_hb.session_id(),
                    time_since_ms = time_since.as_millis(),
                    "Connection timed out (no heartbeat)"
                );
                connection_hb.close(CloseCode::SessionTimeout);
                break;
            }
        }
    });

    let close_code = tokio::select! {
        result = &mut recv_task => result.ok().flatten(),
        _ = &mut send_task => None,
        _ = &mut heartbeat_task => None,
    };

    // Stop routing frames to this socket before the writer flushes
    cleanup_connection(&state, &connection);
    heartbeat_task.abort();
    recv_task.abort();

    if let Some(code) = close_code {
        tracing::debug!(session_id = %session_id, close_code = %code, "Closing connection");
        connection.close(code);
    }

    if connection.close_requested().is_some() {
        if tokio::time::timeout(CLOSE_GRACE, &mut send_task).await.is_err() {
            send_task.abort();
        }
    } else {
        send_task.abort();
    }
}

/// Handle a text message from the client
async fn handle_text_message(state: &GatewayState, connection: &Arc<Connection>, text: &str) -> Result<(), CloseCode> {
    let message = match GatewayMessage::from_json(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(
                session_id = %connection.session_id(),
                error = %e,
                "Failed to parse message"
            );
            return Err(CloseCode::DecodeError);
        }
    };

    tracing::trace!(
        session_id = %connection.session_id(),
        op = %message.op,
        "Received message"
    );

    match MessageDispatcher::dispatch(state, connection, message).await {
        Ok(Some(close_code)) => Err(close_code),
        Ok(None) => Ok(()),
        Err(e) => {
            tracing::warn!(
                session_id = %connection.session_id(),
                error = %e,
                "Handler error"
            );
            if let HandlerError::AuthenticationFailed(reason) = &e {
                connection.send(GatewayMessage::invalid_session(reason));
            }
            Err(e.to_close_code())
        }
    }
}

/// Drop the session from the registry
fn cleanup_connection(state: &GatewayState, connection: &Arc<Connection>) {
    tracing::info!(session_id = %connection.session_id(), "Cleaning up connection");

    connection.set_state(ConnectionState::Disconnected);
    state.registry().deregister(connection.session_id());
}
