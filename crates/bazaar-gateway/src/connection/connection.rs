//! Individual WebSocket connection
//!
//! Represents a single WebSocket connection and its state.

use crate::protocol::{CloseCode, GatewayMessage};
use bazaar_core::Identity;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Connection established, waiting for Identify
    Connecting,
    /// Successfully authenticated
    Connected,
    /// Connection is closed
    Disconnected,
}

/// A single WebSocket connection
pub struct Connection {
    session_id: String,

    /// Authenticated caller (None until Identify)
    identity: RwLock<Option<Identity>>,

    state: RwLock<ConnectionState>,

    /// Outgoing frames, drained by the socket writer
    sender: mpsc::Sender<GatewayMessage>,

    /// Server-initiated close, observed by the socket writer
    close_tx: watch::Sender<Option<CloseCode>>,

    /// Last sequence number sent
    sequence: AtomicU64,

    last_heartbeat: Mutex<Instant>,

    /// The one room whose message events this session receives
    active_room: Mutex<Option<Uuid>>,

    created_at: Instant,
}

impl Connection {
    pub fn new(session_id: String, sender: mpsc::Sender<GatewayMessage>) -> Arc<Self> {
        let (close_tx, _) = watch::channel(None);
        Arc::new(Self {
            session_id,
            identity: RwLock::new(None),
            state: RwLock::new(ConnectionState::Connecting),
            sender,
            close_tx,
            sequence: AtomicU64::new(0),
            last_heartbeat: Mutex::new(Instant::now()),
            active_room: Mutex::new(None),
            created_at: Instant::now(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn identity(&self) -> Option<Identity> {
        *self.identity.read()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.identity().map(|i| i.user_id)
    }

    /// Record the authenticated caller and mark the session connected
    pub fn set_identity(&self, identity: Identity) {
        *self.identity.write() = Some(identity);
        *self.state.write() = ConnectionState::Connected;
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.read().is_some()
    }

    /// Get the next sequence number
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn record_heartbeat(&self) {
        *self.last_heartbeat.lock() = Instant::now();
    }

    pub fn time_since_heartbeat(&self) -> Duration {
        self.last_heartbeat.lock().elapsed()
    }

    pub fn active_room(&self) -> Option<Uuid> {
        *self.active_room.lock()
    }

    /// Replace the active room, returning the previous one
    pub fn set_active_room(&self, room_id: Option<Uuid>) -> Option<Uuid> {
        std::mem::replace(&mut *self.active_room.lock(), room_id)
    }

    /// Connection age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Queue a frame without waiting
    ///
    /// A full buffer drops the frame; clients refetch history on reconnect.
    pub fn send(&self, message: GatewayMessage) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(message)) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    message = %message,
                    "Outgoing buffer full, frame dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Queue a `DISPATCH` frame with the next sequence number
    pub fn dispatch(&self, event_type: &str, data: Value) -> bool {
        let seq = self.next_sequence();
        self.send(GatewayMessage::dispatch(event_type, seq, data))
    }

    /// Ask the socket writer to close with `code`
    pub fn close(&self, code: CloseCode) {
        self.close_tx.send_replace(Some(code));
    }

    /// Watch for a server-initiated close
    pub fn close_signal(&self) -> watch::Receiver<Option<CloseCode>> {
        self.close_tx.subscribe()
    }

    pub fn close_requested(&self) -> Option<CloseCode> {
        *self.close_tx.borrow()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id())
            .field("active_room", &self.active_room())
            .field("sequence", &self.current_sequence())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::Role;
    use serde_json::json;

    #[test]
    fn test_connection_creation() {
        let (tx, _rx) = mpsc::channel(10);
        let conn = Connection::new("session123".to_string(), tx);

        assert_eq!(conn.session_id(), "session123");
        assert!(conn.user_id().is_none());
        assert_eq!(conn.state(), ConnectionState::Connecting);
        assert!(!conn.is_authenticated());
        assert!(conn.close_requested().is_none());
    }

    #[test]
    fn test_connection_authentication() {
        let (tx, _rx) = mpsc::channel(10);
        let conn = Connection::new("session123".to_string(), tx);

        let identity = Identity::new(Uuid::new_v4(), Role::Client);
        conn.set_identity(identity);

        assert!(conn.is_authenticated());
        assert_eq!(conn.user_id(), Some(identity.user_id));
        assert_eq!(conn.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_dispatch_sequences() {
        let (tx, mut rx) = mpsc::channel(10);
        let conn = Connection::new("session123".to_string(), tx);

        assert!(conn.dispatch("message:new", json!({ "n": 1 })));
        assert!(conn.dispatch("message:new", json!({ "n": 2 })));

        assert_eq!(rx.try_recv().unwrap().s, Some(1));
        assert_eq!(rx.try_recv().unwrap().s, Some(2));
        assert_eq!(conn.current_sequence(), 2);
    }

    #[test]
    fn test_full_buffer_drops_frames() {
        let (tx, _rx) = mpsc::channel(1);
        let conn = Connection::new("session123".to_string(), tx);

        assert!(conn.send(GatewayMessage::heartbeat_ack()));
        assert!(!conn.send(GatewayMessage::heartbeat_ack()));
    }

    #[test]
    fn test_active_room_is_replaced() {
        let (tx, _rx) = mpsc::channel(10);
        let conn = Connection::new("session123".to_string(), tx);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(conn.set_active_room(Some(a)), None);
        assert_eq!(conn.set_active_room(Some(b)), Some(a));
        assert_eq!(conn.active_room(), Some(b));
    }

    #[tokio::test]
    async fn test_close_signal() {
        let (tx, _rx) = mpsc::channel(10);
        let conn = Connection::new("session123".to_string(), tx);
        let mut signal = conn.close_signal();

        conn.close(CloseCode::SessionReplaced);
        signal.changed().await.unwrap();
        assert_eq!(*signal.borrow(), Some(CloseCode::SessionReplaced));
    }
}
