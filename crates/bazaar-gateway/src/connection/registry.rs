//! Session registry
//!
//! Owns the lifecycle of every live session: register on connect, evict the
//! previous session of an identity when a new one identifies, deregister on
//! disconnect. Also tracks which sessions watch which room.

use super::Connection;
use crate::protocol::{CloseCode, GatewayMessage};
use bazaar_core::Identity;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

pub struct SessionRegistry {
    /// Live connections by session ID
    sessions: DashMap<String, Arc<Connection>>,

    /// The single live session of each identity
    by_identity: DashMap<Uuid, String>,

    /// Sessions whose active room is the key
    rooms: DashMap<Uuid, HashSet<String>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            by_identity: DashMap::new(),
            rooms: DashMap::new(),
        }
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a fresh, unauthenticated connection
    pub fn register(&self, sender: mpsc::Sender<GatewayMessage>) -> Arc<Connection> {
        let session_id = Uuid::new_v4().simple().to_string();
        let connection = Connection::new(session_id.clone(), sender);
        self.sessions.insert(session_id.clone(), connection.clone());

        tracing::debug!(session_id = %session_id, "Session registered");

        connection
    }

    /// Bind `identity` to `connection`, evicting any other live session it had
    ///
    /// The evicted connection is told to close with `SESSION_REPLACED` and is
    /// returned so the caller can log it.
    pub fn bind_identity(&self, connection: &Arc<Connection>, identity: Identity) -> Option<Arc<Connection>> {
        connection.set_identity(identity);

        let previous = self
            .by_identity
            .insert(identity.user_id, connection.session_id().to_string())?;
        if previous == connection.session_id() {
            return None;
        }

        let evicted = self.deregister(&previous)?;
        evicted.close(CloseCode::SessionReplaced);

        tracing::info!(
            user_id = %identity.user_id,
            evicted = %previous,
            session_id = %connection.session_id(),
            "Previous session replaced"
        );

        Some(evicted)
    }

    /// Remove a session and everything that points at it
    pub fn deregister(&self, session_id: &str) -> Option<Arc<Connection>> {
        let (_, connection) = self.sessions.remove(session_id)?;

        if let Some(user_id) = connection.user_id() {
            // A newer session may already own the identity
            self.by_identity.remove_if(&user_id, |_, sid| sid == session_id);
        }

        if let Some(room_id) = connection.set_active_room(None) {
            self.drop_from_room(room_id, session_id);
        }

        tracing::debug!(session_id = %session_id, "Session deregistered");

        Some(connection)
    }

    /// Make `room_id` the connection's only active room
    ///
    /// Returns the room that was active before, if any.
    pub fn join_room(&self, connection: &Connection, room_id: Uuid) -> Option<Uuid> {
        let session_id = connection.session_id();
        let previous = connection.set_active_room(Some(room_id));

        if let Some(prev) = previous.filter(|p| *p != room_id) {
            self.drop_from_room(prev, session_id);
        }

        self.rooms
            .entry(room_id)
            .or_default()
            .insert(session_id.to_string());

        tracing::trace!(session_id = %session_id, room_id = %room_id, "Room joined");

        previous
    }

    /// Leave `room_id` if it is the active room
    pub fn leave_room(&self, connection: &Connection, room_id: Uuid) -> bool {
        if connection.active_room() != Some(room_id) {
            return false;
        }

        connection.set_active_room(None);
        self.drop_from_room(room_id, connection.session_id());

        tracing::trace!(session_id = %connection.session_id(), room_id = %room_id, "Room left");

        true
    }

    fn drop_from_room(&self, room_id: Uuid, session_id: &str) {
        if let Some(mut sessions) = self.rooms.get_mut(&room_id) {
            sessions.remove(session_id);
        }
        self.rooms.remove_if(&room_id, |_, sessions| sessions.is_empty());
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<Connection>> {
        self.sessions.get(session_id).map(|r| r.clone())
    }

    /// The live session of a user
    pub fn session_of(&self, user_id: Uuid) -> Option<Arc<Connection>> {
        let session_id = self.by_identity.get(&user_id)?.clone();
        self.get(&session_id)
    }

    /// Connections whose active room is `room_id`
    pub fn room_connections(&self, room_id: Uuid) -> Vec<Arc<Connection>> {
        let Some(session_ids) = self.rooms.get(&room_id).map(|s| s.clone()) else {
            return Vec::new();
        };
        session_ids.iter().filter_map(|sid| self.get(sid)).collect()
    }

    /// Dispatch to every session watching `room_id`
    pub fn dispatch_to_room(&self, room_id: Uuid, event_type: &str, data: &Value, excluded: &[Uuid]) -> usize {
        let mut sent = 0;
        for conn in self.room_connections(room_id) {
            if conn.user_id().is_some_and(|u| excluded.contains(&u)) {
                continue;
            }
            if conn.dispatch(event_type, data.clone()) {
                sent += 1;
            }
        }

        tracing::trace!(room_id = %room_id, event_type, sent, "Event dispatched to room");

        sent
    }

    /// Dispatch to every identified session
    pub fn broadcast(&self, event_type: &str, data: &Value, excluded: &[Uuid]) -> usize {
        let connections: Vec<Arc<Connection>> = self.sessions.iter().map(|r| r.value().clone()).collect();

        let mut sent = 0;
        for conn in connections {
            let Some(user_id) = conn.user_id() else {
                continue;
            };
            if excluded.contains(&user_id) {
                continue;
            }
            if conn.dispatch(event_type, data.clone()) {
                sent += 1;
            }
        }

        tracing::trace!(event_type, sent, "Event broadcast to all sessions");

        sent
    }

    pub fn connection_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of identified users with a live session
    pub fn identity_count(&self) -> usize {
        self.by_identity.len()
    }

    /// Number of rooms with at least one watcher
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .field("identities", &self.by_identity.len())
            .field("rooms", &self.rooms.len())
            .finish()
    }
}
