//! Event dispatcher
//!
//! Receives committed room events from Redis Pub/Sub and fans them out to
//! the sessions in the registry.

use crate::connection::SessionRegistry;
use bazaar_cache::{
    PubSubChannel, ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError,
    ROOM_CHANNEL_PATTERN,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event dispatcher that routes Redis Pub/Sub messages to WebSocket connections
pub struct EventDispatcher {
    registry: Arc<SessionRegistry>,
    subscriber: Subscriber,
    running: Arc<AtomicBool>,
}

impl EventDispatcher {
    /// Subscribe to every room channel and the broadcast channel
    pub async fn new(config: SubscriberConfig, registry: Arc<SessionRegistry>) -> Result<Self, SubscriberError> {
        let subscriber = SubscriberBuilder::new()
            .config(config)
            .subscribe(PubSubChannel::broadcast())
            .psubscribe(ROOM_CHANNEL_PATTERN)
            .build()
            .await?;

        Ok(Self {
            registry,
            subscriber,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Spawn the background fanout loop
    pub fn start(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Event dispatcher is already running");
            return;
        }

        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.run().await;
        });

        tracing::info!("Event dispatcher started");
    }

    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.subscriber.shutdown().await.ok();
        tracing::info!("Event dispatcher stopped");
    }

    async fn run(&self) {
        let mut receiver = self.subscriber.receiver();

        while self.running.load(Ordering::SeqCst) {
            match receiver.recv().await {
                Ok(msg) => {
                    route(&self.registry, &msg);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "Event dispatcher lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::warn!("Event dispatcher channel closed");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Event dispatcher loop ended");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Deliver one Pub/Sub message, returning how many sessions got it
///
/// Room channels reach the sessions watching that room. The broadcast
/// channel reaches every identified session.
pub fn route(registry: &SessionRegistry, msg: &ReceivedMessage) -> usize {
    let Some(event) = &msg.event else {
        tracing::debug!(channel = ?msg.channel, "Received non-event message, ignoring");
        return 0;
    };

    let excluded = event
        .target
        .as_ref()
        .map(|t| t.exclude_users.as_slice())
        .unwrap_or_default();

    match &msg.channel {
        PubSubChannel::Room(room_id) => {
            registry.dispatch_to_room(*room_id, &event.event_type, &event.data, excluded)
        }
        PubSubChannel::Broadcast => registry.broadcast(&event.event_type, &event.data, excluded),
        other => {
            tracing::debug!(
                channel = %other.name(),
                event_type = %event.event_type,
                "Event on unrouted channel, ignoring"
            );
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::GatewayMessage;
    use bazaar_cache::{EventTarget, PubSubEvent};
    use bazaar_core::{Identity, Role};
    use serde_json::json;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn received(channel: PubSubChannel, event: PubSubEvent) -> ReceivedMessage {
        ReceivedMessage {
            channel,
            payload: event.to_json().unwrap(),
            event: Some(event),
        }
    }

    fn identified(registry: &SessionRegistry) -> (Identity, mpsc::Receiver<GatewayMessage>, Arc<crate::connection::Connection>) {
        let (tx, rx) = mpsc::channel(8);
        let conn = registry.register(tx);
        let identity = Identity::new(Uuid::new_v4(), Role::Client);
        registry.bind_identity(&conn, identity);
        (identity, rx, conn)
    }

    #[test]
    fn test_room_event_reaches_watchers_only() {
        let registry = SessionRegistry::new();
        let (_, mut watcher_rx, watcher) = identified(&registry);
        let (_, mut other_rx, _other) = identified(&registry);
        let room = Uuid::new_v4();
        registry.join_room(&watcher, room);

        let msg = received(
            PubSubChannel::room(room),
            PubSubEvent::new("message:new", json!({ "room_id": room })),
        );
        assert_eq!(route(&registry, &msg), 1);

        let frame = watcher_rx.try_recv().unwrap();
        assert_eq!(frame.t.as_deref(), Some("message:new"));
        assert!(other_rx.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_respects_exclusions() {
        let registry = SessionRegistry::new();
        let (_, mut a_rx, _a) = identified(&registry);
        let (b, mut b_rx, _b) = identified(&registry);

        let event = PubSubEvent::new("room:created", json!({}))
            .with_target(EventTarget::default().exclude_user(b.user_id));
        assert_eq!(route(&registry, &received(PubSubChannel::broadcast(), event)), 1);

        assert!(a_rx.try_recv().is_ok());
        assert!(b_rx.try_recv().is_err());
    }

    #[test]
    fn test_unparsed_and_unrouted_are_dropped() {
        let registry = SessionRegistry::new();
        let (user, _rx, _conn) = identified(&registry);

        let raw = ReceivedMessage {
            channel: PubSubChannel::broadcast(),
            event: None,
            payload: "not json".into(),
        };
        assert_eq!(route(&registry, &raw), 0);

        let direct = received(PubSubChannel::user(user.user_id), PubSubEvent::new("x", json!({})));
        assert_eq!(route(&registry, &direct), 0);
    }
}
