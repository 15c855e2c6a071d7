//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` in the application state and
//! lives as long as the service. Dropping it closes every subscriber.

use assetreg_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event type names published by the register.
pub mod event_types {
    pub const ASSET_CREATED: &str = "asset.created";
    pub const ASSET_UPDATED: &str = "asset.updated";
    pub const ASSET_DELETED: &str = "asset.deleted";
    pub const ASSET_IMPORTED: &str = "asset.imported";
    pub const SCAN_RECORDED: &str = "scan.recorded";
}

// ---------------------------------------------------------------------------
// RegisterEvent
// ---------------------------------------------------------------------------

/// A change to the register.
///
/// Built with [`RegisterEvent::new`] and the [`for_asset`](RegisterEvent::for_asset),
/// [`with_actor`](RegisterEvent::with_actor) and
/// [`with_payload`](RegisterEvent::with_payload) builders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterEvent {
    /// Dot-separated event name, one of [`event_types`].
    pub event_type: String,

    /// Asset the event is about, when there is exactly one.
    pub asset_id: Option<DbId>,

    /// Subject of the token that made the change.
    pub actor: Option<String>,

    /// Event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: Timestamp,
}

impl RegisterEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            asset_id: None,
            actor: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn for_asset(mut self, asset_id: DbId) -> Self {
        self.asset_id = Some(asset_id);
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use assetreg_events::bus::{event_types, EventBus, RegisterEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(RegisterEvent::new(event_types::ASSET_CREATED).for_asset(1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<RegisterEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unread events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped silently when nobody
    /// is listening.
    pub fn publish(&self, event: RegisterEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegisterEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            RegisterEvent::new(event_types::ASSET_UPDATED)
                .for_asset(42)
                .with_actor("user-7")
                .with_payload(serde_json::json!({"asset_number": "ST23A0010001"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "asset.updated");
        assert_eq!(received.asset_id, Some(42));
        assert_eq!(received.actor.as_deref(), Some("user-7"));
        assert_eq!(received.payload["asset_number"], "ST23A0010001");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(RegisterEvent::new(event_types::SCAN_RECORDED));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.event_type, "scan.recorded");
        assert_eq!(e2.event_type, "scan.recorded");
    }

    #[tokio::test]
    async fn dropping_the_bus_closes_subscribers() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        drop(bus);
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(RegisterEvent::new(event_types::ASSET_DELETED));
    }

    #[test]
    fn new_event_has_empty_optional_fields() {
        let event = RegisterEvent::new(event_types::ASSET_IMPORTED);
        assert!(event.asset_id.is_none());
        assert!(event.actor.is_none());
        assert!(event.payload.is_object());
    }
}
