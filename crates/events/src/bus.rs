//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ComposerEvent`]s. It is
//! shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use opc_core::types::DbId;

// ---------------------------------------------------------------------------
// ComposerEvent
// ---------------------------------------------------------------------------

/// A draft lifecycle event.
///
/// Constructed via [`ComposerEvent::new`] and enriched with the builder
/// methods [`with_page`](ComposerEvent::with_page),
/// [`with_actor`](ComposerEvent::with_actor), and
/// [`with_payload`](ComposerEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerEvent {
    /// Dot-separated event name, e.g. `"draft.saved"`.
    pub event_type: String,

    /// Surrogate key of the affected page row, when there is one.
    pub page_key: Option<DbId>,

    /// Serialized logical page id of the affected page.
    pub page_id: Option<String>,

    /// Editor that triggered the event.
    pub actor: Option<String>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ComposerEvent {
    /// Create a new event with only the required `event_type`.
    ///
    /// All optional fields default to `None` / empty object.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            page_key: None,
            page_id: None,
            actor: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the affected page to the event.
    pub fn with_page(mut self, key: DbId, page_id: impl Into<String>) -> Self {
        self.page_key = Some(key);
        self.page_id = Some(page_id.into());
        self
    }

    /// Attach the acting editor to the event.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Set the JSON payload for the event.
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
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ComposerEvent`].
///
/// # Usage
///
/// ```rust
/// use opc_events::bus::{ComposerEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ComposerEvent::new("draft.saved"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ComposerEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: ComposerEvent) {
        // Ignore the SendError, it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ComposerEvent> {
        self.sender.subscribe()
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

        let event = ComposerEvent::new("draft.saved")
            .with_page(42, r#"{"type":"product","id":42,"lang":1}"#)
            .with_actor("alice")
            .with_payload(serde_json::json!({"key": "value"}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "draft.saved");
        assert_eq!(received.page_key, Some(42));
        assert_eq!(received.actor.as_deref(), Some("alice"));
        assert_eq!(received.payload["key"], "value");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ComposerEvent::new("draft.published"));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, "draft.published");
        assert_eq!(e2.event_type, "draft.published");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers, this must not panic.
        bus.publish(ComposerEvent::new("draft.deleted"));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = ComposerEvent::new("draft.locked");
        assert_eq!(event.event_type, "draft.locked");
        assert!(event.page_key.is_none());
        assert!(event.page_id.is_none());
        assert!(event.actor.is_none());
        assert!(event.payload.is_object());
    }
}
