//! Player event types and event bus
//!
//! Events are broadcast by the player engine and forwarded verbatim to UI
//! clients over SSE; they use a central enum for exhaustive matching and a
//! `type` tag on the wire.

use crate::model::{ItemKey, PlayableItem, PlaybackMode};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Player events observable by UI clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Playing/paused flipped
    ///
    /// Triggers:
    /// - SSE: update transport controls
    PlaybackStateChanged {
        playing: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A new item was handed to the transport
    ///
    /// Triggers:
    /// - SSE: update "now playing" display and queue highlight
    ItemStarted {
        item: PlayableItem,
        /// Cursor position when the item came from the queue; None for ad-hoc
        /// plays outside any queue context.
        queue_index: Option<usize>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Periodic transport position update while playing; also emitted once on
    /// play/pause and seek edges so progress bars settle immediately.
    PlaybackProgress {
        position: f64,
        duration: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The transport reached the end of the loaded item
    ItemFinished {
        item: ItemKey,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Queue contents or cursor changed
    ///
    /// Triggers:
    /// - SSE: re-render queue display
    QueueChanged {
        length: usize,
        index: Option<usize>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Auto-advance found no candidate; playback stopped at the end of the
    /// queue with the last item still loaded.
    QueueEnded {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Volume changed
    VolumeChanged {
        old_volume: f32,
        new_volume: f32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback mode changed (normal / shuffle / repeat)
    PlaybackModeChanged {
        mode: PlaybackMode,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Autoplay toggled
    AutoplayChanged {
        autoplay: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A load failed; the item stays loaded for display with transport
    /// controls disabled.
    PlaybackError {
        item: Option<ItemKey>,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// Wire name of the event, used as the SSE event field.
    pub fn type_name(&self) -> &'static str {
        match self {
            PlayerEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            PlayerEvent::ItemStarted { .. } => "ItemStarted",
            PlayerEvent::PlaybackProgress { .. } => "PlaybackProgress",
            PlayerEvent::ItemFinished { .. } => "ItemFinished",
            PlayerEvent::QueueChanged { .. } => "QueueChanged",
            PlayerEvent::QueueEnded { .. } => "QueueEnded",
            PlayerEvent::VolumeChanged { .. } => "VolumeChanged",
            PlayerEvent::PlaybackModeChanged { .. } => "PlaybackModeChanged",
            PlayerEvent::AutoplayChanged { .. } => "AutoplayChanged",
            PlayerEvent::PlaybackError { .. } => "PlaybackError",
        }
    }
}

/// One-to-many event broadcasting over `tokio::sync::broadcast`.
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity (events buffered
    /// per subscriber before old events are dropped).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events. Events emitted before subscription are
    /// not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` when no subscriber is
    /// listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PlayerEvent,
    ) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscribers case. Progress ticks and
    /// other high-frequency events use this path.
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eventbus_new_and_subscribe() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);

        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn emit_without_subscribers_errors() {
        let bus = EventBus::new(100);
        let event = PlayerEvent::PlaybackStateChanged {
            playing: true,
            timestamp: chrono::Utc::now(),
        };
        assert!(bus.emit(event).is_err());
    }

    #[test]
    fn emit_lossy_without_subscribers_does_not_panic() {
        let bus = EventBus::new(100);
        bus.emit_lossy(PlayerEvent::QueueEnded {
            timestamp: chrono::Utc::now(),
        });
    }

    #[tokio::test]
    async fn emit_with_subscriber_delivers() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        bus.emit(PlayerEvent::VolumeChanged {
            old_volume: 1.0,
            new_volume: 0.5,
            timestamp: chrono::Utc::now(),
        })
        .unwrap();

        match rx.recv().await.unwrap() {
            PlayerEvent::VolumeChanged {
                old_volume,
                new_volume,
                ..
            } => {
                assert_eq!(old_volume, 1.0);
                assert_eq!(new_volume, 0.5);
            }
            other => panic!("wrong event type received: {:?}", other),
        }
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PlayerEvent::PlaybackStateChanged {
            playing: false,
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PlaybackStateChanged");
        assert_eq!(json["playing"], false);
        assert!(json["timestamp"].is_string());

        assert_eq!(event.type_name(), "PlaybackStateChanged");
    }

    #[test]
    fn progress_event_shape() {
        let event = PlayerEvent::PlaybackProgress {
            position: 12.5,
            duration: 180.0,
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PlaybackProgress");
        assert_eq!(json["position"], 12.5);
        assert_eq!(json["duration"], 180.0);
    }
}
