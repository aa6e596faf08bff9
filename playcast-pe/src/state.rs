//! Shared playback state
//!
//! Thread-safe state shared between the engine, API handlers, and the SSE
//! stream. Uses RwLock for concurrent read access with rare writes. The
//! engine is the only writer; everything else reads snapshots.

use playcast_common::events::{EventBus, PlayerEvent};
use playcast_common::model::{PlayableItem, PlaybackMode, PlaybackPreferences};
use tokio::sync::{broadcast, RwLock};

/// Transport facts for the currently loaded item.
#[derive(Debug, Clone, Default)]
pub struct TransportState {
    /// Currently loaded item (None until something is loaded; retained for
    /// display after a failed load)
    pub current_item: Option<PlayableItem>,

    /// Whether the transport is playing. Optimistically mirrors intent and is
    /// corrected when a load fails.
    pub is_playing: bool,

    /// Seconds elapsed in the current item
    pub progress: f64,

    /// Seconds total (0 while unknown)
    pub duration: f64,

    /// Set when the last load failed; gates transport controls until the next
    /// load.
    pub load_failed: bool,
}

/// Shared state accessible by all components
pub struct SharedState {
    transport: RwLock<TransportState>,
    prefs: RwLock<PlaybackPreferences>,
    events: EventBus,
}

impl SharedState {
    /// Create new shared state with default values
    pub fn new() -> Self {
        Self {
            transport: RwLock::new(TransportState::default()),
            prefs: RwLock::new(PlaybackPreferences::default()),
            events: EventBus::new(256),
        }
    }

    /// Broadcast an event to all SSE listeners (no listeners is fine)
    pub fn broadcast_event(&self, event: PlayerEvent) {
        self.events.emit_lossy(event);
    }

    /// Subscribe to the event stream for SSE
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the transport state
    pub async fn transport(&self) -> TransportState {
        self.transport.read().await.clone()
    }

    /// Apply a mutation to the transport state under the write lock
    pub(crate) async fn update_transport<F>(&self, mutate: F)
    where
        F: FnOnce(&mut TransportState),
    {
        let mut transport = self.transport.write().await;
        mutate(&mut transport);
    }

    /// Snapshot of the live playback preferences
    pub async fn preferences(&self) -> PlaybackPreferences {
        *self.prefs.read().await
    }

    /// Set live volume, clamped to [0.0, 1.0]. Returns (old, new).
    pub async fn set_volume(&self, volume: f32) -> (f32, f32) {
        let mut prefs = self.prefs.write().await;
        let old = prefs.volume;
        prefs.volume = volume.clamp(0.0, 1.0);
        (old, prefs.volume)
    }

    /// Set live playback mode
    pub async fn set_playback_mode(&self, mode: PlaybackMode) {
        self.prefs.write().await.playback_mode = mode;
    }

    /// Set live autoplay flag
    pub async fn set_autoplay(&self, autoplay: bool) {
        self.prefs.write().await.autoplay = autoplay;
    }

    /// Flip the autoplay flag, returning the new value
    pub async fn toggle_autoplay(&self) -> bool {
        let mut prefs = self.prefs.write().await;
        prefs.autoplay = !prefs.autoplay;
        prefs.autoplay
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
