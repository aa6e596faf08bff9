//! Player engine orchestration
//!
//! Coordinates the queue store, mode resolution, and the media transport, and
//! owns every piece of player state a UI can observe: queue, cursor,
//! transport facts, and the live playback preferences. All mutation goes
//! through engine methods; the media event loop reconciles asynchronous
//! transport facts back into shared state.
//!
//! Lock order is queue before transport state. Queue mutations hold the queue
//! write lock across the paired transport-state update, so no reader ever
//! observes the loaded item diverging from the queue cursor mid-switch.

use crate::error::Result;
use crate::playback::modes;
use crate::playback::queue::QueueStore;
use crate::playback::transport::{MediaEvent, MediaTransport};
use crate::state::SharedState;
use playcast_common::events::PlayerEvent;
use playcast_common::model::{ItemKey, PlayableItem, PlaybackMode, PlaybackPreferences};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, info, warn};

/// Observable player state, shaped exactly as UI clients consume it on every
/// render. Field names are part of the wire contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub current_item: Option<PlayableItem>,
    pub is_playing: bool,
    pub progress: f64,
    pub duration: f64,
    pub volume: f32,
    pub autoplay: bool,
    pub playback_mode: PlaybackMode,
    pub queue: Vec<PlayableItem>,
    pub queue_index: Option<usize>,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Player engine: the one owner of queue, transport, and live preferences.
pub struct PlayerEngine {
    state: Arc<SharedState>,
    queue: RwLock<QueueStore>,
    transport: Arc<dyn MediaTransport>,
    /// Monotonic load counter; transport events from older generations are
    /// discarded so a superseded load can never resurface.
    generation: AtomicU64,
    /// Whether the latest load should start playing once the transport
    /// reports it ready.
    load_autoplay: AtomicBool,
    /// Media event channel, taken by the event loop on start.
    media_rx: Mutex<Option<mpsc::UnboundedReceiver<MediaEvent>>>,
}

impl PlayerEngine {
    /// Create a new engine over a transport and its event channel.
    pub fn new(
        state: Arc<SharedState>,
        transport: Arc<dyn MediaTransport>,
        media_rx: mpsc::UnboundedReceiver<MediaEvent>,
    ) -> Self {
        Self {
            state,
            queue: RwLock::new(QueueStore::new()),
            transport,
            generation: AtomicU64::new(0),
            load_autoplay: AtomicBool::new(false),
            media_rx: Mutex::new(Some(media_rx)),
        }
    }

    /// Start the media event loop in the background.
    pub fn start(self: &Arc<Self>) {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.run().await;
        });
    }

    /// Consume media events until the transport goes away.
    async fn run(&self) {
        let Some(mut media_rx) = self.media_rx.lock().await.take() else {
            warn!("Engine event loop already started");
            return;
        };
        info!("Player engine event loop started");
        while let Some(event) = media_rx.recv().await {
            self.on_media_event(event).await;
        }
        debug!("Media event channel closed; engine loop exiting");
    }

    // ------------------------------------------------------------------
    // Public contract
    // ------------------------------------------------------------------

    /// Observable state for UI renders.
    pub async fn snapshot(&self) -> PlayerSnapshot {
        let queue = self.queue.read().await;
        let transport = self.state.transport().await;
        let prefs = self.state.preferences().await;
        PlayerSnapshot {
            has_next: modes::has_next(queue.items(), queue.index(), prefs.playback_mode),
            has_prev: modes::has_previous(queue.items(), transport.current_item.is_some()),
            current_item: transport.current_item,
            is_playing: transport.is_playing,
            progress: transport.progress,
            duration: transport.duration,
            volume: prefs.volume,
            autoplay: prefs.autoplay,
            playback_mode: prefs.playback_mode,
            queue: queue.items().to_vec(),
            queue_index: queue.index(),
        }
    }

    /// Live playback preferences.
    pub async fn preferences(&self) -> PlaybackPreferences {
        self.state.preferences().await
    }

    /// Load a single item outside any queue context ("play this now").
    /// The queue is untouched.
    pub async fn load_item(&self, item: PlayableItem, autoplay: bool) {
        info!(item = %item.key(), autoplay, "Loading ad-hoc item");
        self.begin_load(item, autoplay, None).await;
    }

    /// Replace the queue wholesale and start playing from `start_index`: the
    /// canonical "start playback session" entry point. An empty `items`
    /// clears the queue and leaves the transport untouched.
    pub async fn set_new_queue(
        &self,
        items: Vec<PlayableItem>,
        start_index: usize,
    ) -> Result<()> {
        let mut queue = self.queue.write().await;
        queue.replace(items, start_index)?;
        info!(
            length = queue.len(),
            start = ?queue.index(),
            "Queue replaced"
        );
        self.broadcast_queue_changed(&queue);

        if let Some(item) = queue.current().cloned() {
            let index = queue.index();
            // Still holding the queue write lock: cursor and loaded item
            // change together.
            self.begin_load(item, true, index).await;
        }
        Ok(())
    }

    /// Jump the cursor to an existing queue position and play it.
    pub async fn play_item_at(&self, index: usize) -> Result<()> {
        let mut queue = self.queue.write().await;
        let item = queue.advance_to(index)?.clone();
        self.broadcast_queue_changed(&queue);
        self.begin_load(item, true, Some(index)).await;
        Ok(())
    }

    /// Append an item to the queue tail. The cursor does not move.
    pub async fn enqueue(&self, item: PlayableItem) {
        let mut queue = self.queue.write().await;
        debug!(item = %item.key(), "Enqueueing item");
        queue.enqueue(item);
        self.broadcast_queue_changed(&queue);
    }

    /// Remove an item by identity, re-syncing the cursor. Playback is not
    /// interrupted even when the removed item is the one playing: the
    /// transport keeps the loaded resource. Returns false when absent.
    pub async fn remove_item(&self, key: &ItemKey) -> bool {
        let mut queue = self.queue.write().await;
        let removed = queue.remove(key);
        if removed {
            debug!(item = %key, "Removed item from queue");
            self.broadcast_queue_changed(&queue);
        }
        removed
    }

    /// Flip play/pause. No-op when nothing is loaded or the last load failed.
    pub async fn toggle_play(&self) {
        let transport_state = self.state.transport().await;
        if transport_state.current_item.is_none() {
            debug!("Toggle ignored: nothing loaded");
            return;
        }
        if transport_state.load_failed {
            debug!("Toggle ignored: current item failed to load");
            return;
        }

        let playing = !transport_state.is_playing;
        if playing {
            self.transport.play();
        } else {
            self.transport.pause();
        }
        self.state.update_transport(|t| t.is_playing = playing).await;

        self.state.broadcast_event(PlayerEvent::PlaybackStateChanged {
            playing,
            timestamp: chrono::Utc::now(),
        });
        // Settle progress bars immediately on the edge.
        self.state.broadcast_event(PlayerEvent::PlaybackProgress {
            position: transport_state.progress,
            duration: transport_state.duration,
            timestamp: chrono::Utc::now(),
        });
        info!("Playback {}", if playing { "resumed" } else { "paused" });
    }

    /// Advance to the next item per the current mode. Defensive no-op when no
    /// candidate exists; UIs already disable the control via `hasNext`.
    pub async fn play_next(&self) {
        let mode = self.state.preferences().await.playback_mode;
        let mut queue = self.queue.write().await;
        let Some(index) = queue.index() else {
            debug!("Next ignored: nothing queued");
            return;
        };
        let target = {
            let mut rng = rand::thread_rng();
            modes::next_index(queue.items(), index, mode, &mut rng)
        };
        let Some(target) = target else {
            debug!("Next ignored: no candidate");
            return;
        };
        let item = match queue.advance_to(target) {
            Ok(item) => item.clone(),
            Err(e) => {
                warn!("Next resolution out of sync with queue: {}", e);
                return;
            }
        };
        self.broadcast_queue_changed(&queue);
        self.begin_load(item, true, Some(target)).await;
    }

    /// Step back to the previous item. Defensive no-op at the head.
    pub async fn play_previous(&self) {
        let mut queue = self.queue.write().await;
        let Some(index) = queue.index() else {
            debug!("Previous ignored: nothing queued");
            return;
        };
        let Some(target) = modes::previous_index(queue.items(), index) else {
            debug!("Previous ignored: already at the head");
            return;
        };
        let item = match queue.advance_to(target) {
            Ok(item) => item.clone(),
            Err(e) => {
                warn!("Previous resolution out of sync with queue: {}", e);
                return;
            }
        };
        self.broadcast_queue_changed(&queue);
        self.begin_load(item, true, Some(target)).await;
    }

    /// Seek within the loaded item. Only meaningful once the transport knows
    /// the duration; it clamps or ignores accordingly.
    pub async fn seek(&self, seconds: f64) {
        self.transport.seek(seconds);
    }

    /// Set volume now. Live preference only; persisting to the profile is the
    /// explicit save path in the preference bridge.
    pub async fn change_volume(&self, volume: f32) {
        let (old_volume, new_volume) = self.state.set_volume(volume).await;
        self.transport.set_volume(new_volume);
        self.state.broadcast_event(PlayerEvent::VolumeChanged {
            old_volume,
            new_volume,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Switch playback mode. Live preference only.
    pub async fn change_playback_mode(&self, mode: PlaybackMode) {
        self.state.set_playback_mode(mode).await;
        info!(%mode, "Playback mode changed");
        self.state.broadcast_event(PlayerEvent::PlaybackModeChanged {
            mode,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Flip autoplay. Live preference only. Returns the new value.
    pub async fn toggle_autoplay(&self) -> bool {
        let autoplay = self.state.toggle_autoplay().await;
        self.state.broadcast_event(PlayerEvent::AutoplayChanged {
            autoplay,
            timestamp: chrono::Utc::now(),
        });
        autoplay
    }

    // ------------------------------------------------------------------
    // Bridge setters
    // ------------------------------------------------------------------
    //
    // Seed live state from remotely-persisted values. Distinct from the
    // change_* methods so the seeding path can never be confused with one
    // that should write back to the profile.

    pub async fn set_volume_pref(&self, volume: f32) {
        let (old_volume, new_volume) = self.state.set_volume(volume).await;
        self.transport.set_volume(new_volume);
        self.state.broadcast_event(PlayerEvent::VolumeChanged {
            old_volume,
            new_volume,
            timestamp: chrono::Utc::now(),
        });
    }

    pub async fn set_playback_mode_pref(&self, mode: PlaybackMode) {
        self.state.set_playback_mode(mode).await;
        self.state.broadcast_event(PlayerEvent::PlaybackModeChanged {
            mode,
            timestamp: chrono::Utc::now(),
        });
    }

    pub async fn set_autoplay_pref(&self, autoplay: bool) {
        self.state.set_autoplay(autoplay).await;
        self.state.broadcast_event(PlayerEvent::AutoplayChanged {
            autoplay,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Apply a full preference set through the bridge setters.
    pub async fn apply_preferences(&self, prefs: PlaybackPreferences) {
        let prefs = prefs.clamped();
        self.set_volume_pref(prefs.volume).await;
        self.set_playback_mode_pref(prefs.playback_mode).await;
        self.set_autoplay_pref(prefs.autoplay).await;
    }

    // ------------------------------------------------------------------
    // Media event handling
    // ------------------------------------------------------------------

    /// Reconcile one transport event into shared state. The event loop calls
    /// this for every received event; tests drive it directly.
    pub async fn on_media_event(&self, event: MediaEvent) {
        let current = self.generation.load(Ordering::SeqCst);
        match event {
            MediaEvent::Loaded {
                generation,
                duration,
            } if generation == current => {
                self.state.update_transport(|t| t.duration = duration).await;
                if self.load_autoplay.load(Ordering::SeqCst) {
                    self.transport.play();
                }
            }
            MediaEvent::Progress {
                generation,
                position,
            } if generation == current => {
                self.state.update_transport(|t| t.progress = position).await;
                let duration = self.state.transport().await.duration;
                self.state.broadcast_event(PlayerEvent::PlaybackProgress {
                    position,
                    duration,
                    timestamp: chrono::Utc::now(),
                });
            }
            MediaEvent::Ended { generation } if generation == current => {
                self.on_ended().await;
            }
            MediaEvent::Failed {
                generation,
                message,
            } if generation == current => {
                self.state
                    .update_transport(|t| {
                        t.is_playing = false;
                        t.load_failed = true;
                    })
                    .await;
                let item = self
                    .state
                    .transport()
                    .await
                    .current_item
                    .map(|item| item.key());
                warn!(item = ?item.as_ref().map(ToString::to_string), "Media load failed: {}", message);
                self.state.broadcast_event(PlayerEvent::PlaybackError {
                    item,
                    message,
                    timestamp: chrono::Utc::now(),
                });
                self.state.broadcast_event(PlayerEvent::PlaybackStateChanged {
                    playing: false,
                    timestamp: chrono::Utc::now(),
                });
            }
            stale => {
                debug!(?stale, "Discarding event from superseded load");
            }
        }
    }

    /// End-of-item policy: with autoplay on this behaves exactly like an
    /// explicit next (repeat replays the current item from zero); with
    /// autoplay off, or when no candidate exists, playback stops with the
    /// item still loaded at its final position.
    async fn on_ended(&self) {
        let prefs = self.state.preferences().await;
        self.state
            .update_transport(|t| {
                t.progress = t.duration;
                t.is_playing = false;
            })
            .await;
        if let Some(item) = self.state.transport().await.current_item {
            self.state.broadcast_event(PlayerEvent::ItemFinished {
                item: item.key(),
                timestamp: chrono::Utc::now(),
            });
        }

        if !prefs.autoplay {
            info!("Item finished; autoplay off");
            self.state.broadcast_event(PlayerEvent::PlaybackStateChanged {
                playing: false,
                timestamp: chrono::Utc::now(),
            });
            return;
        }

        let mut queue = self.queue.write().await;
        let Some(index) = queue.index() else {
            // Ad-hoc item with nothing queued behind it.
            self.state.broadcast_event(PlayerEvent::PlaybackStateChanged {
                playing: false,
                timestamp: chrono::Utc::now(),
            });
            return;
        };
        let target = {
            let mut rng = rand::thread_rng();
            modes::next_index(queue.items(), index, prefs.playback_mode, &mut rng)
        };
        match target {
            Some(target) => {
                let item = match queue.advance_to(target) {
                    Ok(item) => item.clone(),
                    Err(e) => {
                        warn!("Auto-advance out of sync with queue: {}", e);
                        return;
                    }
                };
                if target != index {
                    self.broadcast_queue_changed(&queue);
                }
                self.begin_load(item, true, Some(target)).await;
            }
            None => {
                info!("End of queue reached; stopping");
                self.state.broadcast_event(PlayerEvent::QueueEnded {
                    timestamp: chrono::Utc::now(),
                });
                self.state.broadcast_event(PlayerEvent::PlaybackStateChanged {
                    playing: false,
                    timestamp: chrono::Utc::now(),
                });
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Hand an item to the transport under a fresh load generation. Items
    /// without a playable media URL never reach the transport: they stay
    /// loaded for display with playback stopped and an error event emitted.
    async fn begin_load(&self, item: PlayableItem, autoplay: bool, queue_index: Option<usize>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        match item.signed_audio() {
            Some(url) => {
                let url = url.to_string();
                let duration_hint = item.duration_secs();
                self.load_autoplay.store(autoplay, Ordering::SeqCst);
                self.state
                    .update_transport(|t| {
                        t.current_item = Some(item.clone());
                        t.progress = 0.0;
                        t.duration = 0.0;
                        t.is_playing = autoplay;
                        t.load_failed = false;
                    })
                    .await;
                self.transport.load(generation, url, duration_hint);
                self.state.broadcast_event(PlayerEvent::ItemStarted {
                    item,
                    queue_index,
                    timestamp: chrono::Utc::now(),
                });
            }
            None => {
                let key = item.key();
                self.load_autoplay.store(false, Ordering::SeqCst);
                self.state
                    .update_transport(|t| {
                        t.current_item = Some(item);
                        t.progress = 0.0;
                        t.duration = 0.0;
                        t.is_playing = false;
                        t.load_failed = true;
                    })
                    .await;
                warn!(item = %key, "Item has no playable media url");
                self.state.broadcast_event(PlayerEvent::PlaybackError {
                    item: Some(key),
                    message: "no playable media url".to_string(),
                    timestamp: chrono::Utc::now(),
                });
            }
        }
    }

    fn broadcast_queue_changed(&self, queue: &QueueStore) {
        self.state.broadcast_event(PlayerEvent::QueueChanged {
            length: queue.len(),
            index: queue.index(),
            timestamp: chrono::Utc::now(),
        });
    }
}
