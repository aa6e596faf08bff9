//! Media transport: the single playback unit
//!
//! Exactly one transport exists per engine. It binds to one media URL at a
//! time and reports transport facts as events on an mpsc channel back to the
//! engine; it makes no queue or policy decisions. Loading a new URL
//! supersedes the previous one — there is no separate cancel.
//!
//! Every command and event carries a load generation. The engine discards
//! events from superseded generations, so a slow load can never resurface
//! after the user has switched items.

use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, warn};

/// Interval between transport ticks (and Progress events) while playing
const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Events reported by the transport to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// The URL was accepted and the transport is positioned at zero.
    Loaded { generation: u64, duration: f64 },

    /// Position update while playing (also emitted once after a seek).
    Progress { generation: u64, position: f64 },

    /// End of the loaded item was reached. Emitted exactly once per completed
    /// playback.
    Ended { generation: u64 },

    /// The load could not proceed (bad or missing URL).
    Failed { generation: u64, message: String },
}

/// Command surface of the playback unit.
///
/// Implementations must not block: the engine calls these from async context
/// and expects an immediate return, with outcomes reported as [`MediaEvent`]s.
/// Test suites substitute a scripted implementation; this trait is the seam.
pub trait MediaTransport: Send + Sync {
    /// Bind to a new media URL, resetting position to zero. The previous
    /// resource is discarded. Invalid URLs surface as a `Failed` event, not an
    /// error return. `duration_hint` seeds the duration from catalog metadata
    /// (0 when unknown).
    fn load(&self, generation: u64, url: String, duration_hint: f64);

    /// Start playback of the loaded resource. No-op when nothing is loaded.
    fn play(&self);

    /// Pause playback. No-op when nothing is loaded.
    fn pause(&self);

    /// Seek to a position in seconds. Clamped to `[0, duration]`; ignored
    /// while the duration is unknown.
    fn seek(&self, position: f64);

    /// Set volume, clamped to `[0.0, 1.0]`. Applies regardless of play state.
    fn set_volume(&self, volume: f32);
}

#[derive(Debug)]
enum Command {
    Load {
        generation: u64,
        url: String,
        duration: f64,
    },
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
}

/// Clock-driven production transport.
///
/// Advances position against the known item duration on a fixed tick. Media
/// bytes reach listeners out-of-band through the signed URL; the engine owns
/// transport facts only, so a wall-clock position model is the whole of
/// playback here.
pub struct ClockTransport {
    command_tx: mpsc::UnboundedSender<Command>,
}

impl ClockTransport {
    /// Spawn the transport task. Emitted events go to `event_tx`.
    pub fn spawn(event_tx: mpsc::UnboundedSender<MediaEvent>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(transport_task(command_rx, event_tx));
        Self { command_tx }
    }

    fn send(&self, command: Command) {
        if self.command_tx.send(command).is_err() {
            warn!("Transport task is gone; command dropped");
        }
    }
}

impl MediaTransport for ClockTransport {
    fn load(&self, generation: u64, url: String, duration_hint: f64) {
        self.send(Command::Load {
            generation,
            url,
            duration: duration_hint,
        });
    }

    fn play(&self) {
        self.send(Command::Play);
    }

    fn pause(&self) {
        self.send(Command::Pause);
    }

    fn seek(&self, position: f64) {
        self.send(Command::Seek(position));
    }

    fn set_volume(&self, volume: f32) {
        self.send(Command::SetVolume(volume));
    }
}

/// Transport state machine, driven by commands and the playback tick.
#[derive(Debug, Default)]
struct TransportCore {
    generation: u64,
    loaded: bool,
    playing: bool,
    position: f64,
    duration: f64,
    volume: f32,
}

impl TransportCore {
    fn apply(&mut self, command: Command, events: &mpsc::UnboundedSender<MediaEvent>) {
        match command {
            Command::Load {
                generation,
                url,
                duration,
            } => {
                self.generation = generation;
                self.position = 0.0;
                self.playing = false;
                if url.trim().is_empty() {
                    self.loaded = false;
                    self.duration = 0.0;
                    let _ = events.send(MediaEvent::Failed {
                        generation,
                        message: "missing media url".to_string(),
                    });
                } else {
                    self.loaded = true;
                    self.duration = duration.max(0.0);
                    debug!(url = %url, duration = self.duration, "Transport loaded");
                    let _ = events.send(MediaEvent::Loaded {
                        generation,
                        duration: self.duration,
                    });
                }
            }
            Command::Play => {
                if self.loaded {
                    // Play after the end restarts from the top, matching what
                    // listeners expect from a finished track.
                    if self.duration > 0.0 && self.position >= self.duration {
                        self.position = 0.0;
                    }
                    self.playing = true;
                }
            }
            Command::Pause => {
                self.playing = false;
            }
            Command::Seek(position) => {
                // Seeking is only meaningful once the duration is known.
                if self.loaded && self.duration > 0.0 {
                    self.position = position.clamp(0.0, self.duration);
                    let _ = events.send(MediaEvent::Progress {
                        generation: self.generation,
                        position: self.position,
                    });
                }
            }
            Command::SetVolume(volume) => {
                self.volume = volume.clamp(0.0, 1.0);
            }
        }
    }

    /// Advance the clock by `dt` seconds while playing.
    fn advance(&mut self, dt: f64, events: &mpsc::UnboundedSender<MediaEvent>) {
        if !self.playing || !self.loaded {
            return;
        }
        self.position += dt;
        if self.duration > 0.0 && self.position >= self.duration {
            self.position = self.duration;
            self.playing = false;
            let _ = events.send(MediaEvent::Progress {
                generation: self.generation,
                position: self.position,
            });
            let _ = events.send(MediaEvent::Ended {
                generation: self.generation,
            });
        } else {
            let _ = events.send(MediaEvent::Progress {
                generation: self.generation,
                position: self.position,
            });
        }
    }
}

async fn transport_task(
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::UnboundedSender<MediaEvent>,
) {
    let mut core = TransportCore::default();
    let mut tick = interval(TICK_INTERVAL);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            command = command_rx.recv() => {
                let Some(command) = command else {
                    debug!("Transport command channel closed; task exiting");
                    break;
                };
                core.apply(command, &event_tx);
            }
            _ = tick.tick(), if core.playing => {
                core.advance(TICK_INTERVAL.as_secs_f64(), &event_tx);
            }
        }
    }
}
