//! # Playcast Player Engine (playcast-pe)
//!
//! The one "now playing" for a Playcast session: owns the play queue,
//! transport state, playback mode, autoplay policy, and volume, and
//! coordinates a single media transport against many independent UI triggers
//! delivered over HTTP. State flows back to clients through a snapshot
//! endpoint and an SSE event stream; persisted preferences round-trip through
//! the remote profile service.

pub mod api;
pub mod bridge;
pub mod error;
pub mod playback;
pub mod profile;
pub mod state;

pub use error::{Error, Result};
pub use state::SharedState;
