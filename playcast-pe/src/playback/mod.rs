//! Playback subsystem: media transport, queue store, mode resolution, and the
//! engine that orchestrates them.

pub mod engine;
pub mod modes;
pub mod queue;
pub mod transport;

pub use engine::{PlayerEngine, PlayerSnapshot};
pub use transport::{ClockTransport, MediaEvent, MediaTransport};
