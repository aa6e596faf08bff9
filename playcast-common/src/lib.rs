//! # Playcast Common Library
//!
//! Shared building blocks for the Playcast services: the playable item model,
//! player events and event bus, common error types, and configuration
//! resolution.

pub mod config;
pub mod error;
pub mod events;
pub mod model;

pub use error::{Error, Result};
