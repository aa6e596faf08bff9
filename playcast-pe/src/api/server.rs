//! HTTP server setup and routing
//!
//! Sets up the Axum router with the player control endpoints and the SSE
//! stream. UI clients drive the engine exclusively through these routes.

use crate::bridge::PreferenceBridge;
use crate::playback::engine::PlayerEngine;
use crate::state::SharedState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub engine: Arc<PlayerEngine>,
    pub state: Arc<SharedState>,
    pub bridge: Arc<PreferenceBridge>,
}

/// Build the application router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // Observable player state
        .route("/player/state", get(super::handlers::get_state))
        // Playback control
        .route("/player/load", post(super::handlers::load_item))
        .route("/player/queue", post(super::handlers::set_queue))
        .route("/player/queue/items", post(super::handlers::enqueue_item))
        .route(
            "/player/queue/items/:kind/:id",
            delete(super::handlers::remove_item),
        )
        .route("/player/queue/jump", post(super::handlers::jump_to))
        .route("/player/toggle", post(super::handlers::toggle_play))
        .route("/player/next", post(super::handlers::play_next))
        .route("/player/previous", post(super::handlers::play_previous))
        .route("/player/seek", post(super::handlers::seek))
        // Live preference controls
        .route("/player/volume", post(super::handlers::set_volume))
        .route("/player/mode", post(super::handlers::set_mode))
        .route(
            "/player/autoplay/toggle",
            post(super::handlers::toggle_autoplay),
        )
        // Preference persistence round-trips
        .route("/player/preferences", get(super::handlers::get_preferences))
        .route("/player/preferences", put(super::handlers::save_preferences))
        .route(
            "/player/preferences/refresh",
            post(super::handlers::refresh_preferences),
        )
        // SSE event stream
        .route("/events", get(super::sse::event_stream))
        // Attach application context
        .with_state(ctx)
        // Enable CORS for the web clients
        .layer(CorsLayer::permissive())
}
