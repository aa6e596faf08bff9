//! HTTP request handlers
//!
//! REST endpoints for playback control. State-mutating handlers respond with
//! the fresh player snapshot so UIs can reconcile immediately.

use crate::api::server::AppContext;
use crate::error::Error;
use crate::playback::engine::PlayerSnapshot;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use playcast_common::model::{ItemKey, ItemKind, PlayableItem, PlaybackMode, PlaybackPreferences};
use serde::{Deserialize, Serialize};
use tracing::error;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    item: PlayableItem,
    #[serde(default = "default_autoplay")]
    autoplay: bool,
}

fn default_autoplay() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetQueueRequest {
    items: Vec<PlayableItem>,
    start_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    item: PlayableItem,
}

#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    index: usize,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    seconds: f64,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    /// Volume in [0.0, 1.0]; clamped
    volume: f32,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    mode: PlaybackMode,
}

type HandlerResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

fn error_response(e: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        Error::Queue(_) => StatusCode::BAD_REQUEST,
        Error::Profile(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", e);
    }
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Health
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "playcast-pe".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Observable state
// ============================================================================

/// GET /player/state - Full observable player snapshot
pub async fn get_state(State(ctx): State<AppContext>) -> Json<PlayerSnapshot> {
    Json(ctx.engine.snapshot().await)
}

// ============================================================================
// Playback control
// ============================================================================

/// POST /player/load - Play a single item outside any queue context
pub async fn load_item(
    State(ctx): State<AppContext>,
    Json(req): Json<LoadRequest>,
) -> Json<PlayerSnapshot> {
    ctx.engine.load_item(req.item, req.autoplay).await;
    Json(ctx.engine.snapshot().await)
}

/// POST /player/queue - Replace the queue wholesale and start playing
pub async fn set_queue(
    State(ctx): State<AppContext>,
    Json(req): Json<SetQueueRequest>,
) -> HandlerResult<Json<PlayerSnapshot>> {
    ctx.engine
        .set_new_queue(req.items, req.start_index)
        .await
        .map_err(error_response)?;
    Ok(Json(ctx.engine.snapshot().await))
}

/// POST /player/queue/items - Append an item to the queue tail
pub async fn enqueue_item(
    State(ctx): State<AppContext>,
    Json(req): Json<EnqueueRequest>,
) -> Json<PlayerSnapshot> {
    ctx.engine.enqueue(req.item).await;
    Json(ctx.engine.snapshot().await)
}

/// DELETE /player/queue/items/:kind/:id - Remove an item by identity
pub async fn remove_item(
    State(ctx): State<AppContext>,
    Path((kind, id)): Path<(String, String)>,
) -> HandlerResult<Json<PlayerSnapshot>> {
    let kind: ItemKind = kind.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("unknown item kind: {}", kind),
            }),
        )
    })?;
    let key = ItemKey { kind, id };
    if !ctx.engine.remove_item(&key).await {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("item {} not in queue", key),
            }),
        ));
    }
    Ok(Json(ctx.engine.snapshot().await))
}

/// POST /player/queue/jump - Move the cursor to a queue position and play it
pub async fn jump_to(
    State(ctx): State<AppContext>,
    Json(req): Json<JumpRequest>,
) -> HandlerResult<Json<PlayerSnapshot>> {
    ctx.engine
        .play_item_at(req.index)
        .await
        .map_err(error_response)?;
    Ok(Json(ctx.engine.snapshot().await))
}

/// POST /player/toggle - Flip play/pause
pub async fn toggle_play(State(ctx): State<AppContext>) -> Json<PlayerSnapshot> {
    ctx.engine.toggle_play().await;
    Json(ctx.engine.snapshot().await)
}

/// POST /player/next - Advance per the current playback mode
pub async fn play_next(State(ctx): State<AppContext>) -> Json<PlayerSnapshot> {
    ctx.engine.play_next().await;
    Json(ctx.engine.snapshot().await)
}

/// POST /player/previous - Step back to the previous item
pub async fn play_previous(State(ctx): State<AppContext>) -> Json<PlayerSnapshot> {
    ctx.engine.play_previous().await;
    Json(ctx.engine.snapshot().await)
}

/// POST /player/seek - Seek within the loaded item
pub async fn seek(
    State(ctx): State<AppContext>,
    Json(req): Json<SeekRequest>,
) -> Json<PlayerSnapshot> {
    ctx.engine.seek(req.seconds).await;
    Json(ctx.engine.snapshot().await)
}

// ============================================================================
// Live preference controls
// ============================================================================

/// POST /player/volume - Set volume now (no remote persistence)
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Json(req): Json<VolumeRequest>,
) -> Json<PlayerSnapshot> {
    ctx.engine.change_volume(req.volume).await;
    Json(ctx.engine.snapshot().await)
}

/// POST /player/mode - Switch playback mode (no remote persistence)
pub async fn set_mode(
    State(ctx): State<AppContext>,
    Json(req): Json<ModeRequest>,
) -> Json<PlayerSnapshot> {
    ctx.engine.change_playback_mode(req.mode).await;
    Json(ctx.engine.snapshot().await)
}

/// POST /player/autoplay/toggle - Flip autoplay (no remote persistence)
pub async fn toggle_autoplay(State(ctx): State<AppContext>) -> Json<PlayerSnapshot> {
    ctx.engine.toggle_autoplay().await;
    Json(ctx.engine.snapshot().await)
}

// ============================================================================
// Preference persistence round-trips
// ============================================================================

/// GET /player/preferences - Live preference values
pub async fn get_preferences(State(ctx): State<AppContext>) -> Json<PlaybackPreferences> {
    Json(ctx.engine.preferences().await)
}

/// PUT /player/preferences - Explicit save: persist to the remote profile,
/// then mirror the stored values into the live engine. A remote failure
/// leaves live state untouched.
pub async fn save_preferences(
    State(ctx): State<AppContext>,
    Json(prefs): Json<PlaybackPreferences>,
) -> HandlerResult<Json<PlaybackPreferences>> {
    let saved = ctx
        .bridge
        .save(&ctx.engine, prefs)
        .await
        .map_err(|e| error_response(Error::Profile(e)))?;
    Ok(Json(saved))
}

/// POST /player/preferences/refresh - Re-seed live preferences from the
/// profile service (the login-time pull, exposed for session handoff)
pub async fn refresh_preferences(State(ctx): State<AppContext>) -> Json<PlaybackPreferences> {
    ctx.bridge.seed(&ctx.engine).await;
    Json(ctx.engine.preferences().await)
}
