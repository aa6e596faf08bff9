//! Preference bridge integration tests
//!
//! Runs an in-process stub of the profile service and drives the seed/save
//! round-trips over real HTTP.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use playcast_common::model::{PlaybackMode, PlaybackPreferences};
use playcast_pe::bridge::PreferenceBridge;
use playcast_pe::playback::engine::PlayerEngine;
use playcast_pe::playback::transport::ClockTransport;
use playcast_pe::profile::ProfileClient;
use playcast_pe::state::SharedState;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Clone)]
struct StubState {
    /// Profile body served on GET
    user: Arc<Mutex<Value>>,
    /// Recorded PATCH bodies
    patches: Arc<Mutex<Vec<Value>>>,
    /// When true, PATCH responds 500
    fail_patch: bool,
}

async fn stub_get_user(
    State(stub): State<StubState>,
    Path(_id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let user = stub.user.lock().unwrap().clone();
    if user.is_null() {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({ "user": user })))
}

async fn stub_patch_user(
    State(stub): State<StubState>,
    Path(_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    stub.patches.lock().unwrap().push(body.clone());
    if stub.fail_patch {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!({ "user": body })))
}

/// Spawn the stub profile service on an ephemeral port.
async fn spawn_profile_stub(user: Value, fail_patch: bool) -> (SocketAddr, StubState) {
    let stub = StubState {
        user: Arc::new(Mutex::new(user)),
        patches: Arc::new(Mutex::new(Vec::new())),
        fail_patch,
    };

    let app = Router::new()
        .route("/users/:id", get(stub_get_user))
        .route("/users/:id", patch(stub_patch_user))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, stub)
}

fn engine() -> Arc<PlayerEngine> {
    let state = Arc::new(SharedState::new());
    let (media_tx, media_rx) = mpsc::unbounded_channel();
    let transport = Arc::new(ClockTransport::spawn(media_tx));
    let engine = Arc::new(PlayerEngine::new(state, transport, media_rx));
    engine.start();
    engine
}

fn bridge_for(addr: SocketAddr) -> PreferenceBridge {
    let client = ProfileClient::new(format!("http://{}", addr), "user-1").unwrap();
    PreferenceBridge::new(client)
}

#[tokio::test]
async fn seed_applies_remote_preferences_without_writing_back() {
    let (addr, stub) = spawn_profile_stub(
        json!({
            "userID": "user-1",
            "username": "casey",
            "volume": 0.4,
            "playbackMode": "shuffle",
            "autoplay": false
        }),
        false,
    )
    .await;
    let engine = engine();
    let bridge = bridge_for(addr);

    bridge.seed(&engine).await;

    let prefs = engine.preferences().await;
    assert_eq!(prefs.volume, 0.4);
    assert_eq!(prefs.playback_mode, PlaybackMode::Shuffle);
    assert!(!prefs.autoplay);

    // Seeding never persists.
    assert!(stub.patches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn seed_with_unknown_user_keeps_defaults() {
    let (addr, _stub) = spawn_profile_stub(Value::Null, false).await;
    let engine = engine();
    let bridge = bridge_for(addr);

    bridge.seed(&engine).await;

    let prefs = engine.preferences().await;
    assert_eq!(prefs, PlaybackPreferences::default());
}

#[tokio::test]
async fn seed_clamps_out_of_range_remote_volume() {
    let (addr, _stub) = spawn_profile_stub(
        json!({ "volume": 7.5, "playbackMode": "normal", "autoplay": true }),
        false,
    )
    .await;
    let engine = engine();
    let bridge = bridge_for(addr);

    bridge.seed(&engine).await;
    assert_eq!(engine.preferences().await.volume, 1.0);
}

#[tokio::test]
async fn save_persists_then_applies_to_live_engine() {
    let (addr, stub) = spawn_profile_stub(json!({}), false).await;
    let engine = engine();
    let bridge = bridge_for(addr);

    // Interim control change; the explicit save below wins.
    engine.change_volume(0.9).await;

    let saved = bridge
        .save(
            &engine,
            PlaybackPreferences {
                volume: 0.2,
                playback_mode: PlaybackMode::Repeat,
                autoplay: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(saved.volume, 0.2);
    assert_eq!(saved.playback_mode, PlaybackMode::Repeat);

    let prefs = engine.preferences().await;
    assert_eq!(prefs.volume, 0.2);
    assert_eq!(prefs.playback_mode, PlaybackMode::Repeat);

    // The PATCH body carries exactly the wire preference fields.
    let patches = stub.patches.lock().unwrap();
    assert_eq!(patches.len(), 1);
    let body = &patches[0];
    assert_eq!(body["volume"], 0.2);
    assert_eq!(body["playbackMode"], "repeat");
    assert_eq!(body["autoplay"], true);
}

#[tokio::test]
async fn save_clamps_volume_before_sending() {
    let (addr, stub) = spawn_profile_stub(json!({}), false).await;
    let engine = engine();
    let bridge = bridge_for(addr);

    bridge
        .save(
            &engine,
            PlaybackPreferences {
                volume: 3.0,
                playback_mode: PlaybackMode::Normal,
                autoplay: true,
            },
        )
        .await
        .unwrap();

    let patches = stub.patches.lock().unwrap();
    assert_eq!(patches[0]["volume"], 1.0);
}

#[tokio::test]
async fn failed_save_leaves_live_state_untouched() {
    let (addr, stub) = spawn_profile_stub(json!({}), true).await;
    let engine = engine();
    let bridge = bridge_for(addr);

    engine.change_volume(0.8).await;

    let result = bridge
        .save(
            &engine,
            PlaybackPreferences {
                volume: 0.1,
                playback_mode: PlaybackMode::Shuffle,
                autoplay: false,
            },
        )
        .await;
    assert!(result.is_err());

    // The remote write failed; the in-memory state keeps the control value.
    let prefs = engine.preferences().await;
    assert_eq!(prefs.volume, 0.8);
    assert_eq!(prefs.playback_mode, PlaybackMode::Normal);
    assert!(prefs.autoplay);

    // The request was attempted.
    assert_eq!(stub.patches.lock().unwrap().len(), 1);
}
