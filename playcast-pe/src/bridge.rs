//! Preference bridge
//!
//! Playback preferences have two independent write paths: every control
//! applies immediately to the live engine, and an explicit save pushes to the
//! remote profile. The bridge owns the remote half plus the login-time seed,
//! and holds no state of its own.

use crate::playback::engine::PlayerEngine;
use crate::profile::{ProfileClient, ProfileError};
use playcast_common::model::PlaybackPreferences;
use tracing::{info, warn};

pub struct PreferenceBridge {
    client: ProfileClient,
}

impl PreferenceBridge {
    pub fn new(client: ProfileClient) -> Self {
        Self { client }
    }

    /// Seed live engine state from the persisted profile. Goes through the
    /// bridge setters, so it can never trigger a remote write-back. A failed
    /// fetch keeps the engine on defaults.
    pub async fn seed(&self, engine: &PlayerEngine) {
        match self.client.fetch_preferences().await {
            Ok(prefs) => {
                info!(user = %self.client.user_id(), "Seeding engine preferences from profile");
                engine.apply_preferences(prefs).await;
            }
            Err(e) => {
                warn!("Preference seed failed, keeping defaults: {}", e);
            }
        }
    }

    /// Explicit save: persist remotely first, then mirror the stored values
    /// into the live engine so the saved set wins over any interim control
    /// changes. On failure the live state is left untouched — the local
    /// changes made through the controls persist in memory regardless.
    pub async fn save(
        &self,
        engine: &PlayerEngine,
        prefs: PlaybackPreferences,
    ) -> Result<PlaybackPreferences, ProfileError> {
        let saved = self.client.save_preferences(&prefs).await?;
        engine.apply_preferences(saved).await;
        Ok(saved)
    }
}
