//! Remote profile service client
//!
//! The profile service owns the persisted copy of user playback preferences.
//! The engine reads them once at session start and writes them only on an
//! explicit save; it never validates server-side constraints beyond clamping
//! volume before sending.

use playcast_common::model::PlaybackPreferences;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("playcast-pe/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Profile client errors
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Envelope wrapping the user object in profile responses
#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: PlaybackPreferences,
}

/// Profile service API client
pub struct ProfileClient {
    http_client: reqwest::Client,
    base_url: String,
    user_id: String,
}

impl ProfileClient {
    pub fn new(
        base_url: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Result<Self, ProfileError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProfileError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: user_id.into(),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn user_url(&self) -> String {
        format!("{}/users/{}", self.base_url, self.user_id)
    }

    /// Fetch the persisted playback preferences from the user's profile.
    /// Unknown profile fields are ignored; volume is clamped on ingest.
    pub async fn fetch_preferences(&self) -> Result<PlaybackPreferences, ProfileError> {
        let url = self.user_url();
        tracing::debug!(url = %url, "Fetching profile preferences");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProfileError::Network(e.to_string()))?;

        let status = response.status();
        if status == 404 {
            return Err(ProfileError::UserNotFound(self.user_id.clone()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProfileError::Api(status.as_u16(), error_text));
        }

        let envelope: UserEnvelope = response
            .json()
            .await
            .map_err(|e| ProfileError::Parse(e.to_string()))?;

        tracing::info!(
            user = %self.user_id,
            volume = envelope.user.volume,
            mode = %envelope.user.playback_mode,
            "Retrieved preferences from profile service"
        );

        Ok(envelope.user.clamped())
    }

    /// Persist playback preferences to the user's profile. Returns the
    /// preferences as the server stored them.
    pub async fn save_preferences(
        &self,
        prefs: &PlaybackPreferences,
    ) -> Result<PlaybackPreferences, ProfileError> {
        let url = self.user_url();
        let body = prefs.clamped();
        tracing::debug!(url = %url, "Saving profile preferences");

        let response = self
            .http_client
            .patch(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProfileError::Network(e.to_string()))?;

        let status = response.status();
        if status == 404 {
            return Err(ProfileError::UserNotFound(self.user_id.clone()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProfileError::Api(status.as_u16(), error_text));
        }

        let envelope: UserEnvelope = response
            .json()
            .await
            .map_err(|e| ProfileError::Parse(e.to_string()))?;

        tracing::info!(user = %self.user_id, "Preferences saved to profile service");

        Ok(envelope.user.clamped())
    }
}
