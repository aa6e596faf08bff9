//! Playable item model
//!
//! Items arrive from the catalog service as songs or podcast episodes. The
//! wire shape (field names, `type` tag) is shared with the web clients and
//! must not drift. Identity is the catalog's string ID qualified by kind;
//! queue position is never identity, because lists are re-fetched and
//! re-normalized copies.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A playable catalog entry.
///
/// `signed_audio` carries the time-limited media URL. An item without one is
/// display-only and must never reach the media transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlayableItem {
    Song {
        #[serde(rename = "songID")]
        song_id: String,
        #[serde(rename = "songName")]
        song_name: String,
        #[serde(rename = "creatorName")]
        creator_name: String,
        #[serde(rename = "signedAudio", default)]
        signed_audio: Option<String>,
        #[serde(rename = "signedCover", default)]
        signed_cover: Option<String>,
        /// Length in seconds (0 when unknown)
        #[serde(default)]
        duration: f64,
    },
    Podcast {
        #[serde(rename = "podcastID")]
        podcast_id: String,
        title: String,
        #[serde(rename = "creatorName")]
        creator_name: String,
        #[serde(rename = "signedAudio", default)]
        signed_audio: Option<String>,
        #[serde(rename = "signedCover", default)]
        signed_cover: Option<String>,
        /// Length in seconds (0 when unknown)
        #[serde(default)]
        duration: f64,
    },
}

impl PlayableItem {
    /// Value identity: kind + string-coerced catalog ID.
    pub fn key(&self) -> ItemKey {
        match self {
            PlayableItem::Song { song_id, .. } => ItemKey {
                kind: ItemKind::Song,
                id: song_id.clone(),
            },
            PlayableItem::Podcast { podcast_id, .. } => ItemKey {
                kind: ItemKind::Podcast,
                id: podcast_id.clone(),
            },
        }
    }

    /// Display title (song name or episode title)
    pub fn title(&self) -> &str {
        match self {
            PlayableItem::Song { song_name, .. } => song_name,
            PlayableItem::Podcast { title, .. } => title,
        }
    }

    pub fn creator_name(&self) -> &str {
        match self {
            PlayableItem::Song { creator_name, .. } => creator_name,
            PlayableItem::Podcast { creator_name, .. } => creator_name,
        }
    }

    /// The media URL, filtered to non-empty values.
    pub fn signed_audio(&self) -> Option<&str> {
        let url = match self {
            PlayableItem::Song { signed_audio, .. } => signed_audio,
            PlayableItem::Podcast { signed_audio, .. } => signed_audio,
        };
        url.as_deref().filter(|u| !u.trim().is_empty())
    }

    pub fn signed_cover(&self) -> Option<&str> {
        let url = match self {
            PlayableItem::Song { signed_cover, .. } => signed_cover,
            PlayableItem::Podcast { signed_cover, .. } => signed_cover,
        };
        url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Length in seconds, 0 when the catalog did not supply one.
    pub fn duration_secs(&self) -> f64 {
        match self {
            PlayableItem::Song { duration, .. } => duration.max(0.0),
            PlayableItem::Podcast { duration, .. } => duration.max(0.0),
        }
    }

    /// An item is playable iff it carries a non-empty media URL.
    pub fn is_playable(&self) -> bool {
        self.signed_audio().is_some()
    }
}

/// Item kind discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Song,
    Podcast,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Song => write!(f, "song"),
            ItemKind::Podcast => write!(f, "podcast"),
        }
    }
}

impl FromStr for ItemKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "song" => Ok(ItemKind::Song),
            "podcast" => Ok(ItemKind::Podcast),
            other => Err(Error::InvalidInput(format!("unknown item kind: {}", other))),
        }
    }
}

/// Value identity of a playable item.
///
/// Compared by value, never by reference: the same catalog entry appears as
/// many independent copies across queue snapshots and API payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub kind: ItemKind,
    pub id: String,
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Playback mode selected by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    #[default]
    Normal,
    Shuffle,
    Repeat,
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackMode::Normal => write!(f, "normal"),
            PlaybackMode::Shuffle => write!(f, "shuffle"),
            PlaybackMode::Repeat => write!(f, "repeat"),
        }
    }
}

impl FromStr for PlaybackMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(PlaybackMode::Normal),
            "shuffle" => Ok(PlaybackMode::Shuffle),
            "repeat" => Ok(PlaybackMode::Repeat),
            other => Err(Error::InvalidInput(format!(
                "unknown playback mode: {}",
                other
            ))),
        }
    }
}

/// User-level playback preferences.
///
/// Live values are owned by the player engine; the persisted copy lives in the
/// remote profile service and only changes on an explicit save.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackPreferences {
    /// Volume in [0.0, 1.0]
    pub volume: f32,
    pub playback_mode: PlaybackMode,
    pub autoplay: bool,
}

impl Default for PlaybackPreferences {
    fn default() -> Self {
        Self {
            volume: 1.0,
            playback_mode: PlaybackMode::Normal,
            autoplay: true,
        }
    }
}

impl PlaybackPreferences {
    /// Copy with volume clamped to [0.0, 1.0]. Applied at every write path,
    /// local or remote.
    pub fn clamped(mut self) -> Self {
        self.volume = self.volume.clamp(0.0, 1.0);
        self
    }
}
