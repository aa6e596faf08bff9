//! Configuration loading and resolution
//!
//! Every setting resolves through the same priority ladder:
//! 1. Command-line argument
//! 2. Environment variable (`PLAYCAST_*`)
//! 3. TOML config file
//! 4. Compiled default
//!
//! Missing or corrupt config files degrade to defaults with a warning; they
//! never abort startup.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default HTTP port for the player engine service
pub const DEFAULT_PORT: u16 = 5750;

/// Default base URL of the profile service
pub const DEFAULT_PROFILE_URL: &str = "http://127.0.0.1:5751";

/// Fallback user when no identity is configured
pub const DEFAULT_USER_ID: &str = "anonymous";

pub const PORT_ENV: &str = "PLAYCAST_PORT";
pub const PROFILE_URL_ENV: &str = "PLAYCAST_PROFILE_URL";
pub const USER_ID_ENV: &str = "PLAYCAST_USER_ID";

/// Settings read from the TOML config file. All optional; unset values fall
/// through to the next rung of the ladder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub profile_url: Option<String>,
    pub user_id: Option<String>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Load from the first config file found in the platform candidates, or
    /// defaults when none exists.
    pub fn load() -> Self {
        for path in config_file_candidates() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Self::default()
    }

    /// Load from an explicit path. Read or parse failures degrade to defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Corrupt config file {}: {}; using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Could not read config file {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Platform config file locations, in priority order.
fn config_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("playcast").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc/playcast/config.toml"));
    }
    candidates
}

/// Resolve the listen port through the ladder.
pub fn resolve_port(cli: Option<u16>, file: &TomlConfig) -> u16 {
    if let Some(port) = cli {
        return port;
    }
    if let Ok(value) = std::env::var(PORT_ENV) {
        match value.parse() {
            Ok(port) => return port,
            Err(_) => warn!("Ignoring unparseable {}={}", PORT_ENV, value),
        }
    }
    file.port.unwrap_or(DEFAULT_PORT)
}

/// Resolve the profile service base URL through the ladder.
pub fn resolve_profile_url(cli: Option<&str>, file: &TomlConfig) -> String {
    if let Some(url) = cli {
        return url.to_string();
    }
    if let Ok(url) = std::env::var(PROFILE_URL_ENV) {
        return url;
    }
    file.profile_url
        .clone()
        .unwrap_or_else(|| DEFAULT_PROFILE_URL.to_string())
}

/// Resolve the user whose preferences seed the engine.
pub fn resolve_user_id(cli: Option<&str>, file: &TomlConfig) -> String {
    if let Some(id) = cli {
        return id.to_string();
    }
    if let Ok(id) = std::env::var(USER_ID_ENV) {
        return id;
    }
    file.user_id
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_ID.to_string())
}
