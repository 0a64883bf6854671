//! Configuration management for monthlist.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Settings are resolved in this order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults
//!
//! Only the Spotify client id is strictly required, and only by the operations
//! that talk to the accounts service (authorization and token refresh). Run
//! parameters that are missing or malformed fall back to their defaults with a
//! warning instead of failing the job.

use std::{env, path::PathBuf};

use tracing::warn;

use crate::{error::SyncError, utils};

pub const DEFAULT_SEARCH_PERIOD: u32 = 6;
pub const DEFAULT_REMOVE_UNLIKED_SONGS: bool = true;
pub const DEFAULT_RUN_INTERVAL: u64 = 15;

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/callback";
const DEFAULT_SCOPE: &str =
    "user-library-read playlist-read-private playlist-modify-public playlist-modify-private";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_CONFIG_FILE_PATH: &str = "/conf/config.json";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the data directory if it doesn't exist. A missing `.env` file is
/// not an error: containers usually configure the job through the environment
/// alone.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/monthlist/.env`
/// - macOS: `~/Library/Application Support/monthlist/.env`
/// - Windows: `%LOCALAPPDATA%/monthlist/.env`
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Platform-specific directory holding `.env`, the token cache and the
/// `.env.example` template.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("monthlist");
    path
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Address the temporary OAuth callback server binds to.
///
/// Reads `SERVER_ADDRESS`, defaulting to `127.0.0.1:8080`.
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Returns the Spotify API client ID for authentication.
///
/// Retrieves the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable which
/// contains the client ID obtained when registering the application with
/// Spotify's developer platform. The PKCE flow needs no client secret.
///
/// # Errors
///
/// Returns [`SyncError::Config`] if the variable is unset or empty.
pub fn spotify_client_id() -> Result<String, SyncError> {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| SyncError::Config("SPOTIFY_API_AUTH_CLIENT_ID must be set".to_string()))
}

/// Returns the Spotify OAuth redirect URI.
///
/// Must match both the redirect URI registered for the Spotify application
/// and the address of the local callback server.
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Returns the space separated OAuth scopes requested during authorization.
pub fn spotify_scope() -> String {
    var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Returns the Spotify Web API base URL, e.g. `https://api.spotify.com/v1`.
pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Refresh token supplied directly through `REFRESH_TOKEN`, if any.
pub fn refresh_token() -> Option<String> {
    env::var("REFRESH_TOKEN")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Location of the JSON credentials file (`{"RefreshToken": "..."}`).
///
/// Reads `CONFIG_FILE_PATH`, defaulting to `/conf/config.json`.
pub fn config_file_path() -> PathBuf {
    PathBuf::from(var_or("CONFIG_FILE_PATH", DEFAULT_CONFIG_FILE_PATH))
}

/// Parameters of the reconciliation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    /// Months of liked history to mirror, `0` for everything.
    pub search_period: u32,
    pub remove_unliked_songs: bool,
    /// Minutes between two runs of the outer loop.
    pub run_interval: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            search_period: DEFAULT_SEARCH_PERIOD,
            remove_unliked_songs: DEFAULT_REMOVE_UNLIKED_SONGS,
            run_interval: DEFAULT_RUN_INTERVAL,
        }
    }
}

impl RunSettings {
    /// Reads `SEARCH_PERIOD`, `REMOVE_UNLIKED_SONGS` and `RUN_INTERVAL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the settings from an arbitrary key lookup. Unset keys take the
    /// default silently, unparsable ones take it with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let search_period = parse_or(&lookup, "SEARCH_PERIOD", defaults.search_period, |v| {
            v.parse().ok()
        });
        let remove_unliked_songs = parse_or(
            &lookup,
            "REMOVE_UNLIKED_SONGS",
            defaults.remove_unliked_songs,
            utils::parse_bool,
        );
        let run_interval = parse_or(&lookup, "RUN_INTERVAL", defaults.run_interval, |v| {
            v.parse().ok()
        });

        Self {
            search_period,
            remove_unliked_songs,
            run_interval,
        }
    }
}

fn parse_or<T, F, P>(lookup: &F, key: &str, default: T, parse: P) -> T
where
    T: std::fmt::Display + Copy,
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };

    match parse(raw.trim()) {
        Some(value) => value,
        None => {
            warn!(key, value = %raw, default = %default, "invalid setting, using default");
            default
        }
    }
}
