use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Token {
    /// A token known only by its refresh token; already expired, so the first
    /// use refreshes it.
    pub fn from_refresh_token(refresh_token: String) -> Self {
        Token {
            access_token: String::new(),
            refresh_token,
            scope: String::new(),
            expires_in: 0,
            obtained_at: 0,
        }
    }
}

/// Credentials file format, shared with `CONFIG_FILE_PATH` and the output of
/// `monthlist auth --print`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(rename = "RefreshToken")]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
}

/// Generic offset-paginated Spotify response.
#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub total: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavedTrack {
    pub added_at: String,
    pub track: TrackRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackRef {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<TrackRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<TrackUri>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackUri {
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub playlist: String,
    pub status: String,
    pub liked: usize,
    pub add: usize,
    pub remove: usize,
}

#[derive(Tabled)]
pub struct SettingsTableRow {
    pub setting: String,
    pub value: String,
}
