use std::fmt;

use async_trait::async_trait;

use crate::error::SyncResult;

/// Opaque Spotify track identifier (the base62 id, not the `spotify:track:` URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        TrackId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn uri(&self) -> String {
        format!("spotify:track:{}", self.0)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        TrackId::new(id)
    }
}

/// A liked track as returned by the saved-tracks listing.
///
/// `added_at` is kept verbatim (`2024-01-05T12:34:56Z`); only its `YYYY-MM`
/// prefix is ever interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikedTrack {
    pub id: TrackId,
    pub added_at: String,
}

impl LikedTrack {
    pub fn new(id: impl Into<String>, added_at: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(id),
            added_at: added_at.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
}

/// One page of an offset-paginated listing.
///
/// `total` is the size of the whole collection as reported by the remote at
/// the time this page was served.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u32) -> Self {
        Self { items, total }
    }
}

/// The remote music library the engine reconciles against.
///
/// Implementations are expected to be ready to use: authentication, retries
/// and timeouts are their business. Every method may suspend on the network;
/// nothing else in the engine does.
#[async_trait]
pub trait Library: Send + Sync {
    /// Liked tracks, most recently added first. Tracks without an id are
    /// omitted, but still count toward `total`.
    async fn saved_tracks(&self, offset: u32, limit: u32) -> SyncResult<Page<LikedTrack>>;

    /// Playlists in the current user's library.
    async fn playlists(&self, offset: u32, limit: u32) -> SyncResult<Page<PlaylistSummary>>;

    /// Track ids currently in a playlist. Entries without a track id are omitted,
    /// but still count toward `total`.
    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> SyncResult<Page<TrackId>>;

    /// Creates a playlist owned by the current user and returns its id.
    async fn create_playlist(&self, name: &str) -> SyncResult<String>;

    async fn add_tracks(&self, playlist_id: &str, tracks: &[TrackId]) -> SyncResult<()>;

    async fn remove_tracks(&self, playlist_id: &str, tracks: &[TrackId]) -> SyncResult<()>;
}
