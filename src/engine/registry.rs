use std::collections::{HashMap, hash_map::Entry};

use tracing::{debug, info, warn};

use crate::{
    engine::{PLAYLIST_PAGE_SIZE, library::Library, paging::read_all, period::PeriodKey},
    error::SyncResult,
};

/// Managed playlists by period, rebuilt from a full listing every run.
#[derive(Debug, Default, Clone)]
pub struct PlaylistRegistry {
    playlists: HashMap<PeriodKey, String>,
}

impl PlaylistRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists every playlist of the user and keeps those named `YYYY.MM`.
    ///
    /// If several playlists share a managed name the first one listed wins;
    /// the others are never touched.
    pub async fn load<L>(library: &L) -> SyncResult<Self>
    where
        L: Library + ?Sized,
    {
        let listed = read_all(PLAYLIST_PAGE_SIZE, move |offset, limit| {
            library.playlists(offset, limit)
        })
        .await?;

        let mut registry = Self::new();
        for playlist in listed {
            let Some(period) = PeriodKey::parse(&playlist.name) else {
                continue;
            };
            match registry.playlists.entry(period) {
                Entry::Vacant(slot) => {
                    slot.insert(playlist.id);
                }
                Entry::Occupied(kept) => warn!(
                    name = %playlist.name,
                    kept = %kept.get(),
                    ignored = %playlist.id,
                    "duplicate monthly playlist"
                ),
            }
        }

        debug!(managed = registry.len(), "loaded monthly playlists");
        Ok(registry)
    }

    pub fn has(&self, period: &PeriodKey) -> bool {
        self.playlists.contains_key(period)
    }

    pub fn id(&self, period: &PeriodKey) -> Option<&str> {
        self.playlists.get(period).map(String::as_str)
    }

    pub fn insert(&mut self, period: PeriodKey, playlist_id: String) {
        self.playlists.insert(period, playlist_id);
    }

    /// Creates the playlist for `period` and records it.
    ///
    /// Must run before any reconciliation task for `period` is spawned.
    pub async fn create<L>(&mut self, library: &L, period: &PeriodKey) -> SyncResult<String>
    where
        L: Library + ?Sized,
    {
        let playlist_id = library.create_playlist(period.as_str()).await?;
        info!(playlist = %period, id = %playlist_id, "created monthly playlist");
        self.insert(period.clone(), playlist_id.clone());
        Ok(playlist_id)
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }
}
