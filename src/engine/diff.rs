use std::collections::HashSet;

use tracing::debug;

use crate::{
    engine::{
        PLAYLIST_TRACKS_PAGE_SIZE,
        library::{Library, TrackId},
        paging::read_all,
    },
    error::SyncResult,
};

/// Changes that make a playlist mirror its month's liked tracks.
///
/// Both lists are sorted so that batches are reproducible between runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diff {
    pub to_add: Vec<TrackId>,
    pub to_remove: Vec<TrackId>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Single pass over the current members: a member that is also desired is
/// struck from the working copy of `desired` and left alone, any other member
/// is scheduled for removal. Whatever is left of `desired` afterwards was never
/// matched and has to be added.
pub fn diff_members<I>(desired: &HashSet<TrackId>, current: I) -> Diff
where
    I: IntoIterator<Item = TrackId>,
{
    let current: HashSet<TrackId> = current.into_iter().collect();
    let mut missing = desired.clone();
    let mut to_remove = Vec::new();

    for member in current {
        if !missing.remove(&member) {
            to_remove.push(member);
        }
    }

    let mut to_add: Vec<TrackId> = missing.into_iter().collect();
    to_add.sort();
    to_remove.sort();

    Diff { to_add, to_remove }
}

/// Reads the playlist's current tracks and diffs them against `desired`.
pub async fn diff_playlist<L>(
    library: &L,
    playlist_id: &str,
    desired: &HashSet<TrackId>,
) -> SyncResult<Diff>
where
    L: Library + ?Sized,
{
    let current = read_all(PLAYLIST_TRACKS_PAGE_SIZE, move |offset, limit| {
        library.playlist_tracks(playlist_id, offset, limit)
    })
    .await?;

    let diff = diff_members(desired, current);
    debug!(
        playlist = playlist_id,
        add = diff.to_add.len(),
        remove = diff.to_remove.len(),
        "computed playlist diff"
    );
    Ok(diff)
}
