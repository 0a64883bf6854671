use tracing::debug;

use crate::{
    engine::{MUTATION_BATCH_SIZE, diff::Diff, library::Library},
    error::SyncResult,
};

/// What was actually sent to the remote for one playlist.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub added: usize,
    pub removed: usize,
    pub calls: usize,
}

/// Applies a diff in batches of [`MUTATION_BATCH_SIZE`]: all additions first,
/// then removals when `remove_unliked` is set.
///
/// Batches go out one after another. A failing call stops the rest, leaving
/// the playlist partially updated until the next run repairs it.
pub async fn apply_diff<L>(
    library: &L,
    playlist_id: &str,
    diff: &Diff,
    remove_unliked: bool,
) -> SyncResult<Applied>
where
    L: Library + ?Sized,
{
    let mut applied = Applied::default();

    for chunk in diff.to_add.chunks(MUTATION_BATCH_SIZE) {
        library.add_tracks(playlist_id, chunk).await?;
        applied.added += chunk.len();
        applied.calls += 1;
    }

    if remove_unliked {
        for chunk in diff.to_remove.chunks(MUTATION_BATCH_SIZE) {
            library.remove_tracks(playlist_id, chunk).await?;
            applied.removed += chunk.len();
            applied.calls += 1;
        }
    } else if !diff.to_remove.is_empty() {
        debug!(
            playlist = playlist_id,
            kept = diff.to_remove.len(),
            "keeping unliked tracks"
        );
    }

    Ok(applied)
}
