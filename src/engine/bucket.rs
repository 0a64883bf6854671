use std::{
    collections::{BTreeMap, HashSet, btree_map},
    ops::ControlFlow,
};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::{
    engine::{
        LIKED_PAGE_SIZE,
        library::{Library, LikedTrack, TrackId},
        paging::read_pages,
        period::{PeriodKey, SearchWindow},
    },
    error::SyncResult,
};

/// Liked track ids grouped by the month they were added in.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Bucket {
    periods: BTreeMap<PeriodKey, HashSet<TrackId>>,
}

impl Bucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, period: PeriodKey, track: TrackId) {
        self.periods.entry(period).or_default().insert(track);
    }

    pub fn get(&self, period: &PeriodKey) -> Option<&HashSet<TrackId>> {
        self.periods.get(period)
    }

    /// Periods in chronological order.
    pub fn periods(&self) -> impl Iterator<Item = &PeriodKey> {
        self.periods.keys()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn track_count(&self) -> usize {
        self.periods.values().map(HashSet::len).sum()
    }
}

impl IntoIterator for Bucket {
    type Item = (PeriodKey, HashSet<TrackId>);
    type IntoIter = btree_map::IntoIter<PeriodKey, HashSet<TrackId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.periods.into_iter()
    }
}

/// Incrementally sorts liked tracks into a [`Bucket`].
///
/// Precondition: tracks are pushed in non-increasing `added_at` order. The
/// first track older than the cutoff ends the scan, so an out-of-order
/// listing would silently drop whatever recent tracks follow it.
#[derive(Debug)]
pub struct Bucketizer {
    cutoff: Option<PeriodKey>,
    bucket: Bucket,
    skipped: usize,
    reached_cutoff: bool,
}

impl Bucketizer {
    pub fn new(window: SearchWindow, today: NaiveDate) -> Self {
        Self {
            cutoff: window.cutoff(today),
            bucket: Bucket::new(),
            skipped: 0,
            reached_cutoff: false,
        }
    }

    pub fn cutoff(&self) -> Option<&PeriodKey> {
        self.cutoff.as_ref()
    }

    pub fn push(&mut self, track: LikedTrack) -> ControlFlow<()> {
        let Some(period) = PeriodKey::from_added_at(&track.added_at) else {
            warn!(track = %track.id, added_at = %track.added_at, "skipping liked track with unreadable date");
            self.skipped += 1;
            return ControlFlow::Continue(());
        };

        if self.cutoff.as_ref().is_some_and(|cutoff| &period < cutoff) {
            self.reached_cutoff = true;
            return ControlFlow::Break(());
        }

        self.bucket.insert(period, track.id);
        ControlFlow::Continue(())
    }

    /// Whether the scan was stopped early by the cutoff.
    pub fn reached_cutoff(&self) -> bool {
        self.reached_cutoff
    }

    pub fn finish(self) -> Bucket {
        debug!(
            periods = self.bucket.len(),
            tracks = self.bucket.track_count(),
            skipped = self.skipped,
            reached_cutoff = self.reached_cutoff,
            "bucketized liked tracks"
        );
        self.bucket
    }
}

/// Reads the liked tracks newest first and buckets them by month, stopping at
/// the first track older than the search window.
pub async fn bucketize<L>(library: &L, window: SearchWindow, today: NaiveDate) -> SyncResult<Bucket>
where
    L: Library + ?Sized,
{
    let mut bucketizer = Bucketizer::new(window, today);
    read_pages(
        LIKED_PAGE_SIZE,
        move |offset, limit| library.saved_tracks(offset, limit),
        |track| bucketizer.push(track),
    )
    .await?;
    Ok(bucketizer.finish())
}
