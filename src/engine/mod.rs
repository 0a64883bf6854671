//! # Reconciliation Engine
//!
//! Keeps one playlist per month (`YYYY.MM`) in sync with the tracks the user
//! liked during that month. Every run starts from scratch: nothing is cached
//! between runs, so a run that dies halfway is simply repaired by the next one.
//!
//! ## Pipeline
//!
//! ```text
//! saved tracks ──► paging ──► bucket ──┐
//!                                      ├──► scheduler ──► diff ──► mutate
//! playlists    ──► paging ──► registry ┘      (≤ 5 playlists in flight)
//! ```
//!
//! - [`paging`] walks offset-paginated listings.
//! - [`bucket`] groups liked tracks by month and stops scanning at the search
//!   window's cutoff. This relies on the listing being newest first.
//! - [`registry`] maps month keys to existing playlists and creates missing ones.
//! - [`diff`] computes additions and removals for one playlist.
//! - [`mutate`] sends them in batches of 100.
//! - [`scheduler`] creates missing playlists sequentially, then reconciles
//!   every month concurrently behind a semaphore.
//!
//! All network access goes through the [`Library`] trait; the Spotify
//! implementation lives in [`crate::spotify::client`].

pub mod bucket;
pub mod diff;
pub mod library;
pub mod mutate;
pub mod paging;
pub mod period;
pub mod registry;
pub mod scheduler;

pub use bucket::{Bucket, Bucketizer, bucketize};
pub use diff::{Diff, diff_members, diff_playlist};
pub use library::{Library, LikedTrack, Page, PlaylistSummary, TrackId};
pub use mutate::{Applied, apply_diff};
pub use paging::{read_all, read_pages};
pub use period::{PeriodKey, SearchWindow};
pub use registry::PlaylistRegistry;
pub use scheduler::{
    FailurePolicy, PlaylistFailure, PlaylistOutcome, ReconcileOptions, Reconciler, RunReport,
};

/// Upper bound on playlists reconciled at the same time.
pub const MAX_CONCURRENT_UPDATES: usize = 5;

/// Most tracks a single add or remove call may carry.
pub const MUTATION_BATCH_SIZE: usize = 100;

pub const LIKED_PAGE_SIZE: u32 = 50;
pub const PLAYLIST_PAGE_SIZE: u32 = 50;
pub const PLAYLIST_TRACKS_PAGE_SIZE: u32 = 100;
