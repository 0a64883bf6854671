use std::{collections::HashSet, sync::Arc};

use chrono::NaiveDate;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, info, warn};

use crate::{
    engine::{
        MAX_CONCURRENT_UPDATES,
        bucket::bucketize,
        diff::{Diff, diff_members, diff_playlist},
        library::{Library, TrackId},
        mutate::{Applied, apply_diff},
        period::{PeriodKey, SearchWindow},
        registry::PlaylistRegistry,
    },
    error::{SyncError, SyncResult},
};

/// What a failing playlist task does to the rest of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort every sibling task and fail the run with the first error.
    #[default]
    FailFast,
    /// Record the failure in the [`RunReport`] and let the other playlists finish.
    Isolate,
}

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub window: SearchWindow,
    pub remove_unliked: bool,
    pub max_concurrent: usize,
    pub failure_policy: FailurePolicy,
    /// Compute diffs without creating playlists or sending mutations.
    pub dry_run: bool,
}

impl ReconcileOptions {
    pub fn new(window: SearchWindow, remove_unliked: bool) -> Self {
        Self {
            window,
            remove_unliked,
            max_concurrent: MAX_CONCURRENT_UPDATES,
            failure_policy: FailurePolicy::default(),
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistOutcome {
    pub period: PeriodKey,
    /// `None` only in a dry run for a playlist that does not exist yet.
    pub playlist_id: Option<String>,
    /// No playlist existed for this month when the run started.
    pub missing: bool,
    /// The run created the playlist. Never set in a dry run.
    pub created: bool,
    /// Liked tracks that belong to this month.
    pub liked: usize,
    pub diff: Diff,
    pub applied: Applied,
}

impl PlaylistOutcome {
    /// One-line account of the diff. Unliked tracks that stay in the playlist
    /// because removal is switched off are reported as kept.
    pub fn summary(&self, remove_unliked: bool) -> String {
        let unliked = self.diff.to_remove.len();
        let (removed, kept) = if remove_unliked { (unliked, 0) } else { (0, unliked) };
        let mut line = format!(
            "Playlist {}: Added: {} track(s) Removed: {} track(s)",
            self.period,
            self.diff.to_add.len(),
            removed
        );
        if kept > 0 {
            line.push_str(&format!(" Kept: {kept} unliked track(s)"));
        }
        line
    }
}

#[derive(Debug)]
pub struct PlaylistFailure {
    /// `None` when the task died before it could say which playlist it owned.
    pub period: Option<PeriodKey>,
    pub error: SyncError,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub cutoff: Option<PeriodKey>,
    pub liked_tracks: usize,
    pub outcomes: Vec<PlaylistOutcome>,
    pub failures: Vec<PlaylistFailure>,
}

impl RunReport {
    pub fn added(&self) -> usize {
        self.outcomes.iter().map(|o| o.applied.added).sum()
    }

    pub fn removed(&self) -> usize {
        self.outcomes.iter().map(|o| o.applied.removed).sum()
    }

    pub fn created(&self) -> usize {
        self.outcomes.iter().filter(|o| o.created).count()
    }
}

/// One reconciliation pass: bucket the liked tracks, make sure every bucket
/// has a playlist, then diff and apply each playlist concurrently.
pub struct Reconciler<L: ?Sized> {
    library: Arc<L>,
    options: ReconcileOptions,
}

impl<L> Reconciler<L>
where
    L: Library + ?Sized + 'static,
{
    pub fn new(library: Arc<L>, options: ReconcileOptions) -> Self {
        Self { library, options }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    pub async fn run(&self, today: NaiveDate) -> SyncResult<RunReport> {
        let library = self.library.as_ref();
        let bucket = bucketize(library, self.options.window, today).await?;
        let mut registry = PlaylistRegistry::load(library).await?;

        let mut report = RunReport {
            cutoff: self.options.window.cutoff(today),
            liked_tracks: bucket.track_count(),
            ..RunReport::default()
        };

        // Creation stays sequential and ahead of the fan-out so no two tasks
        // can race to create the same month.
        let mut missing = HashSet::new();
        for period in bucket.periods() {
            if registry.has(period) {
                continue;
            }
            if self.options.dry_run {
                debug!(playlist = %period, "would create monthly playlist");
            } else {
                registry.create(library, period).await?;
            }
            missing.insert(period.clone());
        }

        let total = bucket.len();
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent.max(1)));
        let mut tasks = JoinSet::new();

        for (period, desired) in bucket {
            let task = PlaylistTask {
                playlist_id: registry.id(&period).map(str::to_string),
                missing: missing.contains(&period),
                period,
                desired,
                remove_unliked: self.options.remove_unliked,
                dry_run: self.options.dry_run,
            };
            let library = Arc::clone(&self.library);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let period = task.period.clone();
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => task.run(library.as_ref()).await,
                    Err(e) => Err(SyncError::Task(e.to_string())),
                };
                (period, result)
            });
        }

        let mut completed = 0;
        while let Some(joined) = tasks.join_next().await {
            completed += 1;
            let (period, result) = match joined {
                Ok((period, result)) => (Some(period), result),
                Err(e) => (None, Err(SyncError::Task(e.to_string()))),
            };
            debug!(completed, total, "playlist task finished");

            match result {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(error) => match self.options.failure_policy {
                    FailurePolicy::FailFast => {
                        tasks.abort_all();
                        return Err(error);
                    }
                    FailurePolicy::Isolate => {
                        warn!(
                            playlist = period.as_ref().map(PeriodKey::as_str).unwrap_or("?"),
                            error = %error,
                            "playlist reconciliation failed"
                        );
                        report.failures.push(PlaylistFailure { period, error });
                    }
                },
            }
        }

        report.outcomes.sort_by(|a, b| b.period.cmp(&a.period));
        info!(
            playlists = report.outcomes.len(),
            failed = report.failures.len(),
            added = report.added(),
            removed = report.removed(),
            created = report.created(),
            "run finished"
        );
        Ok(report)
    }
}

struct PlaylistTask {
    period: PeriodKey,
    playlist_id: Option<String>,
    missing: bool,
    desired: HashSet<TrackId>,
    remove_unliked: bool,
    dry_run: bool,
}

impl PlaylistTask {
    async fn run<L>(self, library: &L) -> SyncResult<PlaylistOutcome>
    where
        L: Library + ?Sized,
    {
        let diff = match &self.playlist_id {
            Some(id) => diff_playlist(library, id, &self.desired).await?,
            None => diff_members(&self.desired, std::iter::empty()),
        };

        let applied = match (&self.playlist_id, self.dry_run) {
            (Some(id), false) => apply_diff(library, id, &diff, self.remove_unliked).await?,
            _ => Applied::default(),
        };

        let outcome = PlaylistOutcome {
            period: self.period,
            playlist_id: self.playlist_id,
            missing: self.missing,
            created: self.missing && !self.dry_run,
            liked: self.desired.len(),
            diff,
            applied,
        };
        info!(playlist = %outcome.period, "{}", outcome.summary(self.remove_unliked));
        Ok(outcome)
    }
}
