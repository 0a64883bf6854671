use std::{sync::Arc, time::Duration};

use tabled::Table;
use tokio::time::{MissedTickBehavior, interval};

use crate::{
    Res,
    config::RunSettings,
    engine::{ReconcileOptions, Reconciler, RunReport, SearchWindow},
    info,
    management::TokenManager,
    spotify::SpotifyClient,
    success,
    types::{PlaylistTableRow, SettingsTableRow},
    utils, warning,
};

/// Reconciles forever, sleeping `run_interval` minutes between passes.
///
/// A failing pass ends the loop with its error; the next start of the
/// process begins from scratch since nothing is kept between runs.
pub async fn run(settings: RunSettings) -> Res<()> {
    let client = Arc::new(connect().await?);
    print_settings(&client, &settings).await;

    let mut ticker = interval(Duration::from_secs(settings.run_interval.max(1) * 60));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let report = reconciler(&client, &settings, false).run(utils::today()).await?;
        print_summary(&report);
    }
}

/// A single reconciliation pass.
pub async fn once(settings: RunSettings) -> Res<()> {
    let client = Arc::new(connect().await?);
    let report = reconciler(&client, &settings, false).run(utils::today()).await?;
    print_summary(&report);
    Ok(())
}

/// Shows what a pass would change without creating or mutating anything.
pub async fn plan(settings: RunSettings) -> Res<()> {
    let client = Arc::new(connect().await?);
    let report = reconciler(&client, &settings, true).run(utils::today()).await?;

    if report.outcomes.is_empty() {
        info!("No liked tracks inside the search window");
        return Ok(());
    }

    let rows: Vec<PlaylistTableRow> = report
        .outcomes
        .iter()
        .map(|o| PlaylistTableRow {
            playlist: o.period.to_string(),
            status: if o.missing { "new" } else { "exists" }.to_string(),
            liked: o.liked,
            add: o.diff.to_add.len(),
            remove: if settings.remove_unliked_songs {
                o.diff.to_remove.len()
            } else {
                0
            },
        })
        .collect();

    println!("{}", Table::new(rows));
    info!(
        "{} liked track(s) across {} playlist(s), nothing was changed",
        report.liked_tracks,
        report.outcomes.len()
    );
    Ok(())
}

async fn connect() -> Res<SpotifyClient> {
    let tokens = TokenManager::load().await?;
    Ok(SpotifyClient::connect(tokens).await?)
}

fn reconciler(
    client: &Arc<SpotifyClient>,
    settings: &RunSettings,
    dry_run: bool,
) -> Reconciler<SpotifyClient> {
    let options = ReconcileOptions::new(
        SearchWindow::from_months(settings.search_period),
        settings.remove_unliked_songs,
    )
    .dry_run(dry_run);
    Reconciler::new(Arc::clone(client), options)
}

async fn print_settings(client: &SpotifyClient, settings: &RunSettings) {
    let user = client.user();
    let rows = vec![
        SettingsTableRow {
            setting: "Username".to_string(),
            value: user.display_name.clone().unwrap_or_else(|| user.id.clone()),
        },
        SettingsTableRow {
            setting: "Auth type".to_string(),
            value: client.credential_source().await.to_string(),
        },
        SettingsTableRow {
            setting: "Search period".to_string(),
            value: SearchWindow::from_months(settings.search_period).to_string(),
        },
        SettingsTableRow {
            setting: "Remove unliked songs".to_string(),
            value: settings.remove_unliked_songs.to_string(),
        },
        SettingsTableRow {
            setting: "Run interval".to_string(),
            value: format!("{} minute(s)", settings.run_interval),
        },
    ];

    println!("{}", Table::new(rows));
}

fn print_summary(report: &RunReport) {
    let changed: Vec<PlaylistTableRow> = report
        .outcomes
        .iter()
        .filter(|o| o.created || o.applied.calls > 0)
        .map(|o| PlaylistTableRow {
            playlist: o.period.to_string(),
            status: if o.created { "created" } else { "updated" }.to_string(),
            liked: o.liked,
            add: o.applied.added,
            remove: o.applied.removed,
        })
        .collect();

    if !changed.is_empty() {
        println!("{}", Table::new(changed));
    }

    for failure in &report.failures {
        let playlist = failure
            .period
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "?".to_string());
        warning!("Playlist {} failed: {}", playlist, failure.error);
    }

    success!(
        "Reconciled {} playlist(s): {} created, {} track(s) added, {} removed",
        report.outcomes.len(),
        report.created(),
        report.added(),
        report.removed()
    );
}
