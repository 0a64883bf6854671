//! Monthly playlists for liked Spotify tracks.
//!
//! This library mirrors the tracks a user liked into one playlist per calendar
//! month, named `YYYY.MM`. Every run rebuilds its view of the world from
//! Spotify, so nothing besides the OAuth token is kept locally and an
//! interrupted run is repaired by the next one.
//!
//! # Modules
//!
//! - `engine` - the reconciliation engine: paging, bucketing, diffing, batched
//!   mutation and the bounded concurrent scheduler
//! - `spotify` - Spotify Web API client and OAuth 2.0 PKCE flow
//! - `api` - HTTP endpoints for the local callback server
//! - `server` - scoped callback server used during authorization
//! - `management` - credential resolution, caching and refresh
//! - `cli` - command-line interface implementations
//! - `config` - environment variables and run settings
//! - `logging` - tracing subscriber setup
//! - `error` - the `SyncError` taxonomy
//! - `types` - Spotify wire types and table rows
//! - `utils` - PKCE helpers and small parsers
//!
//! # Example
//!
//! ```
//! use monthlist::{config, cli, config::RunSettings};
//!
//! #[tokio::main]
//! async fn main() -> monthlist::Res<()> {
//!     config::load_env().await?;
//!     cli::once(RunSettings::from_env()).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Boxed-error result used by the command layer, where every failure ends up
/// as a printed message anyway.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

// Output macros for user-facing status lines. They print to stdout so that
// they stay readable next to the tracing diagnostics on stderr. Defined after
// the module declarations so `tracing::info!` and friends stay unambiguous
// inside the library.

/// Prints a status line behind a blue `o`.
///
/// ```
/// info!("{} liked track(s) across {} playlist(s)", liked, playlists);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a completion line behind a green check mark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line and exits with status 1.
///
/// Reserved for fatal errors: a failed reconciliation run, missing
/// credentials, an unusable environment. Nothing after it executes.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow `!` line for problems the command can live with.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
