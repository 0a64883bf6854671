//! # CLI Module
//!
//! User-facing commands. Each one resolves credentials, builds a
//! [`SpotifyClient`](crate::spotify::SpotifyClient) and drives the
//! [`engine`](crate::engine); output goes through the colored status macros
//! and `tabled` tables, diagnostics through `tracing`.
//!
//! - [`auth`] - interactive PKCE authorization, optionally exporting the
//!   refresh token for headless hosts
//! - [`run`] - print the effective settings, then reconcile every
//!   `RUN_INTERVAL` minutes
//! - [`once`] - one reconciliation pass
//! - [`plan`] - dry run showing per-playlist additions and removals
//!
//! ```bash
//! monthlist auth --print           # authorize, print {"RefreshToken": ...}
//! monthlist plan --search-period 3 # preview the last three months
//! monthlist run                    # keep playlists in sync
//! ```

mod auth;
mod sync;

pub use auth::auth;
pub use sync::once;
pub use sync::plan;
pub use sync::run;
