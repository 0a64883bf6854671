//! # Spotify Integration Module
//!
//! Everything that talks to the Spotify Web API.
//!
//! ```text
//! cli (auth, run, once, plan)
//!          ↓
//!     ├── auth    OAuth 2.0 PKCE flow, code exchange and token refresh
//!     └── client  SpotifyClient, the HTTP implementation of engine::Library
//!          ↓
//! reqwest (JSON, rustls)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Endpoints
//!
//! - `GET /me` - resolve the current user
//! - `GET /me/tracks` - liked tracks, newest first
//! - `GET /me/playlists` - playlists to find the monthly ones
//! - `GET /playlists/{id}/tracks` - current members of a monthly playlist
//! - `POST /users/{user_id}/playlists` - create a missing monthly playlist
//! - `POST /playlists/{id}/tracks` - add tracks, at most 100 per call
//! - `DELETE /playlists/{id}/tracks` - remove tracks, at most 100 per call
//! - `POST /api/token` - code exchange and refresh
//!
//! ## Transient failures
//!
//! `502 Bad Gateway` is retried after ten seconds. `429 Too Many Requests`
//! honours `Retry-After` up to two minutes; longer waits surface as
//! [`SyncError::RateLimited`](crate::error::SyncError::RateLimited) so a
//! scheduled run fails instead of stalling. Both retries are bounded.

pub mod auth;
mod client;

pub use client::{RetryPolicy, SpotifyClient};
