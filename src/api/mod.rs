//! # API Module
//!
//! HTTP endpoints served by the temporary OAuth callback server that
//! `monthlist auth` starts.
//!
//! - [`callback`] completes the Spotify OAuth 2.0 PKCE flow: it checks the
//!   `state` parameter, exchanges the authorization code for a token and hands
//!   the result to the waiting auth flow through a one-shot channel.
//! - [`health`] returns application status and version.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use monthlist::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::CallbackState;
pub use callback::callback;
pub use health::health;
