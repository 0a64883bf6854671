use std::{sync::Arc, time::Duration};

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Url};
use tokio::sync::oneshot;

use crate::{
    api::CallbackState,
    config,
    error::SyncError,
    server::start_api_server,
    types::{Token, TokenResponse},
    utils, warning,
};

/// How long the user has to complete the authorization in the browser.
const AUTH_TIMEOUT: Duration = Duration::from_secs(300);

/// Runs the interactive OAuth 2.0 PKCE authorization flow with Spotify.
///
/// This function orchestrates the entire authentication process:
/// 1. Generates the PKCE code verifier, its SHA256 challenge and a `state` value
/// 2. Starts the local callback server, scoped to this one authorization
/// 3. Opens the authorization URL in the user's browser, or prints it when no
///    browser is available (headless hosts, containers)
/// 4. Waits for the callback to hand over the exchanged token through a
///    one-shot channel
/// 5. Shuts the callback server down again
///
/// Persisting the token is left to the caller.
///
/// # Errors
///
/// - [`SyncError::Config`] if the client id is missing or the callback server
///   cannot bind
/// - [`SyncError::Auth`] if the user denies access, the code exchange fails or
///   nothing arrives within five minutes
pub async fn auth() -> Result<Token, SyncError> {
    let client_id = config::spotify_client_id()?;
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state = utils::generate_state();

    let (token_tx, token_rx) = oneshot::channel();
    let callback_state = Arc::new(CallbackState::new(code_verifier, state.clone(), token_tx));
    let server = start_api_server(callback_state).await?;

    let auth_url = authorize_url(&client_id, &code_challenge, &state)?;
    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for Spotify authorization...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let outcome = tokio::time::timeout(AUTH_TIMEOUT, token_rx).await;
    pb.finish_and_clear();
    server.shutdown().await;

    match outcome {
        Ok(Ok(Ok(token))) => Ok(token),
        Ok(Ok(Err(message))) => Err(SyncError::Auth(message)),
        Ok(Err(_)) => Err(SyncError::Auth(
            "callback server stopped before authorization completed".to_string(),
        )),
        Err(_) => Err(SyncError::Auth(format!(
            "no authorization received within {}s",
            AUTH_TIMEOUT.as_secs()
        ))),
    }
}

/// Builds the Spotify authorization URL for the PKCE flow.
pub fn authorize_url(client_id: &str, code_challenge: &str, state: &str) -> Result<Url, SyncError> {
    let base = config::spotify_apiauth_url();
    let redirect_uri = config::spotify_redirect_uri();
    let scope = config::spotify_scope();
    Url::parse_with_params(
        &base,
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri.as_str()),
            ("code_challenge_method", "S256"),
            ("code_challenge", code_challenge),
            ("scope", scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| SyncError::Config(format!("invalid SPOTIFY_API_AUTH_URL {base}: {e}")))
}

/// Exchanges a refresh token for a fresh access token.
///
/// Spotify may rotate the refresh token; when the response carries none the
/// old one stays valid and is kept.
pub async fn refresh_token(refresh_token: &str) -> Result<Token, SyncError> {
    if refresh_token.trim().is_empty() {
        return Err(SyncError::Credentials("refresh token is empty".to_string()));
    }

    let client_id = config::spotify_client_id()?;
    let json = request_token(&[
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", client_id.as_str()),
    ])
    .await?;

    Ok(into_token(json, refresh_token))
}

/// Exchanges an authorization code for an access token using PKCE.
///
/// The code verifier proves that the client completing the flow is the one
/// that started it. Authorization codes are single-use and short-lived, so this
/// runs straight from the callback handler.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Token, SyncError> {
    let client_id = config::spotify_client_id()?;
    let redirect_uri = config::spotify_redirect_uri();
    let json = request_token(&[
        ("grant_type", "authorization_code"),
        ("client_id", client_id.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("redirect_uri", redirect_uri.as_str()),
    ])
    .await?;

    if json.refresh_token.is_none() {
        return Err(SyncError::Auth(
            "token response did not include a refresh token".to_string(),
        ));
    }
    Ok(into_token(json, ""))
}

async fn request_token(form: &[(&str, &str)]) -> Result<TokenResponse, SyncError> {
    let url = config::spotify_apitoken_url();
    let res = Client::new()
        .post(&url)
        .form(form)
        .send()
        .await
        .map_err(|e| SyncError::http(&url, e))?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(SyncError::Auth(format!("{status}: {body}")));
    }

    res.json::<TokenResponse>()
        .await
        .map_err(|e| SyncError::decode(&url, e))
}

fn into_token(json: TokenResponse, previous_refresh_token: &str) -> Token {
    Token {
        access_token: json.access_token,
        refresh_token: json
            .refresh_token
            .unwrap_or_else(|| previous_refresh_token.to_string()),
        scope: json.scope,
        expires_in: json.expires_in,
        obtained_at: Utc::now().timestamp().max(0) as u64,
    }
}
