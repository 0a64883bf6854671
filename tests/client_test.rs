use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use monthlist::{
    engine::Library,
    error::SyncError,
    management::{CredentialSource, TokenManager},
    spotify::{RetryPolicy, SpotifyClient},
    types::Token,
};
use serde_json::json;

type Hits = Arc<AtomicUsize>;

fn fresh_tokens() -> TokenManager {
    TokenManager::new(
        Token {
            access_token: "test-token".to_string(),
            refresh_token: "test-refresh".to_string(),
            scope: String::new(),
            expires_in: 3600,
            obtained_at: Utc::now().timestamp() as u64,
        },
        CredentialSource::Environment,
    )
}

fn fast_retries() -> RetryPolicy {
    RetryPolicy {
        bad_gateway_delay: Duration::from_millis(10),
        ..RetryPolicy::default()
    }
}

async fn me(headers: HeaderMap) -> Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer test-token");
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({"id": "listener", "display_name": "Listener"})).into_response()
}

fn saved_tracks_page() -> Response {
    Json(json!({
        "items": [
            {"added_at": "2024-01-05T10:00:00Z", "track": {"id": "a"}},
            {"added_at": "2024-01-04T10:00:00Z", "track": {"id": null}}
        ],
        "total": 2
    }))
    .into_response()
}

async fn bad_gateway_once(State(hits): State<Hits>) -> Response {
    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
        StatusCode::BAD_GATEWAY.into_response()
    } else {
        saved_tracks_page()
    }
}

async fn always_bad_gateway(State(hits): State<Hits>) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::BAD_GATEWAY.into_response()
}

async fn rate_limited_once(State(hits): State<Hits>) -> Response {
    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
        (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "0")]).into_response()
    } else {
        saved_tracks_page()
    }
}

async fn long_retry_after(State(hits): State<Hits>) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "500")]).into_response()
}

async fn always_rate_limited(State(hits): State<Hits>) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "0")]).into_response()
}

/// Serves `/me` plus `/me/tracks` backed by `tracks` on an ephemeral port.
async fn serve<H, T>(tracks: H) -> (String, Hits)
where
    H: axum::handler::Handler<T, Hits>,
    T: 'static,
{
    let hits = Hits::default();
    let app = Router::new()
        .route("/me", get(me))
        .route("/me/tracks", get(tracks))
        .with_state(Arc::clone(&hits));

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), hits)
}

#[tokio::test]
async fn test_connect_resolves_current_user() {
    let (url, _) = serve(bad_gateway_once).await;

    let client = SpotifyClient::connect_to(url, fresh_tokens(), fast_retries())
        .await
        .unwrap();

    assert_eq!(client.user().id, "listener");
    assert_eq!(client.user().display_name.as_deref(), Some("Listener"));
}

#[tokio::test]
async fn test_bad_gateway_is_retried() {
    let (url, hits) = serve(bad_gateway_once).await;
    let client = SpotifyClient::connect_to(url, fresh_tokens(), fast_retries())
        .await
        .unwrap();

    let page = client.saved_tracks(0, 50).await.unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    // The track without an id is dropped but still counted.
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id.as_str(), "a");
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn test_bad_gateway_gives_up_after_max_attempts() {
    let (url, hits) = serve(always_bad_gateway).await;
    let client = SpotifyClient::connect_to(url, fresh_tokens(), fast_retries())
        .await
        .unwrap();

    let result = client.saved_tracks(0, 50).await;

    assert!(matches!(result, Err(SyncError::Http { .. })));
    assert_eq!(hits.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_short_retry_after_is_honoured() {
    let (url, hits) = serve(rate_limited_once).await;
    let client = SpotifyClient::connect_to(url, fresh_tokens(), fast_retries())
        .await
        .unwrap();

    let page = client.saved_tracks(0, 50).await.unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn test_long_retry_after_is_rate_limited() {
    let (url, hits) = serve(long_retry_after).await;
    let client = SpotifyClient::connect_to(url, fresh_tokens(), fast_retries())
        .await
        .unwrap();

    let result = client.saved_tracks(0, 50).await;

    match result {
        Err(SyncError::RateLimited { retry_after, .. }) => assert_eq!(retry_after, 500),
        other => panic!("expected RateLimited, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_repeated_rate_limits_give_up() {
    let (url, hits) = serve(always_rate_limited).await;
    let client = SpotifyClient::connect_to(url, fresh_tokens(), fast_retries())
        .await
        .unwrap();

    let result = client.saved_tracks(0, 50).await;

    assert!(matches!(result, Err(SyncError::RateLimited { .. })));
    assert_eq!(hits.load(Ordering::SeqCst), 5);
}
