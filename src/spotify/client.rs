use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::{sync::Mutex, time::sleep};
use tracing::{trace, warn};

use crate::{
    config,
    engine::{Library, LikedTrack, Page, PlaylistSummary, TrackId},
    error::{SyncError, SyncResult},
    management::{CredentialSource, TokenManager},
    types::{
        AddTracksRequest, CreatePlaylistRequest, CreatePlaylistResponse, CurrentUser, Paging,
        Playlist, PlaylistItem, RemoveTracksRequest, SavedTrack, SnapshotResponse, TrackUri,
    },
};

/// How [`SpotifyClient`] deals with `502 Bad Gateway` and
/// `429 Too Many Requests`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per request before a 502 or 429 is given up on.
    pub max_attempts: u32,
    pub bad_gateway_delay: Duration,
    /// Longest `Retry-After`, in seconds, worth sleeping through.
    pub max_retry_after: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            bad_gateway_delay: Duration::from_secs(10),
            max_retry_after: 120,
        }
    }
}

/// Spotify Web API client authenticated as one user.
///
/// Shared by all reconciliation tasks of a run; the token manager sits behind
/// a mutex so that only one task refreshes an expiring token.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    user: CurrentUser,
    tokens: Mutex<TokenManager>,
    retry: RetryPolicy,
}

impl SpotifyClient {
    /// Builds a client and resolves the current user, which also proves the
    /// credentials work.
    pub async fn connect(tokens: TokenManager) -> SyncResult<Self> {
        Self::connect_to(config::spotify_apiurl(), tokens, RetryPolicy::default()).await
    }

    /// [`connect`](Self::connect) against an explicit API base URL.
    pub async fn connect_to(
        api_url: impl Into<String>,
        tokens: TokenManager,
        retry: RetryPolicy,
    ) -> SyncResult<Self> {
        let api_url: String = api_url.into();
        let mut client = Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            user: CurrentUser {
                id: String::new(),
                display_name: None,
            },
            tokens: Mutex::new(tokens),
            retry,
        };
        client.user = client.get_json("/me").await?;
        Ok(client)
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub async fn credential_source(&self) -> CredentialSource {
        self.tokens.lock().await.source()
    }

    /// Sends an authorized request, retrying `502 Bad Gateway` after a pause
    /// and `429 Too Many Requests` after the advertised `Retry-After`.
    async fn send<F>(&self, path: &str, build: F) -> SyncResult<Response>
    where
        F: Fn(&Client, &str) -> RequestBuilder,
    {
        let url = format!("{}{}", self.api_url, path);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let token = self.tokens.lock().await.get_valid_token().await?;
            let response = build(&self.http, &url)
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| SyncError::http(path, e))?;

            match response.status() {
                StatusCode::BAD_GATEWAY if attempt < self.retry.max_attempts => {
                    warn!(path, attempt, "bad gateway, retrying");
                    sleep(self.retry.bad_gateway_delay).await;
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = retry_after(&response);
                    if retry_after > self.retry.max_retry_after
                        || attempt >= self.retry.max_attempts
                    {
                        return Err(SyncError::RateLimited {
                            endpoint: path.to_string(),
                            retry_after,
                        });
                    }
                    warn!(path, retry_after, "rate limited, waiting");
                    sleep(Duration::from_secs(retry_after)).await;
                }
                _ => {
                    return response
                        .error_for_status()
                        .map_err(|e| SyncError::http(path, e));
                }
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> SyncResult<T> {
        let response = self.send(path, |http, url| http.get(url)).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| SyncError::decode(path, e))
    }
}

fn retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(1)
}

#[async_trait]
impl Library for SpotifyClient {
    async fn saved_tracks(&self, offset: u32, limit: u32) -> SyncResult<Page<LikedTrack>> {
        let path = format!("/me/tracks?limit={limit}&offset={offset}");
        let page: Paging<SavedTrack> = self.get_json(&path).await?;

        let items = page
            .items
            .into_iter()
            .filter_map(|saved| match saved.track.id {
                Some(id) => Some(LikedTrack::new(id, saved.added_at)),
                None => {
                    trace!(added_at = %saved.added_at, "saved track without id");
                    None
                }
            })
            .collect();
        Ok(Page::new(items, page.total))
    }

    async fn playlists(&self, offset: u32, limit: u32) -> SyncResult<Page<PlaylistSummary>> {
        let path = format!("/me/playlists?limit={limit}&offset={offset}");
        let page: Paging<Option<Playlist>> = self.get_json(&path).await?;

        let items = page
            .items
            .into_iter()
            .flatten()
            .map(|p| PlaylistSummary {
                id: p.id,
                name: p.name,
            })
            .collect();
        Ok(Page::new(items, page.total))
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> SyncResult<Page<TrackId>> {
        let path = format!(
            "/playlists/{playlist_id}/tracks?fields=items(track(id)),total&limit={limit}&offset={offset}"
        );
        let page: Paging<PlaylistItem> = self.get_json(&path).await?;

        let items = page
            .items
            .into_iter()
            .filter_map(|item| item.track.and_then(|t| t.id))
            .map(TrackId::new)
            .collect();
        Ok(Page::new(items, page.total))
    }

    async fn create_playlist(&self, name: &str) -> SyncResult<String> {
        let path = format!("/users/{}/playlists", self.user.id);
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: String::new(),
            public: true,
            collaborative: false,
        };

        let response = self.send(&path, |http, url| http.post(url).json(&body)).await?;
        let created = response
            .json::<CreatePlaylistResponse>()
            .await
            .map_err(|e| SyncError::decode(&path, e))?;
        Ok(created.id)
    }

    async fn add_tracks(&self, playlist_id: &str, tracks: &[TrackId]) -> SyncResult<()> {
        let path = format!("/playlists/{playlist_id}/tracks");
        let body = AddTracksRequest {
            uris: tracks.iter().map(TrackId::uri).collect(),
        };

        let response = self.send(&path, |http, url| http.post(url).json(&body)).await?;
        let snapshot = response
            .json::<SnapshotResponse>()
            .await
            .map_err(|e| SyncError::decode(&path, e))?;
        trace!(playlist_id, snapshot = %snapshot.snapshot_id, added = tracks.len(), "tracks added");
        Ok(())
    }

    async fn remove_tracks(&self, playlist_id: &str, tracks: &[TrackId]) -> SyncResult<()> {
        let path = format!("/playlists/{playlist_id}/tracks");
        let body = RemoveTracksRequest {
            tracks: tracks.iter().map(|t| TrackUri { uri: t.uri() }).collect(),
        };

        let response = self
            .send(&path, |http, url| http.delete(url).json(&body))
            .await?;
        let snapshot = response
            .json::<SnapshotResponse>()
            .await
            .map_err(|e| SyncError::decode(&path, e))?;
        trace!(playlist_id, snapshot = %snapshot.snapshot_id, removed = tracks.len(), "tracks removed");
        Ok(())
    }
}
