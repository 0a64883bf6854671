use std::{fmt, path::Path, path::PathBuf};

use chrono::Utc;
use tracing::debug;

use crate::{
    config,
    error::SyncError,
    spotify,
    types::{AuthConfig, Token},
};

/// Where the refresh token of the running job came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    ConfigFile,
    TokenCache,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredentialSource::Environment => "Environment variable",
            CredentialSource::ConfigFile => "Config file",
            CredentialSource::TokenCache => "Token cache",
        })
    }
}

pub struct TokenManager {
    token: Token,
    source: CredentialSource,
}

impl TokenManager {
    pub fn new(token: Token, source: CredentialSource) -> Self {
        TokenManager { token, source }
    }

    /// Resolves credentials from `REFRESH_TOKEN`, then the file at
    /// `CONFIG_FILE_PATH`, then the token cache written by `monthlist auth`.
    pub async fn load() -> Result<Self, SyncError> {
        if let Some(refresh_token) = config::refresh_token() {
            return Ok(Self::new(
                Token::from_refresh_token(refresh_token),
                CredentialSource::Environment,
            ));
        }

        if let Some(auth) = Self::load_config_file(&config::config_file_path()).await? {
            return Ok(Self::new(
                Token::from_refresh_token(auth.refresh_token),
                CredentialSource::ConfigFile,
            ));
        }

        Self::load_cache().await.map_err(|e| {
            SyncError::Credentials(format!(
                "set REFRESH_TOKEN, provide CONFIG_FILE_PATH or run `monthlist auth` ({e})"
            ))
        })
    }

    /// Reads a `{"RefreshToken": "..."}` file. A missing file yields `None`.
    pub async fn load_config_file(path: &Path) -> Result<Option<AuthConfig>, SyncError> {
        if !path.is_file() {
            return Ok(None);
        }

        let content = async_fs::read_to_string(path)
            .await
            .map_err(|e| SyncError::Credentials(format!("{}: {e}", path.display())))?;
        let auth: AuthConfig = serde_json::from_str(&content)
            .map_err(|e| SyncError::Credentials(format!("{}: {e}", path.display())))?;

        if auth.refresh_token.trim().is_empty() {
            return Err(SyncError::Credentials(format!(
                "{}: RefreshToken is empty",
                path.display()
            )));
        }
        Ok(Some(auth))
    }

    pub async fn write_config_file(path: &Path, auth: &AuthConfig) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(auth).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    pub async fn load_cache() -> Result<Self, String> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self::new(token, CredentialSource::TokenCache))
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    /// Returns an access token, refreshing it first when it expires within
    /// four minutes.
    pub async fn get_valid_token(&mut self) -> Result<String, SyncError> {
        if self.is_expired() {
            let refreshed = spotify::auth::refresh_token(&self.token.refresh_token).await?;
            self.token = refreshed;

            if self.source == CredentialSource::TokenCache {
                if let Err(e) = self.persist().await {
                    debug!(error = %e, "could not update token cache");
                }
            }
        }

        Ok(self.token.access_token.clone())
    }

    fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp().max(0) as u64;
        self.token.access_token.is_empty()
            || now + 240 >= self.token.obtained_at + self.token.expires_in
    }

    fn token_path() -> PathBuf {
        let mut path = config::data_dir();
        path.push("cache/token.json");
        path
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}
