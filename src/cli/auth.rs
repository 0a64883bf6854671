use std::path::PathBuf;

use crate::{
    Res,
    management::{CredentialSource, TokenManager},
    spotify, success,
    types::AuthConfig,
    warning,
};

/// Authorizes with Spotify and caches the token for later runs.
///
/// With `print` the refresh token is echoed as the `{"RefreshToken": ...}`
/// document understood by `CONFIG_FILE_PATH`; with `file` that document is
/// written to the given path. Both are meant for moving the credentials to a
/// headless host.
pub async fn auth(print: bool, file: Option<PathBuf>) -> Res<()> {
    let token = spotify::auth::auth().await?;
    let manager = TokenManager::new(token, CredentialSource::TokenCache);

    match manager.persist().await {
        Ok(()) => success!("Authentication completed, token cached"),
        Err(e) => warning!("Authentication completed, but the token could not be cached: {}", e),
    }

    let auth_config = AuthConfig {
        refresh_token: manager.current_token().refresh_token.clone(),
    };

    if print {
        println!("{}", serde_json::to_string_pretty(&auth_config)?);
    }

    if let Some(path) = file {
        TokenManager::write_config_file(&path, &auth_config).await?;
        success!("Credentials written to {}", path.display());
    }

    Ok(())
}
