use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::{Mutex, oneshot};

use crate::{spotify, types::Token, warning};

type TokenSender = oneshot::Sender<Result<Token, String>>;

/// Everything the callback needs to finish one authorization: the PKCE
/// verifier, the expected `state`, and the single-use channel back to the
/// waiting auth flow.
pub struct CallbackState {
    code_verifier: String,
    state: String,
    sender: Mutex<Option<TokenSender>>,
}

impl CallbackState {
    pub fn new(code_verifier: String, state: String, sender: TokenSender) -> Self {
        Self {
            code_verifier,
            state,
            sender: Mutex::new(Some(sender)),
        }
    }

    async fn deliver(&self, result: Result<Token, String>) -> bool {
        match self.sender.lock().await.take() {
            Some(sender) => sender.send(result).is_ok(),
            None => false,
        }
    }
}

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<CallbackState>>,
) -> Html<&'static str> {
    if params.get("state") != Some(&shared_state.state) {
        return Html("<h4>State mismatch, ignoring callback.</h4>");
    }

    if let Some(error) = params.get("error") {
        shared_state
            .deliver(Err(format!("authorization denied: {error}")))
            .await;
        return Html("<h4>Login failed.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    match spotify::auth::exchange_code_pkce(code, &shared_state.code_verifier).await {
        Ok(token) => {
            if shared_state.deliver(Ok(token)).await {
                Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
            } else {
                Html("<h4>Authorization already completed.</h4>")
            }
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            shared_state.deliver(Err(e.to_string())).await;
            Html("<h4>Login failed.</h4>")
        }
    }
}
