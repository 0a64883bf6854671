//! Error taxonomy shared by the reconciliation engine and the Spotify client.

use thiserror::Error;

/// Everything that can abort a reconciliation run.
///
/// Transport and API failures are fatal to the run that hit them. Whether that
/// also takes down sibling playlist tasks is decided by the scheduler's
/// [`FailurePolicy`](crate::engine::FailurePolicy), never by the code that
/// produced the error.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("rate limited by {endpoint}, retry after {retry_after}s")]
    RateLimited { endpoint: String, retry_after: u64 },

    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("no usable credentials: {0}")]
    Credentials(String),

    #[error("missing configuration: {0}")]
    Config(String),

    #[error("reconciliation task did not finish: {0}")]
    Task(String),
}

impl SyncError {
    pub fn http(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        SyncError::Http {
            endpoint: endpoint.into(),
            source,
        }
    }

    pub fn decode(endpoint: impl Into<String>, message: impl ToString) -> Self {
        SyncError::Decode {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
