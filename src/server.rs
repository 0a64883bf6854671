use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Duration};

use axum::{Extension, Router, routing::get};
use tokio::{sync::oneshot, task::JoinHandle};
use tracing::debug;

use crate::{api, config, error::SyncError};

/// Handle on the running callback server. Dropping it without calling
/// [`CallbackServer::shutdown`] leaves the server running until the runtime exits.
pub struct CallbackServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl CallbackServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting connections and waits briefly for in-flight requests.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        match tokio::time::timeout(Duration::from_secs(5), &mut self.handle).await {
            Ok(Ok(Ok(()))) => debug!(addr = %self.addr, "callback server stopped"),
            Ok(Ok(Err(e))) => debug!(error = %e, "callback server failed"),
            Ok(Err(e)) => debug!(error = %e, "callback server task failed"),
            Err(_) => self.handle.abort(),
        }
    }
}

pub async fn start_api_server(state: Arc<api::CallbackState>) -> Result<CallbackServer, SyncError> {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)));

    let addr = SocketAddr::from_str(&config::server_addr())
        .map_err(|e| SyncError::Config(format!("invalid SERVER_ADDRESS: {e}")))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SyncError::Config(format!("cannot bind callback server to {addr}: {e}")))?;

    let (shutdown, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    debug!(%addr, "callback server listening");
    Ok(CallbackServer {
        addr,
        shutdown,
        handle,
    })
}
