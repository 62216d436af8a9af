//! Server lifecycle: bind → spawn background task → return a handle with
//! a shutdown channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::api::router::app_router;
use crate::api::types::AppContext;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to get server address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

/// Handle to a running server.
pub struct AppServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl AppServer {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Server shutdown signal sent");
        }
    }

    /// Wait for the server task to finish.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            tracing::error!("Server task failed: {e}");
        }
    }
}

pub async fn start_server(ctx: AppContext, addr: SocketAddr) -> Result<AppServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let addr = listener.local_addr().map_err(ServerError::LocalAddr)?;

    let app = app_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Server received shutdown signal");
        };

        tracing::info!(%addr, "Server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Server error: {e}");
        }

        tracing::info!("Server stopped");
    });

    Ok(AppServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}
