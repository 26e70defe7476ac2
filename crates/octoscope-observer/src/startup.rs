//! Observer server startup helper for embedding in the studio binary.
//!
//! [`spawn_observer`] binds the listen address on the caller's task, so a
//! taken port is reported at startup, and then serves on a background
//! Tokio task concurrently with the refresh loop.

use std::sync::Arc;

use octoscope_core::store::StoreConnector;
use tokio::task::JoinHandle;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the Observer HTTP server on a background Tokio task.
///
/// Returns a [`JoinHandle`] so the caller can abort the server during
/// clean shutdown.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address cannot be bound.
pub async fn spawn_observer<C: StoreConnector>(
    config: &ServerConfig,
    state: Arc<AppState<C>>,
) -> Result<JoinHandle<()>, StartupError> {
    let listener = server::bind(config).await?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(
        host = %config.host,
        port = config.port,
        "Observer server spawned on background task"
    );

    Ok(handle)
}
