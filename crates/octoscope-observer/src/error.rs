//! Error types for the Observer API server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use octoscope_core::store::StoreError;

/// Errors that can occur in the Observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The requested element is not part of the displayed graph.
    #[error("not found: {0}")]
    NotFound(String),

    /// A page template failed to load or render.
    #[error("template error: {0}")]
    Template(String),

    /// The store failed to answer a lookup.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(_) => StatusCode::BAD_GATEWAY,
        };
        let message = match self {
            Self::NotFound(msg) | Self::Template(msg) => msg,
            Self::Store(e) => e.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
