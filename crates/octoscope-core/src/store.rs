//! Document store seam.
//!
//! The [`StoreFacade`] trait abstracts point-in-time access to the
//! bitemporal store. It could be an HTTP client, an embedded node, or a
//! test double. [`StoreConnector`] opens a facade for a named store node
//! so the refresh controller can switch connection targets at runtime.
//!
//! Methods return `impl Future + Send` so generic callers (the refresh
//! loop, the observer handlers) stay spawnable.

use std::future::Future;

use chrono::{DateTime, Utc};
use octoscope_types::Attributes;
use serde_json::Value;

/// Errors raised by a store facade.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("store transport error: {0}")]
    Transport(String),

    /// The store answered with a non-success status code.
    #[error("store returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// The response or one of its records could not be decoded.
    #[error("store decode error: {0}")]
    Decode(String),

    /// The status endpoint answered but reported an error.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// The reported error.
        reason: String,
        /// The full status document.
        status: Attributes,
    },

    /// A facade for the requested node could not be created.
    #[error("cannot connect to store node {node}: {message}")]
    Connect {
        /// The requested node.
        node: String,
        /// Why the connection failed.
        message: String,
    },
}

/// Point-in-time access to the document store.
pub trait StoreFacade: Send + Sync {
    /// Return the node status document.
    fn status(&self) -> impl Future<Output = Result<Value, StoreError>> + Send;

    /// Run a query as of `valid_time` and return its result batches.
    fn query(
        &self,
        query: &str,
        valid_time: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Vec<Value>>, StoreError>> + Send;

    /// Return the historical versions of one entity.
    fn history(
        &self,
        id: &str,
        with_docs: bool,
        with_corrections: bool,
    ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send;
}

/// Opens a [`StoreFacade`] for a named store node.
pub trait StoreConnector: Send + Sync + 'static {
    /// The facade type this connector produces.
    type Store: StoreFacade;

    /// Open a facade for `node`.
    fn connect(&self, node: &str) -> Result<Self::Store, StoreError>;
}

/// Interpret a status document: an object carrying an `error` key means
/// the store is unavailable.
pub fn check_status(status: Value) -> Result<(), StoreError> {
    let Value::Object(map) = status else {
        return Ok(());
    };
    let Some(error) = map.get("error") else {
        return Ok(());
    };
    let reason = error
        .as_str()
        .map_or_else(|| error.to_string(), ToOwned::to_owned);
    Err(StoreError::Unavailable {
        reason,
        status: map.into_iter().collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_without_error_is_ok() {
        let status = serde_json::json!({"version": "1.24", "kvStore": "rocksdb"});
        assert!(check_status(status).is_ok());
        assert!(check_status(Value::Null).is_ok());
    }

    #[test]
    fn status_with_error_is_unavailable() {
        let status = serde_json::json!({"error": "node 7 does not exist", "code": 404});
        let err = check_status(status).unwrap_err();
        assert!(matches!(
            &err,
            StoreError::Unavailable { reason, status }
                if reason == "node 7 does not exist"
                    && status.get("code") == Some(&serde_json::json!(404))
        ));
    }
}
