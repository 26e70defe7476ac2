//! Errors raised while setting up the HTTP store client.
//!
//! Request-time failures are reported as
//! [`StoreError`](octoscope_core::store::StoreError) so they flow into the
//! Error node like any other fetch failure.

/// Errors that can occur when building an [`XtdbConnector`].
///
/// [`XtdbConnector`]: crate::client::XtdbConnector
#[derive(Debug, thiserror::Error)]
pub enum XtdbError {
    /// The configured base URL does not parse.
    #[error("invalid store URL {url}: {source}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// The underlying parse error.
        source: url::ParseError,
    },

    /// The base URL parses but cannot carry a path (e.g. `mailto:`).
    #[error("store URL {0} cannot be used as a base")]
    NotABase(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
