//! Error types for the Octoscope studio binary.

/// Top-level error for the studio binary.
///
/// Each variant wraps the startup error of one subsystem so `main` can
/// propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: octoscope_core::config::ConfigError,
    },

    /// The store connector could not be created.
    #[error("store error: {source}")]
    Store {
        /// The underlying connector error.
        #[from]
        source: octoscope_xtdb::XtdbError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: octoscope_observer::startup::StartupError,
    },

    /// The logging subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
