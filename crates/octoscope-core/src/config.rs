//! Configuration loading and typed config structures for Octoscope.
//!
//! The configuration lives in `octoscope-config.yaml`. Every section and
//! every field has a default, so an empty file (or no file at all) yields
//! a working local setup against `http://localhost:3000`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::controls::ControlParams;
use crate::synthesis::SynthesisOptions;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `octoscope-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OctoscopeConfig {
    /// Document store connection.
    #[serde(default)]
    pub store: StoreConfig,

    /// Refresh timing.
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Initial placeholder flags.
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Observer HTTP server.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl OctoscopeConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `XTDB_URL` overrides `store.base_url`
    /// - `XTDB_NODE` overrides `store.node`
    /// - `OBSERVER_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    /// Environment overrides apply either way.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be loaded.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply the environment overrides listed on [`Self::from_file`].
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("XTDB_URL") {
            self.store.base_url = val;
        }
        if let Ok(val) = std::env::var("XTDB_NODE") {
            self.store.node = val;
        }
        if let Some(port) = std::env::var("OBSERVER_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.server.port = port;
        }
    }

    /// Control parameters the refresh loop starts with.
    pub fn initial_controls(&self) -> ControlParams {
        ControlParams {
            node: Some(self.store.node.clone()),
            include_fake_nodes: self.synthesis.include_fake_nodes,
            include_null_sentinel: self.synthesis.include_null_sentinel,
            valid_time: None,
        }
    }
}

/// Document store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the store's HTTP API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Node to read from at startup.
    #[serde(default = "default_node")]
    pub node: String,

    /// Node reported as the fallback in diagnostics.
    #[serde(default = "default_node")]
    pub default_node: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl StoreConfig {
    /// The request timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            node: default_node(),
            default_node: default_node(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Refresh timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshConfig {
    /// Milliseconds between periodic refreshes.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl RefreshConfig {
    /// The refresh period as a [`Duration`].
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

/// Placeholder flags applied until the shell overrides them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SynthesisConfig {
    /// Insert Fake nodes.
    #[serde(default = "default_true")]
    pub include_fake_nodes: bool,

    /// Insert the Null sentinel.
    #[serde(default = "default_true")]
    pub include_null_sentinel: bool,
}

impl SynthesisConfig {
    /// The configured flags as synthesis options.
    pub const fn options(self) -> SynthesisOptions {
        SynthesisOptions {
            include_fake_nodes: self.include_fake_nodes,
            include_null_sentinel: self.include_null_sentinel,
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            include_fake_nodes: true,
            include_null_sentinel: true,
        }
    }
}

/// Observer HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_owned()
}

fn default_node() -> String {
    "0".to_owned()
}

const fn default_timeout_secs() -> u64 {
    7200
}

const fn default_interval_ms() -> u64 {
    257
}

const fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8050
}

fn default_log_level() -> String {
    "info".to_owned()
}
