//! Octoscope studio binary.
//!
//! Wires the store connector, the refresh loop, and the Observer API
//! server together and runs until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `octoscope-config.yaml` (or the path in
//!    `OCTOSCOPE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the store connector
//! 4. Create the refresh controller on the configured node
//! 5. Start the Observer API server with the initializing graph
//! 6. Run the refresh loop until Ctrl-C

mod error;
mod observer_callback;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use octoscope_core::config::{LogFormat, LoggingConfig, OctoscopeConfig};
use octoscope_core::controller::RefreshController;
use octoscope_core::render::initializing;
use octoscope_core::runner;
use octoscope_observer::state::{AppState, PublishedGraph};
use octoscope_observer::ServerConfig;
use octoscope_xtdb::XtdbConnector;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::StudioError;
use crate::observer_callback::ObserverCallback;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "octoscope-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any startup step fails.
#[tokio::main]
async fn main() -> Result<(), StudioError> {
    // 1. Load configuration. Logging depends on it, so it comes first.
    let config_path = std::env::var_os("OCTOSCOPE_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = OctoscopeConfig::load_or_default(&config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging)?;
    info!(config = %config_path.display(), "octoscope-studio starting");
    info!(
        base_url = %config.store.base_url,
        node = %config.store.node,
        default_node = %config.store.default_node,
        interval_ms = config.refresh.interval_ms,
        timeout_secs = config.store.timeout_secs,
        "Configuration loaded"
    );

    // 3. Store connector.
    let connector = XtdbConnector::new(&config.store.base_url, config.store.timeout())?;
    info!(gateway = %connector.base_url(), "Store connector created");

    // 4. Refresh controller.
    let mut controller = RefreshController::new(
        connector.clone(),
        config.store.node.clone(),
        config.store.default_node.clone(),
    );

    // 5. Observer API server.
    let initial = PublishedGraph {
        revision: 0,
        node: config.store.node.clone(),
        valid_time: Utc::now(),
        elements: initializing(&config.store.node, &config.store.default_node),
    };
    let app_state = Arc::new(AppState::new(
        connector,
        initial,
        config.initial_controls(),
        config.store.default_node.clone(),
    ));
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let observer_handle =
        octoscope_observer::startup::spawn_observer(&server_config, Arc::clone(&app_state))
            .await?;

    // 6. Refresh loop.
    let inputs = app_state.refresh_inputs();
    let mut callback = ObserverCallback::new(Arc::clone(&app_state));
    let period = config.refresh.interval();

    tokio::select! {
        cycles = runner::run_refresh_loop(&mut controller, inputs, &mut callback, period) => {
            info!(cycles, "Refresh loop finished");
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "failed to listen for Ctrl-C, shutting down");
            }
            info!("Interrupt received, shutting down");
        }
    }

    observer_handle.abort();
    info!("octoscope-studio shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<(), StudioError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match logging.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| StudioError::Logging {
        message: e.to_string(),
    })
}
