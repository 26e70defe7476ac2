//! Refresh callback that updates the Observer API state.
//!
//! After each cycle the displayed node and valid-time are recorded; a
//! changed graph is also published to every connected `WebSocket` client.

use std::sync::Arc;

use octoscope_core::controller::RefreshOutcome;
use octoscope_core::differ::Decision;
use octoscope_core::runner::RefreshCallback;
use octoscope_core::store::StoreConnector;
use octoscope_observer::state::AppState;
use tracing::debug;

/// Callback that bridges the refresh loop to the Observer API.
pub struct ObserverCallback<C> {
    state: Arc<AppState<C>>,
}

impl<C> ObserverCallback<C> {
    /// Create a new observer callback backed by the given app state.
    pub const fn new(state: Arc<AppState<C>>) -> Self {
        Self { state }
    }
}

impl<C: StoreConnector> RefreshCallback for ObserverCallback<C> {
    fn on_refresh(&mut self, outcome: &RefreshOutcome) {
        match &outcome.decision {
            Decision::Publish(graph) => {
                let receivers =
                    self.state
                        .publish(&outcome.node, outcome.valid_time, graph.clone());
                debug!(
                    node = %outcome.node,
                    elements = graph.len(),
                    receivers,
                    "graph published"
                );
            }
            Decision::Unchanged => {
                self.state.record_refresh(&outcome.node, outcome.valid_time);
            }
        }
    }
}
