//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the currently displayed graph, the broadcast channel
//! that pushes every newly published graph to `WebSocket` clients, and the
//! two watch channels the refresh loop reads its inputs from: control
//! parameters and node positions.

use chrono::{DateTime, Utc};
use octoscope_core::controls::ControlParams;
use octoscope_core::runner::RefreshInputs;
use octoscope_core::store::StoreConnector;
use octoscope_types::{PositionIndex, RenderGraph};
use tokio::sync::{broadcast, watch};

/// Capacity of the broadcast channel for published graphs.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 64;

/// The graph currently on display, with where and when it was read.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PublishedGraph {
    /// Incremented on every publish. Zero is the initializing graph.
    pub revision: u64,
    /// Store node of the most recent refresh.
    pub node: String,
    /// Effective valid-time of the most recent refresh.
    pub valid_time: DateTime<Utc>,
    /// Canvas element list.
    pub elements: RenderGraph,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor. `C` opens store facades for on-demand history lookups.
pub struct AppState<C> {
    /// Broadcast sender for published graphs.
    pub tx: broadcast::Sender<PublishedGraph>,
    /// The graph currently on display.
    pub view: watch::Sender<PublishedGraph>,
    /// Control parameters read by the refresh loop.
    pub controls: watch::Sender<ControlParams>,
    /// Node positions reported by the rendering shell.
    pub positions: watch::Sender<PositionIndex>,
    /// Node the deployment falls back to.
    pub default_node: String,
    /// Store connector used for history lookups.
    pub connector: C,
}

impl<C: StoreConnector> AppState<C> {
    /// Create the state with an initial graph on display and the
    /// control parameters the refresh loop starts with.
    pub fn new(
        connector: C,
        initial: PublishedGraph,
        controls: ControlParams,
        default_node: impl Into<String>,
    ) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (view, _) = watch::channel(initial);
        let (controls, _) = watch::channel(controls);
        let (positions, _) = watch::channel(PositionIndex::new());
        Self {
            tx,
            view,
            controls,
            positions,
            default_node: default_node.into(),
            connector,
        }
    }

    /// Receivers for the refresh loop.
    pub fn refresh_inputs(&self) -> RefreshInputs {
        RefreshInputs {
            controls: self.controls.subscribe(),
            positions: self.positions.subscribe(),
        }
    }

    /// A copy of the graph currently on display.
    pub fn current(&self) -> PublishedGraph {
        self.view.borrow().clone()
    }

    /// Subscribe to the published graph stream.
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedGraph> {
        self.tx.subscribe()
    }

    /// Record where and when the latest refresh read, without changing
    /// the displayed graph.
    pub fn record_refresh(&self, node: &str, valid_time: DateTime<Utc>) {
        self.view.send_if_modified(|view| {
            let changed = view.node != node || view.valid_time != valid_time;
            if changed {
                node.clone_into(&mut view.node);
                view.valid_time = valid_time;
            }
            changed
        });
    }

    /// Display a new graph and push it to every connected client.
    ///
    /// Returns the number of `WebSocket` receivers reached. Returns 0 if
    /// no clients are connected (this is not an error).
    pub fn publish(&self, node: &str, valid_time: DateTime<Utc>, elements: RenderGraph) -> usize {
        let mut published = None;
        self.view.send_modify(|view| {
            view.revision = view.revision.saturating_add(1);
            node.clone_into(&mut view.node);
            view.valid_time = valid_time;
            view.elements = elements;
            published = Some(view.clone());
        });
        // send returns Err only when there are zero receivers,
        // which is normal when no WebSocket clients are connected.
        published.map_or(0, |graph| self.tx.send(graph).unwrap_or(0))
    }

    /// Replace the control parameters. Returns whether they changed;
    /// only a change wakes the refresh loop.
    pub fn set_controls(&self, params: ControlParams) -> bool {
        self.controls.send_if_modified(|current| {
            if *current == params {
                return false;
            }
            *current = params;
            true
        })
    }

    /// The current control parameters.
    pub fn controls(&self) -> ControlParams {
        self.controls.borrow().clone()
    }

    /// Replace the position index.
    pub fn set_positions(&self, positions: PositionIndex) {
        self.positions.send_replace(positions);
    }
}
