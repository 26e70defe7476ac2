//! Refresh controller: fetch, synthesize, render, reconcile.
//!
//! The controller owns all mutable refresh state: the current store node
//! and its facade, and the last published graph. One [`refresh`] call runs
//! a whole cycle and never fails; store errors surface as the Error node.
//!
//! [`refresh`]: RefreshController::refresh

use chrono::{DateTime, Utc};
use octoscope_types::{Attributes, FetchFailure, PositionIndex, RenderGraph};
use tracing::{debug, info, warn};

use crate::controls::{ControlParams, resolve_valid_time};
use crate::differ::{Decision, reconcile};
use crate::render::render;
use crate::snapshot::{Snapshot, fetch_snapshot};
use crate::store::{StoreConnector, StoreError};
use crate::synthesis::synthesize;

/// What one refresh cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOutcome {
    /// Store node the cycle read from.
    pub node: String,
    /// Effective valid-time of the cycle.
    pub valid_time: DateTime<Utc>,
    /// Whether to publish, and what.
    pub decision: Decision,
}

/// Drives refresh cycles against a switchable store node.
pub struct RefreshController<C: StoreConnector> {
    connector: C,
    store: Option<C::Store>,
    node: String,
    default_node: String,
    last_published: Option<RenderGraph>,
    failing: bool,
}

impl<C: StoreConnector> RefreshController<C> {
    /// Create a controller that starts on `node`. The facade is opened
    /// lazily on the first refresh.
    pub fn new(connector: C, node: impl Into<String>, default_node: impl Into<String>) -> Self {
        Self {
            connector,
            store: None,
            node: node.into(),
            default_node: default_node.into(),
            last_published: None,
            failing: false,
        }
    }

    /// The current store node.
    pub fn node(&self) -> &str {
        &self.node
    }

    /// The node the deployment falls back to.
    pub fn default_node(&self) -> &str {
        &self.default_node
    }

    /// The last graph this controller decided to publish.
    pub const fn last_published(&self) -> Option<&RenderGraph> {
        self.last_published.as_ref()
    }

    /// Whether the most recent fetch failed.
    pub const fn is_failing(&self) -> bool {
        self.failing
    }

    /// Run one refresh cycle with the given controls and known positions.
    pub async fn refresh(
        &mut self,
        params: &ControlParams,
        positions: &PositionIndex,
    ) -> RefreshOutcome {
        let valid_time = resolve_valid_time(params.valid_time.as_deref(), Utc::now());
        self.select_node(params.node.as_deref());

        let fetched = self.fetch(valid_time).await;
        let graph = synthesize(fetched.as_ref(), params.options());
        let decision = reconcile(self.last_published.as_ref(), render(&graph), positions);

        if let Decision::Publish(published) = &decision {
            debug!(
                node = %self.node,
                elements = published.len(),
                "publishing graph"
            );
            self.last_published = Some(published.clone());
        }

        RefreshOutcome {
            node: self.node.clone(),
            valid_time,
            decision,
        }
    }

    fn select_node(&mut self, requested: Option<&str>) {
        let Some(requested) = requested else {
            return;
        };
        if requested != self.node {
            info!(from = %self.node, to = requested, "switching store node");
            requested.clone_into(&mut self.node);
            self.store = None;
        }
    }

    async fn fetch(&mut self, valid_time: DateTime<Utc>) -> Result<Snapshot, FetchFailure> {
        let store = match self.store.take() {
            Some(store) => store,
            None => match self.connector.connect(&self.node) {
                Ok(store) => store,
                Err(error) => return Err(self.failure(&error)),
            },
        };
        let result = fetch_snapshot(&store, valid_time).await;
        self.store = Some(store);
        match result {
            Ok(snapshot) => {
                if self.failing {
                    info!(node = %self.node, "store recovered");
                    self.failing = false;
                }
                Ok(snapshot)
            }
            Err(error) => Err(self.failure(&error)),
        }
    }

    /// Warns when the store goes from healthy to failing; repeat failures
    /// are logged at debug level.
    fn failure(&mut self, error: &StoreError) -> FetchFailure {
        if self.failing {
            debug!(node = %self.node, error = %error, "snapshot fetch still failing");
        } else {
            warn!(node = %self.node, error = %error, "snapshot fetch failed");
            self.failing = true;
        }
        let status = match error {
            StoreError::Unavailable { status, .. } => status.clone(),
            _ => Attributes::new(),
        };
        FetchFailure {
            message: error.to_string(),
            status,
            node: self.node.clone(),
            default_node: self.default_node.clone(),
        }
    }
}
