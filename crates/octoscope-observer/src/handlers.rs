//! REST API endpoint handlers for the Observer server.
//!
//! Graph reads are served from the watch channel holding the displayed
//! graph; only history lookups reach the store.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/graph` | Displayed graph, node, and valid-time |
//! | `GET` | `/api/elements/{id}` | One selected element and its related record |
//! | `GET` | `/api/controls` | Current control parameters (a query string updates them) |
//! | `POST` | `/api/controls` | Update control parameters from the query string |
//! | `PUT` | `/api/positions` | Replace the node position index |
//! | `GET` | `/api/history/{id}` | Entity history from the store |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::Html;
use minijinja::{Environment, context};
use octoscope_core::controls::ControlParams;
use octoscope_core::store::{StoreConnector, StoreFacade};
use octoscope_types::{Element, PositionIndex};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ObserverError;
use crate::state::{AppState, PublishedGraph};

/// Query parameters for the `GET /api/history/{id}` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct HistoryQuery {
    /// Include full documents (default true).
    pub with_docs: Option<bool>,
    /// Include corrected versions (default true).
    pub with_corrections: Option<bool>,
}

/// Status page template. The `.html` name turns on HTML autoescaping, so
/// node names supplied through `/api/controls` render as text.
const INDEX_TEMPLATE: (&str, &str) = ("index.html", include_str!("../templates/index.html"));

/// Serve a minimal HTML page showing the displayed graph and API links.
pub async fn index<C: StoreConnector>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<Html<String>, ObserverError> {
    let view = state.current();
    let (name, source) = INDEX_TEMPLATE;

    let mut env = Environment::new();
    env.add_template(name, source)
        .map_err(|e| ObserverError::Template(format!("failed to add index template: {e}")))?;
    let template = env
        .get_template(name)
        .map_err(|e| ObserverError::Template(format!("missing index template: {e}")))?;
    let page = template
        .render(context! {
            node => view.node.as_str(),
            default_node => state.default_node.as_str(),
            valid_time => view.valid_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            revision => view.revision,
            node_count => view.elements.nodes().count(),
            edge_count => view.elements.edges().count(),
        })
        .map_err(|e| ObserverError::Template(format!("failed to render index: {e}")))?;
    Ok(Html(page))
}

/// Return the displayed graph.
pub async fn get_graph<C: StoreConnector>(
    State(state): State<Arc<AppState<C>>>,
) -> Json<PublishedGraph> {
    Json(state.current())
}

/// Return the displayed element whose record id is `id`, with the
/// record it links to: the scan profile of a node or the parameter of an
/// edge.
///
/// An origin with several results renders one edge per result; the
/// first one is returned.
pub async fn get_element<C: StoreConnector>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ObserverError> {
    let view = state.current();
    let element = view
        .elements
        .elements
        .into_iter()
        .find(|element| element.record_id() == id)
        .ok_or_else(|| ObserverError::NotFound(format!("element {id}")))?;

    let related = match &element {
        Element::Node(node) => serde_json::to_value(&node.data.profile),
        Element::Edge(edge) => serde_json::to_value(&edge.data.parameter),
    }
    .unwrap_or(Value::Null);

    Ok(Json(serde_json::json!({
        "element": element,
        "related": related,
    })))
}

/// Return the current control parameters. A non-empty query string
/// updates them first, like `POST`.
pub async fn get_controls<C: StoreConnector>(
    State(state): State<Arc<AppState<C>>>,
    RawQuery(query): RawQuery,
) -> Json<ControlParams> {
    match query.filter(|query| !query.is_empty()) {
        Some(query) => apply_controls(&state, &query),
        None => Json(state.controls()),
    }
}

/// Replace the control parameters with those in the query string.
/// Absent keys take their defaults.
pub async fn post_controls<C: StoreConnector>(
    State(state): State<Arc<AppState<C>>>,
    RawQuery(query): RawQuery,
) -> Json<ControlParams> {
    apply_controls(&state, query.as_deref().unwrap_or_default())
}

fn apply_controls<C: StoreConnector>(state: &AppState<C>, query: &str) -> Json<ControlParams> {
    let params = ControlParams::from_query(query);
    if state.set_controls(params.clone()) {
        info!(controls = %params.to_query(), "control parameters updated");
    }
    Json(params)
}

/// Replace the node position index reported by the rendering shell.
pub async fn put_positions<C: StoreConnector>(
    State(state): State<Arc<AppState<C>>>,
    Json(positions): Json<PositionIndex>,
) -> StatusCode {
    debug!(count = positions.len(), "positions updated");
    state.set_positions(positions);
    StatusCode::NO_CONTENT
}

/// Look up the full history of one entity on the current store node.
pub async fn get_history<C: StoreConnector>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<Value>>, ObserverError> {
    let node = state.current().node;
    let store = state.connector.connect(&node)?;
    let history = store
        .history(
            &id,
            params.with_docs.unwrap_or(true),
            params.with_corrections.unwrap_or(true),
        )
        .await?;
    debug!(%id, %node, versions = history.len(), "history served");
    Ok(Json(history))
}
