//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled so a canvas served from another origin
//! can talk to it.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, put};
use octoscope_core::store::StoreConnector;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/graph` -- `WebSocket` graph stream
/// - `GET /api/graph` -- displayed graph
/// - `GET /api/elements/{id}` -- selected element detail
/// - `GET|POST /api/controls` -- control parameters
/// - `PUT /api/positions` -- node positions
/// - `GET /api/history/{id}` -- entity history
pub fn build_router<C: StoreConnector>(state: Arc<AppState<C>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index::<C>))
        // WebSocket
        .route("/ws/graph", get(ws::ws_graph::<C>))
        // REST API
        .route("/api/graph", get(handlers::get_graph::<C>))
        .route("/api/elements/{id}", get(handlers::get_element::<C>))
        .route(
            "/api/controls",
            get(handlers::get_controls::<C>).post(handlers::post_controls::<C>),
        )
        .route("/api/positions", put(handlers::put_positions::<C>))
        .route("/api/history/{id}", get(handlers::get_history::<C>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
