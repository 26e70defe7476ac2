//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use octoscope_core::render::{initializing, render};
use octoscope_core::snapshot::Snapshot;
use octoscope_core::store::{StoreConnector, StoreError, StoreFacade};
use octoscope_core::synthesis::{SynthesisOptions, synthesize};
use octoscope_core::controls::ControlParams;
use octoscope_observer::router::build_router;
use octoscope_observer::state::{AppState, PublishedGraph};
use octoscope_types::{
    Attributes, ObjectOfInterest, Origin, OriginParameter, Position, PositionIndex, RenderGraph,
};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Answers history lookups from memory and records every call.
#[derive(Clone, Default)]
struct MemoryConnector {
    calls: Arc<Mutex<Vec<(String, String, bool, bool)>>>,
    fail: bool,
}

struct MemoryStore {
    node: String,
    calls: Arc<Mutex<Vec<(String, String, bool, bool)>>>,
    fail: bool,
}

impl StoreFacade for MemoryStore {
    async fn status(&self) -> Result<Value, StoreError> {
        Ok(json!({}))
    }

    async fn query(
        &self,
        _query: &str,
        _valid_time: DateTime<Utc>,
    ) -> Result<Vec<Vec<Value>>, StoreError> {
        Ok(Vec::new())
    }

    async fn history(
        &self,
        id: &str,
        with_docs: bool,
        with_corrections: bool,
    ) -> Result<Vec<Value>, StoreError> {
        self.calls.lock().unwrap().push((
            self.node.clone(),
            id.to_owned(),
            with_docs,
            with_corrections,
        ));
        if self.fail {
            return Err(StoreError::Transport("connection reset".to_owned()));
        }
        Ok(vec![
            json!({"xt/id": id, "txTime": "2022-01-01T00:00:00Z"}),
            json!({"xt/id": id, "txTime": "2022-02-01T00:00:00Z"}),
        ])
    }
}

impl StoreConnector for MemoryConnector {
    type Store = MemoryStore;

    fn connect(&self, node: &str) -> Result<MemoryStore, StoreError> {
        Ok(MemoryStore {
            node: node.to_owned(),
            calls: Arc::clone(&self.calls),
            fail: self.fail,
        })
    }
}

fn sample_graph() -> RenderGraph {
    let snapshot = Snapshot {
        objects: vec![
            ObjectOfInterest {
                id: "a".to_owned(),
                object_type: "Hostname".to_owned(),
                attributes: Attributes::new(),
            },
            ObjectOfInterest {
                id: "b".to_owned(),
                object_type: "IPAddressV4".to_owned(),
                attributes: Attributes::new(),
            },
        ],
        origins: vec![Origin {
            id: "o1".to_owned(),
            source_id: "a".to_owned(),
            origin_type: "dns".to_owned(),
            results: vec!["b".to_owned()],
            attributes: Attributes::new(),
        }],
        origin_parameters: vec![OriginParameter {
            id: "p1".to_owned(),
            origin_id: "o1".to_owned(),
            attributes: Attributes::new(),
        }],
        scan_profiles: Vec::new(),
    };
    render(&synthesize(Ok(&snapshot), SynthesisOptions::default()))
}

fn valid_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 1, 1, 10, 0, 0).unwrap()
}

fn make_state(connector: MemoryConnector) -> Arc<AppState<MemoryConnector>> {
    let initial = PublishedGraph {
        revision: 0,
        node: "0".to_owned(),
        valid_time: valid_time(),
        elements: initializing("0", "0"),
    };
    Arc::new(AppState::new(
        connector,
        initial,
        ControlParams::default(),
        "0",
    ))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(state: &Arc<AppState<MemoryConnector>>, request: Request<Body>) -> (StatusCode, Body) {
    let response = build_router(Arc::clone(state)).oneshot(request).await.unwrap();
    (response.status(), response.into_body())
}

#[tokio::test]
async fn index_returns_html() {
    let state = make_state(MemoryConnector::default());

    let response = build_router(state)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn index_escapes_node_names_from_controls() {
    let state = make_state(MemoryConnector::default());

    let (status, body) = send(
        &state,
        Request::post("/api/controls?node=%3Cscript%3Ealert(1)%3C%2Fscript%3E")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let node = body_to_json(body).await["node"].as_str().unwrap().to_owned();
    assert_eq!(node, "<script>alert(1)</script>");
    state.publish(&node, valid_time(), sample_graph());

    let (status, body) = send(&state, Request::get("/").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("&lt;script&gt;alert(1)&lt;"));
    assert!(!html.contains("<script>"));
    assert!(html.contains("/api/elements/{id}"));
}

#[tokio::test]
async fn graph_starts_with_initializing_node() {
    let state = make_state(MemoryConnector::default());

    let (status, body) = send(&state, Request::get("/api/graph").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    let json = body_to_json(body).await;
    assert_eq!(json["revision"], 0);
    assert_eq!(json["node"], "0");
    assert_eq!(json["elements"][0]["data"]["id"], "init");
    assert_eq!(json["elements"][0]["data"]["label"], "Initializing...");
}

#[tokio::test]
async fn published_graph_is_served_as_flat_elements() {
    let state = make_state(MemoryConnector::default());
    state.publish("0", valid_time(), sample_graph());

    let (_, body) = send(&state, Request::get("/api/graph").body(Body::empty()).unwrap()).await;

    let json = body_to_json(body).await;
    assert_eq!(json["revision"], 1);
    let elements = json["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 3);
    let edge = elements.iter().find(|e| e["data"].get("source").is_some()).unwrap();
    assert_eq!(edge["data"]["kind"], "dns");
    assert_eq!(edge["data"]["parameter"]["xt/id"], "p1");
    assert!(edge["style"]["line-color"].as_str().unwrap().starts_with('#'));
}

#[tokio::test]
async fn element_detail_includes_related_record() {
    let state = make_state(MemoryConnector::default());
    state.publish("0", valid_time(), sample_graph());

    let (status, body) =
        send(&state, Request::get("/api/elements/o1").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let json = body_to_json(body).await;
    assert_eq!(json["element"]["data"]["source"], "a");
    assert_eq!(json["related"]["xt/id"], "p1");

    let (status, body) =
        send(&state, Request::get("/api/elements/a").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let json = body_to_json(body).await;
    assert_eq!(json["element"]["data"]["label"], "Hostname");
    assert!(json["related"].is_null());
}

#[tokio::test]
async fn unknown_element_is_not_found() {
    let state = make_state(MemoryConnector::default());

    let (status, body) =
        send(&state, Request::get("/api/elements/nope").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let json = body_to_json(body).await;
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn controls_update_from_query_string() {
    let state = make_state(MemoryConnector::default());
    let mut inputs = state.refresh_inputs();

    let (status, body) = send(
        &state,
        Request::post("/api/controls?node=3&nofakes=1&valid_time=2022-01-01T10%3A00%3A00")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json = body_to_json(body).await;
    assert_eq!(json["node"], "3");
    assert_eq!(json["include_fake_nodes"], false);
    assert_eq!(json["include_null_sentinel"], true);
    assert!(inputs.controls.has_changed().unwrap());
    let params = inputs.controls.borrow_and_update().clone();
    assert_eq!(params.node.as_deref(), Some("3"));
    assert_eq!(params.valid_time.as_deref(), Some("2022-01-01T10:00:00"));
}

#[tokio::test]
async fn plain_get_controls_reads_without_waking_the_loop() {
    let state = make_state(MemoryConnector::default());
    let inputs = state.refresh_inputs();

    let (status, body) =
        send(&state, Request::get("/api/controls").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    let json = body_to_json(body).await;
    assert_eq!(json["include_fake_nodes"], true);
    assert!(!inputs.controls.has_changed().unwrap());

    let (_, body) = send(
        &state,
        Request::get("/api/controls?nonull=1").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(body_to_json(body).await["include_null_sentinel"], false);
    assert!(inputs.controls.has_changed().unwrap());
}

#[tokio::test]
async fn positions_replace_the_index() {
    let state = make_state(MemoryConnector::default());
    let inputs = state.refresh_inputs();

    let (status, _) = send(
        &state,
        Request::put("/api/positions")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"a": {"x": 1.5, "y": -3.0}}"#))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    let expected = PositionIndex::from([("a".to_owned(), Position { x: 1.5, y: -3.0 })]);
    assert_eq!(*inputs.positions.borrow(), expected);
}

#[tokio::test]
async fn history_is_read_from_the_current_node() {
    let connector = MemoryConnector::default();
    let state = make_state(connector.clone());
    state.record_refresh("4", valid_time());

    let (status, body) = send(
        &state,
        Request::get("/api/history/a?with_corrections=false")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json = body_to_json(body).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
    let calls = connector.calls.lock().unwrap().clone();
    assert_eq!(calls, vec![("4".to_owned(), "a".to_owned(), true, false)]);
}

#[tokio::test]
async fn store_failure_is_bad_gateway() {
    let state = make_state(MemoryConnector {
        fail: true,
        ..MemoryConnector::default()
    });

    let (status, body) =
        send(&state, Request::get("/api/history/a").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json = body_to_json(body).await;
    assert!(json["error"].as_str().unwrap().contains("connection reset"));
}
