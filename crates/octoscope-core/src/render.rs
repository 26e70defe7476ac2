//! Flatten a typed [`Graph`] into the canvas element list.

use octoscope_types::{
    BorderStyle, Color, Edge, EdgeData, EdgeElement, EdgeStyle, Element, ERROR_NODE_ID,
    FetchFailure, Graph, INIT_NODE_ID, NULL_SENTINEL_ID, Node, NodeData, NodeElement, NodeStyle,
    ObjectOfInterest, RenderGraph, ScanProfile, ScanProfileType,
};
use serde_json::{Map, Value, json};

use crate::colorize::colorize;

/// Border width used when an object has no scan profile.
const MISSING_PROFILE_BORDER_WIDTH: u32 = 10;

/// Diagnostic carried by every Fake node.
const FAKE_NODE_ERROR: &str = "ooi not present in xtdb but found in origin";

/// Diagnostic carried by the Null sentinel.
const NULL_NODE_ERROR: &str = "the origin pointing to this node has no result";

/// Render a graph: all nodes in graph order, then all edges.
pub fn render(graph: &Graph) -> RenderGraph {
    let mut elements = Vec::with_capacity(graph.nodes.len().saturating_add(graph.edges.len()));
    elements.extend(graph.nodes.iter().map(|node| Element::Node(render_node(node))));
    elements.extend(graph.edges.iter().map(|edge| Element::Edge(render_edge(edge))));
    RenderGraph::new(elements)
}

/// The placeholder graph published before the first refresh completes.
pub fn initializing(current_node: &str, default_node: &str) -> RenderGraph {
    let node = NodeElement {
        data: NodeData {
            id: INIT_NODE_ID.to_owned(),
            label: "Initializing...".to_owned(),
            info: json!({
                "current_node": current_node,
                "default_node": default_node,
                "xt/id": INIT_NODE_ID,
            }),
            profile: None,
        },
        style: NodeStyle::filled(colorize(ERROR_NODE_ID)),
        position: None,
    };
    RenderGraph::new(vec![Element::Node(node)])
}

fn render_node(node: &Node) -> NodeElement {
    match node {
        Node::Real { ooi, profile } => real_node(ooi, profile.as_ref()),
        Node::Fake { id } => placeholder(id, "Fake", FAKE_NODE_ERROR),
        Node::Null => placeholder(NULL_SENTINEL_ID, "Null", NULL_NODE_ERROR),
        Node::Error(failure) => error_node(failure),
    }
}

fn real_node(ooi: &ObjectOfInterest, profile: Option<&ScanProfile>) -> NodeElement {
    let mut style = NodeStyle::filled(colorize(&ooi.object_type));
    match profile {
        Some(profile) => {
            style.border_width = Some(profile.level.saturating_mul(2));
            style.border_color = Some(Color::BLACK);
            style.border_style = Some(border_style(&profile.scan_profile_type));
        }
        None => {
            style.border_width = Some(MISSING_PROFILE_BORDER_WIDTH);
            style.border_color = Some(Color::RED);
            style.border_style = Some(BorderStyle::Double);
        }
    }

    NodeElement {
        data: NodeData {
            id: ooi.id.clone(),
            label: ooi.object_type.clone(),
            info: ooi.document(),
            profile: profile.cloned(),
        },
        style,
        position: None,
    }
}

const fn border_style(kind: &ScanProfileType) -> BorderStyle {
    match kind {
        ScanProfileType::Declared => BorderStyle::Solid,
        ScanProfileType::Inherited => BorderStyle::Dashed,
        ScanProfileType::Empty => BorderStyle::None,
        ScanProfileType::Unrecognized(_) => BorderStyle::Double,
    }
}

fn placeholder(id: &str, label: &str, error: &str) -> NodeElement {
    NodeElement {
        data: NodeData {
            id: id.to_owned(),
            label: label.to_owned(),
            info: json!({ "error": error, "xt/id": id }),
            profile: None,
        },
        style: NodeStyle::filled(Color::RED),
        position: None,
    }
}

/// The store status object, the failure message under `error` unless the
/// status already names one, then the node identities.
fn error_node(failure: &FetchFailure) -> NodeElement {
    let mut info: Map<String, Value> = failure
        .status
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    info.entry("error")
        .or_insert_with(|| Value::String(failure.message.clone()));
    info.insert("node".to_owned(), Value::String(failure.node.clone()));
    info.insert(
        "default_node".to_owned(),
        Value::String(failure.default_node.clone()),
    );
    info.insert("xt/id".to_owned(), Value::String(ERROR_NODE_ID.to_owned()));

    NodeElement {
        data: NodeData {
            id: ERROR_NODE_ID.to_owned(),
            label: "Error".to_owned(),
            info: Value::Object(info),
            profile: None,
        },
        style: NodeStyle::filled(colorize(ERROR_NODE_ID)),
        position: None,
    }
}

fn render_edge(edge: &Edge) -> EdgeElement {
    let color = colorize(&edge.kind);
    EdgeElement {
        data: EdgeData {
            source: edge.source.clone(),
            target: edge.target.clone(),
            info: edge.info.clone(),
            kind: edge.kind.clone(),
            parameter: edge.parameter.clone(),
        },
        style: EdgeStyle {
            line_color: color,
            target_arrow_color: color,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use octoscope_types::{Attributes, Origin};

    use super::*;

    fn host(id: &str) -> ObjectOfInterest {
        let mut attributes = Attributes::new();
        attributes.insert("name".to_owned(), json!("example.com"));
        ObjectOfInterest {
            id: id.to_owned(),
            object_type: "Hostname".to_owned(),
            attributes,
        }
    }

    fn profile(level: u32, kind: ScanProfileType) -> ScanProfile {
        ScanProfile {
            id: "ScanProfile|a".to_owned(),
            reference: "a".to_owned(),
            level,
            scan_profile_type: kind,
            attributes: Attributes::new(),
        }
    }

    #[test]
    fn real_node_carries_full_document_and_type_color() {
        let graph = Graph {
            nodes: vec![Node::Real {
                ooi: host("a"),
                profile: None,
            }],
            edges: Vec::new(),
        };

        let rendered = render(&graph);
        let node = rendered.node("a").unwrap();
        assert_eq!(node.data.label, "Hostname");
        assert_eq!(node.data.info["name"], "example.com");
        assert_eq!(node.data.info["xt/id"], "a");
        assert_eq!(node.data.info["object_type"], "Hostname");
        assert_eq!(node.style.background_color, colorize("Hostname"));
    }

    #[test]
    fn missing_profile_gets_thick_red_double_border() {
        let node = real_node(&host("a"), None);
        assert_eq!(node.style.border_width, Some(10));
        assert_eq!(node.style.border_color, Some(Color::RED));
        assert_eq!(node.style.border_style, Some(BorderStyle::Double));
        assert!(node.data.profile.is_none());
    }

    #[test]
    fn profile_type_selects_border_style() {
        let cases = [
            (ScanProfileType::Declared, BorderStyle::Solid),
            (ScanProfileType::Inherited, BorderStyle::Dashed),
            (ScanProfileType::Empty, BorderStyle::None),
            (
                ScanProfileType::Unrecognized("custom".to_owned()),
                BorderStyle::Double,
            ),
        ];
        for (kind, expected) in cases {
            let node = real_node(&host("a"), Some(&profile(3, kind)));
            assert_eq!(node.style.border_width, Some(6));
            assert_eq!(node.style.border_color, Some(Color::BLACK));
            assert_eq!(node.style.border_style, Some(expected));
            assert!(node.data.profile.is_some());
        }
    }

    #[test]
    fn placeholders_are_red_with_diagnostics() {
        let graph = Graph {
            nodes: vec![
                Node::Fake {
                    id: "ghost".to_owned(),
                },
                Node::Null,
            ],
            edges: Vec::new(),
        };

        let rendered = render(&graph);
        let fake = rendered.node("ghost").unwrap();
        assert_eq!(fake.data.label, "Fake");
        assert_eq!(fake.style, NodeStyle::filled(Color::RED));
        assert_eq!(fake.data.info["error"], FAKE_NODE_ERROR);
        assert_eq!(fake.data.info["xt/id"], "ghost");

        let null = rendered.node(NULL_SENTINEL_ID).unwrap();
        assert_eq!(null.data.label, "Null");
        assert_eq!(null.data.info["error"], NULL_NODE_ERROR);
    }

    #[test]
    fn error_node_merges_status_and_identities() {
        let mut status = Attributes::new();
        status.insert("error".to_owned(), json!("no such node"));
        status.insert("code".to_owned(), json!(404));
        let graph = Graph::error(FetchFailure {
            message: "store unavailable: no such node".to_owned(),
            status,
            node: "7".to_owned(),
            default_node: "0".to_owned(),
        });

        let rendered = render(&graph);
        assert_eq!(rendered.len(), 1);
        let node = rendered.node(ERROR_NODE_ID).unwrap();
        assert_eq!(node.data.label, "Error");
        assert_eq!(node.data.info["error"], "no such node");
        assert_eq!(node.data.info["code"], 404);
        assert_eq!(node.data.info["node"], "7");
        assert_eq!(node.data.info["default_node"], "0");
        assert_eq!(node.data.info["xt/id"], ERROR_NODE_ID);
        assert_eq!(node.style.background_color, colorize("error"));
    }

    #[test]
    fn error_without_status_reports_message() {
        let graph = Graph::error(FetchFailure {
            message: "connection refused".to_owned(),
            status: Attributes::new(),
            node: "0".to_owned(),
            default_node: "0".to_owned(),
        });
        let rendered = render(&graph);
        assert_eq!(
            rendered.node(ERROR_NODE_ID).unwrap().data.info["error"],
            "connection refused"
        );
    }

    #[test]
    fn edges_follow_nodes_and_share_kind_color() {
        let origin = Origin {
            id: "o1".to_owned(),
            source_id: "a".to_owned(),
            origin_type: "scan".to_owned(),
            results: vec!["a".to_owned()],
            attributes: Attributes::new(),
        };
        let graph = Graph {
            nodes: vec![Node::Real {
                ooi: host("a"),
                profile: None,
            }],
            edges: vec![Edge {
                source: "a".to_owned(),
                target: "a".to_owned(),
                kind: "scan".to_owned(),
                info: origin,
                parameter: None,
            }],
        };

        let rendered = render(&graph);
        assert!(matches!(rendered.elements.as_slice(), [Element::Node(_), Element::Edge(_)]));
        let edge = rendered.edges().next().unwrap();
        assert_eq!(edge.style.line_color, colorize("scan"));
        assert_eq!(edge.style.target_arrow_color, colorize("scan"));

        let json = serde_json::to_value(&rendered).unwrap();
        assert!(json[1]["data"]["parameter"].is_null());
        assert_eq!(json[1]["data"]["info"]["source"], "a");
    }

    #[test]
    fn initializing_graph_names_both_nodes() {
        let rendered = initializing("3", "0");
        let node = rendered.node(INIT_NODE_ID).unwrap();
        assert_eq!(node.data.label, "Initializing...");
        assert_eq!(node.data.info["current_node"], "3");
        assert_eq!(node.data.info["default_node"], "0");
    }
}
