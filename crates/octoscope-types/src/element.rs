//! Render-boundary element list consumed by the graph canvas.
//!
//! The canvas expects nodes and edges interleaved in one ordered sequence.
//! A node element carries a standalone `data.id`; an edge element carries
//! a `data.source`/`data.target` pair. [`Element`] is untagged on the
//! wire so the JSON shape matches what the canvas reads, while Rust code
//! matches on the variant instead of sniffing structure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::color::Color;
use crate::records::{Origin, OriginParameter, ScanProfile};

/// Canvas coordinates of a node, as last reported by the rendering shell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// Out-of-band node positions keyed by node id.
pub type PositionIndex = BTreeMap<String, Position>;

/// Border line style of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum BorderStyle {
    /// Solid line (declared profile).
    Solid,
    /// Dashed line (inherited profile).
    Dashed,
    /// No border line (empty profile).
    None,
    /// Double line (missing or unrecognized profile).
    Double,
}

/// Visual encoding of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub struct NodeStyle {
    /// Fill color.
    #[ts(type = "string")]
    pub background_color: Color,
    /// Border width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub border_width: Option<u32>,
    /// Border color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "string")]
    pub border_color: Option<Color>,
    /// Border line style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub border_style: Option<BorderStyle>,
}

impl NodeStyle {
    /// A borderless style with the given fill.
    pub const fn filled(background_color: Color) -> Self {
        Self {
            background_color,
            border_width: None,
            border_color: None,
            border_style: None,
        }
    }
}

/// Payload of a node element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NodeData {
    /// Node id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// The full backing record, or a diagnostic object for placeholders.
    pub info: Value,
    /// The object's scan profile, if any.
    #[ts(type = "Record<string, unknown> | null")]
    pub profile: Option<ScanProfile>,
}

/// A node as handed to the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NodeElement {
    /// Node payload.
    pub data: NodeData,
    /// Visual encoding.
    pub style: NodeStyle,
    /// Position carried over from the rendering shell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub position: Option<Position>,
}

/// Visual encoding of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub struct EdgeStyle {
    /// Line color.
    #[ts(type = "string")]
    pub line_color: Color,
    /// Arrowhead color.
    #[ts(type = "string")]
    pub target_arrow_color: Color,
}

/// Payload of an edge element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EdgeData {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// The origin record the edge was derived from.
    #[ts(type = "Record<string, unknown>")]
    pub info: Origin,
    /// Edge kind (origin type).
    pub kind: String,
    /// Parameter record attached to the origin, if any.
    #[ts(type = "Record<string, unknown> | null")]
    pub parameter: Option<OriginParameter>,
}

/// An edge as handed to the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EdgeElement {
    /// Edge payload.
    pub data: EdgeData,
    /// Visual encoding.
    pub style: EdgeStyle,
}

/// One entry of the flat render list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum Element {
    /// A node.
    Node(NodeElement),
    /// An edge.
    Edge(EdgeElement),
}

impl Element {
    /// Identity of the backing record: the node id for nodes, the origin id
    /// for edges. Edges of one origin share this key.
    pub fn record_id(&self) -> &str {
        match self {
            Self::Node(node) => &node.data.id,
            Self::Edge(edge) => &edge.data.info.id,
        }
    }

    /// Compare two elements ignoring any node position.
    pub fn same_content(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Node(a), Self::Node(b)) => a.data == b.data && a.style == b.style,
            (Self::Edge(a), Self::Edge(b)) => a == b,
            _ => false,
        }
    }

    /// Return the node payload if this is a node.
    pub const fn as_node(&self) -> Option<&NodeElement> {
        match self {
            Self::Node(node) => Some(node),
            Self::Edge(_) => None,
        }
    }

    /// Return the edge payload if this is an edge.
    pub const fn as_edge(&self) -> Option<&EdgeElement> {
        match self {
            Self::Edge(edge) => Some(edge),
            Self::Node(_) => None,
        }
    }
}

/// A render-ready graph: the flat element list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderGraph {
    /// Nodes and edges in render order.
    pub elements: Vec<Element>,
}

impl RenderGraph {
    /// Wrap an element list.
    pub const fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over node elements.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeElement> {
        self.elements.iter().filter_map(Element::as_node)
    }

    /// Iterate over edge elements.
    pub fn edges(&self) -> impl Iterator<Item = &EdgeElement> {
        self.elements.iter().filter_map(Element::as_edge)
    }

    /// Look up a node element by id.
    pub fn node(&self, id: &str) -> Option<&NodeElement> {
        self.nodes().find(|node| node.data.id == id)
    }

    /// Element-wise [`Element::same_content`] over two lists in order.
    pub fn same_content(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| a.same_content(b))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::records::Attributes;

    fn origin() -> Origin {
        Origin {
            id: "Origin|scan|a".to_owned(),
            source_id: "a".to_owned(),
            origin_type: "scan".to_owned(),
            results: vec!["b".to_owned()],
            attributes: Attributes::new(),
        }
    }

    #[test]
    fn untagged_elements_round_trip_by_shape() {
        let node = Element::Node(NodeElement {
            data: NodeData {
                id: "a".to_owned(),
                label: "Host".to_owned(),
                info: serde_json::json!({"xt/id": "a"}),
                profile: None,
            },
            style: NodeStyle::filled(Color::RED),
            position: Some(Position { x: 1.5, y: -2.0 }),
        });
        let edge = Element::Edge(EdgeElement {
            data: EdgeData {
                source: "a".to_owned(),
                target: "b".to_owned(),
                info: origin(),
                kind: "scan".to_owned(),
                parameter: None,
            },
            style: EdgeStyle {
                line_color: Color::BLACK,
                target_arrow_color: Color::BLACK,
            },
        });

        let json = serde_json::to_value(RenderGraph::new(vec![node.clone(), edge.clone()])).unwrap();
        assert_eq!(json[0]["data"]["id"], "a");
        assert_eq!(json[0]["style"]["background-color"], "#ff0000");
        assert!(json[0]["style"].get("border-width").is_none());
        assert_eq!(json[1]["data"]["source"], "a");
        assert_eq!(json[1]["style"]["line-color"], "#000000");

        let back: RenderGraph = serde_json::from_value(json).unwrap();
        assert_eq!(back.elements, vec![node, edge]);
    }

    #[test]
    fn record_id_of_edge_is_origin_id() {
        let edge = Element::Edge(EdgeElement {
            data: EdgeData {
                source: "a".to_owned(),
                target: "b".to_owned(),
                info: origin(),
                kind: "scan".to_owned(),
                parameter: None,
            },
            style: EdgeStyle {
                line_color: Color::BLACK,
                target_arrow_color: Color::BLACK,
            },
        });
        assert_eq!(edge.record_id(), "Origin|scan|a");
        assert!(edge.as_node().is_none());
    }

    #[test]
    fn same_content_ignores_position() {
        let placed = |position| {
            Element::Node(NodeElement {
                data: NodeData {
                    id: "a".to_owned(),
                    label: "Host".to_owned(),
                    info: serde_json::json!({"xt/id": "a"}),
                    profile: None,
                },
                style: NodeStyle::filled(Color::RED),
                position,
            })
        };
        let here = RenderGraph::new(vec![placed(Some(Position { x: 0.0, y: 0.0 }))]);
        let there = RenderGraph::new(vec![placed(Some(Position { x: 9.0, y: 9.0 }))]);
        let nowhere = RenderGraph::new(vec![placed(None)]);
        assert!(here.same_content(&there));
        assert!(here.same_content(&nowhere));
        assert!(!here.same_content(&RenderGraph::default()));
    }

    #[test]
    fn skipped_fields_are_optional_in_bindings() {
        let style = NodeStyle::decl();
        assert!(style.contains("\"border-width\"?:"));
        assert!(style.contains("\"border-color\"?: string"));
        assert!(style.contains("\"border-style\"?:"));
        assert!(NodeElement::decl().contains("position?:"));
    }
}
