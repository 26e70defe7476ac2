//! Typed node/edge graph produced by one synthesis call.
//!
//! Nodes and edges are kept as two explicitly typed sequences. They are
//! only flattened into a single ordered element list at the render
//! boundary (see [`crate::element`]).

use crate::records::{Attributes, ObjectOfInterest, Origin, OriginParameter, ScanProfile};

/// Id of the shared Null sentinel node.
///
/// Reserved within one synthesis call only. A real object using this id
/// collides with the sentinel; that case is not guarded against.
pub const NULL_SENTINEL_ID: &str = "fake_null";

/// Id of the node that replaces the graph when the snapshot fetch fails.
pub const ERROR_NODE_ID: &str = "error";

/// Id of the placeholder shown before the first refresh completes.
pub const INIT_NODE_ID: &str = "init";

/// Why a snapshot could not be fetched, and from where.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    /// Human-readable failure message.
    pub message: String,
    /// Structured status returned by the store, if it returned one.
    pub status: Attributes,
    /// Store node (connection target) the fetch was attempted against.
    pub node: String,
    /// Default node the deployment falls back to.
    pub default_node: String,
}

/// A graph node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Backed by an object present in the snapshot.
    Real {
        /// The backing object.
        ooi: ObjectOfInterest,
        /// The object's scan profile, if one exists.
        profile: Option<ScanProfile>,
    },
    /// An id referenced by some origin but absent from the object set.
    Fake {
        /// The dangling id.
        id: String,
    },
    /// The shared target of every origin without results.
    Null,
    /// Stands in for the whole graph when the fetch failed.
    Error(FetchFailure),
}

impl Node {
    /// Return the node id.
    pub fn id(&self) -> &str {
        match self {
            Self::Real { ooi, .. } => &ooi.id,
            Self::Fake { id } => id,
            Self::Null => NULL_SENTINEL_ID,
            Self::Error(_) => ERROR_NODE_ID,
        }
    }
}

/// A directed edge derived from one result of one [`Origin`].
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Source node id.
    pub source: String,
    /// Target node id (an object id or [`NULL_SENTINEL_ID`]).
    pub target: String,
    /// Edge kind (the origin type).
    pub kind: String,
    /// The origin record this edge was derived from.
    pub info: Origin,
    /// The parameter record attached to the origin, if any.
    pub parameter: Option<OriginParameter>,
}

/// One synthesized graph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    /// Real nodes first, then fakes, then the Null sentinel.
    pub nodes: Vec<Node>,
    /// Edges in origin order.
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Build the single-node graph that replaces a failed fetch.
    pub fn error(failure: FetchFailure) -> Self {
        Self {
            nodes: vec![Node::Error(failure)],
            edges: Vec::new(),
        }
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Whether this graph is the fetch-failure graph.
    pub fn is_error(&self) -> bool {
        matches!(self.nodes.as_slice(), [Node::Error(_)])
    }

    /// Iterate over the fake nodes.
    pub fn fakes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Fake { id } => Some(id.as_str()),
            _ => None,
        })
    }
}
