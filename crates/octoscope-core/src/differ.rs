//! Publish-or-skip decision for a freshly rendered graph.
//!
//! A refresh that changes nothing must not reach the canvas, otherwise the
//! shell would reset selection, pan, and any node the user dragged.

use std::cmp::Ordering;

use octoscope_types::{Element, PositionIndex, RenderGraph};
use tracing::debug;

/// Outcome of [`reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The graph changed; display this one.
    Publish(RenderGraph),
    /// Nothing changed; keep the currently displayed graph.
    Unchanged,
}

impl Decision {
    /// Whether the caller should publish.
    pub const fn is_publish(&self) -> bool {
        matches!(self, Self::Publish(_))
    }

    /// The graph to publish, if any.
    pub const fn graph(&self) -> Option<&RenderGraph> {
        match self {
            Self::Publish(graph) => Some(graph),
            Self::Unchanged => None,
        }
    }
}

/// Compare `next` against the previously published graph.
///
/// Known positions are re-attached to matching nodes of `next` and the
/// element list is canonicalized before comparing. Positions are not part
/// of the comparison, so a drag alone never forces a publish.
pub fn reconcile(
    previous: Option<&RenderGraph>,
    mut next: RenderGraph,
    positions: &PositionIndex,
) -> Decision {
    attach_positions(&mut next, positions);
    canonicalize(&mut next);

    match previous {
        Some(previous) if !previous.is_empty() && previous.same_content(&next) => {
            debug!(elements = next.len(), "graph unchanged");
            Decision::Unchanged
        }
        _ => {
            debug!(elements = next.len(), "graph changed");
            Decision::Publish(next)
        }
    }
}

fn attach_positions(graph: &mut RenderGraph, positions: &PositionIndex) {
    for element in &mut graph.elements {
        if let Element::Node(node) = element {
            if let Some(position) = positions.get(&node.data.id) {
                node.position = Some(*position);
            }
        }
    }
}

/// Sort by record id. Edges of one origin share that id, so they are
/// further ordered by endpoints; nodes sort before edges on a tie.
pub fn canonicalize(graph: &mut RenderGraph) {
    graph.elements.sort_by(compare);
}

fn compare(a: &Element, b: &Element) -> Ordering {
    a.record_id()
        .cmp(b.record_id())
        .then_with(|| endpoints(a).cmp(&endpoints(b)))
}

fn endpoints(element: &Element) -> Option<(&str, &str)> {
    element
        .as_edge()
        .map(|edge| (edge.data.source.as_str(), edge.data.target.as_str()))
}
