//! Shared type definitions for Octoscope.
//!
//! This crate is the single source of truth for the records read from the
//! bitemporal document store, the typed graph produced by synthesis, and
//! the flat element list handed to the graph canvas. Render-boundary
//! types flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`records`] -- Store documents (objects, origins, origin parameters,
//!   scan profiles) with open attribute payloads
//! - [`graph`] -- Typed [`Node`] tagged union, [`Edge`], and [`Graph`]
//! - [`element`] -- Render-boundary element list and visual encoding
//! - [`color`] -- RGB color serialized as `#rrggbb`

pub mod color;
pub mod element;
pub mod graph;
pub mod records;

// Re-export all public types at crate root for convenience.
pub use color::{Color, ParseColorError};
pub use element::{
    BorderStyle, EdgeData, EdgeElement, EdgeStyle, Element, NodeData, NodeElement, NodeStyle,
    Position, PositionIndex, RenderGraph,
};
pub use graph::{
    Edge, ERROR_NODE_ID, FetchFailure, Graph, INIT_NODE_ID, NULL_SENTINEL_ID, Node,
};
pub use records::{
    Attributes, ObjectOfInterest, Origin, OriginParameter, ScanProfile, ScanProfileType,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the render-boundary types.

    #[test]
    fn export_bindings() {
        // ts-rs writes the files to the `bindings/` directory relative to
        // the crate root.
        use ts_rs::TS;

        let _ = crate::element::Position::export_all();
        let _ = crate::element::BorderStyle::export_all();
        let _ = crate::element::NodeStyle::export_all();
        let _ = crate::element::NodeData::export_all();
        let _ = crate::element::NodeElement::export_all();
        let _ = crate::element::EdgeStyle::export_all();
        let _ = crate::element::EdgeData::export_all();
        let _ = crate::element::EdgeElement::export_all();
        let _ = crate::element::Element::export_all();
    }
}
