//! Observer API server for Octoscope.
//!
//! This crate is the rendering-shell boundary. It provides an Axum HTTP
//! server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/graph`) streaming every published
//!   graph via [`tokio::sync::broadcast`]
//! - **REST endpoints** for the displayed graph, element detail, and
//!   on-demand entity history
//! - **Control endpoints** that feed node selection, valid-time, and
//!   placeholder flags back into the refresh loop, plus the node position
//!   index
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! The refresh loop owns all refresh state. It reads its inputs from
//! watch channels held in [`AppState`] and writes each decision back
//! into it. Handlers never block a refresh cycle.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use state::{AppState, PublishedGraph};
