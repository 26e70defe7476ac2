//! Graph synthesis, change detection, and refresh control for Octoscope.
//!
//! A refresh cycle fetches a snapshot of store records at a valid-time,
//! synthesizes a node/edge graph with placeholder nodes for dangling and
//! empty references, renders it to the canvas element list, and decides
//! whether it differs from what is currently displayed.
//!
//! # Modules
//!
//! - [`colorize`] -- Deterministic string-to-color mapping.
//! - [`config`] -- Configuration loading from `octoscope-config.yaml` into
//!   strongly-typed structs.
//! - [`controller`] -- [`RefreshController`], owner of the node selection
//!   and the last published graph.
//! - [`controls`] -- Query-string control parameters and valid-time parsing.
//! - [`differ`] -- Publish-or-skip [`Decision`] against the last graph.
//! - [`render`] -- Visual encoding and flattening into canvas elements.
//! - [`runner`] -- Periodic refresh loop with a [`RefreshCallback`].
//! - [`snapshot`] -- The four record queries making up one snapshot.
//! - [`store`] -- [`StoreFacade`] and [`StoreConnector`] traits.
//! - [`synthesis`] -- Snapshot to typed graph.
//!
//! [`RefreshController`]: controller::RefreshController
//! [`Decision`]: differ::Decision
//! [`RefreshCallback`]: runner::RefreshCallback
//! [`StoreFacade`]: store::StoreFacade
//! [`StoreConnector`]: store::StoreConnector

pub mod colorize;
pub mod config;
pub mod controller;
pub mod controls;
pub mod differ;
pub mod render;
pub mod runner;
pub mod snapshot;
pub mod store;
pub mod synthesis;
