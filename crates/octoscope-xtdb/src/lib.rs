//! HTTP store facade for Octoscope.
//!
//! Implements [`StoreFacade`] and [`StoreConnector`] against the REST API
//! of an XTDB multinode gateway using `reqwest`.
//!
//! # Modules
//!
//! - [`client`] -- [`XtdbConnector`] and the per-node [`XtdbClient`].
//! - [`error`] -- Setup errors; request errors are reported as
//!   [`StoreError`].
//!
//! [`StoreFacade`]: octoscope_core::store::StoreFacade
//! [`StoreConnector`]: octoscope_core::store::StoreConnector
//! [`StoreError`]: octoscope_core::store::StoreError

pub mod client;
pub mod error;

pub use client::{XtdbClient, XtdbConnector};
pub use error::XtdbError;
