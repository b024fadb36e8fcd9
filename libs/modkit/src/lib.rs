//! # ModKit - shared HTTP kit
//!
//! Building blocks shared by the server and its modules:
//!
//! - **Problem details**: RFC 9457 `Problem` / `ProblemResponse` for error bodies
//! - **HTTP layers**: request-id propagation, request tracing, timeouts, body limits
//! - **Runtime**: signal-driven graceful shutdown

pub use anyhow::Result;

// Problem details
pub mod api;
pub use api::problem::{
    bad_request, conflict, forbidden, internal_error, not_found, unauthorized, Problem,
    ProblemResponse, ValidationError,
};

// HTTP utilities
pub mod http;
pub use http::layers::{apply_standard_layers, HttpLayerOptions};

pub mod runtime;
pub use runtime::shutdown::{shutdown_signal, wait_for_shutdown};
